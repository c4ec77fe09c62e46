//! The authoritative case list and its persistence.
//!
//! A [`CaseStore`] is built once per session from whatever the byte store
//! holds and writes the full case list back after every mutation. The tax
//! mode lives only in memory and starts out `false` on every load.

use tracing::{debug, warn};

use crate::input::{coerce_amount, coerce_months};
use crate::models::{Case, CaseField, Snapshot, StepDirection};
use crate::storage::{KeyValueStore, StorageError};

/// Key the case list is persisted under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "ses_calc_void";

pub struct CaseStore {
    storage: Box<dyn KeyValueStore>,
    key: String,
    cases: Vec<Case>,
    tax_included: bool,
}

impl CaseStore {
    /// Restores the case list persisted under `key`.
    ///
    /// Falls back to the single sample case when nothing is stored, the
    /// stored bytes are not a valid case list, or the read itself fails.
    /// This never returns an error.
    pub async fn load(
        storage: Box<dyn KeyValueStore>,
        key: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let cases = read_cases(&*storage, &key)
            .await
            .unwrap_or_else(default_cases);

        debug!(key = %key, count = cases.len(), "case store loaded");

        Self {
            storage,
            key,
            cases,
            tax_included: false,
        }
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn get(
        &self,
        id: i64,
    ) -> Option<&Case> {
        self.cases.iter().find(|c| c.id == id)
    }

    pub fn tax_included(&self) -> bool {
        self.tax_included
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        &*self.storage
    }

    /// Copy of the current state for handing to a renderer.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cases: self.cases.clone(),
            tax_included: self.tax_included,
        }
    }

    /// The id the next [`add`](Self::add) will assign: one past the largest
    /// id in use, or the lowest free positive id once that would overflow.
    pub fn next_id(&self) -> i64 {
        match self.cases.iter().map(|c| c.id).max() {
            None => 1,
            Some(max) => max.checked_add(1).unwrap_or_else(|| self.lowest_free_id()),
        }
    }

    fn lowest_free_id(&self) -> i64 {
        let mut ids: Vec<i64> = self.cases.iter().map(|c| c.id).filter(|&id| id > 0).collect();
        ids.sort_unstable();
        ids.dedup();

        let mut candidate = 1;
        for id in ids {
            if id != candidate {
                break;
            }
            candidate = candidate.saturating_add(1);
        }
        candidate
    }

    /// Appends a blank case and returns a copy of it.
    pub async fn add(&mut self) -> Result<Case, StorageError> {
        let case = Case::blank(self.next_id());
        debug!(id = case.id, "adding case");
        self.cases.push(case.clone());
        self.persist().await?;
        Ok(case)
    }

    /// Sets one field of the case with `id` from raw input.
    ///
    /// Numeric fields are coerced to non-negative integers (unparseable
    /// input becomes 0); `name` is stored verbatim. Returns `false` and
    /// leaves everything untouched when no case has that id.
    pub async fn update(
        &mut self,
        id: i64,
        field: CaseField,
        value: &str,
    ) -> Result<bool, StorageError> {
        let Some(case) = self.cases.iter_mut().find(|c| c.id == id) else {
            debug!(id, %field, "update ignored, no such case");
            return Ok(false);
        };

        match field {
            CaseField::Name => case.name = value.to_string(),
            CaseField::Sales => case.sales = coerce_amount(value),
            CaseField::Cost => case.cost = coerce_amount(value),
            CaseField::Duration => case.duration = coerce_months(value),
        }
        debug!(id, %field, "case updated");

        self.persist().await?;
        Ok(true)
    }

    /// Moves a numeric field one stepper increment up or down, stopping at 0.
    ///
    /// Returns `false` for `name` or an unknown id.
    pub async fn step(
        &mut self,
        id: i64,
        field: CaseField,
        direction: StepDirection,
    ) -> Result<bool, StorageError> {
        let Some(size) = field.step() else {
            return Ok(false);
        };
        let Some(current) = self.get(id).and_then(|c| c.amount(field)) else {
            return Ok(false);
        };

        let next = direction.apply(current, size);
        self.update(id, field, &next.to_string()).await
    }

    /// Removes the case with `id`. Removing an unknown id is a no-op that
    /// returns `false`.
    pub async fn remove(
        &mut self,
        id: i64,
    ) -> Result<bool, StorageError> {
        let before = self.cases.len();
        self.cases.retain(|c| c.id != id);
        if self.cases.len() == before {
            debug!(id, "remove ignored, no such case");
            return Ok(false);
        }

        debug!(id, "case removed");
        self.persist().await?;
        Ok(true)
    }

    pub fn set_tax_included(
        &mut self,
        tax_included: bool,
    ) {
        self.tax_included = tax_included;
    }

    /// Deletes the persisted entry and returns to the sample case list.
    pub async fn reset(&mut self) -> Result<(), StorageError> {
        self.cases = default_cases();
        self.tax_included = false;
        self.storage.remove(&self.key).await
    }

    async fn persist(&self) -> Result<(), StorageError> {
        let bytes =
            serde_json::to_vec(&self.cases).map_err(|e| StorageError::Write(e.to_string()))?;
        self.storage.set(&self.key, &bytes).await
    }
}

fn default_cases() -> Vec<Case> {
    vec![Case::sample()]
}

async fn read_cases(
    storage: &dyn KeyValueStore,
    key: &str,
) -> Option<Vec<Case>> {
    let bytes = match storage.get(key).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(error) => {
            warn!(key, %error, "could not read saved cases, using defaults");
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(cases) => Some(cases),
        Err(error) => {
            warn!(key, %error, "discarding unreadable saved cases");
            None
        }
    }
}
