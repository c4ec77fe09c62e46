//! Application context for one CLI session.
//!
//! [`App`] owns the [`CaseStore`] for the lifetime of the process. Each
//! command is one mutation (or none) followed by a fresh derivation of the
//! table from the store's snapshot.

use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use ses_core::storage::{MemoryStorageFactory, StorageRegistry};
use ses_core::{Case, CaseField, CaseStore, StepDirection};
use ses_db_sqlite::SqliteStorageFactory;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::export::write_csv;
use crate::render::CaseTable;

/// Registry with every storage backend this binary ships with.
pub fn build_registry() -> StorageRegistry {
    let mut registry = StorageRegistry::new();
    registry.register(Box::new(MemoryStorageFactory));
    registry.register(Box::new(SqliteStorageFactory));
    registry
}

/// Field values for a case created by `add`. Each one goes through the
/// same coercion as an edit.
#[derive(Debug, Clone, Default)]
pub struct CaseDraft {
    pub name: Option<String>,
    pub sales: Option<String>,
    pub cost: Option<String>,
    pub duration: Option<String>,
}

impl CaseDraft {
    fn fields(&self) -> impl Iterator<Item = (CaseField, &str)> {
        [
            (CaseField::Name, &self.name),
            (CaseField::Sales, &self.sales),
            (CaseField::Cost, &self.cost),
            (CaseField::Duration, &self.duration),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
    }
}

/// A command named a case id that is not in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no case with id {0}")]
pub struct CaseNotFound(pub i64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(Case),
    NotFound,
    Cancelled,
}

pub struct App {
    store: CaseStore,
}

impl App {
    /// Opens the configured backend and restores the saved cases.
    pub async fn open(
        config: &AppConfig,
        tax_included: bool,
    ) -> Result<Self> {
        let storage_config = config.storage_config();
        debug!("connecting to {} backend", storage_config.backend);

        let storage = build_registry()
            .create(&storage_config)
            .await
            .with_context(|| {
                format!(
                    "failed to open {} storage '{}'",
                    storage_config.backend, storage_config.connection_string
                )
            })?;

        let mut store = CaseStore::load(storage, config.storage.key.as_str()).await;
        store.set_tax_included(tax_included);
        Ok(Self { store })
    }

    pub fn store(&self) -> &CaseStore {
        &self.store
    }

    pub fn table(&self) -> CaseTable {
        CaseTable::from_snapshot(&self.store.snapshot())
    }

    pub async fn add_case(
        &mut self,
        draft: &CaseDraft,
    ) -> Result<Case> {
        let added = self.store.add().await.context("failed to save new case")?;
        for (field, value) in draft.fields() {
            self.store
                .update(added.id, field, value)
                .await
                .with_context(|| format!("failed to save {field} of case {}", added.id))?;
        }

        let case = self.store.get(added.id).cloned().unwrap_or(added);
        info!(id = case.id, "case added");
        Ok(case)
    }

    /// Sets one field of case `id`. Fails with [`CaseNotFound`] for an
    /// unknown id.
    pub async fn set_field(
        &mut self,
        id: i64,
        field: CaseField,
        value: &str,
    ) -> Result<Case> {
        self.require(id)?;
        self.store
            .update(id, field, value)
            .await
            .with_context(|| format!("failed to save {field} of case {id}"))?;
        self.current(id)
    }

    pub async fn step_field(
        &mut self,
        id: i64,
        field: CaseField,
        direction: StepDirection,
    ) -> Result<Case> {
        self.require(id)?;
        self.store
            .step(id, field, direction)
            .await
            .with_context(|| format!("failed to save {field} of case {id}"))?;
        self.current(id)
    }

    /// Removes case `id` once `confirm` agrees. `confirm` is not consulted
    /// for unknown ids.
    pub async fn remove_case<F>(
        &mut self,
        id: i64,
        confirm: F,
    ) -> Result<RemoveOutcome>
    where
        F: FnOnce(&Case) -> io::Result<bool>,
    {
        let Some(case) = self.store.get(id).cloned() else {
            return Ok(RemoveOutcome::NotFound);
        };
        if !confirm(&case).context("failed to read confirmation")? {
            return Ok(RemoveOutcome::Cancelled);
        }

        self.store
            .remove(id)
            .await
            .with_context(|| format!("failed to save removal of case {id}"))?;
        info!(id, "case removed");
        Ok(RemoveOutcome::Removed(case))
    }

    /// Writes the current table to `path` as CSV.
    pub fn export(
        &self,
        path: &Path,
    ) -> Result<usize> {
        let file = File::create(path)
            .with_context(|| format!("failed to create '{}'", path.display()))?;
        let written = write_csv(&self.table(), file)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        info!(rows = written, path = %path.display(), "exported cases");
        Ok(written)
    }

    fn require(
        &self,
        id: i64,
    ) -> Result<(), CaseNotFound> {
        self.store.get(id).map(|_| ()).ok_or(CaseNotFound(id))
    }

    fn current(
        &self,
        id: i64,
    ) -> Result<Case> {
        Ok(self.store.get(id).cloned().ok_or(CaseNotFound(id))?)
    }

    pub async fn reset(&mut self) -> Result<()> {
        self.store
            .reset()
            .await
            .context("failed to clear saved cases")
    }
}

/// Asks a yes/no question; anything but `y`/`yes` (or end of input) is no.
pub fn confirm<R: BufRead, W: Write>(
    prompt: &str,
    mut input: R,
    mut output: W,
) -> io::Result<bool> {
    write!(output, "{prompt} [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn registry_ships_memory_and_sqlite() {
        assert_eq!(build_registry().available_backends(), vec!["memory", "sqlite"]);
    }

    #[test]
    fn confirm_accepts_yes() {
        let mut out = Vec::new();

        assert!(confirm("Delete?", "y\n".as_bytes(), &mut out).unwrap());
        assert!(confirm("Delete?", " YES \n".as_bytes(), Vec::new()).unwrap());
        assert_eq!(String::from_utf8(out).unwrap(), "Delete? [y/N] ");
    }

    #[test]
    fn confirm_defaults_to_no() {
        assert!(!confirm("Delete?", "\n".as_bytes(), Vec::new()).unwrap());
        assert!(!confirm("Delete?", "".as_bytes(), Vec::new()).unwrap());
        assert!(!confirm("Delete?", "nope\n".as_bytes(), Vec::new()).unwrap());
    }

    #[test]
    fn draft_yields_only_given_fields() {
        let draft = CaseDraft {
            name: Some("X".to_string()),
            duration: Some("3".to_string()),
            ..Default::default()
        };

        let fields: Vec<_> = draft.fields().collect();

        assert_eq!(fields, vec![(CaseField::Name, "X"), (CaseField::Duration, "3")]);
    }
}
