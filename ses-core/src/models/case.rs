use serde::{Deserialize, Serialize};

/// One engagement line item.
///
/// `sales` and `cost` are monthly unit prices in whole yen; `duration` is
/// the number of months the engagement runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: i64,
    pub name: String,
    pub sales: u64,
    pub cost: u64,
    pub duration: u32,
}

impl Case {
    /// The case a fresh store starts with when nothing has been persisted.
    pub fn sample() -> Self {
        Self {
            id: 1,
            name: "CYBER CORE DEV".to_string(),
            sales: 900_000,
            cost: 600_000,
            duration: 6,
        }
    }

    /// An empty one-month case, as created by the "add" action.
    pub fn blank(id: i64) -> Self {
        Self {
            id,
            name: String::new(),
            sales: 0,
            cost: 0,
            duration: 1,
        }
    }

    /// Current value of a numeric field, `None` for `name`.
    pub fn amount(&self, field: CaseField) -> Option<u64> {
        match field {
            CaseField::Name => None,
            CaseField::Sales => Some(self.sales),
            CaseField::Cost => Some(self.cost),
            CaseField::Duration => Some(u64::from(self.duration)),
        }
    }
}

/// Editable fields of a [`Case`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseField {
    Name,
    Sales,
    Cost,
    Duration,
}

impl CaseField {
    pub fn all() -> &'static [CaseField] {
        &[
            CaseField::Name,
            CaseField::Sales,
            CaseField::Cost,
            CaseField::Duration,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Sales => "sales",
            Self::Cost => "cost",
            Self::Duration => "duration",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Some(Self::Name),
            "sales" => Some(Self::Sales),
            "cost" => Some(Self::Cost),
            "duration" => Some(Self::Duration),
            _ => None,
        }
    }

    /// Whether writes to this field go through the non-negative integer clamp.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Name)
    }

    /// Increment used by the stepper controls.
    pub fn step(&self) -> Option<u64> {
        match self {
            Self::Name => None,
            Self::Sales | Self::Cost => Some(10_000),
            Self::Duration => Some(1),
        }
    }
}

impl std::fmt::Display for CaseField {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

impl StepDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "+" | "inc" => Some(Self::Up),
            "down" | "-" | "dec" => Some(Self::Down),
            _ => None,
        }
    }

    /// Applies one step of `size` to `value`, never going below zero.
    pub fn apply(
        &self,
        value: u64,
        size: u64,
    ) -> u64 {
        match self {
            Self::Up => value.saturating_add(size),
            Self::Down => value.saturating_sub(size),
        }
    }
}
