mod case;
mod snapshot;

pub use case::{Case, CaseField, StepDirection};
pub use snapshot::Snapshot;
