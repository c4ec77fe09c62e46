use super::Case;

/// The full in-memory state of a session: the ordered case list plus the
/// tax mode. Only `cases` is ever persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub cases: Vec<Case>,
    pub tax_included: bool,
}
