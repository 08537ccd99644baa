use thiserror::Error;

/// Errors surfaced at the ledger boundary.
///
/// Tamper detection is not an error: see [`crate::ledger::InvalidBlock`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl LedgerError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        LedgerError::Configuration(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
