use thiserror::Error;

use crate::visit::types::DocStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("party lookup failed: {0}")]
    Lookup(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("[{parent}] missing table '{table}'")]
    MissingTable { parent: String, table: &'static str },
    #[error("{doctype} {name} not found")]
    NotFound { doctype: String, name: String },
    #[error("visit must be saved before it can be {0}")]
    Unsaved(&'static str),
    #[error("visit is {actual:?}, expected {expected:?}")]
    InvalidStatus { expected: DocStatus, actual: DocStatus },
    #[error("ledger error: {0}")]
    Ledger(String),
}
