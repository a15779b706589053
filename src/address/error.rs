//! Addressing error types.
//!
//! These are caller bugs (bad configuration, misuse of the scope API).
//! Resolution misses are never errors; they surface as `None`.

use thiserror::Error;

/// Errors raised by the addressing engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid file extension `{0}`: must start with `.` and name at least one character")]
    InvalidExtension(String),

    #[error("scope directory `{0}` must be relative to the site root")]
    AbsoluteDirectory(String),

    #[error("path `{0}` navigates above the site root")]
    AboveRoot(String),

    #[error("scope released out of order: `{found}` is not the active scope (active: `{expected}`)")]
    ScopeOrder { expected: String, found: String },

    #[error(
        "scope `{0}` opened on a tokio runtime outside a flow: wrap the task in `scope_flow` (or `sync_flow` for blocking code)"
    )]
    FlowRequired(String),

    #[error("invalid base url `{0}`: must be an absolute http(s) url")]
    InvalidBaseUrl(String),

    #[error("path `{0}` is already mapped")]
    DuplicateMapping(String),

    #[error("invalid namespace pattern `{0}`: `*` may only appear as a whole trailing segment")]
    InvalidPattern(String),

    #[error("invalid url template `{0}`: missing `{1}` placeholder")]
    InvalidTemplate(String, &'static str),
}
