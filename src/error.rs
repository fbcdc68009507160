//! Error types for themeform operations.
//!
//! Only binding problems and I/O surface as errors. Unparseable numbers and
//! constraint violations are reported through field validity instead.

use thiserror::Error;

/// Errors that can occur while binding or driving a theme form.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "cli")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid binding name: {0}")]
    InvalidBindingName(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Element is not a form: {0}")]
    NotAForm(String),

    #[error("Form is already bound")]
    AlreadyBound,

    #[error("Form is not bound")]
    NotBound,

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
