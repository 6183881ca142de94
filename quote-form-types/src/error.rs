/// Error type for form operations.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// User closed the form without submitting (Esc, Ctrl+C, closed window).
    #[error("Form cancelled by user")]
    Cancelled,

    /// The configured currency code cannot be used to format the total.
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    /// Backend-specific failure (I/O, terminal crash, etc.)
    #[error("Backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl FormError {
    /// Create a backend error from any error type.
    pub fn backend(err: impl Into<anyhow::Error>) -> Self {
        Self::Backend(err.into())
    }

    /// Check if this error represents user cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Error setting a control from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetValueError {
    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("'{value}' is not an option of {name}")]
    NotAnOption { name: String, value: String },

    #[error("'{0}' is not a checkbox state")]
    BadCheckboxState(String),
}
