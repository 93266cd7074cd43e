//! Error types for sqlfrag

use thiserror::Error;

/// Result type alias for sqlfrag operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while normalizing conditions, building templates or
/// compiling statements.
#[derive(Debug, Error)]
pub enum Error {
    /// The number of `?` markers does not match the number of bound arguments
    #[error("placeholder mismatch: {placeholders} placeholder(s) but {args} argument(s)")]
    PlaceholderMismatch { placeholders: usize, args: usize },

    /// An argument kind that cannot appear in the given position
    #[error("Unsupported argument: {0}")]
    UnsupportedArgument(String),

    /// An operator string that cannot be used in a condition
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    /// A dialect layout string failed to parse or references an unknown slot
    #[error("Layout error in '{layout}': {message}")]
    Layout { layout: String, message: String },

    /// Invalid dialect configuration
    #[error("Config error: {0}")]
    Config(String),

    /// A statement is missing a part its type requires
    #[error("Empty statement: {0}")]
    EmptyStatement(String),

    /// Failed to read a configuration file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a layout error for a named layout
    pub fn layout(layout: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Layout {
            layout: layout.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a placeholder/argument count mismatch
    pub fn is_placeholder_mismatch(&self) -> bool {
        matches!(self, Self::PlaceholderMismatch { .. })
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
