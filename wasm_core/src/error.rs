use thiserror::Error;

/// Errors surfaced by the toolbox core. At the wasm boundary every variant is
/// rendered into a plain string for the inline UI message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("invalid JSON at line {line}, column {column}: {message}")]
    Json {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("unsupported algorithm {0}")]
    UnsupportedAlgorithm(String),

    #[error("{context}: {message}")]
    Decode { context: String, message: String },
}

impl ToolError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ToolError::InvalidInput(message.into())
    }

    pub fn decode(context: impl Into<String>, message: impl ToString) -> Self {
        ToolError::Decode {
            context: context.into(),
            message: message.to_string(),
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_eof() {
            let suffix = format!(" at line {} column {}", err.line(), err.column());
            let text = err.to_string();
            let message = text.strip_suffix(&suffix).unwrap_or(&text).to_string();
            ToolError::Json {
                line: err.line(),
                column: err.column(),
                message,
            }
        } else {
            ToolError::Serialization(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;
