// Error types for router collection and the RouterOS API client

use thiserror::Error;

/// Failures at the router API session layer
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Login rejected: {0}")]
    LoginRejected(String),

    #[error("Command {command} failed: {message}")]
    Trap { command: String, message: String },

    #[error("Router closed the session: {0}")]
    Fatal(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Errors that abort a snapshot build
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("Transport error: {0}")]
    Transport(#[from] ClientError),

    #[error("Empty response to {command}")]
    EmptyResponse { command: String },

    #[error("Malformed field {field}: {raw_value:?}")]
    MalformedField { field: String, raw_value: String },
}

/// Result type alias using CollectError
pub type CollectResult<T> = Result<T, CollectError>;

impl CollectError {
    /// Short machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            CollectError::Transport(_) => "RouterUnreachable",
            CollectError::EmptyResponse { .. } => "EmptyRouterResponse",
            CollectError::MalformedField { .. } => "MalformedRouterResponse",
        }
    }

    /// Convert error to user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            CollectError::Transport(_) => {
                "Could not talk to the router. Check its address and API credentials.".to_string()
            }
            CollectError::EmptyResponse { .. } | CollectError::MalformedField { .. } => {
                "The router returned unexpected data.".to_string()
            }
        }
    }
}
