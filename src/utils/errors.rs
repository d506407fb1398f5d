use thiserror::Error;

use crate::actions::{Field, FailureKind};

/// Result alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Main error type for the bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Invalid request: {field}: {reason}")]
    InvalidRequest { field: Field, reason: String },

    #[error("Compile error: {0}")]
    Compile(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportFailure),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Faults that stop a payload from reaching the host or its reply from coming back
#[derive(Error, Debug)]
pub enum TransportFailure {
    #[error("host unreachable at {address}: {source}")]
    Unreachable {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start host runner '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("host did not answer within {secs} seconds")]
    Timeout { secs: u64 },

    #[error("host runner exited with status {code} and no reply")]
    NoReply { code: i32 },

    #[error("transport panicked: {0}")]
    Panicked(String),
}

impl TransportFailure {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

impl BridgeError {
    pub fn invalid(field: Field, reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            field,
            reason: reason.into(),
        }
    }

    /// Category reported alongside a failed `ActionResult`
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidRequest { .. } | Self::Json(_) => FailureKind::InvalidRequest,
            Self::Compile(_) | Self::Config(_) => FailureKind::Compile,
            Self::Transport(_) => FailureKind::Transport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_names_field() {
        let err = BridgeError::invalid(Field::Value, "must be within [0, 1]");
        assert_eq!(err.to_string(), "Invalid request: value: must be within [0, 1]");
        assert_eq!(err.kind(), FailureKind::InvalidRequest);
    }

    #[test]
    fn test_transport_failures_map_to_transport_kind() {
        let err: BridgeError = TransportFailure::Timeout { secs: 5 }.into();
        assert_eq!(err.kind(), FailureKind::Transport);
        assert!(err.to_string().contains("5 seconds"));
    }
}
