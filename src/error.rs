// MIT License - Copyright (c) 2026 Peter Wright
// Error types

/// All errors that can occur in the pima-force bridge.
///
/// Decoded events that fail the zone-status filter are never errors; they are
/// dropped by the dispatcher without a trace outside of `trace!` logging.
#[derive(Debug, thiserror::Error)]
pub enum PimaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SIA listener failed to start on port {port}: {reason}")]
    Startup { port: u16, reason: String },

    #[error("SIA listener failed to stop on port {port}: {reason}")]
    Shutdown { port: u16, reason: String },

    #[error("Unknown config entry: {entry_id}")]
    UnknownEntry { entry_id: String },

    #[error("Unknown zone entity: {entity_id}")]
    UnknownEntity { entity_id: String },

    #[error("Config entry already exists: {entry_id}")]
    DuplicateEntry { entry_id: String },

    #[error("Config entry already loaded: {entry_id}")]
    AlreadyLoaded { entry_id: String },

    #[error("Config entry not loaded: {entry_id}")]
    NotLoaded { entry_id: String },

    #[error("Invalid listening port: {port}")]
    InvalidPort { port: u16 },
}

impl PimaError {
    /// Whether this error came from the listener lifecycle rather than from
    /// an operator action.
    pub fn is_listener_error(&self) -> bool {
        matches!(self, PimaError::Startup { .. } | PimaError::Shutdown { .. })
    }
}

pub type Result<T> = std::result::Result<T, PimaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_errors() {
        assert!(PimaError::Startup { port: 10001, reason: "busy".into() }.is_listener_error());
        assert!(PimaError::Shutdown { port: 10001, reason: "gone".into() }.is_listener_error());
        assert!(!PimaError::UnknownEntry { entry_id: "x".into() }.is_listener_error());
    }

    #[test]
    fn test_error_messages() {
        let err = PimaError::UnknownEntry { entry_id: "missing_entry".into() };
        assert_eq!(err.to_string(), "Unknown config entry: missing_entry");
        let err = PimaError::Startup { port: 10001, reason: "address in use".into() };
        assert_eq!(
            err.to_string(),
            "SIA listener failed to start on port 10001: address in use"
        );
    }
}
