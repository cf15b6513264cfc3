//! Error types for the activity log.
//!
//! None of these escape [`ActivityLog::save`](crate::ActivityLog::save),
//! [`ActivityLog::load`](crate::ActivityLog::load) or
//! [`ActivityLog::add_to_log`](crate::ActivityLog::add_to_log); those
//! report and carry on. The `try_*` forms return them.

use std::path::PathBuf;
use thiserror::Error;

pub type ActivityLogResult<T> = Result<T, ActivityLogError>;

#[derive(Debug, Error)]
pub enum ActivityLogError {
    /// E_IO - directory creation, read or write failed
    #[error("failed to {operation} '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// E_MALFORMED_DOCUMENT - the file is not a JSON array
    #[error("malformed activity log '{}': {reason}", .path.display())]
    MalformedDocument { path: PathBuf, reason: String },

    /// E_MALFORMED_RECORD - one element failed validation
    #[error("malformed activity record: {reason}")]
    MalformedRecord { reason: String },

    /// E_ENCODE - the snapshot could not be rendered as JSON
    #[error("failed to encode activity log: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}

impl ActivityLogError {
    pub fn io(path: impl Into<PathBuf>, operation: &'static str, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            operation,
            source,
        }
    }

    pub fn malformed_record(reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "E_IO",
            Self::MalformedDocument { .. } => "E_MALFORMED_DOCUMENT",
            Self::MalformedRecord { .. } => "E_MALFORMED_RECORD",
            Self::Encode { .. } => "E_ENCODE",
        }
    }

    /// Whether a later attempt may succeed without touching the file by hand.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        let io = ActivityLogError::io(
            "/tmp/x.json",
            "write",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(io.code(), "E_IO");
        assert!(io.is_transient());
        assert_eq!(
            io.to_string(),
            "failed to write '/tmp/x.json': denied"
        );

        let record = ActivityLogError::malformed_record("missing field `time`");
        assert_eq!(record.code(), "E_MALFORMED_RECORD");
        assert!(!record.is_transient());

        let doc = ActivityLogError::MalformedDocument {
            path: PathBuf::from("log.json"),
            reason: "expected an array".into(),
        };
        assert_eq!(doc.code(), "E_MALFORMED_DOCUMENT");
    }
}
