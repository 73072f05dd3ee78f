//! Error types for the positioning pipeline

use thiserror::Error;

use crate::platform::PlatformError;

/// Errors that abort a `compute_position` call
#[derive(Debug, Error)]
pub enum PositionError {
    /// A platform measurement failed; there is no retry
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Middleware data could not be serialized
    #[error("could not serialize middleware data: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Middleware data must be a JSON object so it can be merged
    #[error("middleware data must be an object, got {found}")]
    DataNotAnObject { found: String },

    /// Accumulated data does not have the shape its reader expects
    #[error("invalid data for middleware '{name}': {source}")]
    InvalidData {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// A middleware reported its own failure
    #[error("middleware '{name}' failed: {reason}")]
    Middleware { name: String, reason: String },
}

impl PositionError {
    pub fn middleware(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Middleware {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_error_display() {
        let err = PositionError::from(PlatformError::unknown("menu"));
        insta::assert_snapshot!(err.to_string(), @"platform error: unknown element 'menu'");
    }

    #[test]
    fn test_middleware_error_display() {
        let err = PositionError::middleware("arrow", "no arrow element");
        assert_eq!(err.to_string(), "middleware 'arrow' failed: no arrow element");
    }
}
