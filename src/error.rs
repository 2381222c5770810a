// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the pose-progression engine.

use std::fmt;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, PoseMatchError>;

/// Main error type for the engine.
#[derive(Debug)]
pub enum PoseMatchError {
    /// A reference resource (keypoint file or image) does not exist.
    NotFound(String),
    /// A reference keypoint file or replay line could not be parsed.
    ParseError(String),
    /// Sequence construction failed for a reason other than a missing or malformed resource.
    LoadError(String),
    /// The pose estimator failed on a frame.
    EstimatorError(String),
    /// The frame source or estimator could not be acquired.
    AcquisitionError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// Wrapped `std::io::Error`.
    Io(std::io::Error),
    /// HTTP transport error.
    Network(String),
}

impl PoseMatchError {
    /// Message suitable for showing to the player when a session cannot start.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::AcquisitionError(msg) => {
                format!("Camera or pose detector unavailable: {msg}. Check the device and start again.")
            }
            Self::NotFound(msg) | Self::ParseError(msg) | Self::LoadError(msg) => {
                format!("Could not load the reference poses ({msg}). Start again to retry.")
            }
            Self::Network(msg) => {
                format!("Could not reach the pose library ({msg}). Start again to retry.")
            }
            Self::EstimatorError(msg) => format!("Pose detection stopped: {msg}"),
            Self::ConfigError(msg) => format!("Invalid game settings: {msg}"),
            Self::Io(err) => format!("Could not read game data: {err}"),
        }
    }
}

impl fmt::Display for PoseMatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
            Self::LoadError(msg) => write!(f, "Load error: {msg}"),
            Self::EstimatorError(msg) => write!(f, "Estimator error: {msg}"),
            Self::AcquisitionError(msg) => write!(f, "Acquisition error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::Network(msg) => write!(f, "Network error: {msg}"),
        }
    }
}

impl std::error::Error for PoseMatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PoseMatchError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound(err.to_string());
        }
        Self::Io(err)
    }
}

impl From<serde_json::Error> for PoseMatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<image::ImageError> for PoseMatchError {
    fn from(err: image::ImageError) -> Self {
        Self::LoadError(format!("unreadable image: {err}"))
    }
}

impl From<toml::de::Error> for PoseMatchError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<toml::ser::Error> for PoseMatchError {
    fn from(err: toml::ser::Error) -> Self {
        Self::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PoseMatchError::NotFound("pose3.json".to_string());
        assert_eq!(err.to_string(), "Not found: pose3.json");

        let err = PoseMatchError::EstimatorError("backend lost".to_string());
        assert_eq!(err.to_string(), "Estimator error: backend lost");
    }

    #[test]
    fn test_io_not_found_maps_to_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(matches!(PoseMatchError::from(io), PoseMatchError::NotFound(_)));

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(PoseMatchError::from(io), PoseMatchError::Io(_)));
    }

    #[test]
    fn test_user_message_mentions_retry() {
        let err = PoseMatchError::ParseError("pose2.json".to_string());
        assert!(err.user_message().contains("Start again"));
    }
}
