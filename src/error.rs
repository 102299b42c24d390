use thiserror::Error;

/// Main error type for the backdrop compositor library
#[derive(Error, Debug)]
pub enum BackdropError {
    #[error("Segmentation error: {0}")]
    Segmentation(#[from] SegmentationError),

    #[error("Compositing error: {0}")]
    Composite(#[from] CompositeError),

    #[error("Detection error: {0}")]
    Detection(#[from] DetectionError),

    #[error("Video error: {0}")]
    Video(#[from] VideoError),

    #[error("Effect store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Segmentation model errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SegmentationError {
    #[error("Failed to load segmentation model '{locator}': {reason}")]
    LoadFailed { locator: String, reason: String },

    #[error("Inference failed: {reason}")]
    InferenceFailed { reason: String },
}

/// Pixel compositor errors
///
/// These never leave a tick: the scheduler degrades every one of them to a
/// pass-through frame.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompositeError {
    #[error("Mask has {mask_len} values but frame has {pixel_count} pixels")]
    MaskSizeMismatch { mask_len: usize, pixel_count: usize },

    #[error("Original pixels have {actual} bytes, expected {expected}")]
    BufferSizeMismatch { actual: usize, expected: usize },
}

/// Detection round-trip errors
#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Failed to encode frame: {reason}")]
    EncodeFailed { reason: String },

    #[error("Detection request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Detection service returned HTTP {status}")]
    Status { status: u16 },

    #[error("Invalid detection response: {reason}")]
    InvalidResponse { reason: String },
}

/// Frame source and presentation errors
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Failed to load frame: {path}")]
    LoadFailed { path: String },

    #[error("No frames found in: {path}")]
    NoFrames { path: String },

    #[error("Failed to present frame: {reason}")]
    PresentFailed { reason: String },

    #[error("Invalid frame dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Effect store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Effect store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Project not found: {project_id}")]
    ProjectNotFound { project_id: String },

    #[error("Effect store returned HTTP {status}")]
    Status { status: u16 },

    #[error("Failed to parse effect records from {source_name}: {reason}")]
    ParseFailed { source_name: String, reason: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using BackdropError
pub type Result<T> = std::result::Result<T, BackdropError>;

impl BackdropError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Check if this error is recoverable (the next tick may succeed)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::Detection(_) => true,
            Self::Composite(_) => true,
            Self::Segmentation(SegmentationError::InferenceFailed { .. }) => true,
            Self::Store(StoreError::Request(_)) => true,
            // Model load failures are permanent for the session
            _ => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Segmentation(SegmentationError::LoadFailed { locator, .. }) => {
                format!(
                    "Could not load segmentation model '{}'. Effects are disabled; video plays unmodified.",
                    locator
                )
            }
            Self::Video(VideoError::NoFrames { path }) => {
                format!("No frames found in '{}'. Expected numbered PNG or JPEG images.", path)
            }
            Self::Store(StoreError::ProjectNotFound { project_id }) => {
                format!("Project '{}' does not exist in the effect store.", project_id)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_failure_is_permanent() {
        let err: BackdropError = SegmentationError::LoadFailed {
            locator: "selfie.onnx".to_string(),
            reason: "missing".to_string(),
        }
        .into();

        assert!(!err.is_recoverable());
        assert!(err.user_message().contains("selfie.onnx"));
    }

    #[test]
    fn test_tick_level_errors_are_recoverable() {
        let err: BackdropError = CompositeError::MaskSizeMismatch {
            mask_len: 3,
            pixel_count: 4,
        }
        .into();
        assert!(err.is_recoverable());

        let err: BackdropError = DetectionError::Status { status: 503 }.into();
        assert!(err.is_recoverable());
    }
}
