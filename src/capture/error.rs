use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("Camera access denied: {0}")]
    CameraDenied(String),

    #[error("No frame available: {0}")]
    NoFrame(String),

    #[error("Could not read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("The selected file is not an image")]
    NotAnImage,

    #[error("Analysis failed: {0}")]
    Analysis(String),
}

impl CaptureError {
    /// The camera could not be opened at all, as opposed to a failed grab.
    pub fn is_camera_access(&self) -> bool {
        matches!(
            self,
            CaptureError::CameraUnavailable(_) | CaptureError::CameraDenied(_)
        )
    }
}
