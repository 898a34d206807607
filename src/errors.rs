use crate::types::Position;
use thiserror::Error;

/// Adding a device input to the capture session failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Device busy: {0}")]
    DeviceBusy(String),
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("Input rejected by session: {0}")]
    InputRejected(String),
}

/// Still capture failed inside the session adapter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("No active input attached to the session")]
    NoActiveInput,
    #[error("Capture failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum LensError {
    #[error("Camera engine not started")]
    NotStarted,
    #[error("Camera engine already started")]
    AlreadyStarted,
    #[error("No camera available for position: {}", .0.as_str())]
    CameraUnavailable(Position),
    #[error("Capture session unavailable: {0}")]
    SessionUnavailable(ConfigurationError),
    #[error("Camera control queue closed")]
    ControlQueueClosed,
    #[error("Failed to spawn camera control thread: {0}")]
    ControlThread(String),
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Device source error: {0}")]
    DeviceSource(String),
}
