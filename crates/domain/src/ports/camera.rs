use thiserror::Error;

use super::BoxFuture;

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera access denied: {0}")]
    Denied(String),
    #[error("camera device error: {0}")]
    Device(String),
}

/// A live video feed. Dropping the stream without stopping it leaves the
/// device indicator on, so owners call `stop_all_tracks` explicitly.
pub trait VideoStream: Send {
    fn id(&self) -> &str;

    fn stop_all_tracks(&mut self);
}

pub trait CameraDevice: Send + Sync {
    /// Video only, never audio.
    fn request_video_stream(&self) -> BoxFuture<'_, Result<Box<dyn VideoStream>, CameraError>>;
}
