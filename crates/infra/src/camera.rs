use std::io::ErrorKind;
use std::path::PathBuf;

use assessment_domain::ports::BoxFuture;
use assessment_domain::ports::camera::{CameraDevice, CameraError, VideoStream};
use tokio::fs::File;

/// Camera backed by a V4L-style device node. Holding the node open keeps the
/// device busy; closing it releases the capture.
#[derive(Debug, Clone)]
pub struct DeviceCamera {
    path: PathBuf,
}

impl DeviceCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

pub struct DeviceStream {
    id: String,
    handle: Option<File>,
}

impl VideoStream for DeviceStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn stop_all_tracks(&mut self) {
        if self.handle.take().is_some() {
            tracing::debug!(device = %self.id, "camera device closed");
        }
    }
}

impl CameraDevice for DeviceCamera {
    fn request_video_stream(&self) -> BoxFuture<'_, Result<Box<dyn VideoStream>, CameraError>> {
        Box::pin(async move {
            let handle = File::open(&self.path).await.map_err(|err| match err.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    CameraError::Denied(format!("{}: {err}", self.path.display()))
                }
                _ => CameraError::Device(format!("{}: {err}", self.path.display())),
            })?;
            let stream: Box<dyn VideoStream> = Box::new(DeviceStream {
                id: self.path.display().to_string(),
                handle: Some(handle),
            });
            Ok(stream)
        })
    }
}

/// Stand-in when no capture device is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCamera;

impl CameraDevice for NoCamera {
    fn request_video_stream(&self) -> BoxFuture<'_, Result<Box<dyn VideoStream>, CameraError>> {
        Box::pin(async { Err(CameraError::Denied("no camera device configured".into())) })
    }
}
