use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use crate::error::FlowError;
use crate::ports::camera::{CameraDevice, VideoStream};
use crate::ports::notify::{Notifier, Severity};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureStatus {
    Pending,
    Acquiring,
    Live,
    Unavailable,
    Released,
}

enum CaptureState {
    Pending,
    Acquiring,
    Live(Box<dyn VideoStream>),
    Unavailable,
    Released,
}

impl CaptureState {
    fn status(&self) -> CaptureStatus {
        match self {
            Self::Pending => CaptureStatus::Pending,
            Self::Acquiring => CaptureStatus::Acquiring,
            Self::Live(_) => CaptureStatus::Live,
            Self::Unavailable => CaptureStatus::Unavailable,
            Self::Released => CaptureStatus::Released,
        }
    }
}

/// Tracks are stopped exactly once. A grant that lands after release is
/// stopped on arrival.
pub struct MediaCapture {
    camera: Arc<dyn CameraDevice>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<CaptureState>,
}

impl MediaCapture {
    pub fn new(camera: Arc<dyn CameraDevice>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            camera,
            notifier,
            state: Mutex::new(CaptureState::Pending),
        }
    }

    pub fn status(&self) -> CaptureStatus {
        self.state.lock().expect("capture state lock").status()
    }

    pub fn stream_id(&self) -> Option<String> {
        match &*self.state.lock().expect("capture state lock") {
            CaptureState::Live(stream) => Some(stream.id().to_string()),
            _ => None,
        }
    }

    pub fn spawn_acquire(self: &Arc<Self>) -> JoinHandle<()> {
        let media = Arc::clone(self);
        tokio::spawn(async move {
            let _ = media.acquire().await;
        })
    }

    pub async fn acquire(&self) -> Result<(), FlowError> {
        {
            let mut state = self.state.lock().expect("capture state lock");
            if !matches!(*state, CaptureState::Pending) {
                return Ok(());
            }
            *state = CaptureState::Acquiring;
        }

        let requested = self.camera.request_video_stream().await;

        let mut state = self.state.lock().expect("capture state lock");
        match requested {
            Ok(mut stream) => {
                if matches!(*state, CaptureState::Released) {
                    tracing::debug!(stream_id = stream.id(), "camera granted after release");
                    stream.stop_all_tracks();
                    return Ok(());
                }
                tracing::info!(stream_id = stream.id(), "camera stream live");
                *state = CaptureState::Live(stream);
                Ok(())
            }
            Err(err) => {
                let released = matches!(*state, CaptureState::Released);
                if !released {
                    *state = CaptureState::Unavailable;
                }
                drop(state);
                tracing::warn!(error = %err, "camera unavailable, continuing without proctoring");
                let err = FlowError::CameraUnavailable(err);
                if !released {
                    self.notifier.notify(err.user_message(), Severity::Warning);
                }
                Err(err)
            }
        }
    }

    /// `true` only on the call that actually stopped a stream.
    pub fn release(&self) -> bool {
        let previous = {
            let mut state = self.state.lock().expect("capture state lock");
            std::mem::replace(&mut *state, CaptureState::Released)
        };
        match previous {
            CaptureState::Live(mut stream) => {
                stream.stop_all_tracks();
                tracing::info!(stream_id = stream.id(), "camera released");
                true
            }
            _ => false,
        }
    }
}

impl Drop for MediaCapture {
    fn drop(&mut self) {
        let state = match self.state.get_mut() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let CaptureState::Live(stream) = state {
            stream.stop_all_tracks();
        }
        *state = CaptureState::Released;
    }
}
