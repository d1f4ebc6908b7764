use std::{
    fmt,
    path::PathBuf,
    process::Stdio,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::{
    io::AsyncReadExt,
    process::{Child, Command},
};

use crate::{
    capture::{
        error::CaptureError,
        image::{ImageSource, StillImage},
    },
    config::CameraConfig,
};

const FRAME_POLL: Duration = Duration::from_millis(100);
const FRAME_ATTEMPTS: usize = 20;
const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

static STREAM_ID: AtomicU64 = AtomicU64::new(0);

/// Exclusive ownership of a live video stream. Dropping the stream must
/// release the device.
#[async_trait]
pub trait CameraStream: Send {
    async fn grab_frame(&mut self) -> Result<StillImage, CaptureError>;
    fn stop(&mut self);
}

#[async_trait]
pub trait MediaDevices: Send + Sync {
    async fn open_camera(&self) -> Result<Box<dyn CameraStream>, CaptureError>;
}

/// A freshly opened stream on its way through the event channel. The
/// first [`CameraHandoff::take`] gets it; if nobody does, dropping the last
/// clone releases the camera.
#[derive(Clone)]
pub struct CameraHandoff(Arc<Mutex<Option<Box<dyn CameraStream>>>>);

impl CameraHandoff {
    pub fn new(stream: Box<dyn CameraStream>) -> Self {
        Self(Arc::new(Mutex::new(Some(stream))))
    }

    pub fn take(&self) -> Option<Box<dyn CameraStream>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

impl fmt::Debug for CameraHandoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraHandoff").finish_non_exhaustive()
    }
}

/// The frame file is rewritten in place, so a read can land mid-write.
fn is_complete_jpeg(bytes: &[u8]) -> bool {
    bytes.starts_with(&JPEG_SOI) && bytes.ends_with(&JPEG_EOI)
}

/// Camera backend driven by an `ffmpeg` child process that keeps
/// overwriting a single JPEG with the latest frame.
pub struct FfmpegCamera {
    config: CameraConfig,
}

impl FfmpegCamera {
    pub fn new(config: CameraConfig) -> Self {
        Self { config }
    }

    fn frame_path() -> PathBuf {
        let id = STREAM_ID.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("anima-camera-{}-{id}.jpg", std::process::id()))
    }
}

#[async_trait]
impl MediaDevices for FfmpegCamera {
    async fn open_camera(&self) -> Result<Box<dyn CameraStream>, CaptureError> {
        let frame_path = Self::frame_path();
        let mut child = Command::new(&self.config.program)
            .args(["-loglevel", "error", "-f", self.config.input_format.as_str()])
            .args(["-i", self.config.device.as_str()])
            .args(["-vf", format!("fps={}", self.config.frame_rate).as_str()])
            .args(["-q:v", "3", "-update", "1", "-atomic_writing", "1", "-y"])
            .arg(&frame_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CaptureError::CameraUnavailable(e.to_string()))?;

        // A device that is busy or not permitted makes ffmpeg exit right away.
        let deadline = tokio::time::Instant::now() + self.config.startup_grace;
        while tokio::time::Instant::now() < deadline {
            if let Some(status) = child
                .try_wait()
                .map_err(|e| CaptureError::CameraUnavailable(e.to_string()))?
            {
                let mut stderr = String::new();
                if let Some(mut pipe) = child.stderr.take() {
                    let _ = pipe.read_to_string(&mut stderr).await;
                }
                let reason = match stderr.trim() {
                    "" => format!("capture process exited with {status}"),
                    message => message.to_string(),
                };
                return Err(CaptureError::CameraDenied(reason));
            }
            if frame_path.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        tracing::info!(device = %self.config.device, "camera stream started");
        Ok(Box::new(FfmpegStream {
            child: Some(child),
            frame_path,
        }))
    }
}

struct FfmpegStream {
    child: Option<Child>,
    frame_path: PathBuf,
}

#[async_trait]
impl CameraStream for FfmpegStream {
    async fn grab_frame(&mut self) -> Result<StillImage, CaptureError> {
        let mut last_error = String::from("no frame written yet");

        for _ in 0..FRAME_ATTEMPTS {
            let Some(child) = self.child.as_mut() else {
                return Err(CaptureError::NoFrame("camera stream is stopped".into()));
            };
            if let Ok(Some(status)) = child.try_wait() {
                return Err(CaptureError::NoFrame(format!(
                    "capture process exited with {status}"
                )));
            }

            match tokio::fs::read(&self.frame_path).await {
                Ok(bytes) if is_complete_jpeg(&bytes) => {
                    match StillImage::from_bytes(bytes, ImageSource::Camera) {
                        Ok(image) => return Ok(image),
                        Err(e) => last_error = e.to_string(),
                    }
                }
                Ok(bytes) if !bytes.is_empty() => last_error = "frame still being written".into(),
                Ok(_) => {}
                Err(e) => last_error = e.to_string(),
            }
            tokio::time::sleep(FRAME_POLL).await;
        }

        Err(CaptureError::NoFrame(last_error))
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                tracing::warn!("failed to stop capture process: {e}");
            }
            tracing::info!("camera stream released");
        }
        let _ = std::fs::remove_file(&self.frame_path);
    }
}

impl Drop for FfmpegStream {
    fn drop(&mut self) {
        self.stop();
    }
}
