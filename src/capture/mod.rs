//! Capture/analysis flow behind the "Análisis de Emoción" modal.
//!
//! A [`CaptureSession`] lives exactly as long as the modal. It owns at most
//! one live camera stream and releases it on capture, on close and on drop.
//! Opening the camera, grabbing a frame and classifying it all run as
//! background tasks; their outcome arrives as [`Event::Camera`] or
//! [`Event::AnalysisFinished`], tagged with the generation that started
//! them. Anything older than the current generation is discarded.

pub mod analysis;
pub mod camera;
pub mod error;
pub mod image;

use std::{path::Path, sync::Arc};

use flume::Sender;

use crate::{
    event::events::Event,
    notice::Notice,
    util::{
        scroll::{ScrollGuard, ScrollLock},
        task::TaskManager,
    },
};

use self::{
    analysis::{Classifier, Emotion, PlaylistSource},
    camera::{CameraHandoff, CameraStream, MediaDevices},
    error::CaptureError,
    image::StillImage,
};

const ANALYSIS_TASK: &str = "analysis";
const CAMERA_TASK: &str = "camera";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisPhase {
    #[default]
    Idle,
    CapturedAwaitingResult,
    ResultReady,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Preview {
    #[default]
    Placeholder,
    Live,
    Still(StillImage),
}

/// Camera work running in the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraRequest {
    Start,
    Capture,
}

#[derive(Debug, Clone)]
pub enum CameraEvent {
    Opened {
        generation: u64,
        outcome: Result<CameraHandoff, CaptureError>,
    },
    Captured {
        generation: u64,
        outcome: Result<StillImage, CaptureError>,
    },
}

/// The collaborators a session is built from. The classifier and playlist
/// source are strategies so a real backend can replace the simulation.
#[derive(Clone)]
pub struct CaptureDeps {
    pub devices: Arc<dyn MediaDevices>,
    pub classifier: Arc<dyn Classifier>,
    pub playlists: Arc<dyn PlaylistSource>,
}

pub struct CaptureSession {
    deps: CaptureDeps,
    event_tx: Sender<Event>,
    camera: Option<Box<dyn CameraStream>>,
    camera_request: Option<CameraRequest>,
    camera_generation: u64,
    phase: AnalysisPhase,
    preview: Preview,
    result: Option<Emotion>,
    playlist: Vec<String>,
    generation: u64,
    tasks: TaskManager,
    scroll_guard: Option<ScrollGuard>,
}

fn camera_ready() -> Notice {
    Notice::info("Cámara", "Cámara activada correctamente")
}

/// Opens the camera when none is given, grabs one frame and stops the
/// stream either way.
async fn grab_still(
    devices: Arc<dyn MediaDevices>,
    stream: Option<Box<dyn CameraStream>>,
    tx: Sender<Event>,
) -> Result<StillImage, CaptureError> {
    let mut stream = match stream {
        Some(stream) => stream,
        None => {
            let stream = devices.open_camera().await?;
            let _ = tx.send(Event::Notify(camera_ready()));
            stream
        }
    };

    let frame = stream.grab_frame().await;
    stream.stop();
    frame
}

impl CaptureSession {
    /// Opens the modal: fresh state and the background scroll lock held.
    pub fn open(deps: CaptureDeps, event_tx: Sender<Event>, scroll: &ScrollLock) -> Self {
        tracing::debug!("capture modal opened");
        Self {
            deps,
            event_tx,
            camera: None,
            camera_request: None,
            camera_generation: 0,
            phase: AnalysisPhase::Idle,
            preview: Preview::Placeholder,
            result: None,
            playlist: Vec::new(),
            generation: 0,
            tasks: TaskManager::new(),
            scroll_guard: Some(scroll.acquire()),
        }
    }

    pub fn phase(&self) -> AnalysisPhase {
        self.phase
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn result(&self) -> Option<&Emotion> {
        self.result.as_ref()
    }

    pub fn playlist(&self) -> &[String] {
        &self.playlist
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_camera(&self) -> bool {
        self.camera.is_some()
    }

    pub fn camera_request(&self) -> Option<CameraRequest> {
        self.camera_request
    }

    pub fn is_open(&self) -> bool {
        self.scroll_guard.is_some()
    }

    /// Asks for the camera in the background. Returns false only when the
    /// modal is closed; a held or already requested stream is kept.
    pub fn start_camera(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        if self.camera.is_some() || self.camera_request.is_some() {
            return true;
        }

        let generation = self.begin_camera_request(CameraRequest::Start);
        let devices = self.deps.devices.clone();
        let tx = self.event_tx.clone();
        self.tasks.spawn(CAMERA_TASK, async move {
            let outcome = devices.open_camera().await.map(CameraHandoff::new);
            let _ = tx.send(Event::Camera(CameraEvent::Opened {
                generation,
                outcome,
            }));
        });
        true
    }

    /// Grabs a frame in the background, starting the camera first when
    /// none is held. The stream leaves the session right away and is
    /// stopped once the frame is read. A pending start is superseded.
    pub fn capture(&mut self) -> bool {
        if !self.is_open() || self.camera_request == Some(CameraRequest::Capture) {
            return false;
        }

        let stream = self.camera.take();
        let generation = self.begin_camera_request(CameraRequest::Capture);
        let devices = self.deps.devices.clone();
        let tx = self.event_tx.clone();
        self.tasks.spawn(CAMERA_TASK, async move {
            let outcome = grab_still(devices, stream, tx.clone()).await;
            let _ = tx.send(Event::Camera(CameraEvent::Captured {
                generation,
                outcome,
            }));
        });
        true
    }

    pub fn on_camera_event(&mut self, event: &CameraEvent) {
        match event {
            CameraEvent::Opened {
                generation,
                outcome,
            } => {
                if !self.is_current(*generation, CameraRequest::Start) {
                    if let Ok(handoff) = outcome {
                        drop(handoff.take());
                    }
                    return;
                }
                self.camera_request = None;

                match outcome {
                    Ok(handoff) => {
                        let Some(stream) = handoff.take() else {
                            return;
                        };
                        self.camera = Some(stream);
                        self.preview = Preview::Live;
                        self.notify(camera_ready());
                    }
                    Err(e) => {
                        tracing::warn!("camera access failed: {e}");
                        self.notify(Notice::error("Cámara", "Error al acceder a la cámara"));
                    }
                }
            }
            CameraEvent::Captured {
                generation,
                outcome,
            } => {
                if !self.is_current(*generation, CameraRequest::Capture) {
                    return;
                }
                self.camera_request = None;

                match outcome {
                    Ok(image) => {
                        tracing::info!(bytes = image.len(), "frame captured");
                        self.preview = Preview::Still(image.clone());
                        self.run_analysis(image.clone());
                    }
                    Err(e) => {
                        tracing::warn!("frame capture failed: {e}");
                        self.preview = Preview::Placeholder;
                        let message = if e.is_camera_access() {
                            "Error al acceder a la cámara"
                        } else {
                            "No se pudo capturar la foto"
                        };
                        self.notify(Notice::error("Cámara", message));
                    }
                }
            }
        }
    }

    /// Uses a picture from disk. A live camera is left alone; a capture in
    /// progress is cancelled.
    pub async fn upload_image(&mut self, path: &Path) -> bool {
        if !self.is_open() {
            return false;
        }

        match StillImage::load(path).await {
            Ok(image) => {
                tracing::info!(path = %path.display(), mime = image.mime(), "image uploaded");
                self.cancel_capture();
                self.preview = Preview::Still(image.clone());
                self.run_analysis(image);
                true
            }
            Err(e) => {
                tracing::warn!("upload rejected: {e}");
                let message = match e {
                    CaptureError::NotAnImage => "El archivo seleccionado no es una imagen",
                    _ => "No se pudo leer la imagen",
                };
                self.notify(Notice::error("Imagen", message));
                false
            }
        }
    }

    /// Starts a new analysis generation. A pending one is cancelled.
    fn run_analysis(&mut self, image: StillImage) {
        if self.phase == AnalysisPhase::CapturedAwaitingResult {
            tracing::debug!(generation = self.generation, "restarting pending analysis");
        }

        self.generation += 1;
        self.phase = AnalysisPhase::CapturedAwaitingResult;
        self.result = None;
        self.playlist.clear();

        let generation = self.generation;
        let classifier = self.deps.classifier.clone();
        let tx = self.event_tx.clone();
        self.tasks.spawn(ANALYSIS_TASK, async move {
            let outcome = classifier.classify(&image).await;
            let _ = tx.send(Event::AnalysisFinished {
                generation,
                outcome,
            });
        });
    }

    pub fn on_analysis_finished(
        &mut self,
        generation: u64,
        outcome: &Result<Emotion, CaptureError>,
    ) {
        if !self.is_open()
            || generation != self.generation
            || self.phase != AnalysisPhase::CapturedAwaitingResult
        {
            tracing::debug!(generation, current = self.generation, "discarding stale analysis");
            return;
        }

        match outcome {
            Ok(emotion) => {
                tracing::info!(label = %emotion.label, "analysis ready");
                self.playlist = self.deps.playlists.tracks_for(&emotion.label);
                self.result = Some(emotion.clone());
                self.phase = AnalysisPhase::ResultReady;
            }
            Err(e) => {
                tracing::warn!("analysis failed: {e}");
                self.phase = AnalysisPhase::Idle;
                self.notify(Notice::error("Análisis", "No se pudo analizar la imagen"));
            }
        }
    }

    /// Back to Idle inside the open modal. A live camera stays on.
    pub fn reset(&mut self) {
        self.cancel_capture();
        self.tasks.abort(ANALYSIS_TASK);
        self.generation += 1;
        self.phase = AnalysisPhase::Idle;
        self.result = None;
        self.playlist.clear();
        self.preview = if self.camera.is_some() {
            Preview::Live
        } else {
            Preview::Placeholder
        };
    }

    /// Releases the camera and the scroll lock and resets to Idle. Safe to
    /// call any number of times; also runs on drop.
    pub fn close(&mut self) {
        if self.camera_request.take().is_some() {
            self.tasks.abort(CAMERA_TASK);
            self.camera_generation += 1;
        }
        self.release_camera();
        self.reset();
        self.preview = Preview::Placeholder;
        if self.scroll_guard.take().is_some() {
            tracing::debug!("capture modal closed");
        }
    }

    fn begin_camera_request(&mut self, request: CameraRequest) -> u64 {
        self.camera_generation += 1;
        self.camera_request = Some(request);
        self.camera_generation
    }

    fn is_current(&self, generation: u64, request: CameraRequest) -> bool {
        let current = self.is_open()
            && generation == self.camera_generation
            && self.camera_request == Some(request);
        if !current {
            tracing::debug!(generation, ?request, "discarding stale camera event");
        }
        current
    }

    /// Aborting the task drops the stream it was reading from.
    fn cancel_capture(&mut self) {
        if self.camera_request == Some(CameraRequest::Capture) {
            self.tasks.abort(CAMERA_TASK);
            self.camera_request = None;
            self.camera_generation += 1;
        }
    }

    fn release_camera(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            camera.stop();
        }
    }

    fn notify(&self, notice: Notice) {
        let _ = self.event_tx.send(Event::Notify(notice));
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.close();
    }
}
