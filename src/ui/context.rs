use std::sync::Arc;

use flume::Sender;

use crate::{
    capture::{
        CaptureDeps,
        analysis::{SimulatedClassifier, StaticPlaylists},
        camera::FfmpegCamera,
    },
    config::AppConfig,
    event::events::Event,
    http::traits::{AuthApi, RecoveryApi},
    session::Session,
    util::scroll::ScrollLock,
};

/// Shared handles every view gets. Cheap to clone pieces out of.
pub struct AppContext {
    pub auth: Arc<dyn AuthApi>,
    pub recovery: Arc<dyn RecoveryApi>,
    pub session: Session,
    pub config: Arc<AppConfig>,
    pub capture: CaptureDeps,
    pub scroll: ScrollLock,
    pub event_tx: Sender<Event>,
}

impl AppContext {
    pub fn new<A>(api: Arc<A>, session: Session, config: AppConfig, event_tx: Sender<Event>) -> Self
    where
        A: AuthApi + RecoveryApi + 'static,
    {
        let capture = CaptureDeps {
            devices: Arc::new(FfmpegCamera::new(config.camera.clone())),
            classifier: Arc::new(SimulatedClassifier::new(config.timings.analysis_latency)),
            playlists: Arc::new(StaticPlaylists),
        };

        Self {
            auth: api.clone(),
            recovery: api,
            session,
            config: Arc::new(config),
            capture,
            scroll: ScrollLock::new(),
            event_tx,
        }
    }

    pub fn with_capture(mut self, capture: CaptureDeps) -> Self {
        self.capture = capture;
        self
    }

    pub fn notify(&self, notice: crate::notice::Notice) {
        let _ = self.event_tx.send(Event::Notify(notice));
    }
}
