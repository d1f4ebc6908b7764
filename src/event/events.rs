use crate::{
    capture::{CameraEvent, analysis::Emotion, error::CaptureError},
    http::{
        error::ApiError,
        models::{AuthResponse, RegisterResponse, UserProfile},
    },
    notice::Notice,
    recovery::RecoveryEvent,
    ui::state::Route,
};

/// Everything background tasks report back to the UI loop.
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum Event {
    Navigate(Route),
    Notify(Notice),

    LoginFinished(Result<AuthResponse, ApiError>),
    RegisterFinished(Result<RegisterResponse, ApiError>),
    ProfileFetched(Result<UserProfile, ApiError>),
    LogoutElapsed,

    Recovery(RecoveryEvent),
    Camera(CameraEvent),
    AnalysisFinished {
        generation: u64,
        outcome: Result<Emotion, CaptureError>,
    },

    Quit,
}
