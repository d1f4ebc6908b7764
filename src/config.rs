use std::{env, time::Duration};

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub request_timeout: Duration,
    pub tick_rate: Duration,
    pub camera: CameraConfig,
    pub timings: Timings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(15),
            tick_rate: Duration::from_millis(33),
            camera: CameraConfig::default(),
            timings: Timings::default(),
        }
    }
}

impl AppConfig {
    /// Reads `ANIMA_*` variables. Call after `dotenv` so a `.env` file is
    /// honoured. Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("ANIMA_API_URL") {
            let url = url.trim().trim_end_matches('/');
            if !url.is_empty() {
                config.api_url = url.to_string();
            }
        }

        if let Some(secs) = env::var("ANIMA_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
        {
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Ok(program) = env::var("ANIMA_CAMERA_PROGRAM") {
            config.camera.program = program;
        }
        if let Ok(format) = env::var("ANIMA_CAMERA_FORMAT") {
            config.camera.input_format = format;
        }
        if let Ok(device) = env::var("ANIMA_CAMERA_DEVICE") {
            config.camera.device = device;
        }

        tracing::debug!(api_url = %config.api_url, "configuration loaded");
        config
    }
}

/// How the default camera backend invokes the capture program.
#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub program: String,
    pub input_format: String,
    pub device: String,
    pub frame_rate: u32,
    pub startup_grace: Duration,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let (input_format, device) = if cfg!(target_os = "macos") {
            ("avfoundation", "0")
        } else if cfg!(target_os = "windows") {
            ("dshow", "video=Integrated Camera")
        } else {
            ("v4l2", "/dev/video0")
        };

        Self {
            program: "ffmpeg".to_string(),
            input_format: input_format.to_string(),
            device: device.to_string(),
            frame_rate: 5,
            startup_grace: Duration::from_millis(500),
        }
    }
}

/// Fixed UI delays. They stand in for latency and are not user-cancellable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub code_sent_delay: Duration,
    pub code_verified_delay: Duration,
    pub password_reset_delay: Duration,
    pub analysis_latency: Duration,
    pub auth_redirect_delay: Duration,
    pub logout_delay: Duration,
    pub toast_ttl: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            code_sent_delay: Duration::from_millis(2000),
            code_verified_delay: Duration::from_millis(1500),
            password_reset_delay: Duration::from_millis(2500),
            analysis_latency: Duration::from_millis(2000),
            auth_redirect_delay: Duration::from_millis(2000),
            logout_delay: Duration::from_millis(1500),
            toast_ttl: Duration::from_millis(3000),
        }
    }
}
