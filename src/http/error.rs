use thiserror::Error;

pub const FALLBACK_MESSAGE: &str = "Error en la petición";
pub const CONNECTION_MESSAGE: &str = "No se pudo conectar con el servidor. Intenta nuevamente.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Non-2xx answer. `message` is the body's `message` field or
    /// [`FALLBACK_MESSAGE`].
    #[error("{message} (HTTP {status})")]
    Service { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Decoding error: {0}")]
    Decode(String),
}

impl ApiError {
    /// Text shown to the user inside a notice.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Service { message, .. } => message.clone(),
            ApiError::Network(_) => CONNECTION_MESSAGE.to_string(),
            ApiError::Decode(_) => FALLBACK_MESSAGE.to_string(),
        }
    }

    /// Like [`ApiError::user_message`], but a rejection without a server
    /// message reads `fallback` instead of the generic text.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            ApiError::Service { message, .. } if message == FALLBACK_MESSAGE => fallback.to_string(),
            _ => self.user_message(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Service { status: 401, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_read_as_connection_problems() {
        let err = ApiError::Network("connection refused".into());
        assert_eq!(err.user_message(), CONNECTION_MESSAGE);
        assert_eq!(err.message_or("No se pudo crear la cuenta"), CONNECTION_MESSAGE);
    }

    #[test]
    fn server_message_wins_over_the_fallback() {
        let err = ApiError::Service {
            status: 409,
            message: "El correo ya está registrado".into(),
        };
        assert_eq!(err.message_or("No se pudo crear la cuenta"), "El correo ya está registrado");

        let bare = ApiError::Service {
            status: 500,
            message: FALLBACK_MESSAGE.into(),
        };
        assert_eq!(bare.message_or("No se pudo crear la cuenta"), "No se pudo crear la cuenta");
        assert!(!bare.is_unauthorized());
    }
}
