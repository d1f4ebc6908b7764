pub mod store;
pub mod token;

use std::sync::Arc;

use crate::http::models::UserProfile;

use self::{
    store::{MemoryStore, SessionError, SessionStore},
    token::{TokenStatus, token_status},
};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// The signed-in user as seen by the client: a bearer token plus the last
/// profile the server returned. Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::default()))
    }

    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn user(&self) -> Option<UserProfile> {
        let raw = self.store.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("stored profile is unreadable: {e}");
                None
            }
        }
    }

    pub fn save(&self, token: &str, user: &UserProfile) -> Result<(), SessionError> {
        self.store.set(TOKEN_KEY, token)?;
        self.update_user(user)
    }

    pub fn update_user(&self, user: &UserProfile) -> Result<(), SessionError> {
        self.store.set(USER_KEY, &serde_json::to_string(user)?)
    }

    /// A token is present and, if it carries an expiry, not past it.
    /// Expired tokens are purged together with the stored profile.
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(chrono::Utc::now().timestamp())
    }

    pub fn is_authenticated_at(&self, now_secs: i64) -> bool {
        let Some(token) = self.token() else {
            return false;
        };

        match token_status(&token, now_secs) {
            TokenStatus::Valid => true,
            TokenStatus::Expired => {
                tracing::info!("stored token expired, clearing session");
                if let Err(e) = self.logout() {
                    tracing::warn!("failed to clear expired session: {e}");
                }
                false
            }
            TokenStatus::Malformed => false,
        }
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::token::make_token;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;

    fn profile() -> UserProfile {
        UserProfile {
            id: Some("42".into()),
            name: Some("Ana".into()),
            email: Some("ana@example.com".into()),
            ..Default::default()
        }
    }

    #[test]
    fn empty_session_is_anonymous() {
        let session = Session::in_memory();
        assert!(!session.is_authenticated_at(NOW));
        assert_eq!(session.user(), None);
    }

    #[test]
    fn valid_token_authenticates_and_keeps_profile() {
        let session = Session::in_memory();
        let token = make_token(&json!({ "exp": NOW + 3600 }));
        session.save(&token, &profile()).unwrap();

        assert!(session.is_authenticated_at(NOW));
        assert_eq!(session.user(), Some(profile()));
    }

    #[test]
    fn expired_token_is_purged() {
        let session = Session::in_memory();
        let token = make_token(&json!({ "exp": NOW - 10 }));
        session.save(&token, &profile()).unwrap();

        assert!(!session.is_authenticated_at(NOW));
        assert_eq!(session.token(), None);
        assert_eq!(session.user(), None);
    }

    #[test]
    fn undecodable_token_is_rejected_but_kept() {
        let session = Session::in_memory();
        session.save("opaque-token", &profile()).unwrap();

        assert!(!session.is_authenticated_at(NOW));
        assert_eq!(session.token().as_deref(), Some("opaque-token"));
    }

    #[test]
    fn logout_clears_both_keys() {
        let session = Session::in_memory();
        session
            .save(&make_token(&json!({})), &profile())
            .unwrap();
        session.logout().unwrap();
        assert_eq!(session.token(), None);
        assert_eq!(session.user(), None);
    }
}
