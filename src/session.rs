//! Typed view over the `tower_sessions` session installed by
//! [`crate::app::session_layer`].
//!
//! Only two keys are ever stored: the logged-in user's id and the current
//! CSRF token. Persistence, cookie handling, id cycling and inactivity
//! expiry are left to the session layer and its store.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tower_sessions::session::Id;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const USER_ID_KEY: &str = "user_id";
const CSRF_TOKEN_KEY: &str = "csrf_token";

/// Cheap to clone; all clones share the same record.
#[derive(Debug, Clone)]
pub struct Session(tower_sessions::Session);

impl Session {
    pub fn new(inner: tower_sessions::Session) -> Self {
        Self(inner)
    }

    /// `None` until the record has been saved once.
    pub fn id(&self) -> Option<Id> {
        self.0.id()
    }

    pub async fn user_id(&self) -> AppResult<Option<Uuid>> {
        Ok(self.0.get(USER_ID_KEY).await?)
    }

    pub async fn set_user_id(&self, user_id: Uuid) -> AppResult<()> {
        Ok(self.0.insert(USER_ID_KEY, user_id).await?)
    }

    pub async fn csrf_token(&self) -> AppResult<Option<String>> {
        Ok(self.0.get(CSRF_TOKEN_KEY).await?)
    }

    pub async fn set_csrf_token(&self, token: &str) -> AppResult<()> {
        Ok(self.0.insert(CSRF_TOKEN_KEY, token).await?)
    }

    pub async fn clear_csrf_token(&self) -> AppResult<()> {
        self.0.remove_value(CSRF_TOKEN_KEY).await?;
        Ok(())
    }

    /// Moves the data under a fresh id and drops the old record.
    pub async fn regenerate(&self) -> AppResult<()> {
        Ok(self.0.cycle_id().await?)
    }

    /// Clears the data and deletes the record; the layer then expires the
    /// cookie.
    pub async fn destroy(&self) -> AppResult<()> {
        Ok(self.0.flush().await?)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<tower_sessions::Session>()
            .cloned()
            .map(Self)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("session layer is not installed")))
    }
}

/// A session backed by its own in-memory store, outside any request.
#[cfg(test)]
pub(crate) fn in_memory() -> (Session, tower_sessions::MemoryStore) {
    let store = tower_sessions::MemoryStore::default();
    let inner = tower_sessions::Session::new(None, std::sync::Arc::new(store.clone()), None);
    (Session::new(inner), store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_sessions::SessionStore;

    #[tokio::test]
    async fn fresh_session_is_anonymous() {
        let (session, _) = in_memory();
        assert_eq!(session.user_id().await.unwrap(), None);
        assert_eq!(session.csrf_token().await.unwrap(), None);
        assert!(session.id().is_none());
    }

    #[tokio::test]
    async fn typed_accessors_round_trip() {
        let (session, _) = in_memory();
        let user = Uuid::new_v4();
        session.set_user_id(user).await.unwrap();
        session.set_csrf_token("t").await.unwrap();
        assert_eq!(session.user_id().await.unwrap(), Some(user));
        assert_eq!(session.csrf_token().await.unwrap().as_deref(), Some("t"));

        session.clear_csrf_token().await.unwrap();
        assert_eq!(session.csrf_token().await.unwrap(), None);
        assert_eq!(session.user_id().await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn regenerate_keeps_data_and_drops_old_record() {
        let (session, store) = in_memory();
        let user = Uuid::new_v4();
        session.set_user_id(user).await.unwrap();
        session.0.save().await.unwrap();
        let old = session.id().unwrap();

        session.regenerate().await.unwrap();
        session.0.save().await.unwrap();
        let new = session.id().unwrap();

        assert_ne!(old, new);
        assert!(store.load(&old).await.unwrap().is_none());
        assert!(store.load(&new).await.unwrap().is_some());
        assert_eq!(session.user_id().await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn destroy_clears_data_and_record() {
        let (session, store) = in_memory();
        session.set_user_id(Uuid::new_v4()).await.unwrap();
        session.0.save().await.unwrap();
        let id = session.id().unwrap();

        session.destroy().await.unwrap();
        assert_eq!(session.user_id().await.unwrap(), None);
        assert!(store.load(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let (session, _) = in_memory();
        let other = session.clone();
        other.set_csrf_token("shared").await.unwrap();
        assert_eq!(
            session.csrf_token().await.unwrap().as_deref(),
            Some("shared")
        );
    }
}
