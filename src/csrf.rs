//! Per-session CSRF token. Only the latest token is ever valid.

use crate::{crypto, error::AppResult, escape::escape_html, session::Session};

pub const FIELD_NAME: &str = "csrf_token";

/// Stores a fresh token as the session's only token and returns it.
pub async fn generate_token(session: &Session) -> AppResult<String> {
    let token = crypto::random_token();
    session.set_csrf_token(&token).await?;
    Ok(token)
}

/// Current token, generated on first use.
pub async fn get_token(session: &Session) -> AppResult<String> {
    match session.csrf_token().await? {
        Some(token) => Ok(token),
        None => generate_token(session).await,
    }
}

pub async fn verify_token(session: &Session, candidate: &str) -> AppResult<bool> {
    Ok(match session.csrf_token().await? {
        Some(stored) => crypto::constant_time_eq(stored.as_bytes(), candidate.as_bytes()),
        None => false,
    })
}

pub async fn remove_token(session: &Session) -> AppResult<()> {
    session.clear_csrf_token().await
}

/// `<input type="hidden">` carrying the current token.
pub async fn hidden_input(session: &Session) -> AppResult<String> {
    Ok(format!(
        r#"<input type="hidden" name="{}" value="{}">"#,
        FIELD_NAME,
        escape_html(&get_token(session).await?)
    ))
}
