//! Request plumbing shared by every controller.

use std::collections::HashMap;

use anyhow::Context;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Serialize;
use serde_json::Value;
use tracing::error;
use uuid::Uuid;

use crate::{
    csrf,
    error::{AppError, AppResult},
    escape::{escape_html, escape_value},
    session::Session,
    state::AppState,
    validator::Validator,
    views::View,
};

/// Handed to every action: app state plus the caller's session.
pub struct Controller {
    state: AppState,
    session: Session,
}

#[async_trait]
impl FromRequestParts<AppState> for Controller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        Ok(Self {
            state: state.clone(),
            session,
        })
    }
}

impl Controller {
    pub fn new(state: AppState, session: Session) -> Self {
        Self { state, session }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn render<T: Serialize>(&self, view: View, data: &T) -> AppResult<Response> {
        self.render_with_status(StatusCode::OK, view, data).await
    }

    /// Escapes every string in `data`, adds `csrf_token`/`csrf_input` and
    /// renders `view` inside the layout.
    pub async fn render_with_status<T: Serialize>(
        &self,
        status: StatusCode,
        view: View,
        data: &T,
    ) -> AppResult<Response> {
        let value = serde_json::to_value(data).context("serialize view data")?;
        let Value::Object(mut page) = escape_value(value) else {
            return Err(anyhow::anyhow!("view data for {} is not a map", view.name()).into());
        };
        page.insert(
            "csrf_token".into(),
            Value::String(csrf::get_token(&self.session).await?),
        );
        page.insert(
            "csrf_input".into(),
            Value::String(csrf::hidden_input(&self.session).await?),
        );

        match self.state.views.render(view, &page) {
            Some(html) => Ok((status, Html(html)).into_response()),
            None => {
                error!(view = view.name(), "view not registered");
                Ok((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(format!("View file not found: {}", escape_html(view.name()))),
                )
                    .into_response())
            }
        }
    }

    pub fn redirect(&self, url: &str) -> Response {
        Redirect::to(url).into_response()
    }

    pub async fn is_logged_in(&self) -> AppResult<bool> {
        Ok(self.session.user_id().await?.is_some())
    }

    /// Id of the logged-in user, or `AuthRequired` (a redirect to `/login`).
    pub async fn require_auth(&self) -> AppResult<Uuid> {
        self.session.user_id().await?.ok_or(AppError::AuthRequired)
    }

    /// Checks the submitted `csrf_token` field; a missing field fails.
    pub async fn verify_csrf_token(&self, form: &HashMap<String, String>) -> AppResult<bool> {
        let token = form.get(csrf::FIELD_NAME).map(String::as_str).unwrap_or("");
        self.verify_csrf_token_value(token).await
    }

    pub async fn verify_csrf_token_value(&self, token: &str) -> AppResult<bool> {
        csrf::verify_token(&self.session, token).await
    }

    pub fn validator(&self, form: HashMap<String, String>) -> Validator {
        Validator::new(form)
    }

    pub fn json_response<T: Serialize>(&self, data: &T, status: StatusCode) -> AppResult<Response> {
        let body = serde_json::to_vec(data).context("serialize json response")?;
        Ok((
            status,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json; charset=utf-8"),
            )],
            body,
        )
            .into_response())
    }
}
