use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// No `user_id` in the session; answered with a redirect to the login page.
    #[error("authentication required")]
    AuthRequired,

    #[error("Invalid CSRF token")]
    CsrfMismatch,

    /// Front controller could not resolve the path; carries the diagnostic body.
    #[error("{0}")]
    RouteNotFound(String),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthRequired => StatusCode::SEE_OTHER,
            AppError::CsrfMismatch => StatusCode::FORBIDDEN,
            AppError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Session(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::AuthRequired => Redirect::to("/login").into_response(),
            AppError::CsrfMismatch | AppError::RouteNotFound(_) => {
                (self.status_code(), self.to_string()).into_response()
            }
            AppError::Session(_) | AppError::Internal(_) => {
                error!(error = %self, "request failed");
                (self.status_code(), "Internal Server Error").into_response()
            }
        }
    }
}
