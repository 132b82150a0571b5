use axum::response::Response;
use serde::Serialize;
use tracing::instrument;

use crate::{controller::Controller, error::AppResult, views::View};

#[derive(Debug, Serialize)]
struct HomePage {
    title: &'static str,
    message: &'static str,
}

#[instrument(skip(c))]
pub async fn index(c: Controller) -> AppResult<Response> {
    if c.is_logged_in().await? {
        return Ok(c.redirect("/mypage"));
    }

    c.render(
        View::HomeIndex,
        &HomePage {
            title: "Login system demo",
            message: "An MVC web application with sessions, CSRF protection and validation",
        },
    )
    .await
}
