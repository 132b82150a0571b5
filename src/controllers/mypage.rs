use axum::{http::StatusCode, response::Response};
use serde::Serialize;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    controller::Controller,
    error::{AppError, AppResult},
    users::User,
    views::View,
};

#[derive(Debug, Serialize)]
struct MyPage<'a> {
    title: &'static str,
    username: &'a str,
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Profile<'a> {
    id: Uuid,
    username: &'a str,
    email: &'a str,
}

/// User behind the session. A session whose user no longer exists is
/// destroyed and treated as logged out.
async fn current_user(c: &Controller) -> AppResult<User> {
    let user_id = c.require_auth().await?;
    match c.state().users.find_by_id(user_id).await? {
        Some(user) => Ok(user),
        None => {
            warn!(user_id = %user_id, "session points at a missing user, logging out");
            c.session().destroy().await?;
            Err(AppError::AuthRequired)
        }
    }
}

#[instrument(skip(c))]
pub async fn index(c: Controller) -> AppResult<Response> {
    let user = current_user(&c).await?;
    c.render(
        View::MypageIndex,
        &MyPage {
            title: "My page",
            username: &user.username,
            email: &user.email,
        },
    )
    .await
}

#[instrument(skip(c))]
pub async fn profile(c: Controller) -> AppResult<Response> {
    let user = current_user(&c).await?;
    c.json_response(
        &Profile {
            id: user.id,
            username: &user.username,
            email: &user.email,
        },
        StatusCode::OK,
    )
}
