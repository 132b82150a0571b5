use std::collections::HashMap;

use axum::{http::StatusCode, response::Response, Form};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    controller::Controller,
    csrf,
    error::{AppError, AppResult},
    users::password::verify_password,
    validator::BLANK,
    views::View,
};

const INVALID_CREDENTIALS: &str = "Incorrect username or password.";

#[derive(Debug, Serialize)]
struct LoginPage<'a> {
    title: &'static str,
    error: &'a str,
    username: &'a str,
}

async fn login_form(
    c: &Controller,
    status: StatusCode,
    error: &str,
    username: &str,
) -> AppResult<Response> {
    c.render_with_status(
        status,
        View::LoginIndex,
        &LoginPage {
            title: "Log in",
            error,
            username,
        },
    )
    .await
}

async fn unauthorized(c: &Controller, username: &str) -> AppResult<Response> {
    login_form(c, StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS, username).await
}

#[instrument(skip(c))]
pub async fn index(c: Controller) -> AppResult<Response> {
    if c.is_logged_in().await? {
        return Ok(c.redirect("/mypage"));
    }
    login_form(&c, StatusCode::OK, "", "").await
}

#[instrument(skip(c, form))]
pub async fn authenticate(
    c: Controller,
    Form(form): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    if !c.verify_csrf_token(&form).await? {
        warn!("login rejected: csrf token mismatch");
        return Err(AppError::CsrfMismatch);
    }

    let username = form
        .get("username")
        .map(|s| s.trim_matches(BLANK))
        .unwrap_or("")
        .to_string();
    let password = form.get("password").cloned().unwrap_or_default();

    let mut v = c.validator(form);
    v.required("username", Some("Please enter your username."))
        .max_length("username", 50, None)
        .required("password", Some("Please enter your password."))
        .max_length("password", 255, None);
    if !v.is_valid() {
        let error = v.first_error();
        return login_form(&c, StatusCode::UNPROCESSABLE_ENTITY, error, &username).await;
    }

    let Some(user) = c.state().users.find_by_username(&username).await? else {
        warn!(username = %username, "login unknown username");
        return unauthorized(&c, &username).await;
    };
    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return unauthorized(&c, &username).await;
    }

    // new id on privilege change; the pre-login token dies with it
    c.session().regenerate().await?;
    c.session().set_user_id(user.id).await?;
    csrf::remove_token(c.session()).await?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(c.redirect("/mypage"))
}

#[instrument(skip(c, form))]
pub async fn logout(
    c: Controller,
    Form(form): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    if !c.verify_csrf_token(&form).await? {
        warn!("logout rejected: csrf token mismatch");
        return Err(AppError::CsrfMismatch);
    }

    if let Some(user_id) = c.session().user_id().await? {
        info!(user_id = %user_id, "user logged out");
    }
    c.session().destroy().await?;
    Ok(c.redirect("/"))
}
