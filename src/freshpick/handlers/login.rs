//! Login, logout, and the remember-me cookie.

use axum::{
    extract::{Extension, Form, Query},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::session::{
    append_cookie, clear_remember_cookie, clear_session_cookie, extract_session_token,
    remember_cookie, session_cookie, REMEMBER_COOKIE_NAME,
};
use super::state::AccountState;
use super::storage::{delete_session, insert_session, lookup_credentials};
use super::types::{LoginError, LoginForm, LoginPage, NextQuery};
use super::utils::{cookie_value, hash_session_token, redirect_target, verify_password, CHECKBOX_ON};

#[utoipa::path(
    get,
    path = "/user/login",
    responses(
        (status = 200, description = "Login page, pre-filled from the remember-me cookie", body = LoginPage)
    ),
    tag = "accounts"
)]
pub async fn login_form(headers: HeaderMap) -> impl IntoResponse {
    let page = match cookie_value(&headers, REMEMBER_COOKIE_NAME) {
        Some(username) => LoginPage {
            username,
            checked: true,
            error: None,
        },
        None => LoginPage::default(),
    };
    Json(page)
}

#[utoipa::path(
    post,
    path = "/user/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    params(
        ("next" = Option<String>, Query, description = "Return target after login")
    ),
    responses(
        (status = 303, description = "Session established; redirect to `next` or the landing page"),
        (status = 400, description = "Incomplete form data", body = LoginPage),
        (status = 401, description = "Invalid username or password", body = LoginPage),
        (status = 403, description = "Account is not activated", body = LoginPage)
    ),
    tag = "accounts"
)]
pub async fn login(
    pool: Extension<PgPool>,
    state: Extension<Arc<AccountState>>,
    Query(query): Query<NextQuery>,
    payload: Option<Form<LoginForm>>,
) -> impl IntoResponse {
    let Some(Form(form)) = payload else {
        return LoginError::IncompleteData.into_response();
    };
    let Some((username, password)) = form.fields() else {
        return LoginError::IncompleteData.into_response();
    };

    let record = match lookup_credentials(&pool, username).await {
        Ok(record) => record,
        Err(err) => {
            error!("Failed to lookup credentials: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Login failed".to_string())
                .into_response();
        }
    };

    // Unknown username and wrong password are indistinguishable to the caller.
    let Some(record) = record else {
        return LoginError::InvalidCredentials.into_response();
    };
    if !verify_password(password, &record.password_hash) {
        return LoginError::InvalidCredentials.into_response();
    }

    if !record.is_active {
        return LoginError::AccountNotActivated.into_response();
    }

    let token =
        match insert_session(&pool, record.user_id, state.config().session_ttl_seconds()).await {
            Ok(token) => token,
            Err(err) => {
                error!("Failed to insert session: {err}");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Login failed".to_string())
                    .into_response();
            }
        };

    let mut response_headers = HeaderMap::new();
    match session_cookie(state.config(), &token) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Login failed".to_string()).into_response();
        }
    }

    // Ticked checkbox refreshes the username hint; otherwise clear any old one.
    if form.remember.as_deref() == Some(CHECKBOX_ON) {
        append_cookie(&mut response_headers, remember_cookie(username));
    } else {
        response_headers.append(SET_COOKIE, clear_remember_cookie());
    }

    let target = redirect_target(query.next.as_deref());
    (response_headers, Redirect::to(&target)).into_response()
}

#[utoipa::path(
    get,
    path = "/user/logout",
    responses(
        (status = 303, description = "Session cleared; redirect to the landing page")
    ),
    tag = "account-center"
)]
pub async fn logout(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    state: Extension<Arc<AccountState>>,
) -> impl IntoResponse {
    if let Some(token) = extract_session_token(&headers) {
        let token_hash = hash_session_token(&token);
        if let Err(err) = delete_session(&pool, &token_hash).await {
            error!("Failed to delete session: {err}");
        }
    }

    // Always clear the cookie, even if the session record was missing.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(state.config()) {
        response_headers.insert(SET_COOKIE, cookie);
    }
    (response_headers, Redirect::to("/")).into_response()
}
