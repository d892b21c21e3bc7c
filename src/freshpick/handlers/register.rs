//! Registration endpoints.
//!
//! Validation order matches the storefront form: completeness, email shape,
//! agreement checkbox, then username availability. Failures re-render the
//! registration page context with an inline message; nothing is persisted.
//! Success creates an inactive account, enqueues the activation email in the
//! same transaction, and redirects to the landing page.

use axum::{
    extract::{Extension, Form},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::state::AccountState;
use super::storage::{create_account, username_taken, SignupOutcome};
use super::types::{RegisterError, RegisterForm, RegisterPage};
use super::utils::{hash_password, valid_email, CHECKBOX_ON};

#[utoipa::path(
    get,
    path = "/user/register",
    responses(
        (status = 200, description = "Empty registration page", body = RegisterPage)
    ),
    tag = "accounts"
)]
pub async fn register_form() -> impl IntoResponse {
    Json(RegisterPage::default())
}

#[utoipa::path(
    post,
    path = "/user/register",
    request_body(content = RegisterForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Account created; redirect to the landing page"),
        (status = 400, description = "Incomplete or invalid form data", body = RegisterPage),
        (status = 409, description = "Username already exists", body = RegisterPage)
    ),
    tag = "accounts"
)]
pub async fn register(
    pool: Extension<PgPool>,
    state: Extension<Arc<AccountState>>,
    payload: Option<Form<RegisterForm>>,
) -> impl IntoResponse {
    let Some(Form(form)) = payload else {
        return RegisterError::IncompleteData.into_response();
    };
    let Some((username, password, email, allow)) = form.fields() else {
        return RegisterError::IncompleteData.into_response();
    };

    if !valid_email(email) {
        return RegisterError::InvalidEmail.into_response();
    }

    if allow != CHECKBOX_ON {
        return RegisterError::AgreementNotAccepted.into_response();
    }

    match username_taken(&pool, username).await {
        Ok(true) => return RegisterError::UsernameTaken.into_response(),
        Ok(false) => {}
        Err(err) => {
            error!("Failed to check username: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response();
        }
    }

    let password_hash = match hash_password(password) {
        Ok(hash) => hash,
        Err(err) => {
            error!("Failed to hash password: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response();
        }
    };

    match create_account(&pool, username, email, &password_hash, &state).await {
        Ok(SignupOutcome::Created) => Redirect::to("/").into_response(),
        // The unique index catches races the pre-check missed.
        Ok(SignupOutcome::UsernameTaken) => RegisterError::UsernameTaken.into_response(),
        Err(err) => {
            error!("Failed to create account: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freshpick::handlers::state::AccountConfig;
    use crate::token::ActivationCodec;
    use anyhow::Result;
    use axum::http::StatusCode;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;

    fn account_state() -> Arc<AccountState> {
        let config = AccountConfig::new("https://freshpick.store".to_string());
        let codec = ActivationCodec::new(&SecretString::from("test secret"));
        Arc::new(AccountState::new(config, codec))
    }

    fn lazy_pool() -> Result<PgPool> {
        Ok(PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?)
    }

    fn form(
        username: &str,
        password: &str,
        email: &str,
        allow: &str,
    ) -> Option<Form<RegisterForm>> {
        Some(Form(RegisterForm {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            email: Some(email.to_string()),
            allow: Some(allow.to_string()),
        }))
    }

    #[tokio::test]
    async fn register_missing_payload() -> Result<()> {
        let response = register(Extension(lazy_pool()?), Extension(account_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn register_empty_field() -> Result<()> {
        let response = register(
            Extension(lazy_pool()?),
            Extension(account_state()),
            form("alice", "", "alice@example.com", "on"),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn register_invalid_email() -> Result<()> {
        let response = register(
            Extension(lazy_pool()?),
            Extension(account_state()),
            form("alice", "pw", "not-an-email", "on"),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn register_agreement_not_accepted() -> Result<()> {
        let response = register(
            Extension(lazy_pool()?),
            Extension(account_state()),
            form("alice", "pw", "alice@example.com", "off"),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn register_form_renders_blank_page() {
        let response = register_form().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
