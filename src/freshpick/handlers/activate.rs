//! Email-activation endpoint.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::state::AccountState;
use super::storage::activate_user;
use crate::token::RedeemError;

#[utoipa::path(
    get,
    path = "/user/active/{token}",
    params(
        ("token" = String, Path, description = "Signed activation token from the emailed link")
    ),
    responses(
        (status = 303, description = "Account activated; redirect to the login page"),
        (status = 400, description = "Invalid activation link", body = String),
        (status = 404, description = "Unknown account", body = String),
        (status = 410, description = "Activation link has expired", body = String)
    ),
    tag = "accounts"
)]
pub async fn activate(
    Path(token): Path<String>,
    pool: Extension<PgPool>,
    state: Extension<Arc<AccountState>>,
) -> impl IntoResponse {
    let user_id = match state.codec().redeem(token.trim()) {
        Ok(user_id) => user_id,
        Err(RedeemError::Expired) => {
            // Terminal plain-text response; resending is a support path.
            return (StatusCode::GONE, "activation link has expired".to_string()).into_response();
        }
        Err(RedeemError::Invalid) => {
            return (
                StatusCode::BAD_REQUEST,
                "invalid activation link".to_string(),
            )
                .into_response();
        }
    };

    match activate_user(&pool, user_id).await {
        Ok(true) => Redirect::to("/user/login").into_response(),
        // A signed token can outlive its account; answer gracefully.
        Ok(false) => (StatusCode::NOT_FOUND, "unknown account".to_string()).into_response(),
        Err(err) => {
            error!("Failed to activate account: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Activation failed".to_string(),
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
    use axum::body::to_bytes;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use uuid::Uuid;

    fn account_state(secret: &str) -> Arc<AccountState> {
        let config = AccountConfig::new("https://freshpick.store".to_string());
        let codec = ActivationCodec::new(&SecretString::from(secret.to_string()));
        Arc::new(AccountState::new(config, codec))
    }

    fn lazy_pool() -> Result<PgPool> {
        Ok(PgPoolOptions::new().connect_lazy("postgres://postgres@localhost/postgres")?)
    }

    #[tokio::test]
    async fn activate_rejects_garbage_token() -> Result<()> {
        let response = activate(
            Path("garbage".to_string()),
            Extension(lazy_pool()?),
            Extension(account_state("test secret")),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn activate_rejects_foreign_signature() -> Result<()> {
        let other = ActivationCodec::new(&SecretString::from("other secret"));
        let token = other.issue(Uuid::new_v4())?;

        let response = activate(
            Path(token),
            Extension(lazy_pool()?),
            Extension(account_state("test secret")),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        Ok(())
    }

    #[tokio::test]
    async fn activate_reports_expired_link() -> Result<()> {
        let state = account_state("test secret");
        // Zero-TTL codec sharing the secret mints an already-stale token.
        let stale = ActivationCodec::with_ttl(&SecretString::from("test secret"), 0);
        let token = stale.issue(Uuid::new_v4())?;
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        let response = activate(Path(token), Extension(lazy_pool()?), Extension(state))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::GONE);

        let body = to_bytes(response.into_body(), 1024).await?;
        assert_eq!(&body[..], b"activation link has expired");
        Ok(())
    }
}
