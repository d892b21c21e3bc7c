//! Session cookies and the login gate for the account-center pages.

use axum::{
    extract::{Extension, Request},
    http::{
        header::{InvalidHeaderValue, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode, Uri,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use sqlx::PgPool;
use tracing::error;

use super::state::{AccountConfig, REMEMBER_COOKIE_MAX_AGE_SECONDS};
use super::storage::{lookup_session, SessionRecord};
use super::utils::{cookie_value, hash_session_token};

pub(crate) const SESSION_COOKIE_NAME: &str = "freshpick_session";
pub(crate) const REMEMBER_COOKIE_NAME: &str = "username";

/// Resolve the session cookie into a session record, if present.
///
/// Returns `Ok(None)` when the cookie is missing or invalid.
pub(crate) async fn authenticate_session(
    headers: &HeaderMap,
    pool: &PgPool,
) -> Result<Option<SessionRecord>, StatusCode> {
    let Some(token) = extract_session_token(headers) else {
        return Ok(None);
    };
    // Only the hash is stored; never compare raw tokens against the database.
    let token_hash = hash_session_token(&token);
    match lookup_session(pool, &token_hash).await {
        Ok(record) => Ok(record),
        Err(err) => {
            error!("Failed to lookup session: {err}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Gate wrapped around the account-center routes: anonymous requests are sent
/// to the login page with the original URL preserved as `next`; authenticated
/// requests pass through with the session record attached as an extension.
pub async fn require_session(
    Extension(pool): Extension<PgPool>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate_session(request.headers(), &pool).await {
        Ok(Some(record)) => {
            request.extensions_mut().insert(record);
            next.run(request).await
        }
        Ok(None) => login_redirect(request.uri()).into_response(),
        Err(status) => status.into_response(),
    }
}

/// Redirect to the login page, carrying the requested URL as `next`.
pub(crate) fn login_redirect(uri: &Uri) -> Redirect {
    let original = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string);
    let next: String = url::form_urlencoded::byte_serialize(original.as_bytes()).collect();
    Redirect::to(&format!("/user/login?next={next}"))
}

pub(crate) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, SESSION_COOKIE_NAME)
}

/// Build a secure `HttpOnly` cookie for the session token.
pub(crate) fn session_cookie(
    config: &AccountConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn clear_session_cookie(
    config: &AccountConfig,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Remember-me cookie: a plain username hint with a 7-day lifetime.
pub(crate) fn remember_cookie(username: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{REMEMBER_COOKIE_NAME}={username}; Path=/; SameSite=Lax; Max-Age={REMEMBER_COOKIE_MAX_AGE_SECONDS}"
    ))
}

pub(crate) fn clear_remember_cookie() -> HeaderValue {
    HeaderValue::from_static("username=; Path=/; SameSite=Lax; Max-Age=0")
}

/// Append a `Set-Cookie` pair to response headers, logging bad values.
pub(crate) fn append_cookie(headers: &mut HeaderMap, cookie: Result<HeaderValue, InvalidHeaderValue>) {
    match cookie {
        Ok(value) => {
            headers.append(SET_COOKIE, value);
        }
        Err(err) => {
            error!("Failed to build cookie header: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freshpick::handlers::state::AccountConfig;
    use axum::http::header::COOKIE;

    #[test]
    fn session_cookie_secure_over_https() {
        let config = AccountConfig::new("https://freshpick.store".to_string());
        let cookie = session_cookie(&config, "tok").expect("cookie");
        let value = cookie.to_str().expect("ascii");
        assert!(value.starts_with("freshpick_session=tok; Path=/; HttpOnly"));
        assert!(value.ends_with("; Secure"));
    }

    #[test]
    fn session_cookie_plain_over_http() {
        let config = AccountConfig::new("http://localhost:8080".to_string());
        let cookie = session_cookie(&config, "tok").expect("cookie");
        assert!(!cookie.to_str().expect("ascii").contains("Secure"));
    }

    #[test]
    fn clear_session_cookie_expires_immediately() {
        let config = AccountConfig::new("http://localhost:8080".to_string());
        let cookie = clear_session_cookie(&config).expect("cookie");
        assert!(cookie.to_str().expect("ascii").contains("Max-Age=0"));
    }

    #[test]
    fn remember_cookie_lives_seven_days() {
        let cookie = remember_cookie("alice").expect("cookie");
        let value = cookie.to_str().expect("ascii");
        assert!(value.starts_with("username=alice"));
        assert!(value.contains("Max-Age=604800"));
    }

    #[test]
    fn clear_remember_cookie_expires_immediately() {
        let value = clear_remember_cookie();
        assert!(value.to_str().expect("ascii").contains("Max-Age=0"));
    }

    #[test]
    fn extract_session_token_reads_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("freshpick_session=tok; username=alice"),
        );
        assert_eq!(extract_session_token(&headers), Some("tok".to_string()));
    }

    #[test]
    fn login_redirect_preserves_original_url() {
        let uri: Uri = "/user/order?page=2".parse().expect("uri");
        let redirect = login_redirect(&uri).into_response();
        let location = redirect
            .headers()
            .get(axum::http::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        assert_eq!(
            location.as_deref(),
            Some("/user/login?next=%2Fuser%2Forder%3Fpage%3D2")
        );
    }

    #[tokio::test]
    async fn authenticate_session_without_cookie_is_anonymous() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://postgres@localhost/postgres")
            .expect("lazy pool");
        let headers = HeaderMap::new();
        let record = authenticate_session(&headers, &pool).await.expect("ok");
        assert!(record.is_none());
    }
}
