//! Account-center pages behind the login gate.
//!
//! Each handler only assembles the page context; the session record is put in
//! place by [`super::session::require_session`], so reaching these handlers
//! implies an authenticated request.

use axum::{extract::Extension, response::IntoResponse, Json};

use super::storage::SessionRecord;
use super::types::AccountPage;

fn page_context(tag: &str, session: &SessionRecord) -> AccountPage {
    AccountPage {
        page: tag.to_string(),
        username: session.username.clone(),
    }
}

#[utoipa::path(
    get,
    path = "/user",
    responses(
        (status = 200, description = "Account overview page", body = AccountPage),
        (status = 303, description = "No session; redirect to login")
    ),
    tag = "account-center"
)]
pub async fn overview(session: Extension<SessionRecord>) -> impl IntoResponse {
    Json(page_context("user", &session))
}

#[utoipa::path(
    get,
    path = "/user/order",
    responses(
        (status = 200, description = "Order history page", body = AccountPage),
        (status = 303, description = "No session; redirect to login")
    ),
    tag = "account-center"
)]
pub async fn orders(session: Extension<SessionRecord>) -> impl IntoResponse {
    Json(page_context("order", &session))
}

#[utoipa::path(
    get,
    path = "/user/address",
    responses(
        (status = 200, description = "Address book page", body = AccountPage),
        (status = 303, description = "No session; redirect to login")
    ),
    tag = "account-center"
)]
pub async fn addresses(session: Extension<SessionRecord>) -> impl IntoResponse {
    Json(page_context("address", &session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use uuid::Uuid;

    fn session() -> SessionRecord {
        SessionRecord {
            user_id: Uuid::new_v4(),
            username: "alice".to_string(),
        }
    }

    #[test]
    fn page_context_carries_tag_and_username() {
        let record = session();
        assert_eq!(page_context("user", &record).page, "user");
        assert_eq!(page_context("order", &record).page, "order");
        assert_eq!(page_context("address", &record).page, "address");
        assert_eq!(page_context("user", &record).username, "alice");
    }

    #[tokio::test]
    async fn pages_render_for_authenticated_session() {
        for handler_page in [
            overview(Extension(session())).await.into_response(),
            orders(Extension(session())).await.into_response(),
            addresses(Extension(session())).await.into_response(),
        ] {
            assert_eq!(handler_page.status(), StatusCode::OK);
        }
    }
}
