//! Landing stub; the storefront index lives in the storefront app. Kept so
//! post-registration and post-logout redirects resolve in local development.

use axum::response::{IntoResponse, Json};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
