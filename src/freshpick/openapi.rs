//! OpenAPI document for the account routes.
//!
//! Add new endpoints to the `paths(...)` list so they show up in the Swagger
//! UI mounted at `/docs`. The landing stub at `/` is intentionally not
//! documented.

use crate::freshpick::handlers::{account, activate, health, login, register, types};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        register::register_form,
        register::register,
        activate::activate,
        login::login_form,
        login::login,
        login::logout,
        account::overview,
        account::orders,
        account::addresses,
    ),
    components(schemas(
        health::Health,
        types::RegisterForm,
        types::RegisterPage,
        types::LoginForm,
        types::LoginPage,
        types::AccountPage,
    )),
    tags(
        (name = "accounts", description = "Registration, activation, and login"),
        (name = "account-center", description = "Authenticated account pages"),
        (name = "health", description = "Service health")
    )
)]
struct ApiDoc;

pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
