//! Form and page types for the account endpoints.
//!
//! Handlers return the page *context* the storefront templates consume; form
//! errors re-render the originating page context with an inline message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Registration form fields submitted by the storefront.
#[derive(ToSchema, Deserialize, Debug)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub allow: Option<String>,
}

impl RegisterForm {
    /// All four fields, provided every one is present and non-empty.
    pub(crate) fn fields(&self) -> Option<(&str, &str, &str, &str)> {
        match (&self.username, &self.password, &self.email, &self.allow) {
            (Some(username), Some(password), Some(email), Some(allow))
                if !username.is_empty()
                    && !password.is_empty()
                    && !email.is_empty()
                    && !allow.is_empty() =>
            {
                Some((username, password, email, allow))
            }
            _ => None,
        }
    }
}

/// Context for the registration page.
#[derive(ToSchema, Serialize, Debug, Default)]
pub struct RegisterPage {
    pub error: Option<String>,
}

/// Login form fields; `remember` carries the checkbox sentinel when ticked.
#[derive(ToSchema, Deserialize, Debug)]
pub struct LoginForm {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub pwd: Option<String>,
    #[serde(default)]
    pub remember: Option<String>,
}

impl LoginForm {
    pub(crate) fn fields(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.pwd) {
            (Some(username), Some(pwd)) if !username.is_empty() && !pwd.is_empty() => {
                Some((username, pwd))
            }
            _ => None,
        }
    }
}

/// Optional return target carried in the login URL.
#[derive(ToSchema, Deserialize, Debug, Default)]
pub struct NextQuery {
    #[serde(default)]
    pub next: Option<String>,
}

/// Context for the login page; pre-filled from the remember-me cookie.
#[derive(ToSchema, Serialize, Debug, Default)]
pub struct LoginPage {
    pub username: String,
    pub checked: bool,
    pub error: Option<String>,
}

/// Context for an account-center page; `page` drives tab highlighting.
#[derive(ToSchema, Serialize, Debug)]
pub struct AccountPage {
    pub page: String,
    pub username: String,
}

/// Why a registration form was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterError {
    IncompleteData,
    InvalidEmail,
    AgreementNotAccepted,
    UsernameTaken,
}

impl RegisterError {
    pub(crate) const fn message(self) -> &'static str {
        match self {
            Self::IncompleteData => "incomplete form data",
            Self::InvalidEmail => "invalid email address",
            Self::AgreementNotAccepted => "the user agreement must be accepted",
            Self::UsernameTaken => "username already exists",
        }
    }

    const fn status(self) -> StatusCode {
        match self {
            Self::IncompleteData | Self::InvalidEmail | Self::AgreementNotAccepted => {
                StatusCode::BAD_REQUEST
            }
            Self::UsernameTaken => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for RegisterError {
    fn into_response(self) -> Response {
        let page = RegisterPage {
            error: Some(self.message().to_string()),
        };
        (self.status(), Json(page)).into_response()
    }
}

/// Why a login attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginError {
    IncompleteData,
    InvalidCredentials,
    AccountNotActivated,
}

impl LoginError {
    pub(crate) const fn message(self) -> &'static str {
        match self {
            Self::IncompleteData => "incomplete form data",
            Self::InvalidCredentials => "invalid username or password",
            Self::AccountNotActivated => "account is not activated",
        }
    }

    const fn status(self) -> StatusCode {
        match self {
            Self::IncompleteData => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AccountNotActivated => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        let page = LoginPage {
            error: Some(self.message().to_string()),
            ..LoginPage::default()
        };
        (self.status(), Json(page)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_form(
        username: Option<&str>,
        password: Option<&str>,
        email: Option<&str>,
        allow: Option<&str>,
    ) -> RegisterForm {
        RegisterForm {
            username: username.map(str::to_string),
            password: password.map(str::to_string),
            email: email.map(str::to_string),
            allow: allow.map(str::to_string),
        }
    }

    #[test]
    fn register_fields_require_all_four() {
        let complete = register_form(Some("alice"), Some("pw"), Some("a@example.com"), Some("on"));
        assert_eq!(
            complete.fields(),
            Some(("alice", "pw", "a@example.com", "on"))
        );

        let missing = register_form(Some("alice"), None, Some("a@example.com"), Some("on"));
        assert_eq!(missing.fields(), None);

        let empty = register_form(Some("alice"), Some(""), Some("a@example.com"), Some("on"));
        assert_eq!(empty.fields(), None);
    }

    #[test]
    fn login_fields_require_both() {
        let form = LoginForm {
            username: Some("alice".to_string()),
            pwd: Some("pw".to_string()),
            remember: None,
        };
        assert_eq!(form.fields(), Some(("alice", "pw")));

        let form = LoginForm {
            username: Some("alice".to_string()),
            pwd: Some(String::new()),
            remember: None,
        };
        assert_eq!(form.fields(), None);
    }

    #[test]
    fn register_error_statuses() {
        assert_eq!(
            RegisterError::IncompleteData.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(RegisterError::UsernameTaken.status(), StatusCode::CONFLICT);
        assert_eq!(
            RegisterError::UsernameTaken.message(),
            "username already exists"
        );
    }

    #[test]
    fn login_error_statuses() {
        assert_eq!(
            LoginError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            LoginError::AccountNotActivated.status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn login_form_missing_fields_default_to_none() {
        let form: LoginForm = serde_json::from_str(r#"{"username":"alice"}"#).unwrap();
        assert_eq!(form.username.as_deref(), Some("alice"));
        assert_eq!(form.pwd, None);
        assert_eq!(form.remember, None);
        assert_eq!(form.fields(), None);
    }
}
