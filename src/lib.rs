//! # Freshpick Accounts
//!
//! `freshpick` is the customer-accounts service for the Freshpick
//! storefront. It handles registration, email activation, login/logout, and
//! the authenticated account-center pages.
//!
//! ## Registration & Activation
//!
//! New accounts start inactive. Registration mints a signed, time-limited
//! activation token (HS256, one hour) embedding the new user's id and hands
//! the activation email to a database-backed outbox; a background worker
//! delivers it. Following the emailed link flips the account active.
//!
//! ## Sessions
//!
//! Login verifies the Argon2 password hash and issues a random session token
//! kept in an `HttpOnly` cookie. Only the token's SHA-256 hash is stored
//! server-side. The account-center routes sit behind a middleware gate that
//! redirects anonymous requests to the login page, preserving the original
//! URL as `next`.

pub mod cli;
pub mod freshpick;
pub mod token;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
