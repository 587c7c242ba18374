//! # Authentication
//!
//! The [`AuthProvider`] capability issues and checks identities. Providers
//! report failures as [`AuthErrorCode`]s; [`AuthError`] pairs a code with the
//! flow it happened in so the user-facing message can be picked.
//!
//! | Code | Sign-in | Register |
//! |------|---------|----------|
//! | `invalid-email` | Email tidak valid | Format email tidak valid |
//! | `user-not-found` | Email tidak terdaftar | Registrasi gagal |
//! | `wrong-password` | Password salah | Registrasi gagal |
//! | `network-request-failed` | Koneksi internet bermasalah | Koneksi internet bermasalah |
//! | `email-already-in-use` | Login gagal | Email sudah terdaftar |
//! | `weak-password` | Login gagal | Password terlalu lemah |
//! | anything else | Login gagal | Registrasi gagal |
//!
//! Raw codes never reach the user.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod local;

pub use local::LocalAuthProvider;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    InvalidEmail,
    UserNotFound,
    WrongPassword,
    NetworkRequestFailed,
    EmailAlreadyInUse,
    WeakPassword,
    Other(String),
}

impl AuthErrorCode {
    /// Parses a provider code, with or without the `auth/` namespace.
    pub fn from_code(code: &str) -> Self {
        let bare = code.strip_prefix("auth/").unwrap_or(code);
        match bare {
            "invalid-email" => AuthErrorCode::InvalidEmail,
            "user-not-found" => AuthErrorCode::UserNotFound,
            "wrong-password" => AuthErrorCode::WrongPassword,
            "network-request-failed" => AuthErrorCode::NetworkRequestFailed,
            "email-already-in-use" => AuthErrorCode::EmailAlreadyInUse,
            "weak-password" => AuthErrorCode::WeakPassword,
            _ => AuthErrorCode::Other(bare.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            AuthErrorCode::InvalidEmail => "invalid-email",
            AuthErrorCode::UserNotFound => "user-not-found",
            AuthErrorCode::WrongPassword => "wrong-password",
            AuthErrorCode::NetworkRequestFailed => "network-request-failed",
            AuthErrorCode::EmailAlreadyInUse => "email-already-in-use",
            AuthErrorCode::WeakPassword => "weak-password",
            AuthErrorCode::Other(code) => code,
        }
    }

    pub fn message(&self, flow: AuthFlow) -> &'static str {
        use AuthErrorCode::*;
        match (flow, self) {
            (AuthFlow::SignIn | AuthFlow::Register, NetworkRequestFailed) => {
                "Koneksi internet bermasalah"
            }
            (AuthFlow::SignIn, InvalidEmail) => "Email tidak valid",
            (AuthFlow::SignIn, UserNotFound) => "Email tidak terdaftar",
            (AuthFlow::SignIn, WrongPassword) => "Password salah",
            (AuthFlow::Register, EmailAlreadyInUse) => "Email sudah terdaftar",
            (AuthFlow::Register, InvalidEmail) => "Format email tidak valid",
            (AuthFlow::Register, WeakPassword) => "Password terlalu lemah",
            (flow, _) => flow.fallback_message(),
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "auth/{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFlow {
    SignIn,
    Register,
    SignOut,
}

impl AuthFlow {
    pub fn fallback_message(self) -> &'static str {
        match self {
            AuthFlow::SignIn => "Login gagal",
            AuthFlow::Register => "Registrasi gagal",
            AuthFlow::SignOut => "Logout gagal",
        }
    }
}

/// A provider failure in the context of one flow. Displays the localized
/// message; the raw code stays available for logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .code.message(*.flow))]
pub struct AuthError {
    pub flow: AuthFlow,
    pub code: AuthErrorCode,
}

impl AuthError {
    pub fn new(flow: AuthFlow, code: AuthErrorCode) -> Self {
        Self { flow, code }
    }

    pub fn message(&self) -> &'static str {
        self.code.message(self.flow)
    }
}

/// Account as the provider sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderUser, AuthErrorCode>;

    async fn register(&self, email: &str, password: &str) -> Result<ProviderUser, AuthErrorCode>;

    async fn update_display_name(
        &self,
        user: &ProviderUser,
        display_name: &str,
    ) -> Result<ProviderUser, AuthErrorCode>;

    async fn sign_out(&self) -> Result<(), AuthErrorCode>;
}
