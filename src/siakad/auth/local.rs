//! Auth provider backed by the `accounts` collection of a [`DocumentStore`].
//!
//! Accounts are keyed by the lower-cased email. Passwords are stored as
//! Argon2 PHC strings.

use super::{AuthErrorCode, AuthProvider, ProviderUser};
use crate::error::StoreError;
use crate::store::{Document, DocumentId, DocumentStore, FieldValue, Fields};
use crate::validation::{is_valid_email, PASSWORD_MIN_LEN};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use password_hash::{PasswordHash, SaltString};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

pub const ACCOUNTS: &str = "accounts";

const UID: &str = "uid";
const EMAIL: &str = "email";
const PASSWORD_HASH: &str = "passwordHash";
const DISPLAY_NAME: &str = "displayName";
const CREATED_AT: &str = "createdAt";

pub struct LocalAuthProvider<S: DocumentStore> {
    store: S,
    register_lock: Mutex<()>,
}

impl<S: DocumentStore> LocalAuthProvider<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            register_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn account(&self, email: &str) -> Result<Option<Document>, AuthErrorCode> {
        self.store
            .get(ACCOUNTS, &account_id(email))
            .await
            .map_err(store_failure)
    }
}

fn account_id(email: &str) -> DocumentId {
    DocumentId::new(email.trim().to_lowercase())
}

fn store_failure(err: StoreError) -> AuthErrorCode {
    match err {
        StoreError::Transport { .. } => AuthErrorCode::NetworkRequestFailed,
        other => {
            warn!(error = %other, "account store failure");
            AuthErrorCode::Other("internal-error".to_string())
        }
    }
}

fn hash_password(password: &str) -> Result<String, AuthErrorCode> {
    let internal = |e: String| {
        warn!(error = %e, "password hashing failed");
        AuthErrorCode::Other("internal-error".to_string())
    };
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| internal(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| internal(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| internal(e.to_string()))?
        .to_string();
    Ok(phc)
}

fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn to_user(doc: &Document) -> Result<ProviderUser, AuthErrorCode> {
    let uid = doc.get_str(UID).ok_or_else(|| {
        warn!(account = %doc.id, "account without uid");
        AuthErrorCode::Other("internal-error".to_string())
    })?;
    Ok(ProviderUser {
        uid: uid.to_string(),
        email: doc.get_str(EMAIL).map(str::to_string),
        display_name: doc
            .get_str(DISPLAY_NAME)
            .filter(|name| !name.is_empty())
            .map(str::to_string),
    })
}

#[async_trait]
impl<S: DocumentStore> AuthProvider for LocalAuthProvider<S> {
    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderUser, AuthErrorCode> {
        if !is_valid_email(email) {
            return Err(AuthErrorCode::InvalidEmail);
        }
        let doc = self
            .account(email)
            .await?
            .ok_or(AuthErrorCode::UserNotFound)?;
        let hash = doc.get_str(PASSWORD_HASH).unwrap_or_default();
        if !verify_password(hash, password) {
            return Err(AuthErrorCode::WrongPassword);
        }
        let user = to_user(&doc)?;
        info!(uid = %user.uid, "signed in");
        Ok(user)
    }

    async fn register(&self, email: &str, password: &str) -> Result<ProviderUser, AuthErrorCode> {
        if !is_valid_email(email) {
            return Err(AuthErrorCode::InvalidEmail);
        }
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(AuthErrorCode::WeakPassword);
        }

        let _guard = self.register_lock.lock().await;
        if self.account(email).await?.is_some() {
            return Err(AuthErrorCode::EmailAlreadyInUse);
        }

        let uid = Uuid::new_v4().simple().to_string();
        let email = email.trim().to_string();
        let fields = Fields::from([
            (UID.to_string(), FieldValue::from(uid.as_str())),
            (EMAIL.to_string(), FieldValue::from(email.as_str())),
            (PASSWORD_HASH.to_string(), FieldValue::from(hash_password(password)?)),
            (DISPLAY_NAME.to_string(), FieldValue::Null),
            (CREATED_AT.to_string(), FieldValue::ServerTimestamp),
        ]);
        self.store
            .set(ACCOUNTS, &account_id(&email), fields)
            .await
            .map_err(store_failure)?;

        info!(%uid, "account registered");
        Ok(ProviderUser {
            uid,
            email: Some(email),
            display_name: None,
        })
    }

    async fn update_display_name(
        &self,
        user: &ProviderUser,
        display_name: &str,
    ) -> Result<ProviderUser, AuthErrorCode> {
        let email = user.email.as_deref().ok_or(AuthErrorCode::UserNotFound)?;
        let fields = Fields::from([(DISPLAY_NAME.to_string(), FieldValue::from(display_name))]);
        self.store
            .update(ACCOUNTS, &account_id(email), fields)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => AuthErrorCode::UserNotFound,
                other => store_failure(other),
            })?;
        Ok(ProviderUser {
            display_name: Some(display_name.to_string()),
            ..user.clone()
        })
    }

    /// Nothing is held provider-side; the session lives in the local cache.
    async fn sign_out(&self) -> Result<(), AuthErrorCode> {
        info!("signed out");
        Ok(())
    }
}
