//! # Session Cache
//!
//! Keeps the signed-in identity and the optional "remember me" pair on the
//! device, so both survive a restart.
//!
//! ## Keys
//!
//! ```text
//! user_data          JSON SessionIdentity {uid, email, displayName}
//! remember_email     plaintext
//! remember_password  plaintext
//! ```
//!
//! No other component touches these keys.
//!
//! The two remember-me keys are separate writes. An interrupted
//! [`SessionCache::set_remembered_credential`] can leave only the email
//! behind, and reads return whatever half is there.
//!
//! [`SessionCache::clear_all`] removes all three keys in one operation, so a
//! sign-out also forgets the remembered pair.

use crate::error::CacheError;
use crate::kv::KeyValueStore;
use crate::model::{RememberedCredential, SessionIdentity};
use tracing::{debug, info};

pub const USER_DATA_KEY: &str = "user_data";
pub const REMEMBER_EMAIL_KEY: &str = "remember_email";
pub const REMEMBER_PASSWORD_KEY: &str = "remember_password";

const OWNED_KEYS: [&str; 3] = [USER_DATA_KEY, REMEMBER_EMAIL_KEY, REMEMBER_PASSWORD_KEY];

pub struct SessionCache<K: KeyValueStore> {
    kv: K,
}

impl<K: KeyValueStore> SessionCache<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// The underlying key-value store.
    pub fn store(&self) -> &K {
        &self.kv
    }

    pub async fn set_identity(&self, identity: &SessionIdentity) -> Result<(), CacheError> {
        let json = serde_json::to_string(identity)?;
        self.kv.set_item(USER_DATA_KEY, &json).await?;
        info!(uid = %identity.uid, "session identity stored");
        Ok(())
    }

    pub async fn get_identity(&self) -> Result<Option<SessionIdentity>, CacheError> {
        let Some(json) = self.kv.get_item(USER_DATA_KEY).await? else {
            return Ok(None);
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| CacheError::Corrupt {
                key: USER_DATA_KEY.to_string(),
                reason: e.to_string(),
            })
    }

    pub async fn set_remembered_credential(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(), CacheError> {
        self.kv.set_item(REMEMBER_EMAIL_KEY, email).await?;
        self.kv.set_item(REMEMBER_PASSWORD_KEY, password).await?;
        debug!("remembered credential stored");
        Ok(())
    }

    pub async fn get_remembered_credential(&self) -> Result<RememberedCredential, CacheError> {
        Ok(RememberedCredential {
            email: self.kv.get_item(REMEMBER_EMAIL_KEY).await?,
            password: self.kv.get_item(REMEMBER_PASSWORD_KEY).await?,
        })
    }

    /// Erases every key this cache owns, the remembered pair included.
    pub async fn clear_all(&self) -> Result<(), CacheError> {
        self.kv.remove_items(&OWNED_KEYS).await?;
        info!("session cache cleared");
        Ok(())
    }
}
