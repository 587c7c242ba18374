//! Profile documents in the `users` collection, keyed by auth uid.

use crate::error::StoreError;
use crate::model::UserProfile;
use crate::store::{DocumentId, DocumentStore, FieldValue, Fields};
use tracing::info;

pub const USERS: &str = "users";

pub async fn save_profile<S: DocumentStore>(
    store: &S,
    uid: &str,
    profile: &UserProfile,
) -> Result<(), StoreError> {
    let fields = Fields::from([
        ("nama".to_string(), FieldValue::from(profile.nama.as_str())),
        ("email".to_string(), FieldValue::from(profile.email.as_str())),
        ("role".to_string(), FieldValue::from(profile.role.as_str())),
        ("createdAt".to_string(), FieldValue::ServerTimestamp),
        ("updatedAt".to_string(), FieldValue::ServerTimestamp),
    ]);
    store.set(USERS, &DocumentId::new(uid), fields).await?;
    info!(uid, "user profile saved");
    Ok(())
}

pub async fn load_profile<S: DocumentStore>(
    store: &S,
    uid: &str,
) -> Result<Option<UserProfile>, StoreError> {
    let Some(doc) = store.get(USERS, &DocumentId::new(uid)).await? else {
        return Ok(None);
    };
    let field = |name: &str| {
        doc.get_str(name)
            .map(str::to_string)
            .ok_or_else(|| StoreError::corrupt(format!("{}/{}", USERS, uid), format!("missing field `{}`", name)))
    };
    Ok(Some(UserProfile {
        nama: field("nama")?,
        email: field("email")?,
        role: field("role")?,
    }))
}
