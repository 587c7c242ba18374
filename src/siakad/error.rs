use crate::auth::AuthError;
use crate::validation::ValidationError;
use thiserror::Error;

/// Failure reported by a [`DocumentStore`](crate::store::DocumentStore).
///
/// A failed write never partially applies: single-document writes are
/// all-or-nothing in every store implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unreachable{}", detail(.message))]
    Transport { message: Option<String> },

    #[error("Permission denied{}", detail(.message))]
    Permission { message: Option<String> },

    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Corrupt data in {location}: {reason}")]
    Corrupt { location: String, reason: String },
}

fn detail(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {}", m),
        None => String::new(),
    }
}

impl StoreError {
    pub fn transport(message: impl Into<String>) -> Self {
        StoreError::Transport {
            message: Some(message.into()),
        }
    }

    pub fn permission(message: impl Into<String>) -> Self {
        StoreError::Permission {
            message: Some(message.into()),
        }
    }

    pub fn not_found(collection: &str, id: impl ToString) -> Self {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn corrupt(location: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Corrupt {
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => StoreError::permission(err.to_string()),
            _ => StoreError::transport(err.to_string()),
        }
    }
}

/// Failure reported by a [`KeyValueStore`](crate::kv::KeyValueStore) or while
/// decoding a cached value.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt value for key `{key}`: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Key-value store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum SiakadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Session cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, SiakadError>;
