mod file;
mod memory;

pub use self::file::FileKeyValueStore;
pub use self::memory::MemoryKeyValueStore;

use std::error::Error;
use std::sync::{ Arc, Mutex };

use log::{ info, warn };
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::cli::Args;
use crate::models::user::UserInfo;

/// Key holding the full profile record.
pub const PROFILE_KEY: &str = "copiloto_academico_user";
/// Key holding the generated identifier used before a profile exists.
pub const FALLBACK_ID_KEY: &str = "copiloto_userId";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Flat string key/value persistence, the local-storage capability.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

pub trait IdentityProvider: Send + Sync {
    /// The saved profile, if a complete one exists.
    fn user_info(&self) -> Option<UserInfo>;

    /// Stable identifier, generated on first use. Never empty.
    fn user_id(&self) -> String;

    fn set_user_info(&self, name: &str, age: u32) -> Result<UserInfo, StorageError>;

    fn clear(&self) -> Result<(), StorageError>;

    fn has_user_info(&self) -> bool {
        self.user_info().is_some()
    }

    /// Profile to send to the backend; anonymous when none is saved.
    fn current(&self) -> UserInfo {
        self.user_info().unwrap_or_else(|| UserInfo::anonymous(self.user_id()))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredProfile {
    user_id: Option<String>,
    name: Option<String>,
    age: Option<u32>,
}

impl StoredProfile {
    fn into_complete(self) -> Option<UserInfo> {
        let user_id = self.user_id.filter(|id| !id.trim().is_empty())?;
        let name = self.name.filter(|n| !n.trim().is_empty())?;
        let age = self.age.filter(|a| *a > 0)?;
        Some(UserInfo { user_id, name, age })
    }
}

pub struct IdentityStore {
    store: Arc<dyn KeyValueStore>,
    /// Last fallback id handed out; used when the store cannot provide one.
    generated_id: Mutex<Option<String>>,
}

impl IdentityStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            generated_id: Mutex::new(None),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKeyValueStore::default()))
    }

    fn fallback_id(&self) -> String {
        let mut generated = self.generated_id.lock().unwrap_or_else(|p| p.into_inner());
        match self.store.get(FALLBACK_ID_KEY) {
            Ok(Some(id)) if !id.trim().is_empty() => {
                *generated = Some(id.clone());
                return id;
            }
            Ok(_) => {}
            Err(e) => warn!("Could not read stored user id: {}", e),
        }
        let id = match generated.as_ref() {
            Some(id) => id.clone(),
            None => Uuid::new_v4().to_string(),
        };
        if let Err(e) = self.store.set(FALLBACK_ID_KEY, &id) {
            warn!("Could not persist user id, keeping it for this session only: {}", e);
        }
        *generated = Some(id.clone());
        id
    }
}

impl IdentityProvider for IdentityStore {
    fn user_info(&self) -> Option<UserInfo> {
        let raw = match self.store.get(PROFILE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                return None;
            }
            Err(e) => {
                warn!("Could not read stored profile: {}", e);
                return None;
            }
        };
        match serde_json::from_str::<StoredProfile>(&raw) {
            Ok(stored) => stored.into_complete(),
            Err(e) => {
                warn!("Ignoring malformed stored profile: {}", e);
                None
            }
        }
    }

    fn user_id(&self) -> String {
        match self.user_info() {
            Some(info) => info.user_id,
            None => self.fallback_id(),
        }
    }

    fn set_user_info(&self, name: &str, age: u32) -> Result<UserInfo, StorageError> {
        let info = UserInfo {
            user_id: self.user_id(),
            name: name.trim().to_string(),
            age,
        };
        self.store.set(PROFILE_KEY, &serde_json::to_string(&info)?)?;
        info!("Saved profile for user {}", info.user_id);
        Ok(info)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(PROFILE_KEY)
    }
}

pub fn create_identity_store(
    args: &Args
) -> Result<Arc<dyn IdentityProvider>, Box<dyn Error + Send + Sync>> {
    let store: Arc<dyn KeyValueStore> = match args.identity_type.to_lowercase().as_str() {
        "file" => Arc::new(FileKeyValueStore::new(&args.identity_path)),
        "memory" => Arc::new(MemoryKeyValueStore::default()),
        other => {
            return Err(format!("Unsupported identity store type: {}", other).into());
        }
    };
    info!("Identity will be stored in: {}", args.identity_type);
    Ok(Arc::new(IdentityStore::new(store)))
}
