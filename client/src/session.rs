//! Bearer-token session mirrored to a small key-value store.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::utils::write_atomic;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const EMAIL_KEY: &str = "email";
const STORAGE_FILE: &str = "storage.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// String-keyed persistent storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Keeps every key in one pretty-printed JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}
impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STORAGE_FILE))
    }
    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&data)?)
    }
    fn write_all(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(map)?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }
}
impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.read_all()?;
        map.insert(key.to_string(), value.to_string());
        self.write_all(&map)
    }
    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut map = self.read_all()?;
        if map.remove(key).is_some() {
            self.write_all(&map)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    map: BTreeMap<String, String>,
}
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.map.get(key).cloned())
    }
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.map.insert(key.to_string(), value.to_string());
        Ok(())
    }
    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.map.remove(key);
        Ok(())
    }
}

pub struct Session {
    store: Box<dyn KeyValueStore + Send>,
    token: Option<String>,
    user: Option<String>,
    email: Option<String>,
}

impl Session {
    /// Restores a previous sign-in; a token without its user is ignored.
    pub fn load(store: Box<dyn KeyValueStore + Send>) -> Self {
        let mut session = Self {
            store,
            token: None,
            user: None,
            email: None,
        };
        let read = |s: &Self, key: &str| match s.store.get(key) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(key, error = %e, "failed to read session storage");
                None
            }
        };
        let token = read(&session, TOKEN_KEY);
        let user = read(&session, USER_KEY);
        let email = read(&session, EMAIL_KEY);
        if let (Some(token), Some(user)) = (token, user) {
            tracing::info!(user = %user, "session restored");
            session.token = Some(token);
            session.email = email.or_else(|| Some(user.clone()));
            session.user = Some(user);
        }
        session
    }

    pub fn sign_in(&mut self, token: &str, email: &str) -> Result<(), StorageError> {
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(USER_KEY, email)?;
        self.store.set(EMAIL_KEY, email)?;
        self.token = Some(token.to_string());
        self.user = Some(email.to_string());
        self.email = Some(email.to_string());
        Ok(())
    }

    pub fn sign_out(&mut self) -> Result<(), StorageError> {
        self.token = None;
        self.user = None;
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        tracing::info!("signed out");
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::load(Box::new(FileStore::in_dir(dir.path())));
        assert!(!session.is_signed_in());

        session.sign_in("abc.def", "me@example.com").unwrap();
        let reloaded = Session::load(Box::new(FileStore::in_dir(dir.path())));
        assert!(reloaded.is_signed_in());
        assert_eq!(reloaded.token(), Some("abc.def"));
        assert_eq!(reloaded.email(), Some("me@example.com"));
    }

    #[test]
    fn sign_out_clears_token_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::load(Box::new(FileStore::in_dir(dir.path())));
        session.sign_in("abc.def", "me@example.com").unwrap();
        session.sign_out().unwrap();
        assert!(!session.is_signed_in());
        assert_eq!(session.token(), None);

        let store = FileStore::in_dir(dir.path());
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert!(!Session::load(Box::new(store)).is_signed_in());
    }

    #[test]
    fn token_without_user_is_not_restored() {
        let mut store = MemoryStore::default();
        store.set(TOKEN_KEY, "orphan").unwrap();
        let session = Session::load(Box::new(store));
        assert!(!session.is_signed_in());
        assert_eq!(session.token(), None);
    }
}
