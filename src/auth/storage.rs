//! User credential storage with file and in-memory backends

use async_trait::async_trait;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;
use tracing::debug;

use super::types::User;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User already exists: {0}")]
    Duplicate(String),
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage format error: {0}")]
    Format(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Internal(String),
}

/// Credential store contract: look up by normalized email, insert, list
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Fails with [`StoreError::Duplicate`] when the email is taken
    async fn insert(&self, user: User) -> Result<(), StoreError>;
    async fn list(&self) -> Result<Vec<User>, StoreError>;
}

/// Process-local store, lost on restart
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<BTreeMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Internal("user store lock poisoned".to_string())
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.get(email).cloned())
    }

    async fn insert(&self, user: User) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(poisoned)?;
        if users.contains_key(&user.email) {
            return Err(StoreError::Duplicate(user.email));
        }
        users.insert(user.email.clone(), user);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.values().cloned().collect())
    }
}

/// On-disk file format
#[derive(Debug, Default, Serialize, Deserialize)]
struct FileStorage {
    users: BTreeMap<String, User>,
}

/// JSON file store; a sibling `.lock` file serializes access across processes
pub struct FileUserStore {
    path: PathBuf,
}

impl FileUserStore {
    /// Use `path`, creating its parent directory if needed
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    /// Default location: `<data dir>/propsearch/users.json`
    pub fn default_path() -> Result<PathBuf, StoreError> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| StoreError::Internal("Could not find data directory".to_string()))?;
        Ok(data_dir.join("propsearch").join("users.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    /// Run `f` on the file contents while holding the exclusive lock
    async fn with_storage<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Path, &mut FileStorage) -> Result<T, StoreError> + Send + 'static,
    {
        let path = self.path.clone();
        let lock_path = self.lock_path();
        tokio::task::spawn_blocking(move || {
            let lock_file = fs::OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&lock_path)?;
            lock_file.lock_exclusive()?;
            let result = read_storage(&path).and_then(|mut storage| f(&path, &mut storage));
            lock_file.unlock()?;
            result
        })
        .await
        .map_err(|e| StoreError::Internal(format!("Storage task failed: {}", e)))?
    }
}

fn read_storage(path: &Path) -> Result<FileStorage, StoreError> {
    if !path.exists() {
        return Ok(FileStorage::default());
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(FileStorage::default());
    }
    Ok(serde_json::from_str(&contents)?)
}

fn write_storage(path: &Path, storage: &FileStorage) -> Result<(), StoreError> {
    let contents = serde_json::to_string_pretty(storage)?;
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, contents)?;

    // Set file permissions to user-only (Unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&tmp_path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&tmp_path, perms)?;
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[async_trait]
impl UserStore for FileUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = email.to_string();
        self.with_storage(move |_, storage| Ok(storage.users.get(&email).cloned()))
            .await
    }

    async fn insert(&self, user: User) -> Result<(), StoreError> {
        self.with_storage(move |path, storage| {
            if storage.users.contains_key(&user.email) {
                return Err(StoreError::Duplicate(user.email));
            }
            debug!(email = %user.email, "Storing new user");
            storage.users.insert(user.email.clone(), user);
            write_storage(path, storage)
        })
        .await
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        self.with_storage(|_, storage| Ok(storage.users.values().cloned().collect()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn exercise(store: &dyn UserStore) {
        assert!(store.find_by_email("alice@example.com").await.unwrap().is_none());

        store
            .insert(User::new("Alice", "alice@example.com", "hash-a"))
            .await
            .unwrap();
        store
            .insert(User::new("Bob", "bob@example.com", "hash-b"))
            .await
            .unwrap();

        let alice = store.find_by_email("alice@example.com").await.unwrap().unwrap();
        assert_eq!(alice.name, "Alice");
        assert_eq!(alice.password_hash, "hash-a");

        let dup = store
            .insert(User::new("Other", "alice@example.com", "hash-c"))
            .await
            .unwrap_err();
        assert!(matches!(dup, StoreError::Duplicate(_)));

        let emails: Vec<String> = store.list().await.unwrap().into_iter().map(|u| u.email).collect();
        assert_eq!(emails, vec!["alice@example.com", "bob@example.com"]);
    }

    #[tokio::test]
    async fn test_memory_store() {
        exercise(&MemoryUserStore::new()).await;
    }

    #[tokio::test]
    async fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileUserStore::new(dir.path().join("nested").join("users.json")).unwrap();
        exercise(&store).await;
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");

        FileUserStore::new(&path)
            .unwrap()
            .insert(User::new("Carol", "carol@example.com", "hash"))
            .await
            .unwrap();

        let reopened = FileUserStore::new(&path).unwrap();
        let carol = reopened.find_by_email("carol@example.com").await.unwrap();
        assert_eq!(carol.map(|u| u.name), Some("Carol".to_string()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_store_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileUserStore::new(dir.path().join("users.json")).unwrap();
        store
            .insert(User::new("Dave", "dave@example.com", "hash"))
            .await
            .unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        fs::write(&path, "{ not json").unwrap();

        let store = FileUserStore::new(&path).unwrap();
        assert!(matches!(store.list().await, Err(StoreError::Format(_))));
    }
}
