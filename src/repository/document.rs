//! Document store for user records.
//!
//! Documents live in memory behind a `tokio::sync::RwLock`, indexed by id
//! with a secondary login index. When opened with a path, the whole store
//! is written back to a JSON file after every successful write:
//!
//! ```text
//! { "version": 1, "users": [ { "id": ..., "login": ..., "logins": [...], ... } ] }
//! ```
//!
//! Writes go to a temp file in the same directory and are renamed over
//! the target, so readers never see a half-written file. A write whose
//! persistence fails is rolled back in memory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error};

use super::VaultRepository;
use crate::errors::{KeeperError, Result};
use crate::models::{User, UserId, VaultItem};

/// Current store file format version.
const STORE_VERSION: u8 = 1;

#[derive(Default)]
struct Documents {
    users: HashMap<UserId, User>,
    /// login -> id. Enforces login uniqueness.
    logins: HashMap<String, UserId>,
}

impl Documents {
    fn from_users(users: Vec<User>) -> Result<Self> {
        let mut docs = Self::default();
        for user in users {
            if docs.logins.insert(user.login.clone(), user.id).is_some() {
                return Err(KeeperError::Storage(format!(
                    "store file holds duplicate login '{}'",
                    user.login
                )));
            }
            docs.users.insert(user.id, user);
        }
        Ok(docs)
    }
}

#[derive(Serialize, Deserialize)]
struct StoreFile {
    version: u8,
    users: Vec<User>,
}

/// In-memory document store with optional JSON file persistence.
pub struct DocumentRepository {
    docs: RwLock<Documents>,
    path: Option<PathBuf>,
}

impl DocumentRepository {
    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            docs: RwLock::new(Documents::default()),
            path: None,
        }
    }

    /// Open a store persisted at `path`.
    ///
    /// A missing file yields an empty store; the file is created on the
    /// first write.
    pub async fn open(path: &Path) -> Result<Self> {
        let docs = match tokio::fs::read(path).await {
            Ok(bytes) => {
                let file: StoreFile = serde_json::from_slice(&bytes).map_err(|e| {
                    KeeperError::Storage(format!("cannot parse {}: {e}", path.display()))
                })?;
                if file.version != STORE_VERSION {
                    return Err(KeeperError::Storage(format!(
                        "unsupported store version {}, expected {STORE_VERSION}",
                        file.version
                    )));
                }
                Documents::from_users(file.users)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Documents::default(),
            Err(e) => {
                return Err(KeeperError::Storage(format!(
                    "cannot read {}: {e}",
                    path.display()
                )))
            }
        };

        debug!(
            path = %path.display(),
            users = docs.users.len(),
            "document store opened"
        );

        Ok(Self {
            docs: RwLock::new(docs),
            path: Some(path.to_path_buf()),
        })
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of stored user documents.
    pub async fn user_count(&self) -> usize {
        self.docs.read().await.users.len()
    }

    /// Write every document to the backing file, if there is one.
    ///
    /// Called with the write lock held so file writes are serialized in
    /// the same order as the in-memory updates.
    async fn persist(&self, docs: &Documents) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut users: Vec<&User> = docs.users.values().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        #[derive(Serialize)]
        struct StoreFileRef<'a> {
            version: u8,
            users: Vec<&'a User>,
        }

        let bytes = serde_json::to_vec_pretty(&StoreFileRef {
            version: STORE_VERSION,
            users,
        })
        .map_err(|e| KeeperError::Storage(format!("cannot serialize store: {e}")))?;

        let parent = path.parent().unwrap_or(Path::new("."));
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                KeeperError::Storage(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        let tmp_path = parent.join(format!(
            ".{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));

        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| KeeperError::Storage(format!("cannot write {}: {e}", tmp_path.display())))?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|e| KeeperError::Storage(format!("cannot replace {}: {e}", path.display())))?;

        Ok(())
    }
}

#[async_trait]
impl VaultRepository for DocumentRepository {
    async fn create_user(&self, user: &User) -> Result<()> {
        let mut docs = self.docs.write().await;

        if docs.logins.contains_key(&user.login) {
            debug!(user = %user.login, "login is already taken");
            return Err(KeeperError::AlreadyExists(user.login.clone()));
        }
        if docs.users.contains_key(&user.id) {
            error!(user = %user.login, user_id = %user.id, "identifier collision on insert");
            return Err(KeeperError::Storage(format!(
                "a document with id {} already exists",
                user.id
            )));
        }

        docs.logins.insert(user.login.clone(), user.id);
        docs.users.insert(user.id, user.clone());

        if let Err(e) = self.persist(&docs).await {
            error!(user = %user.login, error = %e, "unable to persist new user");
            docs.logins.remove(&user.login);
            docs.users.remove(&user.id);
            return Err(e);
        }

        debug!(user = %user.login, user_id = %user.id, "new user was inserted");
        Ok(())
    }

    async fn read_user_by_login(&self, login: &str) -> Result<User> {
        let docs = self.docs.read().await;
        let user = docs
            .logins
            .get(login)
            .and_then(|id| docs.users.get(id))
            .cloned();

        match user {
            Some(user) => Ok(user),
            None => {
                debug!(user = %login, "no such user in the store");
                Err(KeeperError::NotFound)
            }
        }
    }

    async fn read_user_by_id(&self, id: UserId) -> Result<User> {
        let docs = self.docs.read().await;
        match docs.users.get(&id) {
            Some(user) => Ok(user.clone()),
            None => {
                debug!(user_id = %id, "no such user in the store");
                Err(KeeperError::NotFound)
            }
        }
    }

    async fn append_item(&self, user_id: UserId, item: VaultItem) -> Result<()> {
        let mut docs = self.docs.write().await;
        let category = item.category();

        let Some(current) = docs.users.get(&user_id) else {
            debug!(user_id = %user_id, "no such user in the store");
            return Err(KeeperError::NotFound);
        };
        let mut updated = current.clone();
        updated.push_item(item);
        let previous = docs.users.insert(user_id, updated);

        if let Err(e) = self.persist(&docs).await {
            error!(user_id = %user_id, %category, error = %e, "unable to persist appended item");
            if let Some(previous) = previous {
                docs.users.insert(user_id, previous);
            }
            return Err(e);
        }

        debug!(user_id = %user_id, %category, "item was appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Meta, TextItem};
    use tempfile::TempDir;

    fn user(login: &str) -> User {
        User::new(UserId::new(), login, "digest".into(), vec![1; 16])
    }

    fn text(value: &str) -> VaultItem {
        VaultItem::Text(TextItem {
            value: value.into(),
            meta: Meta::new(),
        })
    }

    #[tokio::test]
    async fn create_then_read_by_login_and_id() {
        let repo = DocumentRepository::in_memory();
        let alice = user("alice");
        repo.create_user(&alice).await.unwrap();

        assert_eq!(repo.read_user_by_login("alice").await.unwrap(), alice);
        assert_eq!(repo.read_user_by_id(alice.id).await.unwrap(), alice);
    }

    #[tokio::test]
    async fn lookup_is_case_sensitive() {
        let repo = DocumentRepository::in_memory();
        repo.create_user(&user("alice")).await.unwrap();

        assert!(matches!(
            repo.read_user_by_login("Alice").await,
            Err(KeeperError::NotFound)
        ));
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let repo = DocumentRepository::in_memory();
        assert!(matches!(
            repo.read_user_by_id(UserId::new()).await,
            Err(KeeperError::NotFound)
        ));
        assert!(matches!(
            repo.append_item(UserId::new(), text("x")).await,
            Err(KeeperError::NotFound)
        ));
    }

    #[tokio::test]
    async fn duplicate_login_is_rejected_by_the_store() {
        let repo = DocumentRepository::in_memory();
        repo.create_user(&user("alice")).await.unwrap();

        let err = repo.create_user(&user("alice")).await.unwrap_err();
        assert!(matches!(err, KeeperError::AlreadyExists(ref l) if l == "alice"));
        assert_eq!(repo.user_count().await, 1);
    }

    #[tokio::test]
    async fn append_preserves_order() {
        let repo = DocumentRepository::in_memory();
        let alice = user("alice");
        repo.create_user(&alice).await.unwrap();

        repo.append_item(alice.id, text("first")).await.unwrap();
        repo.append_item(alice.id, text("second")).await.unwrap();

        let stored = repo.read_user_by_id(alice.id).await.unwrap();
        let values: Vec<&str> = stored.texts.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, ["first", "second"]);
    }

    #[tokio::test]
    async fn persisted_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");

        let alice = user("alice");
        {
            let repo = DocumentRepository::open(&path).await.unwrap();
            repo.create_user(&alice).await.unwrap();
            repo.append_item(alice.id, text("kept")).await.unwrap();
        }

        let reopened = DocumentRepository::open(&path).await.unwrap();
        let stored = reopened.read_user_by_login("alice").await.unwrap();
        assert_eq!(stored.id, alice.id);
        assert_eq!(stored.texts.len(), 1);
        assert_eq!(stored.texts[0].value, "kept");
    }

    #[tokio::test]
    async fn failed_persist_rolls_back_in_memory() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("store");
        let repo = DocumentRepository::open(&sub.join("users.json"))
            .await
            .unwrap();

        let alice = user("alice");
        repo.create_user(&alice).await.unwrap();

        // Replace the store directory with a plain file so every later
        // write fails to persist.
        std::fs::remove_dir_all(&sub).unwrap();
        std::fs::write(&sub, b"blocker").unwrap();

        let err = repo.create_user(&user("bob")).await.unwrap_err();
        assert!(matches!(err, KeeperError::Storage(_)));
        assert_eq!(repo.user_count().await, 1);
        assert!(matches!(
            repo.read_user_by_login("bob").await,
            Err(KeeperError::NotFound)
        ));

        let err = repo.append_item(alice.id, text("lost")).await.unwrap_err();
        assert!(matches!(err, KeeperError::Storage(_)));
        let stored = repo.read_user_by_id(alice.id).await.unwrap();
        assert!(stored.texts.is_empty());
    }

    #[tokio::test]
    async fn open_missing_file_gives_empty_store() {
        let dir = TempDir::new().unwrap();
        let repo = DocumentRepository::open(&dir.path().join("nope.json"))
            .await
            .unwrap();
        assert_eq!(repo.user_count().await, 0);
    }

    #[tokio::test]
    async fn open_rejects_unknown_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, r#"{"version":9,"users":[]}"#).unwrap();

        assert!(matches!(
            DocumentRepository::open(&path).await,
            Err(KeeperError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn open_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            DocumentRepository::open(&path).await,
            Err(KeeperError::Storage(_))
        ));
    }
}
