//! Data layer: user documents in a document-oriented store.
//!
//! `VaultRepository` is the capability set the service layer depends on;
//! `DocumentRepository` is the store shipped with the server.

pub mod document;

pub use document::DocumentRepository;

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::{User, UserId, VaultItem};

/// Storage operations on user documents.
///
/// Lookups fail with `KeeperError::NotFound` when no document matches,
/// and with `KeeperError::Storage` for any other fault. Nothing is
/// retried here.
#[async_trait]
pub trait VaultRepository: Send + Sync {
    /// Insert a new user document.
    ///
    /// Fails with `KeeperError::AlreadyExists` if another document already
    /// holds the same login.
    async fn create_user(&self, user: &User) -> Result<()>;

    /// Exact, case-sensitive lookup by login.
    async fn read_user_by_login(&self, login: &str) -> Result<User>;

    /// Lookup by identifier.
    async fn read_user_by_id(&self, id: UserId) -> Result<User>;

    /// Append one item to the sequence matching its kind.
    async fn append_item(&self, user_id: UserId, item: VaultItem) -> Result<()>;
}
