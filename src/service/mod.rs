//! Service layer: signup and login business logic.
//!
//! Every call is independent given (login, password); no session state is
//! kept between calls. Item operations are pass-through to the repository.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::ServerSettings;
use crate::crypto::{digests_match, generate_salt, hash_password};
use crate::errors::{KeeperError, Result};
use crate::models::{User, UserId, VaultItem};
use crate::repository::VaultRepository;

/// Credential checks on top of a `VaultRepository`.
#[derive(Clone)]
pub struct CredentialService {
    repo: Arc<dyn VaultRepository>,
    /// Server-wide salt for legacy records without a per-user salt.
    legacy_salt: String,
}

impl CredentialService {
    pub fn new(settings: &ServerSettings, repo: Arc<dyn VaultRepository>) -> Self {
        info!("service layer was successfully initialized");
        Self {
            repo,
            legacy_salt: settings.salt.clone(),
        }
    }

    pub fn repository(&self) -> &Arc<dyn VaultRepository> {
        &self.repo
    }

    /// Register a new user and return the assigned identifier.
    ///
    /// Fails with `AlreadyExists` when the login is taken. The existence
    /// check and the insert are separate store calls; a concurrent signup
    /// that slips between them is rejected by the store's own uniqueness
    /// check and surfaces as `AlreadyExists` too.
    pub async fn sign_up(&self, login: &str, password: &str) -> Result<UserId> {
        debug!(user = %login, "checking if such user exists");
        match self.repo.read_user_by_login(login).await {
            Ok(_) => {
                info!(user = %login, "user with provided login already exists");
                return Err(KeeperError::AlreadyExists(login.to_string()));
            }
            Err(KeeperError::NotFound) => {}
            Err(e) => {
                error!(user = %login, error = %e, "unable to check if user exists");
                return Err(e);
            }
        }

        let id = UserId::new();
        let salt = generate_salt();
        let user = User::new(id, login, hash_password(password, &salt), salt);

        debug!(user = %login, user_id = %id, "passing user's info to data layer");
        if let Err(e) = self.repo.create_user(&user).await {
            error!(user = %login, error = %e, "unable to create user entry");
            return Err(e);
        }

        info!(user = %login, user_id = %id, "new user was signed up");
        Ok(id)
    }

    /// Check credentials and return the stored identifier.
    ///
    /// An unknown login fails with `UserNotExists`; a known login with a
    /// wrong password fails with `InvalidCredentials`.
    pub async fn log_in(&self, login: &str, password: &str) -> Result<UserId> {
        let stored = match self.repo.read_user_by_login(login).await {
            Ok(user) => user,
            Err(KeeperError::NotFound) => {
                info!(user = %login, "user with provided login doesn't exist");
                return Err(KeeperError::UserNotExists(login.to_string()));
            }
            Err(e) => {
                error!(user = %login, error = %e, "unable to check if user exists");
                return Err(e);
            }
        };

        let salt = stored
            .salt
            .as_deref()
            .unwrap_or(self.legacy_salt.as_bytes());
        let digest = hash_password(password, salt);

        // Non-short-circuiting: both checks always run.
        let login_ok = stored.login == login;
        let password_ok = digests_match(&digest, &stored.password);
        if login_ok & password_ok {
            debug!(user = %login, "provided credentials are correct");
            return Ok(stored.id);
        }

        info!(user = %login, "provided credentials aren't correct");
        Err(KeeperError::InvalidCredentials)
    }

    /// Full user record, items included.
    pub async fn read_user(&self, id: UserId) -> Result<User> {
        self.repo.read_user_by_id(id).await.inspect_err(|e| {
            error!(user_id = %id, error = %e, "unable to read user");
        })
    }

    /// Append an item to the user's vault.
    pub async fn add_item(&self, id: UserId, item: VaultItem) -> Result<()> {
        let category = item.category();
        self.repo.append_item(id, item).await.inspect_err(|e| {
            error!(user_id = %id, %category, error = %e, "unable to append item");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::DocumentRepository;

    fn service() -> CredentialService {
        CredentialService::new(
            &ServerSettings::default(),
            Arc::new(DocumentRepository::in_memory()),
        )
    }

    #[tokio::test]
    async fn stored_password_is_salted_digest() {
        let svc = service();
        let id = svc.sign_up("alice", "pw1").await.unwrap();

        let stored = svc.read_user(id).await.unwrap();
        assert_ne!(stored.password, "pw1");
        let salt = stored.salt.as_deref().unwrap();
        assert_eq!(stored.password, hash_password("pw1", salt));
    }

    #[tokio::test]
    async fn same_password_gets_different_digests() {
        let svc = service();
        let a = svc.sign_up("a", "same").await.unwrap();
        let b = svc.sign_up("b", "same").await.unwrap();

        let a = svc.read_user(a).await.unwrap();
        let b = svc.read_user(b).await.unwrap();
        assert_ne!(a.password, b.password);
    }

    #[tokio::test]
    async fn legacy_record_verifies_with_server_salt() {
        let repo = Arc::new(DocumentRepository::in_memory());
        let settings = ServerSettings {
            salt: "server-salt".into(),
            ..ServerSettings::default()
        };
        let mut legacy = User::new(
            UserId::new(),
            "old",
            hash_password("pw", b"server-salt"),
            Vec::new(),
        );
        legacy.salt = None;
        repo.create_user(&legacy).await.unwrap();

        let svc = CredentialService::new(&settings, repo);
        assert_eq!(svc.log_in("old", "pw").await.unwrap(), legacy.id);
        assert!(matches!(
            svc.log_in("old", "nope").await,
            Err(KeeperError::InvalidCredentials)
        ));
    }
}
