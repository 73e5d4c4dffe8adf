//! Client application: RPC transport plus the encryption boundary.

pub mod boundary;

use std::time::Duration;

use tracing::info;

pub use boundary::{open_snapshot, seal_card, seal_login, PlainCard, PlainLogin, Vault};

use crate::config::ClientSettings;
use crate::crypto::{ItemCipher, VaultKey};
use crate::errors::{KeeperError, Result};
use crate::rpc::protocol::{BinaryItem, TextItem};
use crate::rpc::RpcClient;

/// A connected client holding the user's item key.
pub struct KeeperClient {
    rpc: RpcClient,
    cipher: ItemCipher,
}

impl KeeperClient {
    /// Connect using `settings`. Fails with `Config` when no key is set.
    pub async fn connect(settings: &ClientSettings) -> Result<Self> {
        let encoded = settings.key.as_deref().ok_or_else(|| {
            KeeperError::Config("no client key configured; run `vaultkeeper keygen`".into())
        })?;
        let key = VaultKey::from_base64(encoded)?;
        let addr = settings.server_addr().await?;
        let rpc = RpcClient::connect(addr, settings.request_timeout()).await?;
        Ok(Self::new(rpc, &key))
    }

    /// Connect to an explicit address with an explicit key.
    pub async fn connect_to(
        addr: std::net::SocketAddr,
        key: &VaultKey,
        timeout: Duration,
    ) -> Result<Self> {
        let rpc = RpcClient::connect(addr, timeout).await?;
        Ok(Self::new(rpc, key))
    }

    pub fn new(rpc: RpcClient, key: &VaultKey) -> Self {
        Self {
            rpc,
            cipher: ItemCipher::new(key),
        }
    }

    pub async fn sign_up(&mut self, login: &str, password: &str) -> Result<String> {
        let id = self.rpc.sign_up(login, password).await?;
        info!(user = %login, user_id = %id, "signed up");
        Ok(id)
    }

    pub async fn log_in(&mut self, login: &str, password: &str) -> Result<String> {
        let id = self.rpc.log_in(login, password).await?;
        info!(user = %login, user_id = %id, "logged in");
        Ok(id)
    }

    /// Fetch and decrypt the full item set.
    pub async fn refresh(&mut self, user_id: &str) -> Result<Vault> {
        let snapshot = self.rpc.update_items(user_id).await?;
        open_snapshot(&self.cipher, snapshot)
    }

    pub async fn add_login(&mut self, user_id: &str, item: &PlainLogin) -> Result<()> {
        let sealed = seal_login(&self.cipher, item)?;
        self.rpc.add_login_item(user_id, sealed).await
    }

    pub async fn add_card(&mut self, user_id: &str, item: &PlainCard) -> Result<()> {
        let sealed = seal_card(&self.cipher, item)?;
        self.rpc.add_bank_card_item(user_id, sealed).await
    }

    pub async fn add_text(&mut self, user_id: &str, item: TextItem) -> Result<()> {
        self.rpc.add_text_item(user_id, item).await
    }

    pub async fn add_binary(&mut self, user_id: &str, item: BinaryItem) -> Result<()> {
        self.rpc.add_binary_item(user_id, item).await
    }
}
