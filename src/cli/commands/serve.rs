//! `vaultkeeper serve`: run the vault server until Ctrl-C.

use std::sync::Arc;

use crate::cli::{output, server_settings, Cli};
use crate::errors::Result;
use crate::repository::{DocumentRepository, VaultRepository};
use crate::rpc::{Gateway, Server};
use crate::service::CredentialService;

/// Execute the `serve` command.
pub async fn execute(cli: &Cli) -> Result<()> {
    let settings = server_settings(cli)?;

    let repo: Arc<dyn VaultRepository> = match &settings.store_path {
        Some(path) => {
            let repo = DocumentRepository::open(path).await?;
            output::info(&format!(
                "Loaded {} user(s) from {}",
                repo.user_count().await,
                path.display()
            ));
            Arc::new(repo)
        }
        None => {
            output::warning("No store_path configured; data is kept in memory only.");
            Arc::new(DocumentRepository::in_memory())
        }
    };

    let service = CredentialService::new(&settings, repo);
    let server = Server::bind(&settings, Gateway::new(service)).await?;

    output::success(&format!("Listening on {}", server.local_addr()?));
    output::tip("Press Ctrl+C to shut down.");

    server.serve_until_ctrl_c().await
}
