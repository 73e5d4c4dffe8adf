//! `vaultkeeper login`: check credentials and print the account id.

use crate::cli::commands::authenticated_client;
use crate::cli::{output, Cli};
use crate::errors::Result;

/// Execute the `login` command.
pub async fn execute(cli: &Cli) -> Result<()> {
    let (_client, user_id) = authenticated_client(cli).await?;
    output::success("Credentials accepted");
    println!("{user_id}");
    Ok(())
}
