//! `vaultkeeper signup`: register a new account.

use crate::cli::{client_settings, output, prompt_login, prompt_new_password, Cli};
use crate::client::KeeperClient;
use crate::errors::Result;

/// Execute the `signup` command.
pub async fn execute(cli: &Cli) -> Result<()> {
    let settings = client_settings(cli)?;
    let login = prompt_login(cli)?;
    let password = prompt_new_password()?;

    let mut client = KeeperClient::connect(&settings).await?;
    let user_id = client.sign_up(&login, &password).await?;

    output::success(&format!("Account '{login}' created"));
    println!("{user_id}");
    output::tip("Run `vaultkeeper add login` to store your first item.");
    Ok(())
}
