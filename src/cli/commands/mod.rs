pub mod add;
pub mod completions;
pub mod keygen;
pub mod list;
pub mod login;
pub mod serve;
pub mod signup;

use crate::cli::{client_settings, prompt_login, prompt_password, Cli};
use crate::client::KeeperClient;
use crate::errors::Result;

/// Connect with the client settings and log in; returns the client and
/// the account id.
pub(crate) async fn authenticated_client(cli: &Cli) -> Result<(KeeperClient, String)> {
    let settings = client_settings(cli)?;
    let login = prompt_login(cli)?;
    let password = prompt_password()?;

    let mut client = KeeperClient::connect(&settings).await?;
    let user_id = client.log_in(&login, &password).await?;
    Ok((client, user_id))
}
