//! `vaultkeeper add`: prompt for an item, encrypt its secret fields and
//! submit it.

use std::path::Path;

use crate::cli::commands::authenticated_client;
use crate::cli::{output, prompt_field, prompt_meta, prompt_secret, AddAction, Cli};
use crate::client::{PlainCard, PlainLogin};
use crate::errors::Result;
use crate::rpc::protocol::{BinaryItem, TextItem};

/// Execute the `add` command.
pub async fn execute(cli: &Cli, action: &AddAction) -> Result<()> {
    let (mut client, user_id) = authenticated_client(cli).await?;

    match action {
        AddAction::Login => {
            let item = PlainLogin {
                login: prompt_field("Login")?,
                password: prompt_secret("Password")?,
                meta: prompt_meta()?,
            };
            client.add_login(&user_id, &item).await?;
            output::success(&format!("Login '{}' added", item.login));
        }
        AddAction::Card => {
            let item = PlainCard {
                number: prompt_field("Card number")?,
                holder: prompt_field("Card holder")?,
                expires: prompt_field("Expires (MM/YY)")?,
                security_code: prompt_secret("Security code")?,
                meta: prompt_meta()?,
            };
            client.add_card(&user_id, &item).await?;
            output::success("Bank card added");
        }
        AddAction::Text => {
            let item = TextItem {
                value: prompt_field("Text")?,
                meta: prompt_meta()?,
            };
            client.add_text(&user_id, item).await?;
            output::success("Text added");
        }
        AddAction::Binary { file } => {
            let value = match file {
                Some(path) => read_blob(path)?,
                None => prompt_field("Data")?.into_bytes(),
            };
            let size = value.len();
            let item = BinaryItem {
                value,
                meta: prompt_meta()?,
            };
            client.add_binary(&user_id, item).await?;
            output::success(&format!("Binary item of {size} bytes added"));
        }
    }
    Ok(())
}

fn read_blob(path: &Path) -> Result<Vec<u8>> {
    Ok(std::fs::read(path)?)
}
