//! `vaultkeeper list`: fetch, decrypt and display the vault.

use crate::cli::commands::authenticated_client;
use crate::cli::{output, Cli};
use crate::errors::Result;

/// Which categories to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub logins: bool,
    pub cards: bool,
    pub texts: bool,
    pub binaries: bool,
}

impl Selection {
    /// No flag at all means every category.
    pub fn from_flags(logins: bool, cards: bool, texts: bool, binaries: bool) -> Self {
        if !(logins || cards || texts || binaries) {
            return Self {
                logins: true,
                cards: true,
                texts: true,
                binaries: true,
            };
        }
        Self {
            logins,
            cards,
            texts,
            binaries,
        }
    }
}

/// Execute the `list` command.
pub async fn execute(cli: &Cli, selection: Selection) -> Result<()> {
    let (mut client, user_id) = authenticated_client(cli).await?;
    let vault = client.refresh(&user_id).await?;

    output::info(&format!(
        "Vault of '{}': {} item(s)",
        vault.login,
        vault.item_count()
    ));

    if selection.logins {
        println!("Logins");
        output::print_logins_table(&vault.logins);
    }
    if selection.cards {
        println!("Bank cards");
        output::print_cards_table(&vault.cards);
    }
    if selection.texts {
        println!("Texts");
        output::print_texts_table(&vault.texts);
    }
    if selection.binaries {
        println!("Binaries");
        output::print_binaries_table(&vault.binaries);
    }
    Ok(())
}
