//! `vaultkeeper keygen`: print a fresh client encryption key.

use crate::cli::output;
use crate::crypto::VaultKey;
use crate::errors::Result;

/// Execute the `keygen` command.
pub fn execute() -> Result<()> {
    let key = VaultKey::generate();
    println!("{}", key.to_base64().as_str());
    output::tip("Store it as `key = \"...\"` in vaultkeeper.toml. Items cannot be read without it.");
    Ok(())
}
