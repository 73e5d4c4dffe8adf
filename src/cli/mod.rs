//! CLI module: Clap argument parser, prompts, output helpers, and command
//! implementations.

pub mod commands;
pub mod output;

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;
use zeroize::Zeroizing;

use crate::config::{ClientSettings, ServerSettings};
use crate::errors::{KeeperError, Result};

/// Env var consulted before prompting for the account password.
pub const PASSWORD_ENV: &str = "VAULTKEEPER_PASSWORD";

/// VaultKeeper CLI: client and server for an encrypted personal vault.
#[derive(Parser)]
#[command(
    name = "vaultkeeper",
    about = "Encrypted personal vault for logins, cards, notes and files",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: vaultkeeper.toml, or vaultkeeper-server.toml for `serve`)
    #[arg(short, long, env = "VAULTKEEPER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Account login (prompted when omitted)
    #[arg(short, long, global = true)]
    pub login: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the vault server
    Serve,

    /// Register a new account
    Signup,

    /// Check credentials and print the account id
    Login,

    /// Fetch, decrypt and display the vault (all categories by default)
    List {
        #[arg(long)]
        logins: bool,
        #[arg(long)]
        cards: bool,
        #[arg(long)]
        texts: bool,
        #[arg(long)]
        binaries: bool,
    },

    /// Add an item to the vault
    Add {
        #[command(subcommand)]
        action: AddAction,
    },

    /// Generate a new client encryption key
    Keygen,

    /// Generate shell completion scripts
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Item kinds accepted by `add`.
#[derive(clap::Subcommand)]
pub enum AddAction {
    /// A login/password pair
    Login,
    /// A bank card
    Card,
    /// A text note
    Text,
    /// Binary data
    Binary {
        /// Read the data from this file instead of prompting
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load server settings from `--config` or the default file.
pub fn server_settings(cli: &Cli) -> Result<ServerSettings> {
    let path = config_path(cli, ServerSettings::FILE_NAME)?;
    ServerSettings::load(&path)
}

/// Load client settings from `--config` or the default file.
pub fn client_settings(cli: &Cli) -> Result<ClientSettings> {
    let path = config_path(cli, ClientSettings::FILE_NAME)?;
    ClientSettings::load(&path)
}

fn config_path(cli: &Cli, default_name: &str) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => Ok(std::env::current_dir()?.join(default_name)),
    }
}

/// Log filter for the selected command when `RUST_LOG` is unset.
///
/// Settings that fail to load fall back to the defaults here; the command
/// itself reports the error.
pub fn default_log_level(cli: &Cli) -> String {
    match cli.command {
        Commands::Serve => server_settings(cli)
            .map(|s| s.log_level)
            .unwrap_or_else(|_| ServerSettings::default().log_level),
        _ => client_settings(cli)
            .map(|s| s.log_level().to_string())
            .unwrap_or_else(|_| ClientSettings::default().log_level().to_string()),
    }
}

/// The account login from `--login`, or an interactive prompt.
pub fn prompt_login(cli: &Cli) -> Result<String> {
    if let Some(login) = &cli.login {
        return Ok(login.clone());
    }
    dialoguer::Input::<String>::new()
        .with_prompt("Login")
        .interact_text()
        .map_err(|e| KeeperError::CommandFailed(format!("login prompt: {e}")))
}

/// Get the account password, trying in order:
/// 1. `VAULTKEEPER_PASSWORD` env var
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(|e| KeeperError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new account password with confirmation (used by `signup`).
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Choose password")
        .with_confirmation("Confirm password", "Passwords do not match, try again")
        .interact()
        .map_err(|e| KeeperError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

fn password_from_env() -> Option<Zeroizing<String>> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

/// Prompt for a single required field.
pub fn prompt_field(label: &str) -> Result<String> {
    dialoguer::Input::<String>::new()
        .with_prompt(label)
        .interact_text()
        .map_err(|e| KeeperError::CommandFailed(format!("{label} prompt: {e}")))
}

/// Prompt for a secret field without echo.
pub fn prompt_secret(label: &str) -> Result<Zeroizing<String>> {
    dialoguer::Password::new()
        .with_prompt(label)
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| KeeperError::CommandFailed(format!("{label} prompt: {e}")))
}

/// Read key/value metadata pairs until an empty key is entered.
pub fn prompt_meta() -> Result<HashMap<String, String>> {
    let mut meta = HashMap::new();
    loop {
        let key: String = dialoguer::Input::new()
            .with_prompt("Meta key (empty to finish)")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| KeeperError::CommandFailed(format!("meta prompt: {e}")))?;
        if key.is_empty() {
            return Ok(meta);
        }
        let value: String = dialoguer::Input::new()
            .with_prompt(format!("Value for '{key}'"))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| KeeperError::CommandFailed(format!("meta prompt: {e}")))?;
        meta.insert(key, value);
    }
}
