use thiserror::Error;

use crate::rpc::protocol::ErrorCode;

/// All errors that can occur in VaultKeeper.
#[derive(Debug, Error)]
pub enum KeeperError {
    // --- Request validation ---
    #[error("argument can't be empty: {0}")]
    InvalidArgument(String),

    #[error("invalid user identifier '{value}': {reason}")]
    InvalidIdentifier { value: String, reason: String },

    // --- Credential errors ---
    #[error("user '{0}' already exists")]
    AlreadyExists(String),

    #[error("user '{0}' doesn't exist")]
    UserNotExists(String),

    #[error("login and/or password incorrect")]
    InvalidCredentials,

    // --- Storage errors ---
    #[error("there is no such user in the store")]
    NotFound,

    #[error("storage error: {0}")]
    Storage(String),

    // --- Crypto errors ---
    #[error("crypto error: {0}")]
    Crypto(String),

    // --- Transport errors ---
    #[error("operation was cancelled")]
    Cancelled,

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),

    /// An error reported by the server in a response envelope.
    #[error("{message}")]
    Remote { code: ErrorCode, message: String },

    // --- Config errors ---
    #[error("config file error: {0}")]
    Config(String),

    // --- CLI errors ---
    #[error("command failed: {0}")]
    CommandFailed(String),
}

impl KeeperError {
    /// Machine-readable code sent alongside the error string in responses.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::InvalidIdentifier { .. } => ErrorCode::InvalidIdentifier,
            Self::AlreadyExists(_) => ErrorCode::AlreadyExists,
            Self::UserNotExists(_) => ErrorCode::UserNotExists,
            Self::InvalidCredentials => ErrorCode::InvalidCredentials,
            Self::NotFound => ErrorCode::NotFound,
            Self::Storage(_) => ErrorCode::Storage,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::Remote { code, .. } => *code,
            Self::Crypto(_)
            | Self::Protocol(_)
            | Self::Io(_)
            | Self::Internal(_)
            | Self::Config(_)
            | Self::CommandFailed(_) => ErrorCode::Internal,
        }
    }

    /// Rebuild an error from a response envelope. Returns `None` for `Ok`.
    pub fn from_response(code: ErrorCode, message: &str) -> Option<Self> {
        if code == ErrorCode::Ok {
            return None;
        }
        Some(Self::Remote {
            code,
            message: message.to_string(),
        })
    }
}

/// Convenience type alias for VaultKeeper results.
pub type Result<T> = std::result::Result<T, KeeperError>;
