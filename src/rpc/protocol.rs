//! Wire messages exchanged between client and server.
//!
//! Payloads are encoded with `postcard` and framed by `rpc::codec`.
//! Postcard is not self-describing, so these types avoid
//! `skip_serializing_if` and other attributes that change the field set.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Machine-readable outcome carried by every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorCode {
    #[default]
    Ok,
    InvalidArgument,
    InvalidIdentifier,
    AlreadyExists,
    UserNotExists,
    InvalidCredentials,
    NotFound,
    Storage,
    Cancelled,
    Internal,
}

/// A login/password entry as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoginItem {
    pub login: String,
    /// Ciphertext produced by the client.
    pub password: Vec<u8>,
    pub meta: HashMap<String, String>,
}

/// A bank card as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BankCardItem {
    pub number: String,
    pub holder: String,
    pub expires: String,
    /// Ciphertext produced by the client.
    pub security_code: Vec<u8>,
    pub meta: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextItem {
    pub value: String,
    pub meta: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BinaryItem {
    pub value: Vec<u8>,
    pub meta: HashMap<String, String>,
}

/// Full item set of one user, returned by `UpdateItems`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub login: String,
    pub logins: Vec<LoginItem>,
    pub cards: Vec<BankCardItem>,
    pub texts: Vec<TextItem>,
    pub binaries: Vec<BinaryItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateItemsRequest {
    pub user_id: String,
}

/// Append request for one item of kind `T`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddItemRequest<T> {
    pub user_id: String,
    pub item: T,
}

/// Response to `SignUp` and `LogIn`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user_id: String,
    pub code: ErrorCode,
    /// Human-readable error, empty on success.
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateItemsResponse {
    pub user: UserSnapshot,
    pub code: ErrorCode,
    pub error: String,
}

/// Bare outcome: response to every `Add*Item` call and to undecodable frames.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    pub code: ErrorCode,
    pub error: String,
}

/// A request frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    SignUp(Credentials),
    LogIn(Credentials),
    UpdateItems(UpdateItemsRequest),
    AddLoginItem(AddItemRequest<LoginItem>),
    AddBankCardItem(AddItemRequest<BankCardItem>),
    AddTextItem(AddItemRequest<TextItem>),
    AddBinaryItem(AddItemRequest<BinaryItem>),
}

impl Request {
    /// Method name, for logs.
    pub fn method(&self) -> &'static str {
        match self {
            Self::SignUp(_) => "SignUp",
            Self::LogIn(_) => "LogIn",
            Self::UpdateItems(_) => "UpdateItems",
            Self::AddLoginItem(_) => "AddLoginItem",
            Self::AddBankCardItem(_) => "AddBankCardItem",
            Self::AddTextItem(_) => "AddTextItem",
            Self::AddBinaryItem(_) => "AddBinaryItem",
        }
    }
}

/// A response frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    SignUp(AuthResponse),
    LogIn(AuthResponse),
    UpdateItems(UpdateItemsResponse),
    AddItem(StatusResponse),
    /// The request frame could not be decoded.
    Malformed(StatusResponse),
}

impl Response {
    /// Outcome code of whichever response this is.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::SignUp(r) | Self::LogIn(r) => r.code,
            Self::UpdateItems(r) => r.code,
            Self::AddItem(r) | Self::Malformed(r) => r.code,
        }
    }
}
