//! RPC gateway: request validation, wire/model translation and
//! error-to-response mapping.
//!
//! Every handler returns a `Reply`: the wire response (always populated,
//! with `code` and `error` set on failure) together with the typed error,
//! so in-process callers can branch on either.
//!
//! Handlers take a `CancellationToken`. Store calls are abandoned when it
//! fires, and the four snapshot transform tasks in `update_items` observe
//! the same token.

use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::protocol::{
    self, AddItemRequest, AuthResponse, Credentials, ErrorCode, Request, Response,
    StatusResponse, UpdateItemsRequest, UpdateItemsResponse, UserSnapshot,
};
use crate::errors::{KeeperError, Result};
use crate::models::{self, User, UserId, VaultItem};
use crate::service::CredentialService;

/// A wire response plus the error it reports, if any.
#[derive(Debug)]
pub struct Reply<R> {
    pub response: R,
    pub error: Option<KeeperError>,
}

impl<R> Reply<R> {
    /// The typed outcome, discarding the envelope on failure.
    pub fn into_result(self) -> Result<R> {
        match self.error {
            None => Ok(self.response),
            Some(e) => Err(e),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Exposes the credential service and the vault to RPC callers.
#[derive(Clone)]
pub struct Gateway {
    service: CredentialService,
}

impl Gateway {
    pub fn new(service: CredentialService) -> Self {
        info!("rpc gateway was successfully initialized");
        Self { service }
    }

    /// Register a new user.
    pub async fn sign_up(&self, cancel: &CancellationToken, req: Credentials) -> Reply<AuthResponse> {
        info!(user = %req.login, "received new user sign up request");
        let result = match validate_credentials(&req) {
            Ok(()) => cancellable(cancel, self.service.sign_up(&req.login, &req.password)).await,
            Err(e) => Err(e),
        };
        auth_reply(result)
    }

    /// Authenticate an existing user.
    pub async fn log_in(&self, cancel: &CancellationToken, req: Credentials) -> Reply<AuthResponse> {
        info!(user = %req.login, "received user login request");
        let result = match validate_credentials(&req) {
            Ok(()) => cancellable(cancel, self.service.log_in(&req.login, &req.password)).await,
            Err(e) => Err(e),
        };
        auth_reply(result)
    }

    /// Return the user's full item set.
    pub async fn update_items(
        &self,
        cancel: &CancellationToken,
        req: UpdateItemsRequest,
    ) -> Reply<UpdateItemsResponse> {
        info!(user_id = %req.user_id, "received update request");
        let result = cancellable(cancel, async {
            let id = parse_user_id(&req.user_id)?;
            let user = self.service.read_user(id).await?;
            assemble_snapshot(cancel, user).await
        })
        .await;

        match result {
            Ok(user) => {
                info!(user_id = %req.user_id, "user info was updated");
                Reply {
                    response: UpdateItemsResponse {
                        user,
                        code: ErrorCode::Ok,
                        error: String::new(),
                    },
                    error: None,
                }
            }
            Err(e) => {
                debug!(user_id = %req.user_id, error = %e, "update request failed");
                Reply {
                    response: UpdateItemsResponse {
                        user: UserSnapshot::default(),
                        code: e.code(),
                        error: e.to_string(),
                    },
                    error: Some(e),
                }
            }
        }
    }

    pub async fn add_login_item(
        &self,
        cancel: &CancellationToken,
        req: AddItemRequest<protocol::LoginItem>,
    ) -> Reply<StatusResponse> {
        self.add_item(cancel, &req.user_id, models::LoginItem::from(req.item))
            .await
    }

    pub async fn add_bank_card_item(
        &self,
        cancel: &CancellationToken,
        req: AddItemRequest<protocol::BankCardItem>,
    ) -> Reply<StatusResponse> {
        self.add_item(cancel, &req.user_id, models::BankCardItem::from(req.item))
            .await
    }

    pub async fn add_text_item(
        &self,
        cancel: &CancellationToken,
        req: AddItemRequest<protocol::TextItem>,
    ) -> Reply<StatusResponse> {
        self.add_item(cancel, &req.user_id, models::TextItem::from(req.item))
            .await
    }

    pub async fn add_binary_item(
        &self,
        cancel: &CancellationToken,
        req: AddItemRequest<protocol::BinaryItem>,
    ) -> Reply<StatusResponse> {
        self.add_item(cancel, &req.user_id, models::BinaryItem::from(req.item))
            .await
    }

    async fn add_item(
        &self,
        cancel: &CancellationToken,
        user_id: &str,
        item: impl Into<VaultItem>,
    ) -> Reply<StatusResponse> {
        let item = item.into();
        let category = item.category();
        info!(user_id = %user_id, %category, "received new item");

        let result = cancellable(cancel, async {
            let id = parse_user_id(user_id)?;
            self.service.add_item(id, item).await
        })
        .await;

        if result.is_ok() {
            info!(user_id = %user_id, %category, "item was successfully added");
        }
        status_reply(result)
    }

    /// Route a decoded request to its handler.
    pub async fn dispatch(&self, cancel: &CancellationToken, req: Request) -> Response {
        match req {
            Request::SignUp(r) => Response::SignUp(self.sign_up(cancel, r).await.response),
            Request::LogIn(r) => Response::LogIn(self.log_in(cancel, r).await.response),
            Request::UpdateItems(r) => {
                Response::UpdateItems(self.update_items(cancel, r).await.response)
            }
            Request::AddLoginItem(r) => {
                Response::AddItem(self.add_login_item(cancel, r).await.response)
            }
            Request::AddBankCardItem(r) => {
                Response::AddItem(self.add_bank_card_item(cancel, r).await.response)
            }
            Request::AddTextItem(r) => {
                Response::AddItem(self.add_text_item(cancel, r).await.response)
            }
            Request::AddBinaryItem(r) => {
                Response::AddItem(self.add_binary_item(cancel, r).await.response)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Validation and response mapping
// ---------------------------------------------------------------------------

fn validate_credentials(req: &Credentials) -> Result<()> {
    if req.login.is_empty() {
        warn!("sign in request without login");
        return Err(KeeperError::InvalidArgument("login".into()));
    }
    if req.password.is_empty() {
        warn!(user = %req.login, "sign in request without password");
        return Err(KeeperError::InvalidArgument("password".into()));
    }
    Ok(())
}

fn parse_user_id(raw: &str) -> Result<UserId> {
    raw.parse::<UserId>().inspect_err(|e| {
        warn!(user_id = %raw, error = %e, "unable to parse user id");
    })
}

/// Run `fut` unless `cancel` fires first; the future is dropped on cancel.
async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("request was cancelled");
            Err(KeeperError::Cancelled)
        }
        result = fut => result,
    }
}

fn auth_reply(result: Result<UserId>) -> Reply<AuthResponse> {
    match result {
        Ok(id) => Reply {
            response: AuthResponse {
                user_id: id.to_string(),
                code: ErrorCode::Ok,
                error: String::new(),
            },
            error: None,
        },
        Err(e) => Reply {
            response: AuthResponse {
                user_id: String::new(),
                code: e.code(),
                error: e.to_string(),
            },
            error: Some(e),
        },
    }
}

fn status_reply(result: Result<()>) -> Reply<StatusResponse> {
    match result {
        Ok(()) => Reply {
            response: StatusResponse::default(),
            error: None,
        },
        Err(e) => Reply {
            response: StatusResponse {
                code: e.code(),
                error: e.to_string(),
            },
            error: Some(e),
        },
    }
}

// ---------------------------------------------------------------------------
// Snapshot assembly
// ---------------------------------------------------------------------------

/// Convert the four stored sequences into wire form on four tasks and
/// join them into one snapshot.
async fn assemble_snapshot(cancel: &CancellationToken, user: User) -> Result<UserSnapshot> {
    let User {
        login,
        logins,
        cards,
        texts,
        binaries,
        ..
    } = user;

    let logins = spawn_transform(cancel, logins, protocol::LoginItem::from);
    let cards = spawn_transform(cancel, cards, protocol::BankCardItem::from);
    let texts = spawn_transform(cancel, texts, protocol::TextItem::from);
    let binaries = spawn_transform(cancel, binaries, protocol::BinaryItem::from);

    let (logins, cards, texts, binaries) =
        tokio::try_join!(joined(logins), joined(cards), joined(texts), joined(binaries))?;

    Ok(UserSnapshot {
        login,
        logins,
        cards,
        texts,
        binaries,
    })
}

fn spawn_transform<A, B>(
    cancel: &CancellationToken,
    items: Vec<A>,
    convert: fn(A) -> B,
) -> JoinHandle<Result<Vec<B>>>
where
    A: Send + 'static,
    B: Send + 'static,
{
    let cancel = cancel.clone();
    tokio::spawn(async move { transform(&cancel, items, convert) })
}

/// Map every item, stopping early once `cancel` fires.
fn transform<A, B>(cancel: &CancellationToken, items: Vec<A>, convert: fn(A) -> B) -> Result<Vec<B>> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if cancel.is_cancelled() {
            return Err(KeeperError::Cancelled);
        }
        out.push(convert(item));
    }
    Ok(out)
}

async fn joined<T>(handle: JoinHandle<Result<T>>) -> Result<T> {
    handle
        .await
        .map_err(|e| KeeperError::Internal(format!("snapshot task failed: {e}")))?
}

// ---------------------------------------------------------------------------
// Wire <-> model conversions
// ---------------------------------------------------------------------------

impl From<protocol::LoginItem> for models::LoginItem {
    fn from(item: protocol::LoginItem) -> Self {
        Self {
            login: item.login,
            password: item.password,
            meta: item.meta,
        }
    }
}

impl From<models::LoginItem> for protocol::LoginItem {
    fn from(item: models::LoginItem) -> Self {
        Self {
            login: item.login,
            password: item.password,
            meta: item.meta,
        }
    }
}

impl From<protocol::BankCardItem> for models::BankCardItem {
    fn from(item: protocol::BankCardItem) -> Self {
        Self {
            number: item.number,
            holder: item.holder,
            expires: item.expires,
            security_code: item.security_code,
            meta: item.meta,
        }
    }
}

impl From<models::BankCardItem> for protocol::BankCardItem {
    fn from(item: models::BankCardItem) -> Self {
        Self {
            number: item.number,
            holder: item.holder,
            expires: item.expires,
            security_code: item.security_code,
            meta: item.meta,
        }
    }
}

impl From<protocol::TextItem> for models::TextItem {
    fn from(item: protocol::TextItem) -> Self {
        Self {
            value: item.value,
            meta: item.meta,
        }
    }
}

impl From<models::TextItem> for protocol::TextItem {
    fn from(item: models::TextItem) -> Self {
        Self {
            value: item.value,
            meta: item.meta,
        }
    }
}

impl From<protocol::BinaryItem> for models::BinaryItem {
    fn from(item: protocol::BinaryItem) -> Self {
        Self {
            value: item.value,
            meta: item.meta,
        }
    }
}

impl From<models::BinaryItem> for protocol::BinaryItem {
    fn from(item: models::BinaryItem) -> Self {
        Self {
            value: item.value,
            meta: item.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_stops_when_cancelled() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = transform(&cancel, vec![1, 2, 3], |x: i32| x * 2);
        assert!(matches!(result, Err(KeeperError::Cancelled)));
    }

    #[test]
    fn transform_keeps_order() {
        let cancel = CancellationToken::new();
        let result = transform(&cancel, vec![1, 2, 3], |x: i32| x * 2).unwrap();
        assert_eq!(result, vec![2, 4, 6]);
    }

    #[tokio::test]
    async fn cancellable_prefers_cancellation() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = cancellable(&cancel, async { Ok::<_, KeeperError>(1) }).await;
        assert!(matches!(result, Err(KeeperError::Cancelled)));
    }

    #[test]
    fn failed_reply_populates_both_signals() {
        let reply = auth_reply(Err(KeeperError::InvalidCredentials));
        assert_eq!(reply.response.code, ErrorCode::InvalidCredentials);
        assert_eq!(reply.response.error, "login and/or password incorrect");
        assert!(reply.response.user_id.is_empty());
        assert!(matches!(reply.error, Some(KeeperError::InvalidCredentials)));
    }
}
