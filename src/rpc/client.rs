//! Typed RPC client over a single TCP connection.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;
use tracing::{debug, warn};

use super::codec;
use super::protocol::{
    AddItemRequest, BankCardItem, BinaryItem, Credentials, LoginItem, Request, Response,
    StatusResponse, TextItem, UpdateItemsRequest, UserSnapshot,
};
use crate::errors::{KeeperError, Result};

/// Any transport failure or timeout drops the connection, so a late reply
/// to an abandoned request can never be read as the answer to the next one.
/// The following call dials the server again.
pub struct RpcClient {
    addr: SocketAddr,
    stream: Option<TcpStream>,
    timeout: Duration,
}

impl RpcClient {
    /// Open a connection; `timeout` bounds the connect and every later call.
    pub async fn connect(addr: SocketAddr, timeout: Duration) -> Result<Self> {
        let stream = dial(addr, timeout).await?;
        Ok(Self {
            addr,
            stream: Some(stream),
            timeout,
        })
    }

    /// One request/response round trip.
    pub async fn call(&mut self, request: Request) -> Result<Response> {
        let method = request.method();
        let mut stream = match self.stream.take() {
            Some(stream) => stream,
            None => dial(self.addr, self.timeout).await?,
        };
        let round_trip = async {
            codec::send(&mut stream, &request).await?;
            codec::recv::<_, Response>(&mut stream)
                .await?
                .ok_or_else(|| KeeperError::Protocol("server closed the connection".into()))
        };
        let response = match tokio::time::timeout(self.timeout, round_trip).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(method, error = %e, "call failed; dropping connection");
                return Err(e);
            }
            Err(_) => {
                warn!(method, "call timed out; dropping connection");
                return Err(KeeperError::Cancelled);
            }
        };
        self.stream = Some(stream);
        debug!(method, code = ?response.code(), "received response");
        Ok(response)
    }

    pub async fn sign_up(&mut self, login: &str, password: &str) -> Result<String> {
        match self.call(Request::SignUp(credentials(login, password))).await? {
            Response::SignUp(r) => check(r.code, &r.error).map(|()| r.user_id),
            other => Err(unexpected(other)),
        }
    }

    pub async fn log_in(&mut self, login: &str, password: &str) -> Result<String> {
        match self.call(Request::LogIn(credentials(login, password))).await? {
            Response::LogIn(r) => check(r.code, &r.error).map(|()| r.user_id),
            other => Err(unexpected(other)),
        }
    }

    pub async fn update_items(&mut self, user_id: &str) -> Result<UserSnapshot> {
        let request = Request::UpdateItems(UpdateItemsRequest {
            user_id: user_id.to_string(),
        });
        match self.call(request).await? {
            Response::UpdateItems(r) => check(r.code, &r.error).map(|()| r.user),
            other => Err(unexpected(other)),
        }
    }

    pub async fn add_login_item(&mut self, user_id: &str, item: LoginItem) -> Result<()> {
        let request = Request::AddLoginItem(add_request(user_id, item));
        self.add(request).await
    }

    pub async fn add_bank_card_item(&mut self, user_id: &str, item: BankCardItem) -> Result<()> {
        let request = Request::AddBankCardItem(add_request(user_id, item));
        self.add(request).await
    }

    pub async fn add_text_item(&mut self, user_id: &str, item: TextItem) -> Result<()> {
        let request = Request::AddTextItem(add_request(user_id, item));
        self.add(request).await
    }

    pub async fn add_binary_item(&mut self, user_id: &str, item: BinaryItem) -> Result<()> {
        let request = Request::AddBinaryItem(add_request(user_id, item));
        self.add(request).await
    }

    async fn add(&mut self, request: Request) -> Result<()> {
        match self.call(request).await? {
            Response::AddItem(StatusResponse { code, error }) => check(code, &error),
            other => Err(unexpected(other)),
        }
    }
}

async fn dial(addr: SocketAddr, timeout: Duration) -> Result<TcpStream> {
    let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| KeeperError::Cancelled)??;
    stream.set_nodelay(true)?;
    debug!(%addr, "connected to server");
    Ok(stream)
}

fn credentials(login: &str, password: &str) -> Credentials {
    Credentials {
        login: login.to_string(),
        password: password.to_string(),
    }
}

fn add_request<T>(user_id: &str, item: T) -> AddItemRequest<T> {
    AddItemRequest {
        user_id: user_id.to_string(),
        item,
    }
}

fn check(code: super::protocol::ErrorCode, message: &str) -> Result<()> {
    match KeeperError::from_response(code, message) {
        None => Ok(()),
        Some(e) => Err(e),
    }
}

fn unexpected(response: Response) -> KeeperError {
    match response {
        Response::Malformed(r) => KeeperError::from_response(r.code, &r.error)
            .unwrap_or_else(|| KeeperError::Protocol("server rejected the request".into())),
        other => KeeperError::Protocol(format!("unexpected response: {other:?}")),
    }
}
