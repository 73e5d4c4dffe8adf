//! RPC layer: wire messages, framing, server gateway and client.

pub mod client;
pub mod codec;
pub mod gateway;
pub mod protocol;
pub mod server;

pub use client::RpcClient;
pub use gateway::{Gateway, Reply};
pub use server::Server;
