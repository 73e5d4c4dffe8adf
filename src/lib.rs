pub mod cli;
pub mod client;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod models;
pub mod repository;
pub mod rpc;
pub mod service;
