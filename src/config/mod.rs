//! Process configuration for the server and the client.

pub mod settings;

pub use settings::{ClientSettings, ServerSettings};
