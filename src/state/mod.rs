pub mod config;
pub mod credentials;
pub mod history;
pub mod manifest;
mod vault;

pub use config::{Config, CredentialSource};
