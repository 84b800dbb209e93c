pub mod auth;
pub mod backup;
pub mod build;
pub mod export;
pub mod history;
mod utils;
