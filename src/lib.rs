pub mod config;
pub mod constants;
pub mod core_auth;
pub mod core_cli;
pub mod core_client;
pub mod core_command;
pub mod core_error;
pub mod core_log;
pub mod core_network;
pub mod helpers;
pub mod server;
pub mod session;

pub use config::Config;
pub use core_error::ShareError;
