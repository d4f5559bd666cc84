// Here's the list of the share commands implemented
pub mod auth;
pub mod get;
pub mod list;
pub mod put;
pub mod quit;

pub mod command;
pub mod handlers;

// The utils and common functions are here
pub mod utils;
