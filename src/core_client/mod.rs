pub mod client;
pub mod shell;

pub use client::ShareClient;
