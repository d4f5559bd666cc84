pub mod channel;
pub mod network;
pub mod transfer;

use std::sync::Arc;
use tokio::sync::Mutex;

pub use channel::{LineChannel, ShareStream};
pub use transfer::TransferProgress;

/// Connection handle shared between the session loop and command handlers.
pub type SharedChannel = Arc<Mutex<LineChannel>>;
