use crate::core_error::ShareError;
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the QUIT command. Nothing is sent back; the connection loop closes
/// the stream once this returns.
pub async fn handle_quit_command(session: Arc<Mutex<Session>>) -> Result<(), ShareError> {
    let session = session.lock().await;
    info!(
        "Received QUIT from {} ({}). Closing connection.",
        session.peer_label(),
        session.username.as_deref().unwrap_or("anonymous")
    );
    Ok(())
}
