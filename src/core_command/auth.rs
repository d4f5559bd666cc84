use crate::core_error::ShareError;
use crate::core_network::SharedChannel;
use crate::helpers::send_response;
use crate::server::ServerContext;
use crate::session::Session;
use log::warn;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the AUTH command: `AUTH <user> <pass>`.
///
/// Allowed in any state. A failed attempt leaves the session as it was, so an
/// already authenticated session stays authenticated.
///
/// # Arguments
///
/// * `writer` - The shared line channel of the connection.
/// * `context` - Server context holding the credential table.
/// * `session` - The session to authenticate.
/// * `arg` - `<user> <pass>`.
///
/// # Returns
///
/// `Ok(())` after `OK` is sent, or `AuthFailed` when the user is unknown,
/// the password does not match or either field is missing.
pub async fn handle_auth_command(
    writer: SharedChannel,
    context: Arc<ServerContext>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), ShareError> {
    let mut parts = arg.split_whitespace();
    let (username, password) = match (parts.next(), parts.next()) {
        (Some(username), Some(password)) => (username, password),
        (username, _) => {
            warn!("AUTH command received without username and password");
            return Err(ShareError::AuthFailed(username.unwrap_or_default().to_string()));
        }
    };

    if !context.credentials.verify(username, password) {
        warn!(
            "Authentication failed for user {} from {}",
            username,
            session.lock().await.peer_label()
        );
        return Err(ShareError::AuthFailed(username.to_string()));
    }

    session.lock().await.authenticate(username);
    send_response(&writer, "OK").await
}
