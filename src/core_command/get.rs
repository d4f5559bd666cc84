use crate::core_command::utils::validate_filename;
use crate::core_error::ShareError;
use crate::core_network::SharedChannel;
use crate::server::ServerContext;
use crate::session::Session;
use log::{error, info};
use std::sync::Arc;
use tokio::fs::{self, File};
use tokio::sync::Mutex;

/// Handles the GET (download) command.
///
/// Answers `OK <size>` followed by exactly `size` raw bytes of the file. Only
/// regular files directly inside the share directory are served; symlinks and
/// directories read as missing. The connection loop has already checked that
/// the session is authenticated.
///
/// # Arguments
///
/// * `writer` - The shared line channel of the connection.
/// * `context` - Server context holding the share directory.
/// * `session` - The session requesting the file, used for logging.
/// * `arg` - The name of the file to send.
///
/// # Returns
///
/// `Ok(())` once the payload is sent. Validation and lookup failures are
/// returned as non-fatal errors the caller reports as `ERR ...`; a failure
/// after `OK <size>` went out is a fatal connection error.
pub async fn handle_get_command(
    writer: SharedChannel,
    context: Arc<ServerContext>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), ShareError> {
    let filename = validate_filename(&arg)?;
    let path = context.share_dir.join(filename);

    match fs::symlink_metadata(&path).await {
        Ok(metadata) if metadata.is_file() => {}
        _ => return Err(ShareError::FileNotFound(filename.to_string())),
    }

    let mut file = File::open(&path).await.map_err(|e| {
        error!("File could not be opened: {:?}, error: {}", path, e);
        ShareError::FileNotFound(filename.to_string())
    })?;
    let size = file
        .metadata()
        .await
        .map_err(|_| ShareError::FileNotFound(filename.to_string()))?
        .len();

    let username = session.lock().await.username.clone().unwrap_or_default();
    let mut writer = writer.lock().await;
    writer.send_line(&format!("OK {}", size)).await?;
    info!("Sending file: {:?} ({} bytes) to {}", path, size, username);
    writer.send_bytes(&mut file, size).await?;
    info!("File transfer completed successfully: {:?}", path);

    Ok(())
}
