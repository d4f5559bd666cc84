use crate::core_command::utils::validate_filename;
use crate::core_error::ShareError;
use crate::core_network::SharedChannel;
use crate::server::ServerContext;
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Parses `<filename> <size>`; the size must be a positive integer.
pub fn parse_put_args(arg: &str) -> Result<(&str, u64), ShareError> {
    let invalid = || ShareError::InvalidArgs(arg.to_string());
    let mut parts = arg.split_whitespace();
    let filename = parts.next().ok_or_else(invalid)?;
    let size: i64 = parts
        .next()
        .and_then(|size| size.parse().ok())
        .ok_or_else(invalid)?;
    if size <= 0 {
        return Err(invalid());
    }
    Ok((filename, size as u64))
}

/// Handles the PUT (upload) command in two phases.
///
/// `OK` tells the client to start sending; after exactly `size` bytes a second
/// `OK` (or `ERR write failed`) reports the outcome. The upload lands in a
/// part file of its own and only replaces the destination once complete.
///
/// # Arguments
///
/// * `writer` - The shared line channel of the connection.
/// * `context` - Server context holding the share directory.
/// * `session` - The session uploading the file, used for logging.
/// * `arg` - `<filename> <size>`.
///
/// # Returns
///
/// `Ok(())` once the file is committed and acknowledged. `InvalidArgs`,
/// `InvalidFilename` and `WriteFailed` are non-fatal; the stream closing
/// mid-payload is fatal.
pub async fn handle_put_command(
    writer: SharedChannel,
    context: Arc<ServerContext>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<(), ShareError> {
    let (filename, size) = parse_put_args(&arg)?;
    let filename = validate_filename(filename)?;
    let destination = context.share_dir.join(filename);

    let username = session.lock().await.username.clone().unwrap_or_default();
    let mut writer = writer.lock().await;
    writer.send_line("OK").await?;
    info!("Receiving file: {:?} ({} bytes) from {}", destination, size, username);

    writer.receive_to_file_atomic(&destination, size).await?;
    writer.send_line("OK").await?;
    info!("File stored successfully: {:?}", destination);

    Ok(())
}
