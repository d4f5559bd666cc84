use crate::config::Config;
use crate::core_error::ShareError;
use crate::core_network::SharedChannel;
use log::info;

/// Sends a response line to the client.
pub async fn send_response(writer: &SharedChannel, message: &str) -> Result<(), ShareError> {
    let mut writer = writer.lock().await;
    writer.send_line(message).await
}

// Helper function to log configuration options
pub fn log_config(config: &Config) {
    info!("  Listen Address: {}", config.server.listen_address);
    info!("  Users File: {}", config.server.users_file);
    info!(
        "  Transfer Buffer Size: {} bytes",
        config.server.transfer_buffer_size()
    );
    info!(
        "  Max Line Length: {} bytes",
        config.server.max_line_length()
    );
    info!(
        "  Shutdown Grace Period: {}s",
        config.server.shutdown_grace_secs()
    );
}
