use crate::core_command::list::FileEntry;
use crate::core_error::ShareError;
use crate::core_network::channel::{LineChannel, ShareStream};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::Path;
use tokio::fs::File;
use tokio::net::TcpStream;

/// Client side of the share protocol.
pub struct ShareClient {
    channel: LineChannel,
}

impl ShareClient {
    pub async fn connect(server: &str, port: u16) -> Result<Self> {
        let stream = TcpStream::connect((server, port))
            .await
            .with_context(|| format!("Failed to connect to {}:{}", server, port))?;
        info!("Connected to {}:{}", server, port);
        Ok(Self::from_stream(stream))
    }

    pub fn from_stream<S: ShareStream + 'static>(stream: S) -> Self {
        Self {
            channel: LineChannel::new(stream),
        }
    }

    /// Sends AUTH; anything but a response starting with `OK` is a refusal.
    pub async fn auth(&mut self, username: &str, password: &str) -> Result<(), ShareError> {
        self.channel
            .send_line(&format!("AUTH {} {}", username, password))
            .await?;
        let response = self.channel.expect_line().await?;
        if response.starts_with("OK") {
            Ok(())
        } else {
            Err(ShareError::ServerRefused(response))
        }
    }

    /// Files announced by LIST, up to the closing `END`.
    ///
    /// Lines that are not `F <name> <size>` are skipped so the channel stays in
    /// step with the server.
    pub async fn list(&mut self) -> Result<Vec<FileEntry>, ShareError> {
        self.channel.send_line("LIST").await?;
        let mut entries = Vec::new();
        let mut first = true;
        loop {
            let line = self.channel.expect_line().await?;
            if line == "END" {
                break;
            }
            if first && line.starts_with("ERR") {
                return Err(ShareError::ServerRefused(line));
            }
            first = false;
            match line.parse::<FileEntry>() {
                Ok(entry) => entries.push(entry),
                Err(_) => warn!("Ignoring malformed listing line: {}", line),
            }
        }
        Ok(entries)
    }

    /// Downloads `filename` into `dest_dir` and returns its size.
    ///
    /// Bytes go straight to the final local name, so an interrupted download
    /// leaves a truncated file behind.
    pub async fn get(&mut self, filename: &str, dest_dir: &Path) -> Result<u64, ShareError> {
        self.channel.send_line(&format!("GET {}", filename)).await?;
        let response = self.channel.expect_line().await?;
        let size = match response.strip_prefix("OK ").map(|size| size.trim().parse::<u64>()) {
            Some(Ok(size)) => size,
            _ => return Err(ShareError::ServerRefused(response)),
        };

        let local_path = dest_dir.join(filename);
        debug!("Receiving {} bytes into {:?}", size, local_path);
        let mut file = match File::create(&local_path).await {
            Ok(file) => file,
            Err(e) => {
                self.channel.drain_bytes(size).await?;
                return Err(ShareError::WriteFailed(e.to_string()));
            }
        };
        self.channel.receive_bytes(&mut file, size).await?;
        Ok(size)
    }

    /// Uploads the local file `local` under its file name (directories dropped).
    ///
    /// Returns the server's final status line.
    pub async fn put(&mut self, local: &str) -> Result<String, ShareError> {
        let remote_name = Path::new(local)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ShareError::LocalFileNotFound(local.to_string()))?;
        let mut file = File::open(local)
            .await
            .map_err(|_| ShareError::LocalFileNotFound(local.to_string()))?;
        let metadata = file
            .metadata()
            .await
            .map_err(|_| ShareError::LocalFileNotFound(local.to_string()))?;
        if !metadata.is_file() {
            return Err(ShareError::LocalFileNotFound(local.to_string()));
        }
        let size = metadata.len();

        self.channel
            .send_line(&format!("PUT {} {}", remote_name, size))
            .await?;
        let response = self.channel.expect_line().await?;
        if response != "OK" {
            return Err(ShareError::ServerRefused(response));
        }

        self.channel.send_bytes(&mut file, size).await?;
        let status = self.channel.expect_line().await?;
        if status == "OK" {
            Ok(status)
        } else {
            Err(ShareError::ServerRefused(status))
        }
    }

    pub async fn quit(mut self) -> Result<(), ShareError> {
        self.channel.send_line("QUIT").await?;
        self.channel.shutdown().await
    }
}
