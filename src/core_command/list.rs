use crate::core_error::ShareError;
use crate::core_network::SharedChannel;
use crate::server::ServerContext;
use crate::session::Session;
use log::{debug, error, info};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// One regular file of the share, as reported by LIST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
}

impl fmt::Display for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F {} {}", self.name, self.size)
    }
}

impl FromStr for FileEntry {
    type Err = ShareError;

    /// Parses an `F <name> <size>` line; the size is the last token so names
    /// may contain spaces.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let invalid = || ShareError::InvalidArgs(line.to_string());
        let rest = line.strip_prefix("F ").ok_or_else(invalid)?;
        let (name, size) = rest.rsplit_once(' ').ok_or_else(invalid)?;
        if name.is_empty() {
            return Err(invalid());
        }
        Ok(FileEntry {
            name: name.to_string(),
            size: size.parse().map_err(|_| invalid())?,
        })
    }
}

/// Regular files directly inside `share_dir`, sorted by name.
///
/// Symlinks, directories and special files are skipped, as are entries that
/// vanish while the directory is being read.
pub async fn list_share(share_dir: &Path) -> Result<Vec<FileEntry>, ShareError> {
    let mut dir = fs::read_dir(share_dir).await.map_err(|e| {
        error!("Failed to open share directory {:?}: {}", share_dir, e);
        ShareError::ShareUnavailable(share_dir.display().to_string())
    })?;

    let mut entries = Vec::new();
    loop {
        let entry = match dir.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read share directory {:?}: {}", share_dir, e);
                break;
            }
        };

        // file_type() does not follow symlinks.
        match entry.file_type().await {
            Ok(file_type) if file_type.is_file() => {}
            _ => continue,
        }
        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!("Skipping {:?}: {}", entry.path(), e);
                continue;
            }
        };

        entries.push(FileEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            size: metadata.len(),
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Handles the LIST command: one `F <name> <size>` line per file, then `END`.
pub async fn handle_list_command(
    writer: SharedChannel,
    context: Arc<ServerContext>,
    session: Arc<Mutex<Session>>,
) -> Result<(), ShareError> {
    let username = session.lock().await.username.clone().unwrap_or_default();
    let entries = list_share(&context.share_dir).await?;

    let mut writer = writer.lock().await;
    for entry in &entries {
        writer.send_line(&entry.to_string()).await?;
    }
    writer.send_line("END").await?;
    info!("Listed {} file(s) for {}", entries.len(), username);

    Ok(())
}
