use crate::constants::PART_SUFFIX;
use crate::core_error::ShareError;
use crate::core_network::channel::LineChannel;
use log::{debug, error, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Progress of one raw payload transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub declared: u64,
    pub moved: u64,
}

impl TransferProgress {
    pub fn new(declared: u64) -> Self {
        Self { declared, moved: 0 }
    }

    pub fn remaining(&self) -> u64 {
        self.declared - self.moved
    }

    pub fn is_complete(&self) -> bool {
        self.moved == self.declared
    }

    /// Size of the next read, never past the declared size.
    fn next_chunk(&self, chunk_size: usize) -> usize {
        self.remaining().min(chunk_size as u64) as usize
    }
}

impl LineChannel {
    /// Streams exactly `total_size` bytes from `source` to the peer.
    ///
    /// A source that runs dry early leaves the peer waiting for bytes that will
    /// never come, so it is reported as a connection failure as well.
    pub async fn send_bytes<R>(
        &mut self,
        source: &mut R,
        total_size: u64,
    ) -> Result<TransferProgress, ShareError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut progress = TransferProgress::new(total_size);
        let mut buffer = vec![0u8; self.chunk_size];

        while !progress.is_complete() {
            let want = progress.next_chunk(buffer.len());
            let n = source.read(&mut buffer[..want]).await?;
            if n == 0 {
                error!(
                    "Payload source ended after {} of {} bytes",
                    progress.moved, progress.declared
                );
                return Err(ShareError::Connection(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "payload source ended early",
                )));
            }
            self.stream.write_all(&buffer[..n]).await?;
            progress.moved += n as u64;
        }

        self.stream.flush().await?;
        debug!("Sent {} bytes", progress.moved);
        Ok(progress)
    }

    /// Reads exactly `total_size` bytes from the peer into `sink`.
    ///
    /// Once the sink fails the rest of the payload is still consumed and
    /// discarded so the next line frame starts where the peer expects it; the
    /// sink failure is then returned as `WriteFailed`.
    pub async fn receive_bytes<W>(
        &mut self,
        sink: &mut W,
        total_size: u64,
    ) -> Result<TransferProgress, ShareError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut progress = TransferProgress::new(total_size);
        let mut buffer = vec![0u8; self.chunk_size];
        let mut sink_error: Option<std::io::Error> = None;

        while !progress.is_complete() {
            let want = progress.next_chunk(buffer.len());
            let n = self.stream.read(&mut buffer[..want]).await?;
            if n == 0 {
                warn!(
                    "Peer closed the stream after {} of {} bytes",
                    progress.moved, progress.declared
                );
                return Err(ShareError::ConnectionClosed);
            }
            if sink_error.is_none() {
                if let Err(e) = sink.write_all(&buffer[..n]).await {
                    error!("Failed to write received bytes: {}", e);
                    sink_error = Some(e);
                }
            }
            progress.moved += n as u64;
        }

        if sink_error.is_none() {
            if let Err(e) = sink.flush().await {
                sink_error = Some(e);
            }
        }

        match sink_error {
            Some(e) => Err(ShareError::WriteFailed(e.to_string())),
            None => Ok(progress),
        }
    }

    /// Discards exactly `total_size` bytes from the peer.
    pub async fn drain_bytes(&mut self, total_size: u64) -> Result<TransferProgress, ShareError> {
        self.receive_bytes(&mut tokio::io::sink(), total_size).await
    }

    /// Receives a payload into a part file of its own next to `destination`
    /// and renames it over `destination` only once every declared byte has
    /// arrived.
    ///
    /// On any failure the partial file is removed, so `destination` is either
    /// untouched or holds one complete payload. Overlapping uploads to the same
    /// name never share a part file; the last rename wins.
    pub async fn receive_to_file_atomic(
        &mut self,
        destination: &Path,
        total_size: u64,
    ) -> Result<TransferProgress, ShareError> {
        let (part_path, mut file) = match create_part_file(destination).await {
            Ok(created) => created,
            Err(e) => {
                error!("Failed to create part file for {:?}: {}", destination, e);
                self.drain_bytes(total_size).await?;
                return Err(ShareError::WriteFailed(e.to_string()));
            }
        };

        let received = self.receive_bytes(&mut file, total_size).await;
        let received = match received {
            Ok(progress) => file
                .sync_all()
                .await
                .map(|_| progress)
                .map_err(|e| ShareError::WriteFailed(e.to_string())),
            Err(e) => Err(e),
        };
        drop(file);

        let progress = match received {
            Ok(progress) => progress,
            Err(e) => {
                remove_part_file(&part_path).await;
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&part_path, destination).await {
            error!("Failed to rename {:?} to {:?}: {}", part_path, destination, e);
            remove_part_file(&part_path).await;
            return Err(ShareError::WriteFailed(e.to_string()));
        }

        Ok(progress)
    }
}

static UPLOAD_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// `<destination>.<pid>-<sequence>.part`
pub fn part_path_for(destination: &Path, sequence: u64) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(format!(".{}-{}{}", std::process::id(), sequence, PART_SUFFIX));
    PathBuf::from(name)
}

/// Creates a part file no other upload can open; `create_new` fails rather
/// than truncating a file left behind by someone else.
async fn create_part_file(destination: &Path) -> std::io::Result<(PathBuf, File)> {
    loop {
        let sequence = UPLOAD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let part_path = part_path_for(destination, sequence);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&part_path)
            .await
        {
            Ok(file) => return Ok((part_path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
}

async fn remove_part_file(part_path: &Path) {
    if let Err(e) = fs::remove_file(part_path).await {
        if e.kind() != ErrorKind::NotFound {
            warn!("Failed to remove partial file {:?}: {}", part_path, e);
        }
    }
}
