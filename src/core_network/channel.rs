use crate::constants::{DEFAULT_MAX_LINE_LENGTH, DEFAULT_TRANSFER_BUFFER_SIZE};
use crate::core_error::ShareError;
use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Any bidirectional byte stream a session can run over (TCP socket, in-memory duplex, ...).
pub trait ShareStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> ShareStream for T {}

/// Line-framed view of a connection.
///
/// Text frames and raw payloads share one buffered reader so bytes that arrive
/// right behind a command line are never lost when a transfer starts.
pub struct LineChannel {
    pub(crate) stream: BufReader<Box<dyn ShareStream>>,
    pub(crate) max_line_length: usize,
    pub(crate) chunk_size: usize,
}

impl LineChannel {
    pub fn new<S: ShareStream + 'static>(stream: S) -> Self {
        Self::with_limits(stream, DEFAULT_MAX_LINE_LENGTH, DEFAULT_TRANSFER_BUFFER_SIZE)
    }

    pub fn with_limits<S: ShareStream + 'static>(
        stream: S,
        max_line_length: usize,
        chunk_size: usize,
    ) -> Self {
        Self {
            stream: BufReader::new(Box::new(stream)),
            max_line_length: max_line_length.max(1),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Writes `line` followed by a single `\n`.
    pub async fn send_line(&mut self, line: &str) -> Result<(), ShareError> {
        let mut frame = Vec::with_capacity(line.len() + 1);
        frame.extend_from_slice(line.as_bytes());
        frame.push(b'\n');
        self.stream.write_all(&frame).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Reads the next line frame without its terminator.
    ///
    /// Returns `Ok(None)` when the peer closed the stream before completing a
    /// line, which keeps a disconnect distinct from a genuinely empty line.
    pub async fn read_line(&mut self) -> Result<Option<String>, ShareError> {
        let mut buffer = Vec::new();
        // Room for the line plus its `\r\n` terminator.
        let limit = self.max_line_length as u64 + 2;
        let n = (&mut self.stream)
            .take(limit)
            .read_until(b'\n', &mut buffer)
            .await?;

        if n == 0 {
            return Ok(None);
        }

        if buffer.last() != Some(&b'\n') {
            if n as u64 == limit {
                warn!("Rejecting line longer than {} bytes", self.max_line_length);
                return Err(ShareError::LineTooLong(self.max_line_length));
            }
            debug!("Peer closed the stream in the middle of a line");
            return Ok(None);
        }

        buffer.pop();
        if buffer.last() == Some(&b'\r') {
            buffer.pop();
        }
        if buffer.len() > self.max_line_length {
            return Err(ShareError::LineTooLong(self.max_line_length));
        }

        Ok(Some(String::from_utf8_lossy(&buffer).into_owned()))
    }

    /// Like `read_line`, but a closed stream is an error.
    pub async fn expect_line(&mut self) -> Result<String, ShareError> {
        self.read_line().await?.ok_or(ShareError::ConnectionClosed)
    }

    pub async fn shutdown(&mut self) -> Result<(), ShareError> {
        self.stream.shutdown().await?;
        Ok(())
    }
}
