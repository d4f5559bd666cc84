// Error handling for the share protocol
use thiserror::Error;

/// Broad failure classes. Only `Connection` failures end a session; the others
/// are reported to the peer as an `ERR ...` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Protocol,
    Filesystem,
    Validation,
}

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Line exceeds the maximum length of {0} bytes")]
    LineTooLong(usize),

    #[error("Authentication failed for user {0}")]
    AuthFailed(String),

    #[error("Command requires authentication")]
    NotAuthed,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Cannot open share directory: {0}")]
    ShareUnavailable(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Local file not found: {0}")]
    LocalFileNotFound(String),

    #[error("Server refused: {0}")]
    ServerRefused(String),
}

impl ShareError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShareError::ConnectionClosed
            | ShareError::Connection(_)
            | ShareError::LineTooLong(_) => ErrorKind::Connection,
            ShareError::AuthFailed(_)
            | ShareError::NotAuthed
            | ShareError::UnknownCommand(_)
            | ShareError::ServerRefused(_) => ErrorKind::Protocol,
            ShareError::FileNotFound(_)
            | ShareError::ShareUnavailable(_)
            | ShareError::WriteFailed(_)
            | ShareError::LocalFileNotFound(_) => ErrorKind::Filesystem,
            ShareError::InvalidArgs(_) | ShareError::InvalidFilename(_) => ErrorKind::Validation,
        }
    }

    /// True when the stream can no longer be trusted to carry framed lines.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Connection
    }

    pub fn to_wire_response(&self) -> String {
        match self {
            ShareError::AuthFailed(_) => "ERR auth failed".to_string(),
            ShareError::NotAuthed => "ERR not authed".to_string(),
            ShareError::UnknownCommand(_) => "ERR unknown cmd".to_string(),
            ShareError::InvalidArgs(_) => "ERR invalid args".to_string(),
            ShareError::InvalidFilename(_) => "ERR invalid filename".to_string(),
            ShareError::FileNotFound(_) => "ERR file not found".to_string(),
            ShareError::ShareUnavailable(_) => "ERR cannot open share".to_string(),
            ShareError::WriteFailed(_) => "ERR write failed".to_string(),
            ShareError::ServerRefused(response) => response.clone(),
            _ => "ERR internal error".to_string(),
        }
    }
}
