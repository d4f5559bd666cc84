// src/constants.rs

pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_USERS_FILE: &str = "users.db";
pub const DEFAULT_TRANSFER_BUFFER_SIZE: usize = 8192;
pub const DEFAULT_MAX_LINE_LENGTH: usize = 8192;
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 5;

/// Suffix of the temporary file an upload is written to before the final rename.
pub const PART_SUFFIX: &str = ".part";
