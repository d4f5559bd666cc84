use crate::core_auth::core_auth::{CredentialTable, PasswdEntry};
use anyhow::{Context, Result};
use bcrypt::verify;
use log::{info, warn};
use std::fs;
use std::io::ErrorKind;

const BCRYPT_PREFIX: &str = "$2";

/// Checks `password` against a stored value, which is either a bcrypt hash or
/// the password in clear.
pub fn verify_password(password: &str, stored: &str) -> bool {
    if stored.starts_with(BCRYPT_PREFIX) {
        verify(password, stored).unwrap_or(false)
    } else {
        password == stored
    }
}

pub fn parse_passwd(content: &str) -> CredentialTable {
    let mut table = CredentialTable::new();
    for (number, line) in content.lines().enumerate() {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match PasswdEntry::from_line(line) {
            Some(entry) => table.insert(entry),
            None => warn!("Skipping malformed credential line {}", number + 1),
        }
    }
    table
}

/// Loads the credential table. A missing file yields an empty table so the
/// server still starts, with every AUTH failing.
pub fn load_passwd_file(path: &str) -> Result<CredentialTable> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Credential file {} not found, no user can log in", path);
            return Ok(CredentialTable::new());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read credential file: {}", path))
        }
    };

    let table = parse_passwd(&content);
    info!("Loaded {} user(s) from {}", table.len(), path);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let table = parse_passwd("# users\n\nalice:wonderland\nbroken\nbob:builder\n");
        assert_eq!(table.len(), 2);
        assert!(table.verify("alice", "wonderland"));
        assert!(table.verify("bob", "builder"));
    }

    #[test]
    fn test_load_passwd_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "#user:pass").unwrap();
        writeln!(file, "alice:wonderland").unwrap();

        let table = load_passwd_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.verify("alice", "wonderland"));
        assert!(!table.verify("#user", "pass"));
    }

    #[test]
    fn test_missing_passwd_file_is_empty_table() {
        let table = load_passwd_file("/nonexistent/users.db").unwrap();
        assert!(table.is_empty());
    }
}
