use crate::core_auth::helper::verify_password;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct PasswdEntry {
    username: String,
    password: String,
}

impl PasswdEntry {
    /// Parses a `user:pass` line. The password is everything after the first
    /// `:` so it may itself contain colons.
    pub fn from_line(line: &str) -> Option<Self> {
        let (username, password) = line.split_once(':')?;
        if username.is_empty() {
            return None;
        }
        Some(PasswdEntry {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn get_password(&self) -> &str {
        &self.password
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }
}

/// Read-only username → password lookup shared by every connection.
#[derive(Debug, Clone, Default)]
pub struct CredentialTable {
    entries: HashMap<String, PasswdEntry>,
}

impl CredentialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later lines win when a username is listed twice.
    pub fn insert(&mut self, entry: PasswdEntry) {
        self.entries.insert(entry.get_username().to_string(), entry);
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        match self.entries.get(username) {
            Some(entry) => verify_password(password, entry.get_password()),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<PasswdEntry> for CredentialTable {
    fn from_iter<I: IntoIterator<Item = PasswdEntry>>(iter: I) -> Self {
        let mut table = CredentialTable::new();
        for entry in iter {
            table.insert(entry);
        }
        table
    }
}
