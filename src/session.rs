use log::info;
use std::net::SocketAddr;

/// Per-connection protocol state.
///
/// Starts unauthenticated; only a successful AUTH changes it and nothing ever
/// resets it short of dropping the connection.
#[derive(Debug)]
pub struct Session {
    pub peer_addr: Option<SocketAddr>,
    pub username: Option<String>, // Username for the session
    pub is_authenticated: bool,   // Indicates if the user is authenticated
}

impl Session {
    pub fn new(peer_addr: Option<SocketAddr>) -> Self {
        Self {
            peer_addr,
            username: None,
            is_authenticated: false, // Initialize as FALSE
        }
    }

    pub fn authenticate(&mut self, username: &str) {
        info!("User {} authenticated from {}", username, self.peer_label());
        self.username = Some(username.to_string());
        self.is_authenticated = true;
    }

    pub fn peer_label(&self) -> String {
        self.peer_addr
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| String::from("<local>"))
    }
}
