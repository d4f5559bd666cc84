use std::fmt;

/// Command keywords. Matching is case-sensitive.
#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum ShareCommand {
    Auth,
    List,
    Get,
    Put,
    Quit,
}

impl ShareCommand {
    pub fn from_keyword(cmd: &str) -> Option<ShareCommand> {
        match cmd {
            "AUTH" => Some(ShareCommand::Auth),
            "LIST" => Some(ShareCommand::List),
            "GET" => Some(ShareCommand::Get),
            "PUT" => Some(ShareCommand::Put),
            "QUIT" => Some(ShareCommand::Quit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShareCommand::Auth => "AUTH",
            ShareCommand::List => "LIST",
            ShareCommand::Get => "GET",
            ShareCommand::Put => "PUT",
            ShareCommand::Quit => "QUIT",
        }
    }

    /// Whether the command is refused before a successful AUTH.
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            ShareCommand::List | ShareCommand::Get | ShareCommand::Put
        )
    }
}

impl fmt::Display for ShareCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
