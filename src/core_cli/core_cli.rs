use clap::Parser;
use std::path::PathBuf;

/// Server command-line arguments
#[derive(Parser, Debug)]
#[command(name = "rouilleshare", about = "A minimal authenticated file-sharing server.")]
pub struct Cli {
    /// TCP port to listen on
    pub port: u16,

    /// Directory to share, created if absent
    pub share_dir: PathBuf,

    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Credential file (user:pass per line), overrides the configuration
    #[arg(short, long)]
    pub users: Option<String>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}

/// Client command-line arguments
#[derive(Parser, Debug)]
#[command(name = "rouilleshare-client", about = "Interactive client for rouilleshare.")]
pub struct ClientCli {
    /// Server address
    pub server_ip: String,

    /// Server port
    pub port: u16,

    /// Directory downloaded files are written to
    #[arg(short, long, default_value = ".")]
    pub download_dir: PathBuf,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}
