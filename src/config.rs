use crate::constants::{
    DEFAULT_LISTEN_ADDRESS, DEFAULT_MAX_LINE_LENGTH, DEFAULT_SHUTDOWN_GRACE_SECS,
    DEFAULT_TRANSFER_BUFFER_SIZE, DEFAULT_USERS_FILE,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    pub users_file: String,
    pub transfer_buffer_size: Option<usize>, // Optional to allow default value
    pub max_line_length: Option<usize>,
    pub shutdown_grace_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from(DEFAULT_LISTEN_ADDRESS),
            users_file: String::from(DEFAULT_USERS_FILE),
            transfer_buffer_size: Some(DEFAULT_TRANSFER_BUFFER_SIZE),
            max_line_length: Some(DEFAULT_MAX_LINE_LENGTH),
            shutdown_grace_secs: Some(DEFAULT_SHUTDOWN_GRACE_SECS),
        }
    }
}

impl ServerConfig {
    pub fn transfer_buffer_size(&self) -> usize {
        self.transfer_buffer_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_TRANSFER_BUFFER_SIZE)
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length
            .filter(|len| *len > 0)
            .unwrap_or(DEFAULT_MAX_LINE_LENGTH)
    }

    pub fn shutdown_grace_secs(&self) -> u64 {
        self.shutdown_grace_secs
            .unwrap_or(DEFAULT_SHUTDOWN_GRACE_SECS)
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str)?;
        Ok(config)
    }
}
