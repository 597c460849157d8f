// ABOUTME: Server configuration loaded from the environment
// ABOUTME: Port, CORS origin, storage paths, and the admin bootstrap credentials

use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
}

#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub cors_origin: String,
    pub database_path: PathBuf,
    pub uploads_dir: PathBuf,
    pub admin_email: String,
    pub admin_password: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port_str = env::var("PORT").unwrap_or_else(|_| "4010".to_string());
        let port = port_str.parse::<u16>()?;
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let database_path = env::var("PROCURA_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| procura_core::database_file());

        let uploads_dir = env::var("PROCURA_UPLOADS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| procura_core::uploads_dir());

        let admin_email =
            env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@procura.local".to_string());
        let admin_password = env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "change-me".to_string());

        Ok(Self {
            port,
            cors_origin,
            database_path,
            uploads_dir,
            admin_email,
            admin_password,
        })
    }
}
