use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram_bot_token: String,
    pub admin: AdminConfig,
    pub http: HttpConfig,
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
}

/// Credentials for the HTTP basic-auth gate on the admin surface.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
    pub data_dir: String,
    pub static_dir: String,
    pub db_filename: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),
}
