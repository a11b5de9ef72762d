use std::env;

use super::env::{
    AdminConfig, AppConfig, ConfigError, DirectoryConfig, HttpConfig, LoggingConfig,
};

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let telegram_bot_token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let admin = AdminConfig {
            login: env::var("ADMIN_LOGIN").map_err(|_| ConfigError::Missing("ADMIN_LOGIN"))?,
            password: env::var("ADMIN_PASSWORD")
                .map_err(|_| ConfigError::Missing("ADMIN_PASSWORD"))?,
        };

        let http = HttpConfig {
            bind_addr: env::var("HTTP_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        };

        let directories = DirectoryConfig {
            logs_dir: env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string()),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
            db_filename: env::var("DB_FILENAME").unwrap_or_else(|_| "botdesk.db".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };

        Ok(Self {
            telegram_bot_token,
            admin,
            http,
            directories,
            logging,
        })
    }
}
