pub mod env;
mod loader;

pub use env::{AdminConfig, AppConfig, DirectoryConfig, HttpConfig};
pub use loader::load_config;
