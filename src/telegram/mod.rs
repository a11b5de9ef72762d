pub mod service;
pub mod transport;

pub use service::TelegramService;
pub use transport::{BotTransport, MessageTransport};
