use anyhow::Result;
use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{ChatId, InputFile},
};

/// Delivery boundary the broadcaster and dialog answers go through.
/// Every call addresses one recipient and fails independently.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;

    async fn send_photo(&self, chat_id: i64, bytes: Vec<u8>, caption: Option<&str>) -> Result<()>;

    async fn send_video(&self, chat_id: i64, bytes: Vec<u8>, caption: Option<&str>) -> Result<()>;

    async fn send_document(
        &self,
        chat_id: i64,
        bytes: Vec<u8>,
        filename: &str,
        caption: Option<&str>,
    ) -> Result<()>;
}

/// Production transport over the Telegram Bot API.
#[derive(Clone)]
pub struct BotTransport {
    bot: Bot,
}

impl BotTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MessageTransport for BotTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.bot.send_message(ChatId(chat_id), text).await?;
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, bytes: Vec<u8>, caption: Option<&str>) -> Result<()> {
        let mut request = self.bot.send_photo(ChatId(chat_id), InputFile::memory(bytes));
        if let Some(caption) = caption {
            request = request.caption(caption.to_string());
        }
        request.await?;
        Ok(())
    }

    async fn send_video(&self, chat_id: i64, bytes: Vec<u8>, caption: Option<&str>) -> Result<()> {
        let mut request = self.bot.send_video(ChatId(chat_id), InputFile::memory(bytes));
        if let Some(caption) = caption {
            request = request.caption(caption.to_string());
        }
        request.await?;
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: i64,
        bytes: Vec<u8>,
        filename: &str,
        caption: Option<&str>,
    ) -> Result<()> {
        let file = InputFile::memory(bytes).file_name(filename.to_string());
        let mut request = self.bot.send_document(ChatId(chat_id), file);
        if let Some(caption) = caption {
            request = request.caption(caption.to_string());
        }
        request.await?;
        Ok(())
    }
}
