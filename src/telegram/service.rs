use std::sync::Arc;

use anyhow::Result;
use teloxide::{
    dispatching::Dispatcher,
    error_handlers::LoggingErrorHandler,
    net::Download,
    prelude::*,
    utils::command::BotCommands,
};
use tokio_util::sync::CancellationToken;

use crate::db::{messages::NewMessage, MessageRepository, UserRepository};

/// Documents above this size are acknowledged but not stored.
const MAX_FILE_SIZE: u32 = 20 * 1024 * 1024;

/// Inbound side of the bot: registers users on first contact and appends
/// their messages to the dialog history the admin panel reads.
pub struct TelegramService {
    bot: Bot,
    state: Arc<InboundState>,
}

pub struct InboundState {
    users: UserRepository,
    messages: MessageRepository,
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
enum UserCommand {
    #[command(description = "start a dialog with the team")]
    Start,
}

impl TelegramService {
    pub fn new(bot: Bot, users: UserRepository, messages: MessageRepository) -> Self {
        Self {
            bot,
            state: Arc::new(InboundState { users, messages }),
        }
    }

    pub async fn run(self, cancel: CancellationToken) -> Result<()> {
        let me = self.bot.get_me().await?;
        tracing::info!(
            target: "telegram",
            bot_id = me.id.0,
            username = ?me.username,
            "telegram bot connected"
        );

        let handler = Update::filter_message()
            .branch(
                dptree::entry()
                    .filter_command::<UserCommand>()
                    .endpoint(Self::on_command),
            )
            .branch(dptree::endpoint(Self::on_message));

        let mut dispatcher = Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![self.state.clone()])
            .default_handler(|update| async move {
                tracing::debug!(target: "telegram", ?update, "unhandled update");
            })
            .error_handler(LoggingErrorHandler::with_custom_text("inbound handler error"))
            .build();

        let shutdown_token = dispatcher.shutdown_token();
        let mut dispatcher_future = Box::pin(dispatcher.dispatch());
        let mut dispatcher_finished = false;

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(target: "telegram", "stopping telegram dispatcher");
                if let Ok(wait) = shutdown_token.shutdown() {
                    wait.await;
                }
            }
            _ = &mut dispatcher_future => {
                dispatcher_finished = true;
            }
        }

        if !dispatcher_finished {
            dispatcher_future.await;
        }
        Ok(())
    }

    async fn on_command(
        bot: Bot,
        msg: Message,
        cmd: UserCommand,
        state: Arc<InboundState>,
    ) -> Result<()> {
        match cmd {
            UserCommand::Start => {
                if let Some(from) = msg.from.as_ref() {
                    state
                        .users
                        .upsert(
                            msg.chat.id.0,
                            from.username.as_deref(),
                            Some(from.first_name.as_str()),
                            from.last_name.as_deref(),
                        )
                        .await?;
                }
                bot.send_message(
                    msg.chat.id,
                    "Hello! Write your message here and the team will get back to you.",
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn on_message(bot: Bot, msg: Message, state: Arc<InboundState>) -> Result<()> {
        // Dialogs exist only for direct chats with the bot.
        if !msg.chat.is_private() {
            return Ok(());
        }
        let Some(from) = msg.from.as_ref() else {
            return Ok(());
        };

        let text = msg
            .text()
            .or_else(|| msg.caption())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let mut attachment: Option<Vec<u8>> = None;
        let mut filename: Option<String> = None;
        if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
            attachment = Some(download(&bot, &photo.file).await?);
        } else if let Some(doc) = msg.document() {
            if doc.file.size > MAX_FILE_SIZE {
                tracing::warn!(
                    target: "telegram",
                    chat_id = msg.chat.id.0,
                    size = doc.file.size,
                    "document too large, storing text only"
                );
            } else {
                attachment = Some(download(&bot, &doc.file).await?);
                filename = doc.file_name.clone();
            }
        }

        if text.is_none() && attachment.is_none() {
            return Ok(());
        }

        state
            .users
            .upsert(
                msg.chat.id.0,
                from.username.as_deref(),
                Some(from.first_name.as_str()),
                from.last_name.as_deref(),
            )
            .await?;
        state
            .messages
            .add(NewMessage {
                chat_id: msg.chat.id.0,
                from_admin: false,
                text: text.as_deref(),
                attachment: attachment.as_deref(),
                filename: filename.as_deref(),
            })
            .await?;
        state.users.set_unread(msg.chat.id.0, true).await?;

        tracing::info!(
            target: "telegram",
            chat_id = msg.chat.id.0,
            has_attachment = attachment.is_some(),
            "dialog message stored"
        );
        Ok(())
    }
}

async fn download(bot: &Bot, meta: &teloxide::types::FileMeta) -> Result<Vec<u8>> {
    let file = bot.get_file(meta.id.clone()).await?;
    let mut buf = Vec::new();
    bot.download_file(&file.path, &mut buf).await?;
    Ok(buf)
}
