#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use botdesk::domain::Recipient;
use botdesk::telegram::MessageTransport;

/// One recorded transport call, enough to assert which send path ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Text(i64, String),
    Photo(i64),
    Video(i64),
    Document(i64, String),
}

impl Call {
    pub fn chat_id(&self) -> i64 {
        match self {
            Call::Text(id, _) | Call::Photo(id) | Call::Video(id) | Call::Document(id, _) => *id,
        }
    }
}

#[derive(Default)]
pub enum FailMode {
    #[default]
    None,
    All,
    Chats(Vec<i64>),
}

/// Scripted transport: records every call and fails per configuration.
#[derive(Default)]
pub struct MockTransport {
    pub calls: Mutex<Vec<Call>>,
    pub fail: FailMode,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_all() -> Self {
        Self {
            fail: FailMode::All,
            ..Self::default()
        }
    }

    pub fn failing_chats(chats: Vec<i64>) -> Self {
        Self {
            fail: FailMode::Chats(chats),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn record(&self, call: Call) -> Result<()> {
        let chat_id = call.chat_id();
        self.calls.lock().push(call);
        let failed = match &self.fail {
            FailMode::None => false,
            FailMode::All => true,
            FailMode::Chats(chats) => chats.contains(&chat_id),
        };
        if failed {
            bail!("scripted failure for chat {chat_id}");
        }
        Ok(())
    }
}

#[async_trait]
impl MessageTransport for MockTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.record(Call::Text(chat_id, text.to_string()))
    }

    async fn send_photo(&self, chat_id: i64, _bytes: Vec<u8>, _caption: Option<&str>) -> Result<()> {
        self.record(Call::Photo(chat_id))
    }

    async fn send_video(&self, chat_id: i64, _bytes: Vec<u8>, _caption: Option<&str>) -> Result<()> {
        self.record(Call::Video(chat_id))
    }

    async fn send_document(
        &self,
        chat_id: i64,
        _bytes: Vec<u8>,
        filename: &str,
        _caption: Option<&str>,
    ) -> Result<()> {
        self.record(Call::Document(chat_id, filename.to_string()))
    }
}

pub fn recipients(n: usize) -> Vec<Recipient> {
    (1..=n as i64)
        .map(|id| Recipient::new(id, format!("user-{id}")))
        .collect()
}

pub fn jpeg_bytes() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46]
}

pub fn mp4_bytes() -> Vec<u8> {
    let mut buf = vec![0x00, 0x00, 0x00, 0x18];
    buf.extend_from_slice(b"ftypisom");
    buf.extend_from_slice(&[0u8; 8]);
    buf
}
