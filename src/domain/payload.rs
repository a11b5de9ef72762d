use thiserror::Error;

use super::media::{sniff_media_kind, MediaKind};

/// Binary part of a mailing or dialog answer, classified once at creation.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub kind: MediaKind,
}

impl Attachment {
    pub fn new(bytes: Vec<u8>, filename: Option<String>) -> Self {
        let kind = sniff_media_kind(&bytes);
        Self {
            bytes,
            filename: filename.unwrap_or_else(|| "file".to_string()),
            kind,
        }
    }
}

/// What one job delivers to every recipient: text, an attachment, or both.
#[derive(Debug, Clone)]
pub struct MailPayload {
    pub text: Option<String>,
    pub attachment: Option<Attachment>,
}

impl MailPayload {
    pub fn new(text: Option<String>, attachment: Option<Attachment>) -> Result<Self, PayloadError> {
        let text = text.filter(|t| !t.trim().is_empty());
        if text.is_none() && attachment.is_none() {
            return Err(PayloadError::Empty);
        }
        Ok(Self { text, attachment })
    }

    pub fn caption(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("mailing payload has neither text nor attachment")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_is_rejected() {
        assert!(matches!(
            MailPayload::new(None, None),
            Err(PayloadError::Empty)
        ));
        assert!(matches!(
            MailPayload::new(Some("   ".to_string()), None),
            Err(PayloadError::Empty)
        ));
    }

    #[test]
    fn text_only_payload_is_accepted() {
        let payload = MailPayload::new(Some("hello".to_string()), None).unwrap();
        assert_eq!(payload.caption(), Some("hello"));
        assert!(payload.attachment.is_none());
    }

    #[test]
    fn attachment_only_payload_is_accepted() {
        let attachment = Attachment::new(vec![0xFF, 0xD8, 0xFF, 0xE0], Some("a.jpg".to_string()));
        let payload = MailPayload::new(None, Some(attachment)).unwrap();
        assert_eq!(
            payload.attachment.as_ref().map(|a| a.kind),
            Some(MediaKind::Image)
        );
    }
}
