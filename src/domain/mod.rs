pub mod media;
pub mod payload;
pub mod recipient;

pub use media::{sniff_media_kind, MediaKind};
pub use payload::{Attachment, MailPayload, PayloadError};
pub use recipient::Recipient;
