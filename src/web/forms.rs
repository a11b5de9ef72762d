use axum::extract::Multipart;

use crate::domain::Attachment;

use super::error::AppError;

/// Uploads shorter than this are treated as no upload at all; browsers
/// submit a zero-ish part for an empty file input.
const MIN_ATTACHMENT_BYTES: usize = 5;

/// Pulls the `text` and `file` parts out of a mailing or dialog-answer
/// form. Either part may be absent; the caller decides whether that is
/// an error.
pub async fn read_payload_parts(
    mut multipart: Multipart,
) -> Result<(Option<String>, Option<Attachment>), AppError> {
    let mut text: Option<String> = None;
    let mut attachment: Option<Attachment> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("text") => {
                let value = field.text().await?;
                if !value.trim().is_empty() {
                    text = Some(value);
                }
            }
            Some("file") => {
                let filename = field.file_name().map(str::to_string);
                let bytes = field.bytes().await?;
                if bytes.len() >= MIN_ATTACHMENT_BYTES {
                    attachment = Some(Attachment::new(bytes.to_vec(), filename));
                }
            }
            _ => {}
        }
    }

    Ok((text, attachment))
}
