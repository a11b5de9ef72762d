/// Media family of an attachment, decides which transport call delivers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Document,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
        }
    }
}

/// Classifies a byte buffer by its signature. Uploaded content types are
/// untrusted, so this is the only classification the broadcaster relies on;
/// anything unrecognized is sent as a generic document.
pub fn sniff_media_kind(bytes: &[u8]) -> MediaKind {
    if is_image(bytes) {
        MediaKind::Image
    } else if is_video(bytes) {
        MediaKind::Video
    } else {
        MediaKind::Document
    }
}

/// Best-effort content type for serving stored attachments back over HTTP.
pub fn sniff_content_type(bytes: &[u8]) -> &'static str {
    match sniff_media_kind(bytes) {
        MediaKind::Image if bytes.starts_with(&[0x89, b'P', b'N', b'G']) => "image/png",
        MediaKind::Image if bytes.starts_with(b"GIF8") => "image/gif",
        MediaKind::Image if has_riff_tag(bytes, b"WEBP") => "image/webp",
        MediaKind::Image if bytes.starts_with(b"BM") => "image/bmp",
        MediaKind::Image => "image/jpeg",
        MediaKind::Video if bytes.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) => "video/webm",
        MediaKind::Video if has_riff_tag(bytes, b"AVI ") => "video/x-msvideo",
        MediaKind::Video => "video/mp4",
        MediaKind::Document => "application/octet-stream",
    }
}

fn is_image(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0xFF, 0xD8, 0xFF])
        || bytes.starts_with(&[0x89, b'P', b'N', b'G'])
        || bytes.starts_with(b"GIF8")
        || has_riff_tag(bytes, b"WEBP")
        || bytes.starts_with(b"BM")
}

fn is_video(bytes: &[u8]) -> bool {
    // ISO BMFF (mp4, mov, m4v): "ftyp" box at offset 4.
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        return true;
    }
    // Matroska / WebM EBML header.
    if bytes.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return true;
    }
    has_riff_tag(bytes, b"AVI ")
}

fn has_riff_tag(bytes: &[u8], tag: &[u8; 4]) -> bool {
    bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == tag
}
