/// Largest image accepted on upload.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Detect JPEG, PNG, GIF and WEBP by their magic bytes.
pub fn sniff_content_type(data: &[u8]) -> Option<&'static str> {
    if data.len() < 12 {
        return None;
    }
    match data {
        [0xff, 0xd8, 0xff, ..] => Some("image/jpeg"),
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [b'G', b'I', b'F', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => None,
    }
}

/// Content type to serve a stored image with: the declared type when it is
/// an `image/*` type, else whatever the bytes look like.
pub fn resolve_content_type(declared: Option<&str>, data: &[u8]) -> String {
    match declared.map(str::trim) {
        Some(ct) if ct.starts_with("image/") => ct.to_string(),
        _ => sniff_content_type(data)
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string(),
    }
}

pub fn is_image_mime(mime: &str) -> bool {
    mime.trim().starts_with("image/")
}
