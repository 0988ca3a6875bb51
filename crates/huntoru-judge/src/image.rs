//! Inbound image payload validation.
//!
//! Browsers send `data:image/jpeg;base64,...` URIs; other clients may send
//! raw base64. Both are reduced to canonical, padded standard base64.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{JudgeError, JudgeResult};

/// Strip an optional `data:image/<subtype>;base64,` prefix, normalize padding
/// and check that the remainder decodes as standard base64.
///
/// The returned string has a length that is a multiple of 4 and contains only
/// `[A-Za-z0-9+/=]`.
pub fn normalize_image_payload(raw: &str) -> JudgeResult<String> {
    let payload = strip_data_uri(raw.trim())?;
    if payload.is_empty() {
        return Err(JudgeError::invalid("image data is empty"));
    }

    let body = payload.trim_end_matches('=');
    let padding = payload.len() - body.len();
    if padding > 2 {
        return Err(JudgeError::invalid("image data has excess base64 padding"));
    }
    if let Some(c) = body
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '+' || *c == '/'))
    {
        return Err(JudgeError::invalid(format!(
            "image data contains non-base64 character {c:?}"
        )));
    }
    if body.len() % 4 == 1 {
        return Err(JudgeError::invalid("image data has an impossible base64 length"));
    }

    let mut normalized = String::with_capacity(body.len() + 3);
    normalized.push_str(body);
    while normalized.len() % 4 != 0 {
        normalized.push('=');
    }

    let decoded = STANDARD
        .decode(&normalized)
        .map_err(|e| JudgeError::invalid(format!("image data is not valid base64: {e}")))?;
    if decoded.is_empty() {
        return Err(JudgeError::invalid("image data is empty"));
    }

    Ok(normalized)
}

fn strip_data_uri(input: &str) -> JudgeResult<&str> {
    if !input.starts_with("data:") {
        return Ok(input);
    }
    let (header, data) = input
        .split_once(',')
        .ok_or_else(|| JudgeError::invalid("data URI has no payload"))?;
    let media = header
        .strip_prefix("data:")
        .and_then(|h| h.strip_suffix(";base64"))
        .ok_or_else(|| JudgeError::invalid("data URI is not base64-encoded"))?;
    if !media.starts_with("image/") {
        return Err(JudgeError::invalid(format!(
            "data URI media type '{media}' is not an image"
        )));
    }
    Ok(data)
}
