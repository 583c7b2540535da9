use anyhow::{Context, Result};

/// Longest transcription job name we submit.
pub const MAX_JOB_NAME_LEN: usize = 190;

const FALLBACK_JOB_NAME: &str = "transcription";

/// Decodes an object key as delivered in S3 event notifications (`+` for spaces, percent-escapes).
pub fn decode_object_key(raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    let decoded = urlencoding::decode(&spaced)
        .with_context(|| format!("object key {raw} is not valid UTF-8 once decoded"))?;
    Ok(decoded.into_owned())
}

/// File name of `key` without directories or extension. Never empty.
pub fn base_filename(key: &str) -> &str {
    let file = key.rsplit('/').next().unwrap_or(key);
    match file.split('.').next() {
        Some(stem) if !stem.is_empty() => stem,
        _ => FALLBACK_JOB_NAME,
    }
}

/// Maps every character outside `[0-9a-zA-Z._-]` to `-` and caps the length.
pub fn sanitize_job_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .take(MAX_JOB_NAME_LEN)
        .collect();

    if sanitized.is_empty() {
        FALLBACK_JOB_NAME.to_string()
    } else {
        sanitized
    }
}
