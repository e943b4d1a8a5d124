use std::fs;
use std::path::Path;

use base64::prelude::{BASE64_STANDARD, Engine as _};
use tracing::debug;

use crate::error::{AppError, AppResult};

pub const MAX_IMAGE_BYTES: u64 = 2048 * 1024;

/// Turns a CLI image argument into a URL the provider can fetch.
///
/// Remote URLs are passed through untouched. `data:` URLs and local files
/// are checked (type, size, signature); local files are then inlined as a
/// base64 `data:` URL.
pub fn resolve_image_url(input: &str) -> AppResult<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AppError::Image("no image given".to_string()));
    }
    if is_remote(trimmed) {
        return Ok(trimmed.to_string());
    }
    if starts_with_ignore_case(trimmed, "data:") {
        return check_data_url(trimmed);
    }
    encode_local_file(Path::new(trimmed))
}

fn is_remote(input: &str) -> bool {
    starts_with_ignore_case(input, "https://") || starts_with_ignore_case(input, "http://")
}

fn starts_with_ignore_case(input: &str, prefix: &str) -> bool {
    input
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn check_data_url(url: &str) -> AppResult<String> {
    let (header, payload) = url
        .split_once(',')
        .ok_or_else(|| AppError::Image("data URL has no payload".to_string()))?;
    let media = header["data:".len()..].to_ascii_lowercase();
    let mime = match media.strip_suffix(";base64") {
        Some("image/jpeg") | Some("image/jpg") => "image/jpeg",
        Some("image/png") => "image/png",
        Some(other) => {
            return Err(AppError::Image(format!(
                "data URL type {other} must be jpeg, jpg or png"
            )));
        }
        None => {
            return Err(AppError::Image(
                "data URL must be base64 encoded".to_string(),
            ));
        }
    };

    let bytes = BASE64_STANDARD
        .decode(payload.trim())
        .map_err(|err| AppError::Image(format!("data URL payload is not base64: {err}")))?;
    check_size("data URL", bytes.len() as u64)?;
    check_signature("data URL", mime, &bytes)?;

    debug!(bytes = bytes.len(), mime, "accepted inline image");
    Ok(url.to_string())
}

fn encode_local_file(path: &Path) -> AppResult<String> {
    let mime = mime_for_extension(path)?;
    let label = path.display().to_string();

    check_size(&label, fs::metadata(path)?.len())?;
    let bytes = fs::read(path)?;
    check_signature(&label, mime, &bytes)?;

    debug!(path = %label, bytes = bytes.len(), mime, "inlining local image");
    Ok(format!("data:{mime};base64,{}", BASE64_STANDARD.encode(bytes)))
}

fn check_size(label: &str, size: u64) -> AppResult<()> {
    if size > MAX_IMAGE_BYTES {
        return Err(AppError::Image(format!(
            "{label} is {} KB, the limit is {} KB",
            size.div_ceil(1024),
            MAX_IMAGE_BYTES / 1024
        )));
    }
    Ok(())
}

fn check_signature(label: &str, mime: &str, bytes: &[u8]) -> AppResult<()> {
    if has_signature(mime, bytes) {
        Ok(())
    } else {
        Err(AppError::Image(format!("{label} is not a valid {mime} file")))
    }
}

fn mime_for_extension(path: &Path) -> AppResult<&'static str> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => Ok("image/jpeg"),
        Some("png") => Ok("image/png"),
        _ => Err(AppError::Image(format!(
            "{} must be a jpeg, jpg or png file",
            path.display()
        ))),
    }
}

fn has_signature(mime: &str, bytes: &[u8]) -> bool {
    match mime {
        "image/jpeg" => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
        "image/png" => bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
        _ => false,
    }
}
