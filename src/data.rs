use anyhow::{Context, Result, anyhow};
use std::path::Path;

pub const PNG_MIME: &str = "image/png";
pub const JPEG_MIME: &str = "image/jpeg";
pub const WEBP_MIME: &str = "image/webp";

// Upload allowlist, matched against the client-supplied file name.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

#[derive(Debug, Clone)]
pub struct DataAttachment {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub name: Option<String>,
}

pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str())
        }
        _ => false,
    }
}

pub fn load_attachment(path: &Path) -> Result<DataAttachment> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read image file: {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|value| value.to_str())
        .map(|value| value.to_string());
    load_attachment_from_bytes(bytes, name.as_deref())
}

pub fn load_attachment_from_bytes(bytes: Vec<u8>, name: Option<&str>) -> Result<DataAttachment> {
    let mime = detect_image_mime(&bytes, name)?;
    Ok(DataAttachment {
        bytes,
        mime,
        name: name.map(|value| value.to_string()),
    })
}

fn detect_image_mime(bytes: &[u8], name: Option<&str>) -> Result<String> {
    if let Some(kind) = infer::get(bytes) {
        let detected = kind.mime_type();
        if detected.starts_with("image/") {
            return Ok(detected.to_string());
        }
        return Err(anyhow!(
            "uploaded data is not an image (detected '{}')",
            detected
        ));
    }

    if let Some(ext) = extension_lower(name)
        && let Some(mime) = mime_from_extension(&ext)
    {
        return Ok(mime.to_string());
    }

    Err(anyhow!(
        "unable to detect an image type for '{}'",
        name.unwrap_or("upload")
    ))
}

fn extension_lower(name: Option<&str>) -> Option<String> {
    name.and_then(|value| Path::new(value).extension())
        .and_then(|value| value.to_str())
        .map(|value| value.to_lowercase())
}

fn mime_from_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "png" => Some(PNG_MIME),
        "jpg" | "jpeg" => Some(JPEG_MIME),
        "webp" => Some(WEBP_MIME),
        _ => None,
    }
}
