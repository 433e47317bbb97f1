use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::data;
use crate::settings::Settings;

pub(crate) fn write_temp_file(bytes: &[u8], filename: &str, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create tmp dir: {}", dir.display()))?;
    let ext = Path::new(filename)
        .extension()
        .and_then(|value| value.to_str())
        .unwrap_or("bin");
    let suffix = format!(".{}", ext.to_lowercase());
    let file = tempfile::Builder::new()
        .prefix("lingo-lens-")
        .suffix(&suffix)
        .tempfile_in(dir)?;
    std::fs::write(file.path(), bytes).with_context(|| "failed to write uploaded temp file")?;
    let path = file
        .into_temp_path()
        .keep()
        .with_context(|| "failed to persist temp file")?;
    Ok(path)
}

pub(crate) fn resolve_tmp_dir(settings: &Settings) -> PathBuf {
    match settings.server_tmp_dir.as_deref() {
        Some(dir) => PathBuf::from(dir),
        None => std::env::temp_dir().join("lingo-lens"),
    }
}

// Uploads follow the same save-call-unlink cycle as processing a local
// file: persist, hand the path to the attachment loader, remove.
pub(crate) fn load_upload(bytes: &[u8], filename: &str, dir: &Path) -> Result<data::DataAttachment> {
    let path = write_temp_file(bytes, filename, dir)?;
    let loaded = data::load_attachment(&path);
    let _ = std::fs::remove_file(&path);
    loaded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_file_keeps_the_upload_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_temp_file(b"data", "photo.PNG", dir.path()).expect("write");
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        assert_eq!(std::fs::read(&path).expect("read back"), b"data");
        std::fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn upload_temp_file_is_removed_after_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let attachment = load_upload(&png, "shot.png", dir.path()).expect("load");
        assert_eq!(attachment.mime, data::PNG_MIME);
        let leftovers = std::fs::read_dir(dir.path()).expect("read dir").count();
        assert_eq!(leftovers, 0);
    }
}
