use crate::{
    config::upload::UploadConfig,
    error::{AppError, AppResult},
};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub const MAX_IMAGE_SIZE: usize = 4 * 1024 * 1024; // 4 MiB
pub const PHOTO_SUBDIR: &str = "post-photos";
const MAX_FILENAME_LEN: usize = 100;
const MAX_NAME_ATTEMPTS: u32 = 16;

/// Scriptable image formats are never served back.
const REJECTED_CONTENT_TYPES: &[&str] = &["image/svg+xml"];

/// Check magic bytes for the formats we can recognise. Other `image/*`
/// types are accepted on their declared type alone.
fn validate_magic_bytes(data: &[u8], content_type: &str) -> bool {
    match content_type {
        "image/jpeg" => data.len() >= 3 && data[..3] == [0xFF, 0xD8, 0xFF],
        "image/png" => data.len() >= 4 && data[..4] == [0x89, 0x50, 0x4E, 0x47],
        "image/gif" => data.len() >= 4 && data[..4] == [0x47, 0x49, 0x46, 0x38],
        "image/webp" => {
            data.len() >= 12
                && data[..4] == [0x52, 0x49, 0x46, 0x46]
                && data[8..12] == [0x57, 0x45, 0x42, 0x50]
        }
        _ => !data.is_empty(),
    }
}

/// Reduce a client-supplied filename to a safe single path component.
pub fn sanitize_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        return "image".to_string();
    }

    // Keep the extension when truncating.
    if cleaned.len() > MAX_FILENAME_LEN {
        let ext = cleaned
            .rsplit_once('.')
            .map(|(_, e)| e)
            .filter(|e| e.len() <= 10)
            .unwrap_or("");
        let keep = MAX_FILENAME_LEN.saturating_sub(ext.len() + 1);
        let stem = &cleaned[..keep];
        return if ext.is_empty() {
            stem.to_string()
        } else {
            format!("{}.{}", stem, ext)
        };
    }

    cleaned.to_string()
}

/// `<unix millis>-<original filename>`
pub fn stored_filename(timestamp_ms: i64, original: &str) -> String {
    format!("{}-{}", timestamp_ms, sanitize_filename(original))
}

/// `name.jpg` -> `name-<n>.jpg`
fn suffixed(filename: &str, n: u32) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}-{}.{}", stem, n, ext),
        _ => format!("{}-{}", filename, n),
    }
}

/// Create `filename` in `dir` without replacing an existing file. Returns the
/// name actually written.
async fn write_new_file(dir: &Path, filename: &str, data: &[u8]) -> std::io::Result<String> {
    let mut attempt = 0;
    loop {
        let candidate = if attempt == 0 {
            filename.to_string()
        } else {
            suffixed(filename, attempt)
        };

        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(&candidate))
            .await
        {
            Ok(mut file) => {
                file.write_all(data).await?;
                file.flush().await?;
                return Ok(candidate);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < MAX_NAME_ATTEMPTS => {
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Size and type checks run before anything touches the disk.
pub fn validate_image(data: &[u8], content_type: &str) -> AppResult<()> {
    if data.len() > MAX_IMAGE_SIZE {
        return Err(AppError::PayloadTooLarge);
    }

    let content_type = content_type.trim().to_ascii_lowercase();
    if !content_type.starts_with("image/")
        || REJECTED_CONTENT_TYPES.contains(&content_type.as_str())
    {
        return Err(AppError::Validation(format!(
            "Unsupported file type: {}. Please upload an image",
            content_type
        )));
    }

    if !validate_magic_bytes(data, &content_type) {
        return Err(AppError::Validation(
            "File content does not match declared content type".to_string(),
        ));
    }

    Ok(())
}

pub struct UploadService;

impl UploadService {
    /// Store a post photo and return its public URL.
    pub async fn save_image(
        config: &UploadConfig,
        data: &[u8],
        content_type: &str,
        original_filename: &str,
    ) -> AppResult<String> {
        validate_image(data, content_type)?;

        let filename = stored_filename(chrono::Utc::now().timestamp_millis(), original_filename);
        let dir = Path::new(&config.upload_dir).join(PHOTO_SUBDIR);

        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to create upload directory: {}", e))
        })?;

        let filename = write_new_file(&dir, &filename, data)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to write file: {}", e)))?;

        tracing::info!(file = %filename, bytes = data.len(), "Image stored");
        Ok(config.public_url(&format!("{}/{}", PHOTO_SUBDIR, filename)))
    }
}
