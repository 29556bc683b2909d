//! Vehicle image storage on local disk.
//!
//! Files land in `{root}/vehicles/` and are served back under `/uploads/`.

use chrono::Utc;
use std::path::{Path, PathBuf};

/// Largest accepted image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// URL prefix the upload directory is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Upload directory plus the optional absolute base for returned URLs.
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
    public_base_url: Option<String>,
}

impl UploadDir {
    /// Store under `root`; returned URLs are relative unless a base is set.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_base_url: Option<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.map(|base| base.trim_end_matches('/').to_string()),
        }
    }

    /// Directory served under [`PUBLIC_PREFIX`].
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a vehicle image and return its public URL.
    ///
    /// # Errors
    ///
    /// Directory creation or write failure.
    pub async fn save_vehicle_image(&self, original_name: &str, bytes: &[u8]) -> std::io::Result<String> {
        let dir = self.root.join("vehicles");
        tokio::fs::create_dir_all(&dir).await?;

        let filename = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(original_name)
        );
        tokio::fs::write(dir.join(&filename), bytes).await?;
        tracing::info!(file = %filename, size = bytes.len(), "vehicle image stored");

        let path = format!("{PUBLIC_PREFIX}/vehicles/{filename}");
        Ok(match &self.public_base_url {
            Some(base) => format!("{base}{path}"),
            None => path,
        })
    }
}

impl Default for UploadDir {
    fn default() -> Self {
        Self::new("public/uploads", None)
    }
}

/// Keep ASCII letters, digits, `.` and `-`; everything else becomes `_`.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-') { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn file_names_lose_separators_and_spaces() {
        assert_eq!(sanitize_file_name("my car (1).png"), "my_car__1_.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name(""), "image");
    }

    #[tokio::test]
    async fn saved_images_get_a_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path(), Some("https://cdn.example/".to_string()));

        let url = uploads.save_vehicle_image("sedan.jpg", b"jpeg").await.unwrap();
        let filename = url.rsplit('/').next().unwrap();

        assert!(url.starts_with("https://cdn.example/uploads/vehicles/"));
        assert!(filename.ends_with("-sedan.jpg"));
        let stored = std::fs::read(dir.path().join("vehicles").join(filename)).unwrap();
        assert_eq!(stored, b"jpeg");
    }
}
