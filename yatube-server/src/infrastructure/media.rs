use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::info;

const POST_IMAGE_DIR: &str = "posts";
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Error)]
pub(crate) enum MediaError {
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("failed to store upload")]
    Io(#[from] std::io::Error),
}

/// Uploaded files live under `root`; the database stores paths relative to it.
#[derive(Debug, Clone)]
pub(crate) struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    /// Writes a post image and returns its media-relative path.
    pub(crate) async fn save_post_image(
        &self,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String, MediaError> {
        let extension = image_extension(original_name)?;
        let stem = sanitize_stem(original_name);
        let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let relative = format!("{POST_IMAGE_DIR}/{stamp}-{stem}.{extension}");

        let dir = self.root.join(POST_IMAGE_DIR);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(self.root.join(&relative), bytes).await?;

        info!(path = %relative, size = bytes.len(), "post image stored");
        Ok(relative)
    }

    /// Deletes a previously stored image by its media-relative path.
    pub(crate) async fn remove(&self, relative: &str) -> Result<(), MediaError> {
        tokio::fs::remove_file(self.root.join(relative)).await?;
        info!(path = %relative, "post image removed");
        Ok(())
    }
}

pub(crate) fn image_extension(file_name: &str) -> Result<String, MediaError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(MediaError::UnsupportedType(file_name.to_string()))
    }
}

fn sanitize_stem(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    let cleaned: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(64)
        .collect();
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::{MediaStorage, image_extension, sanitize_stem};

    #[test]
    fn only_image_extensions_are_accepted() {
        assert_eq!(image_extension("cat.PNG").expect("png is allowed"), "png");
        assert_eq!(image_extension("photo.jpeg").expect("jpeg is allowed"), "jpeg");
        assert!(image_extension("notes.txt").is_err());
        assert!(image_extension("no_extension").is_err());
    }

    #[test]
    fn stem_is_reduced_to_safe_characters() {
        assert_eq!(sanitize_stem("../../etc/passwd.png"), "passwd");
        assert_eq!(sanitize_stem("мой кот.png"), "image");
        assert_eq!(sanitize_stem("small-cat_1.gif"), "small-cat_1");
    }

    #[tokio::test]
    async fn saved_image_lands_under_posts_dir() {
        let root = std::env::temp_dir().join(format!("yatube-media-{}", std::process::id()));
        let storage = MediaStorage::new(&root);

        let relative = storage
            .save_post_image("small.gif", b"GIF89a")
            .await
            .expect("image must be stored");

        assert!(relative.starts_with("posts/"));
        assert!(relative.ends_with("-small.gif"));
        let stored = tokio::fs::read(root.join(&relative))
            .await
            .expect("stored file must be readable");
        assert_eq!(stored, b"GIF89a");

        storage
            .remove(&relative)
            .await
            .expect("stored image must be removable");
        assert!(!root.join(&relative).exists());

        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
