//! Title, caption and header image shown above the form.
use std::fmt;
use std::path::{Path, PathBuf};

pub const TITLE: &str = "AI Travel Planner";
pub const CAPTION: &str = "Explore the world!";
pub const FALLBACK_IMAGE_URL: &str =
    "https://upload.wikimedia.org/wikipedia/commons/6/63/Travel_Illustration.png";

/// Image shown under the title.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BannerImage {
    Local(PathBuf),
    Remote(&'static str),
}

impl fmt::Display for BannerImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => f.write_str(url),
        }
    }
}

/// Picks the configured image when it exists, the fallback otherwise.
///
/// Returns a warning when a configured image is missing.
pub fn resolve_banner(configured: Option<&Path>) -> (BannerImage, Option<String>) {
    match configured {
        Some(path) if path.is_file() => (BannerImage::Local(path.to_path_buf()), None),
        Some(path) => {
            tracing::warn!(path = %path.display(), "banner image not found");
            (
                BannerImage::Remote(FALLBACK_IMAGE_URL),
                Some("Image not found! Using default image.".to_string()),
            )
        }
        None => (BannerImage::Remote(FALLBACK_IMAGE_URL), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_image_is_used() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let (image, warning) = resolve_banner(Some(file.path()));
        assert_eq!(image, BannerImage::Local(file.path().to_path_buf()));
        assert!(warning.is_none());
    }

    #[test]
    fn missing_image_falls_back_with_warning() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (image, warning) = resolve_banner(Some(&dir.path().join("img.png")));
        assert_eq!(image, BannerImage::Remote(FALLBACK_IMAGE_URL));
        assert!(warning.is_some());
    }

    #[test]
    fn unconfigured_image_uses_fallback_silently() {
        assert_eq!(
            resolve_banner(None),
            (BannerImage::Remote(FALLBACK_IMAGE_URL), None)
        );
    }
}
