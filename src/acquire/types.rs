use std::fmt;
use std::path::PathBuf;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Where one of the two try-on images comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Upload {
        path: PathBuf,
        content_type: Option<String>,
    },
    RemoteUrl {
        url: String,
    },
    CatalogRef {
        product_id: String,
        index: usize,
    },
}

impl ImageSource {
    pub fn upload(path: impl Into<PathBuf>) -> Self {
        Self::Upload {
            path: path.into(),
            content_type: None,
        }
    }

    pub fn remote(url: impl Into<String>) -> Self {
        Self::RemoteUrl { url: url.into() }
    }

    pub fn catalog(product_id: impl Into<String>, index: usize) -> Self {
        Self::CatalogRef {
            product_id: product_id.into(),
            index,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Upload { .. } => "upload",
            Self::RemoteUrl { .. } => "remoteUrl",
            Self::CatalogRef { .. } => "catalogRef",
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload { path, .. } => write!(f, "upload({})", path.display()),
            Self::RemoteUrl { url } => write!(f, "remoteUrl({url})"),
            Self::CatalogRef { product_id, index } => {
                write!(f, "catalogRef({product_id}[{index}])")
            }
        }
    }
}

/// Raw image payload owned by the request that fetched it.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBytes {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ImageBytes {
    /// Keeps `declared` when it names an image type, otherwise sniffs the magic bytes.
    pub fn new(bytes: Vec<u8>, declared: Option<&str>) -> Self {
        let content_type = match declared {
            Some(ct) if ct.trim().to_ascii_lowercase().starts_with("image/") => {
                ct.trim().to_ascii_lowercase()
            }
            _ => sniff_content_type(&bytes).to_string(),
        };
        Self {
            bytes,
            content_type,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File extension matching the content type, used when naming uploads.
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            "image/bmp" => "bmp",
            _ => "bin",
        }
    }
}

impl fmt::Debug for ImageBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBytes")
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

fn sniff_content_type(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or(OCTET_STREAM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0];

    #[test]
    fn test_declared_image_type_wins() {
        let img = ImageBytes::new(PNG_MAGIC.to_vec(), Some("Image/JPEG"));
        assert_eq!(img.content_type, "image/jpeg");
        assert_eq!(img.extension(), "jpg");
    }

    #[test]
    fn test_sniffs_when_declared_type_is_generic() {
        let img = ImageBytes::new(PNG_MAGIC.to_vec(), Some("application/octet-stream"));
        assert_eq!(img.content_type, "image/png");

        let img = ImageBytes::new(JPEG_MAGIC.to_vec(), None);
        assert_eq!(img.content_type, "image/jpeg");
    }

    #[test]
    fn test_unknown_bytes_fall_back_to_octet_stream() {
        let img = ImageBytes::new(b"not an image".to_vec(), None);
        assert_eq!(img.content_type, OCTET_STREAM);
        assert_eq!(img.extension(), "bin");
    }

    #[test]
    fn test_debug_omits_payload() {
        let img = ImageBytes::new(vec![7; 2048], Some("image/png"));
        let rendered = format!("{img:?}");
        assert!(rendered.contains("2048"));
        assert!(!rendered.contains("7, 7"));
    }

    #[test]
    fn test_source_display() {
        assert_eq!(
            ImageSource::catalog("p-1", 0).to_string(),
            "catalogRef(p-1[0])"
        );
        assert_eq!(ImageSource::remote("https://x/y.png").kind(), "remoteUrl");
    }
}
