//! Object-storage configuration and upload descriptors.

use serde::{Deserialize, Serialize};

use crate::domain::types::BucketName;

/// Default bucket holding product images and brand logos.
pub const PRODUCT_IMAGES_BUCKET: &str = "product-images";

/// Largest accepted image, 5 MiB.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// MIME types the product image bucket accepts.
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Settings a bucket is created with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BucketConfig {
    pub name: BucketName,
    /// Objects are readable without credentials.
    pub public: bool,
    pub allowed_mime_types: Vec<String>,
    pub max_bytes: usize,
}

impl BucketConfig {
    /// Public image bucket limited to JPEG/PNG/WebP up to 5 MiB.
    pub fn product_images(name: BucketName) -> Self {
        Self {
            name,
            public: true,
            allowed_mime_types: ALLOWED_IMAGE_TYPES.iter().map(|t| t.to_string()).collect(),
            max_bytes: MAX_IMAGE_BYTES,
        }
    }

    /// An empty allow-list accepts every type.
    pub fn accepts_mime(&self, content_type: &str) -> bool {
        self.allowed_mime_types.is_empty()
            || self
                .allowed_mime_types
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
    }
}

/// Outcome of the most recent bootstrap attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum BootstrapState {
    Unchecked,
    Ready,
    /// Carries the cause reported by the storage backend.
    Failed(String),
}

impl BootstrapState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// What an uploaded image is for; decides its object path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    ProductImage,
    BrandLogo,
}

impl UploadTarget {
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::ProductImage => "products/gallery",
            Self::BrandLogo => "brands",
        }
    }

    pub const fn stem(self) -> &'static str {
        match self {
            Self::ProductImage => "product",
            Self::BrandLogo => "brand-logo",
        }
    }
}

/// Raw image selected by the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: Option<&str>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.map(str::to_string),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Extension taken from the original file name, falling back to the MIME subtype.
    pub fn extension(&self) -> String {
        let from_name = std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty());

        match (from_name, self.content_type.as_deref()) {
            (Some(ext), _) => ext.to_ascii_lowercase(),
            (None, Some("image/jpeg")) => "jpg".to_string(),
            (None, Some(content_type)) => content_type
                .split_once('/')
                .map(|(_, subtype)| subtype.to_string())
                .unwrap_or_else(|| "bin".to_string()),
            (None, None) => "bin".to_string(),
        }
    }
}

/// Builds `<prefix>/<stem>-<millis>-<suffix>.<ext>`.
pub fn object_path(target: UploadTarget, timestamp_millis: i64, suffix: &str, ext: &str) -> String {
    format!(
        "{}/{}-{timestamp_millis}-{suffix}.{ext}",
        target.prefix(),
        target.stem()
    )
}
