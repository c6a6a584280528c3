use bytes::Bytes;
use std::path::Path;

use crate::preview::PreviewHandle;
use crate::validation::FileDescriptor;

/// A file offered for classification, before any validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub name: String,
    pub media_type: String,
    pub content: Bytes,
}

impl ImageCandidate {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            content: content.into(),
        }
    }

    /// Build a candidate whose media type is inferred from the file extension
    pub fn from_path_and_bytes(path: &Path, content: impl Into<Bytes>) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(name, media_type_for_path(path), content)
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

impl FileDescriptor for ImageCandidate {
    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn byte_size(&self) -> u64 {
        self.size()
    }
}

/// Declared media type for a path, based on its extension
pub fn media_type_for_path(path: &Path) -> String {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => mime::IMAGE_PNG.to_string(),
        "jpg" | "jpeg" => mime::IMAGE_JPEG.to_string(),
        "gif" => mime::IMAGE_GIF.to_string(),
        "bmp" => mime::IMAGE_BMP.to_string(),
        "svg" => mime::IMAGE_SVG.to_string(),
        "webp" => "image/webp".to_string(),
        "txt" => mime::TEXT_PLAIN.to_string(),
        _ => mime::APPLICATION_OCTET_STREAM.to_string(),
    }
}

/// A validated candidate together with its live preview handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    pub candidate: ImageCandidate,
    pub preview: PreviewHandle,
}
