// Image upload validation rules

use thiserror::Error;

/// Largest accepted upload: 6 MiB
pub const MAX_IMAGE_BYTES: u64 = 6 * 1024 * 1024;

const IMAGE_TYPE_PREFIX: &str = "image/";

/// Anything with a declared media type and byte size
pub trait FileDescriptor {
    fn media_type(&self) -> &str;
    fn byte_size(&self) -> u64;
}

/// A file known only by its declared attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredFile {
    pub media_type: String,
    pub size: u64,
}

impl DeclaredFile {
    pub fn new(media_type: impl Into<String>, size: u64) -> Self {
        Self {
            media_type: media_type.into(),
            size,
        }
    }
}

impl FileDescriptor for DeclaredFile {
    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn byte_size(&self) -> u64 {
        self.size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid file type. Please upload an image.")]
    InvalidType,

    #[error("File too large. Maximum size is 6MB.")]
    TooLarge,
}

impl ValidationError {
    /// Short heading shown alongside the message
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::InvalidType => "Invalid file type",
            ValidationError::TooLarge => "File too large",
        }
    }
}

/// Decide whether `candidate` may be submitted. The type check wins over the size check.
pub fn validate<F: FileDescriptor + ?Sized>(candidate: &F) -> Result<(), ValidationError> {
    validate_media_type(candidate.media_type())?;
    validate_file_size(candidate.byte_size())
}

pub fn validate_media_type(media_type: &str) -> Result<(), ValidationError> {
    if media_type.starts_with(IMAGE_TYPE_PREFIX) {
        Ok(())
    } else {
        Err(ValidationError::InvalidType)
    }
}

pub fn validate_file_size(size: u64) -> Result<(), ValidationError> {
    if size > MAX_IMAGE_BYTES {
        return Err(ValidationError::TooLarge);
    }
    Ok(())
}
