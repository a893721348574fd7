use bytes::Bytes;
use std::path::Path;

use crate::errors::{AdminError, AdminResult};

/// Upper bound for attached images. Files above this are rejected before
/// any request is built.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Image content types the backend accepts.
pub const ALLOWED_IMAGE_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// An image file staged for upload. Validation happens client-side so a
/// rejected file never costs a round trip.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk and infers its content type from the
    /// extension, then validates it like any other upload.
    pub fn from_path(path: &Path) -> AdminResult<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AdminError::Validation("Invalid file name".into()))?
            .to_string();
        let content_type = content_type_for(&file_name);
        let bytes = std::fs::read(path)
            .map_err(|e| AdminError::Validation(format!("Cannot read {}: {}", file_name, e)))?;

        let upload = Self::new(file_name, content_type, bytes);
        upload.validate()?;
        Ok(upload)
    }

    /// Enforces the content-type allow-list and the size ceiling.
    pub fn validate(&self) -> AdminResult<()> {
        if !ALLOWED_IMAGE_TYPES.contains(&self.content_type.as_str()) {
            return Err(AdminError::Validation(format!(
                "File type {} is not allowed. Use JPEG, PNG, GIF or WebP.",
                self.content_type
            )));
        }
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AdminError::Validation(
                "File is too large. Maximum size is 10 MB.".into(),
            ));
        }
        Ok(())
    }
}

fn content_type_for(file_name: &str) -> String {
    let extension = file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
    .to_string()
}
