use std::path::{Path, PathBuf};

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::capture::error::CaptureError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Camera,
    Upload(PathBuf),
}

/// A captured or uploaded picture. Only bytes whose content sniffs as an
/// image type are accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StillImage {
    mime: &'static str,
    bytes: Vec<u8>,
    source: ImageSource,
}

impl StillImage {
    pub fn from_bytes(bytes: Vec<u8>, source: ImageSource) -> Result<Self, CaptureError> {
        let kind = infer::get(&bytes)
            .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
            .ok_or(CaptureError::NotAnImage)?;

        Ok(Self {
            mime: kind.mime_type(),
            bytes,
            source,
        })
    }

    pub async fn load(path: &Path) -> Result<Self, CaptureError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| CaptureError::Read {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Self::from_bytes(bytes, ImageSource::Upload(path.to_path_buf()))
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

#[cfg(test)]
pub(crate) const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52,
];
