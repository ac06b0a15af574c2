//! Image input handling.
//!
//! Loads the file to diagnose, enforces the upload rules (PNG, JPEG or PDF,
//! at most 10 MB) and produces the base64 forms the providers embed.

use crate::error::{AnalysisError, Result};
use crate::log_debug;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use std::path::Path;

/// Largest file accepted for analysis
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Media types accepted for analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Png,
    Jpeg,
    Pdf,
}

impl MediaType {
    pub const fn mime(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Pdf => "application/pdf",
        }
    }

    /// Detect from the leading magic bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"%PDF-") {
            Some(Self::Pdf)
        } else {
            None
        }
    }

    pub fn from_extension(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// An in-memory file ready to be analyzed
#[derive(Debug, Clone)]
pub struct ImageFile {
    name: String,
    source: String,
    media_type: MediaType,
    bytes: Vec<u8>,
}

impl ImageFile {
    /// Read a file from disk, checking its size before loading it
    pub async fn from_path(path: impl AsRef<Path>, max_size: u64) -> Result<Self> {
        let path = path.as_ref();
        let read_error = |source| AnalysisError::FileRead {
            path: path.to_path_buf(),
            source,
        };

        let metadata = tokio::fs::metadata(path).await.map_err(read_error)?;
        if metadata.len() > max_size {
            return Err(AnalysisError::FileTooLarge {
                size: metadata.len(),
                limit: max_size,
            });
        }

        let bytes = tokio::fs::read(path).await.map_err(read_error)?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

        let mut file = Self::from_bytes(name, bytes, max_size)?;
        file.source = path.display().to_string();
        log_debug!(
            "Loaded {} ({} bytes, {})",
            file.source,
            file.len(),
            file.media_type
        );
        Ok(file)
    }

    /// Wrap bytes that are already in memory
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>, max_size: u64) -> Result<Self> {
        let name = name.into();
        let size = bytes.len() as u64;
        if size > max_size {
            return Err(AnalysisError::FileTooLarge {
                size,
                limit: max_size,
            });
        }

        let media_type = MediaType::sniff(&bytes)
            .or_else(|| MediaType::from_extension(&name))
            .ok_or_else(|| AnalysisError::UnsupportedMediaType(name.clone()))?;

        Ok(Self {
            source: name.clone(),
            name,
            media_type,
            bytes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the image came from: its path, or its name for in-memory files
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:` URI with the base64 payload, as used by OpenAI-style requests
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type.mime(), self.to_base64())
    }
}
