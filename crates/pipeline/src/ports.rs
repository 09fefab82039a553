//! Port traits implemented by infrastructure crates.
//!
//! The pipeline never performs I/O itself. Solving and color recognition are
//! external oracles reached through [`SolvingOracle`] and [`VisionOracle`];
//! photographs arrive through [`ImageUpload`]. Concrete implementations are
//! constructed in the composition root and injected, which also lets tests
//! run the whole pipeline without network access.

use async_trait::async_trait;

use crate::errors::{OracleError, VisionError};
use crate::FaceletString;

/// An external capability that finds a move sequence for a cube.
#[async_trait]
pub trait SolvingOracle: Send + Sync {
    /// Short label for logs (e.g. `"http"`, `"command"`).
    fn name(&self) -> &str;

    /// Returns the oracle's raw reply: whitespace-separated move tokens.
    ///
    /// # Errors
    ///
    /// [`OracleError::SolveFailure`] carrying the oracle's message when it
    /// cannot solve the facelets; [`OracleError::Unavailable`] when it cannot
    /// be reached.
    async fn solve(&self, facelets: &FaceletString) -> Result<String, OracleError>;
}

/// Everything a vision oracle needs to classify one face photograph.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub image: Vec<u8>,
    /// MIME type of `image`, e.g. `"image/png"`.
    pub mime_type: &'static str,
    /// Natural-language instruction naming the face and the permitted colors.
    pub prompt: String,
}

/// An external capability that reads sticker colors off a photograph.
#[async_trait]
pub trait VisionOracle: Send + Sync {
    /// Short label for logs (e.g. `"gemini"`).
    fn name(&self) -> &str;

    /// Returns the oracle's free-form reply text.
    async fn classify(&self, request: VisionRequest) -> Result<String, VisionError>;
}

/// A photograph supplied by a caller, with a backing resource that must be
/// released once read.
#[async_trait]
pub trait ImageUpload: Send {
    /// Original file name; its extension selects the MIME type.
    fn file_name(&self) -> &str;

    /// Size of the image in bytes, if known without reading it.
    fn size_hint(&self) -> Option<u64>;

    /// Reads the whole image.
    async fn read(&mut self) -> std::io::Result<Vec<u8>>;

    /// Discards the backing bytes or file. Called exactly once by the
    /// acquirer, whatever the outcome of acquisition.
    async fn release(&mut self);
}

/// An upload already held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryImage {
    name: String,
    bytes: Option<Vec<u8>>,
}

impl InMemoryImage {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes: Some(bytes),
        }
    }

    /// Returns `true` once the bytes have been released.
    pub fn is_released(&self) -> bool {
        self.bytes.is_none()
    }
}

#[async_trait]
impl ImageUpload for InMemoryImage {
    fn file_name(&self) -> &str {
        &self.name
    }

    fn size_hint(&self) -> Option<u64> {
        self.bytes.as_ref().map(|b| b.len() as u64)
    }

    async fn read(&mut self) -> std::io::Result<Vec<u8>> {
        self.bytes.clone().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "image already released")
        })
    }

    async fn release(&mut self) {
        self.bytes = None;
    }
}
