use mediagate_core::constants::{ALLOWED_MIME_TYPES, MAX_UPLOAD_BYTES};

/// Why an upload was refused by the acceptance policy
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    Size { size: usize, max: usize },

    #[error("Content type not allowed: {0}")]
    Type(String),
}

/// Size and declared media type gate for uploads.
///
/// Pure and total: a candidate is either accepted or refused with a [`Rejection`].
#[derive(Debug, Clone)]
pub struct FileAcceptancePolicy {
    max_bytes: usize,
    allowed_content_types: Vec<String>,
}

impl Default for FileAcceptancePolicy {
    fn default() -> Self {
        Self::new(
            MAX_UPLOAD_BYTES,
            ALLOWED_MIME_TYPES.iter().map(|t| t.to_string()).collect(),
        )
    }
}

impl FileAcceptancePolicy {
    pub fn new(max_bytes: usize, allowed_content_types: Vec<String>) -> Self {
        Self {
            max_bytes,
            allowed_content_types,
        }
    }

    /// Default allow-list with a different size ceiling.
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            ..Self::default()
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn check(&self, byte_length: usize, content_type: &str) -> Result<(), Rejection> {
        if byte_length > self.max_bytes {
            return Err(Rejection::Size {
                size: byte_length,
                max: self.max_bytes,
            });
        }

        if !self
            .allowed_content_types
            .iter()
            .any(|allowed| allowed == content_type)
        {
            return Err(Rejection::Type(content_type.to_string()));
        }

        Ok(())
    }

    pub fn accept(&self, byte_length: usize, content_type: &str) -> bool {
        self.check(byte_length, content_type).is_ok()
    }
}
