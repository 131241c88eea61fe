//! Types for the upload pipeline.

use bytes::Bytes;
use mediagate_core::constants::{DEFAULT_LINK_ID, DEFAULT_SITE_ID, DEFAULT_UPLOAD_TYPE};
use serde::{Deserialize, Serialize};

use super::error::UploadError;

/// The single file an upload request carries.
#[derive(Clone, Debug)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl FileUpload {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One named output rendition. Wire name of `name` is `type`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSpec {
    #[serde(rename = "type")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u32>,
}

impl VariantSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            width: None,
            height: None,
            quality: None,
        }
    }

    /// Requested (width, height) when the variant needs a resize. Zero counts as unset.
    pub fn resize_dimensions(&self) -> Option<(Option<u32>, Option<u32>)> {
        let width = self.width.filter(|w| *w > 0);
        let height = self.height.filter(|h| *h > 0);
        if width.is_none() && height.is_none() {
            None
        } else {
            Some((width, height))
        }
    }

    /// Encoder quality in 1..=100. Zero means unset, larger values clamp to 100.
    pub fn quality_or(&self, default_quality: u8) -> u8 {
        match self.quality.filter(|q| *q > 0) {
            Some(q) => q.min(100) as u8,
            None => default_quality.min(100),
        }
    }
}

/// Variant list as received: either structured JSON or a JSON-encoded string
/// (multipart fields are always strings).
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum VariantSpecsInput {
    Serialized(String),
    Structured(serde_json::Value),
}

impl VariantSpecsInput {
    pub fn parse(&self) -> Result<Vec<VariantSpec>, UploadError> {
        let parsed = match self {
            VariantSpecsInput::Serialized(raw) => serde_json::from_str(raw),
            VariantSpecsInput::Structured(value) => Vec::<VariantSpec>::deserialize(value),
        };
        parsed.map_err(|e| UploadError::VariantParse(e.to_string()))
    }
}

impl From<Vec<VariantSpec>> for VariantSpecsInput {
    fn from(specs: Vec<VariantSpec>) -> Self {
        VariantSpecsInput::Structured(serde_json::to_value(specs).unwrap_or_default())
    }
}

/// A file as decoded from the form; content may be missing.
#[derive(Clone, Debug)]
pub struct FormFile {
    pub filename: String,
    pub content_type: String,
    pub content: Option<Bytes>,
}

/// Decoded upload form before defaults and file checks.
#[derive(Clone, Debug, Default)]
pub struct UploadForm {
    pub link_id: Option<String>,
    pub site_id: Option<String>,
    pub upload_type: Option<String>,
    pub upload_sizes: Option<VariantSpecsInput>,
    pub files: Vec<FormFile>,
}

impl UploadForm {
    /// Apply folder defaults and pick the first file.
    pub fn into_request(self) -> Result<UploadRequest, UploadError> {
        let file = self.files.into_iter().next().ok_or(UploadError::NoFiles)?;
        let data = file
            .content
            .filter(|content| !content.is_empty())
            .ok_or(UploadError::NoFile)?;

        Ok(UploadRequest {
            link_id: or_default(self.link_id, DEFAULT_LINK_ID),
            site_id: or_default(self.site_id, DEFAULT_SITE_ID),
            upload_type: or_default(self.upload_type, DEFAULT_UPLOAD_TYPE),
            variants: self.upload_sizes,
            file: FileUpload {
                filename: file.filename,
                content_type: file.content_type,
                data,
            },
        })
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Validated-shape upload request
#[derive(Clone, Debug)]
pub struct UploadRequest {
    pub link_id: String,
    pub site_id: String,
    pub upload_type: String,
    /// `None` plans the default "full" variant.
    pub variants: Option<VariantSpecsInput>,
    pub file: FileUpload,
}

/// Stored variant as reported to the client
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub mime_type: String,
    pub original_key: String,
    pub bucket: String,
    pub file_name: String,
    pub signed_url: Option<String>,
    pub cdn_url: String,
    /// Size of the submitted file, not of the stored variant.
    pub original_size: usize,
}

/// Successful upload response body
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub id: String,
    pub uploaded_files: Vec<UploadResult>,
}
