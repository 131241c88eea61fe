//! Decoding of upload requests into an [`UploadForm`].
//!
//! Two request shapes are accepted:
//! - `multipart/form-data` with text fields `linkID`, `siteID`, `uploadType`,
//!   `uploadSizes` and a file field named `files` or `file`.
//! - a JSON "direct" event carrying the same fields, `"direct": true` and the
//!   file content as base64.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::{header::CONTENT_TYPE, StatusCode};
use axum::Json;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use mediagate_processing::{FormFile, UploadError, UploadForm, VariantSpecsInput};
use serde::Deserialize;

/// Room for multipart boundaries, headers and the text fields.
pub const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Largest request body the upload route reads for a given file cap.
/// Direct events carry base64, hence the 4/3.
pub fn body_limit(max_upload_bytes: usize) -> usize {
    (max_upload_bytes / 3 + 1)
        .saturating_mul(4)
        .saturating_add(FORM_OVERHEAD_BYTES)
}

/// Decode either request shape, chosen by content type.
pub async fn read_upload_form(request: Request, max_bytes: usize) -> Result<UploadForm, UploadError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/json") {
        let Json(event) = Json::<DirectUploadEvent>::from_request(request, &())
            .await
            .map_err(|rejection| {
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    too_large(max_bytes)
                } else {
                    UploadError::Form(format!("Invalid upload event: {}", rejection.body_text()))
                }
            })?;
        return event.into_form();
    }

    let multipart = Multipart::from_request(request, &())
        .await
        .map_err(|rejection| UploadError::Form(rejection.body_text()))?;
    read_multipart(multipart, max_bytes).await
}

/// Collect multipart fields. Unknown fields are skipped.
pub async fn read_multipart(mut multipart: Multipart, max_bytes: usize) -> Result<UploadForm, UploadError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "linkID" => form.link_id = Some(text(field, max_bytes).await?),
            "siteID" => form.site_id = Some(text(field, max_bytes).await?),
            "uploadType" => form.upload_type = Some(text(field, max_bytes).await?),
            "uploadSizes" => {
                let raw = text(field, max_bytes).await?;
                if !raw.trim().is_empty() {
                    form.upload_sizes = Some(VariantSpecsInput::Serialized(raw));
                }
            }
            "files" | "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, max_bytes))?;

                tracing::debug!(
                    filename = %filename,
                    content_type = %content_type,
                    size_bytes = content.len(),
                    "Received file part"
                );

                form.files.push(FormFile {
                    filename,
                    content_type,
                    content: Some(content),
                });
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown form field");
            }
        }
    }

    Ok(form)
}

async fn text(field: Field<'_>, max_bytes: usize) -> Result<String, UploadError> {
    field.text().await.map_err(|e| multipart_error(e, max_bytes))
}

fn multipart_error(err: MultipartError, max_bytes: usize) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large(max_bytes)
    } else {
        UploadError::Form(format!("Invalid multipart body: {}", err.body_text()))
    }
}

fn too_large(max_bytes: usize) -> UploadError {
    UploadError::BodyTooLarge { max_bytes }
}

/// JSON upload event, used when the caller has already decoded the form.
#[derive(Debug, Deserialize)]
pub struct DirectUploadEvent {
    #[serde(default)]
    pub direct: bool,
    #[serde(rename = "linkID", default)]
    pub link_id: Option<String>,
    #[serde(rename = "siteID", default)]
    pub site_id: Option<String>,
    #[serde(rename = "uploadType", default)]
    pub upload_type: Option<String>,
    #[serde(rename = "uploadSizes", default)]
    pub upload_sizes: Option<VariantSpecsInput>,
    #[serde(default)]
    pub files: Option<OneOrMany<DirectFile>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectFile {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub content_type: String,
    /// Base64 (standard alphabet).
    #[serde(default)]
    pub content: Option<String>,
}

impl DirectUploadEvent {
    pub fn into_form(self) -> Result<UploadForm, UploadError> {
        if !self.direct {
            return Err(UploadError::Form(
                "JSON upload events must set \"direct\": true".to_string(),
            ));
        }

        let files = self
            .files
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .map(|file| {
                let content = file
                    .content
                    .map(|encoded| STANDARD.decode(encoded.trim()))
                    .transpose()
                    .map_err(|_| UploadError::Form("File content is not valid base64".to_string()))?
                    .map(Bytes::from);

                Ok(FormFile {
                    filename: file.filename,
                    content_type: file.content_type,
                    content,
                })
            })
            .collect::<Result<Vec<_>, UploadError>>()?;

        Ok(UploadForm {
            link_id: self.link_id,
            site_id: self.site_id,
            upload_type: self.upload_type,
            upload_sizes: self.upload_sizes,
            files,
        })
    }
}
