//! Shared key derivation for storage backends.
//!
//! Key format: `{siteId}/{uploadType}/{linkId}/{uploadId}_{variant}_{filename}`.

use std::fmt;

/// Turn a free-form name into a key-safe token.
///
/// Lower-cases the input, replaces each run of whitespace with `_`, then replaces
/// each run of characters outside `[A-Za-z0-9_-]` with a single `.`.
/// Distinct inputs can collapse to the same token (`"a!b"` and `"a?b"`).
pub fn sanitize_segment(input: &str) -> String {
    let lowered = input.to_lowercase();

    let mut spaced = String::with_capacity(lowered.len());
    let mut in_whitespace = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                spaced.push('_');
            }
            in_whitespace = true;
        } else {
            spaced.push(c);
            in_whitespace = false;
        }
    }

    let mut out = String::with_capacity(spaced.len());
    let mut in_other = false;
    for c in spaced.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
            in_other = false;
        } else {
            if !in_other {
                out.push('.');
            }
            in_other = true;
        }
    }
    out
}

/// Public retrieval URL for a key as reported by a storage backend.
pub fn cdn_url(base_url: &str, stored_key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), stored_key)
}

/// Deterministic storage key for one variant of one upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Derive the key for a variant. The folder segments are used as given;
    /// the variant name and filename are sanitized.
    pub fn derive(
        site_id: &str,
        upload_type: &str,
        link_id: &str,
        upload_id: &str,
        variant_name: &str,
        filename: &str,
    ) -> Self {
        StorageKey(format!(
            "{}/{}/{}/{}_{}_{}",
            site_id,
            upload_type,
            link_id,
            upload_id,
            sanitize_segment(variant_name),
            sanitize_segment(filename)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Public retrieval URL for this key under `base_url`.
    pub fn cdn_url(&self, base_url: &str) -> String {
        cdn_url(base_url, &self.0)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
