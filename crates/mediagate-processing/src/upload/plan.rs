//! Expansion of a request's variant list into keyed work items.

use mediagate_core::constants::DEFAULT_VARIANT_NAME;
use mediagate_storage::StorageKey;

use super::error::UploadError;
use super::types::{UploadRequest, VariantSpec};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedVariant {
    pub spec: VariantSpec,
    pub key: StorageKey,
}

/// Ordered per-variant work for one upload id.
#[derive(Clone, Debug)]
pub struct VariantPlan {
    upload_id: String,
    variants: Vec<PlannedVariant>,
}

impl VariantPlan {
    /// Plan every requested variant, in request order.
    ///
    /// An absent list plans a single "full" variant; an explicit empty list is
    /// refused with [`UploadError::NoVariants`].
    pub fn expand(request: &UploadRequest, upload_id: &str) -> Result<Self, UploadError> {
        let specs = match &request.variants {
            Some(input) => input.parse()?,
            None => vec![VariantSpec::named(DEFAULT_VARIANT_NAME)],
        };

        if specs.is_empty() {
            return Err(UploadError::NoVariants);
        }

        let variants = specs
            .into_iter()
            .map(|spec| {
                let key = StorageKey::derive(
                    &request.site_id,
                    &request.upload_type,
                    &request.link_id,
                    upload_id,
                    &spec.name,
                    &request.file.filename,
                );
                PlannedVariant { spec, key }
            })
            .collect();

        Ok(VariantPlan {
            upload_id: upload_id.to_string(),
            variants,
        })
    }

    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }

    pub fn variants(&self) -> &[PlannedVariant] {
        &self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::types::{FileUpload, VariantSpecsInput};
    use bytes::Bytes;
    use serde_json::json;

    fn request(variants: Option<VariantSpecsInput>) -> UploadRequest {
        UploadRequest {
            link_id: "post-42".into(),
            site_id: "Acme".into(),
            upload_type: "media".into(),
            variants,
            file: FileUpload {
                filename: "Beach Day.JPG".into(),
                content_type: "image/jpeg".into(),
                data: Bytes::from_static(b"jpeg"),
            },
        }
    }

    #[test]
    fn test_defaults_to_single_full_variant() {
        let plan = VariantPlan::expand(&request(None), "u1").unwrap();

        assert_eq!(plan.len(), 1);
        let only = &plan.variants()[0];
        assert_eq!(only.spec, VariantSpec::named("full"));
        assert_eq!(only.spec.resize_dimensions(), None);
        assert_eq!(only.key.as_str(), "Acme/media/post-42/u1_full_beach_day.jpg");
    }

    #[test]
    fn test_keeps_request_order_and_sanitizes_names() {
        let input = VariantSpecsInput::Structured(json!([
            {"type": "Hero Image", "width": 1200},
            {"type": "thumb", "width": 100, "height": 100, "quality": 60}
        ]));
        let plan = VariantPlan::expand(&request(Some(input)), "u2").unwrap();

        let keys: Vec<&str> = plan.variants().iter().map(|v| v.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "Acme/media/post-42/u2_hero_image_beach_day.jpg",
                "Acme/media/post-42/u2_thumb_beach_day.jpg",
            ]
        );
        assert_eq!(plan.upload_id(), "u2");
    }

    #[test]
    fn test_same_request_same_keys() {
        let input = VariantSpecsInput::Serialized(r#"[{"type":"full"},{"type":"small"}]"#.into());
        let req = request(Some(input));
        let a = VariantPlan::expand(&req, "same").unwrap();
        let b = VariantPlan::expand(&req, "same").unwrap();
        assert_eq!(a.variants(), b.variants());
    }

    #[test]
    fn test_empty_list_is_refused() {
        let err = VariantPlan::expand(
            &request(Some(VariantSpecsInput::Structured(json!([])))),
            "u3",
        )
        .unwrap_err();
        assert!(matches!(err, UploadError::NoVariants));

        let err = VariantPlan::expand(
            &request(Some(VariantSpecsInput::Serialized("[]".into()))),
            "u3",
        )
        .unwrap_err();
        assert!(matches!(err, UploadError::NoVariants));
    }

    #[test]
    fn test_unparsable_list_is_a_request_error() {
        let err = VariantPlan::expand(
            &request(Some(VariantSpecsInput::Serialized("[{".into()))),
            "u4",
        )
        .unwrap_err();
        assert!(matches!(err, UploadError::VariantParse(_)));
    }
}
