//! Constants shared by the authorizer and the upload surface.

/// Largest upload accepted by the file acceptance policy (bytes).
pub const MAX_UPLOAD_BYTES: usize = 4_500_000;

/// Quality passed to the resizer when a variant does not declare one.
pub const DEFAULT_RESIZE_QUALITY: u8 = 80;

/// Largest width or height a resize may produce.
pub const MAX_RESIZE_DIMENSION: u32 = 8192;

/// Largest pixel count a resize may produce (about 160 MB as RGBA).
pub const MAX_RESIZE_PIXELS: u64 = 40_000_000;

/// Variant planned when a request names none.
pub const DEFAULT_VARIANT_NAME: &str = "full";

pub const DEFAULT_LINK_ID: &str = "temp";
pub const DEFAULT_SITE_ID: &str = "DefaultCompany";
pub const DEFAULT_UPLOAD_TYPE: &str = "media";

pub const DEFAULT_JWKS_URL: &str =
    "https://cognito-idp.eu-west-1.amazonaws.com/eu-west-1/.well-known/jwks.json";
pub const DEFAULT_CDN_BASE_URL: &str = "https://cdn2.example.com";

/// Raw tokens above this size are rejected before any decoding.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

pub const PNG_MIME_TYPE: &str = "image/png";
pub const JPEG_MIME_TYPE: &str = "image/jpeg";
pub const JPG_MIME_TYPE: &str = "image/jpg";
pub const WEBP_MIME_TYPE: &str = "image/webp";
pub const ICON_MIME_TYPE: &str = "image/vnd.microsoft.icon";
pub const MP3_MIME_TYPE: &str = "audio/mpeg";
pub const MP4_MIME_TYPE: &str = "video/mp4";
pub const MPEG_MIME_TYPE: &str = "video/mpeg";
pub const OGG_AUDIO_MIME_TYPE: &str = "audio/ogg";
pub const OGG_VIDEO_MIME_TYPE: &str = "video/ogg";
pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const WEBM_AUDIO_MIME_TYPE: &str = "audio/webm";
pub const WEBM_VIDEO_MIME_TYPE: &str = "video/webm";

/// Declared media types an upload may carry.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    PNG_MIME_TYPE,
    JPEG_MIME_TYPE,
    JPG_MIME_TYPE,
    ICON_MIME_TYPE,
    MP3_MIME_TYPE,
    MP4_MIME_TYPE,
    MPEG_MIME_TYPE,
    OGG_AUDIO_MIME_TYPE,
    OGG_VIDEO_MIME_TYPE,
    PDF_MIME_TYPE,
    WEBM_AUDIO_MIME_TYPE,
    WEBM_VIDEO_MIME_TYPE,
    WEBP_MIME_TYPE,
];
