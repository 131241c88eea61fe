mod form;

pub use form::{
    body_limit, read_multipart, read_upload_form, DirectFile, DirectUploadEvent, OneOrMany,
    FORM_OVERHEAD_BYTES,
};
