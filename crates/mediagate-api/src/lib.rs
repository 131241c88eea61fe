//! Mediagate API Library
//!
//! HTTP surface for the gateway token authorizer and the media upload
//! endpoint, plus application setup.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{AuthRejection, HttpAppError, UploadResponse};
pub use state::AppState;
