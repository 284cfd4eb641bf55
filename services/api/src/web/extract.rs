//! services/api/src/web/extract.rs
//!
//! Extractors whose rejections are rendered through `HttpError`, so malformed
//! bodies and ids get the same `{"error": ...}` shape as every other failure.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::HttpError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(HttpError))]
pub struct JsonBody<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(HttpError))]
pub struct PathParams<T>(pub T);
