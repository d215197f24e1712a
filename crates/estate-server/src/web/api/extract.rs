use crate::error::ApiError;
use axum::extract::{FromRequest, FromRequestParts};

// axum's own rejections answer in plain text (and with 415/422 for some
// body errors); these wrappers route them through `ApiError` instead.

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
