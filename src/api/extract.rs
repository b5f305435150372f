//! JSON body access for handlers

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde_json::Value;

/// Request body as parsed by [`parse_json_body`](crate::api::middleware::parse_json_body).
///
/// `None` when the request did not declare a JSON content type or sent an
/// empty body.
#[derive(Debug, Clone, Default)]
pub struct JsonBody(pub Option<Value>);

#[async_trait]
impl<S> FromRequestParts<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<JsonBody>().cloned().unwrap_or_default())
    }
}
