//! Request middleware shared by every route.

use std::borrow::Cow;

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Request},
    http::{header, uri::PathAndQuery, HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::extract::JsonBody;
use crate::api::handlers::ApiError;

/// Rewrite the request path before routing: ASCII case is folded and trailing
/// slashes are dropped, so `/API/complaints/` routes like `/api/complaints`.
pub async fn normalize_path(mut req: Request, next: Next) -> Response {
    if let Cow::Owned(path) = normalized(req.uri().path()) {
        match rewrite_path(req.uri(), &path) {
            Some(uri) => *req.uri_mut() = uri,
            None => tracing::debug!(%path, "Keeping original URI; normalised path is invalid"),
        }
    }

    next.run(req).await
}

/// Parse JSON-typed bodies for every route. The parsed value is stored as a
/// [`JsonBody`] request extension and the raw bytes are put back on the
/// request. Malformed JSON never reaches a handler.
pub async fn parse_json_body(mut req: Request, next: Next) -> Response {
    if !has_json_content_type(req.headers()) {
        req.extensions_mut().insert(JsonBody(None));
        return next.run(req).await;
    }

    let (mut parts, body) = req.into_parts();
    let bytes = match Bytes::from_request(Request::from_parts(parts.clone(), body), &()).await {
        Ok(bytes) => bytes,
        Err(rejection) => {
            return ApiError::new(rejection.status(), rejection.body_text()).into_response()
        }
    };

    let parsed = if bytes.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!(
                    error = %err,
                    path = %parts.uri.path(),
                    "Rejecting malformed JSON body"
                );
                return ApiError::bad_request(format!("Invalid JSON body: {err}")).into_response();
            }
        }
    };

    parts.extensions.insert(JsonBody(parsed));
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn normalized(path: &str) -> Cow<'_, str> {
    let trimmed = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    if trimmed.len() == path.len() && !trimmed.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(trimmed.to_ascii_lowercase())
    }
}

fn rewrite_path(uri: &Uri, path: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}
