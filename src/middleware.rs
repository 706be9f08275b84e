use axum::{
    Json,
    body::{Body, to_bytes},
    extract::Request,
    http::{
        HeaderName,
        header::{CONTENT_LENGTH, CONTENT_TYPE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::ErrorDetail;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

// Upper bound when reading a plain-text rejection body
const REJECTION_BODY_LIMIT: usize = 16 * 1024;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub reqid: String,
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub query: String,
    pub code: u16,
    pub message: String,
}

/// Rewrites every 4xx/5xx response into the `ErrorResponse` envelope.
///
/// Errors raised as `AppError` leave an `ErrorDetail` in the response extensions.
/// Framework rejections (bad JSON, unknown route) only have a text body, which
/// becomes the message.
pub async fn error_envelope(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or_default().to_string();
    let reqid = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("none")
        .to_string();

    let response = next.run(request).await;
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let detail = response.extensions().get::<ErrorDetail>().cloned();
    let (parts, body) = response.into_parts();

    let message = match detail {
        Some(detail) => detail.message,
        None => read_message(body).await.unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("error occurred")
                .to_string()
        }),
    };

    let envelope = ErrorResponse {
        reqid,
        method,
        path,
        query,
        code: status.as_u16(),
        message,
    };

    let mut rewritten = (status, Json(envelope)).into_response();
    for (name, value) in parts.headers.iter() {
        if name != CONTENT_LENGTH && name != CONTENT_TYPE {
            rewritten.headers_mut().insert(name.clone(), value.clone());
        }
    }
    rewritten
}

async fn read_message(body: Body) -> Option<String> {
    let bytes = to_bytes(body, REJECTION_BODY_LIMIT).await.ok()?;
    let text = String::from_utf8_lossy(&bytes).trim().to_string();
    (!text.is_empty()).then_some(text)
}
