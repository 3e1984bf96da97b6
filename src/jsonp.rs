use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::{ApiError, ProxyError};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const SCRIPT_CONTENT_TYPE: &str = "application/javascript";

/// A JSONP callback name: one or more JavaScript identifiers joined by dots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback(String);

impl Callback {
    /// Validates an optional `callback` parameter. Blank values mean plain JSON.
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, ProxyError> {
        let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };
        if raw.split('.').all(is_identifier) {
            Ok(Some(Self(raw.to_string())))
        } else {
            Err(ProxyError::InvalidCallback(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Serializes `payload` as JSON, or as `callback(json)` when a callback is given.
pub fn render<T: Serialize>(payload: &T, callback: Option<&Callback>) -> Result<Response, ApiError> {
    let json = serde_json::to_string(payload).map_err(|e| {
        tracing::error!("Failed to serialize response: {}", e);
        ApiError::new(
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to serialize response",
        )
    })?;
    let response = match callback {
        Some(cb) => (
            [(header::CONTENT_TYPE, SCRIPT_CONTENT_TYPE)],
            format!("{}({})", cb.as_str(), json),
        )
            .into_response(),
        None => ([(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], json).into_response(),
    };
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn test_callback_validation() {
        assert_eq!(Callback::parse(None).unwrap(), None);
        assert_eq!(Callback::parse(Some("  ")).unwrap(), None);
        assert_eq!(Callback::parse(Some("foo")).unwrap().unwrap().as_str(), "foo");
        assert!(Callback::parse(Some("jQuery_123.cb$")).unwrap().is_some());
        assert!(Callback::parse(Some("alert(1)")).is_err());
        assert!(Callback::parse(Some("1abc")).is_err());
        assert!(Callback::parse(Some("a..b")).is_err());
        assert!(Callback::parse(Some("a;b")).is_err());
    }

    #[tokio::test]
    async fn test_render_jsonp_wraps_payload() {
        let cb = Callback::parse(Some("foo")).unwrap();
        let response = render(&serde_json::json!({"a": 1}), cb.as_ref()).unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            SCRIPT_CONTENT_TYPE
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"foo({"a":1})"#);
    }

    #[tokio::test]
    async fn test_render_plain_json() {
        let response = render(&vec![1, 2, 3], None).unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], JSON_CONTENT_TYPE);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"[1,2,3]");
    }
}
