//! Caller-supplied dump metadata.
//!
//! Callers may attach a JSON object in the `X-Log-Server-Frontmatter` header.
//! It is rendered as one `key: value` line per entry for the notification
//! body.

use axum::http::{HeaderMap, HeaderName};
use serde_json::{Map, Value};
use thiserror::Error;

/// Header carrying the frontmatter JSON object.
pub static FRONTMATTER_HEADER: HeaderName = HeaderName::from_static("x-log-server-frontmatter");

#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("frontmatter header is not valid UTF-8")]
    NotUtf8,

    #[error("frontmatter is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frontmatter is not a JSON object")]
    NotObject,
}

/// Parse the frontmatter header into its rendered text block.
///
/// A missing header renders as an empty block. Values that are JSON strings
/// are written verbatim; anything else is written as compact JSON. Entries
/// keep the order they had in the header.
pub fn parse_frontmatter(headers: &HeaderMap) -> Result<String, FrontmatterError> {
    let Some(raw) = headers.get(&FRONTMATTER_HEADER) else {
        return Ok(String::new());
    };

    // `HeaderValue::to_str` only admits visible ASCII; callers may send UTF-8.
    let raw = std::str::from_utf8(raw.as_bytes()).map_err(|_| FrontmatterError::NotUtf8)?;
    let fields: Map<String, Value> = match serde_json::from_str(raw)? {
        Value::Object(fields) => fields,
        _ => return Err(FrontmatterError::NotObject),
    };

    let lines: Vec<String> = fields
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{}: {}", key, s),
            other => format!("{}: {}", key, other),
        })
        .collect();

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(&FRONTMATTER_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_missing_header_is_empty() {
        assert_eq!(parse_frontmatter(&HeaderMap::new()).unwrap(), "");
    }

    #[test]
    fn test_object_renders_lines_in_order() {
        let headers = headers_with(r#"{"version": "1.2.0", "build": 42, "beta": true}"#);
        assert_eq!(
            parse_frontmatter(&headers).unwrap(),
            "version: 1.2.0\nbuild: 42\nbeta: true"
        );
    }

    #[test]
    fn test_nested_values_render_as_json() {
        let headers = headers_with(r#"{"tags": ["a", "b"], "extra": null}"#);
        assert_eq!(
            parse_frontmatter(&headers).unwrap(),
            "tags: [\"a\",\"b\"]\nextra: null"
        );
    }

    #[test]
    fn test_empty_object() {
        assert_eq!(parse_frontmatter(&headers_with("{}")).unwrap(), "");
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            parse_frontmatter(&headers_with("{not json")),
            Err(FrontmatterError::Json(_))
        ));
    }

    #[test]
    fn test_non_object() {
        assert!(matches!(
            parse_frontmatter(&headers_with("[1, 2]")),
            Err(FrontmatterError::NotObject)
        ));
        assert!(matches!(
            parse_frontmatter(&headers_with("\"text\"")),
            Err(FrontmatterError::NotObject)
        ));
    }

    #[test]
    fn test_multibyte_utf8_is_kept() {
        let mut headers = HeaderMap::new();
        headers.insert(
            &FRONTMATTER_HEADER,
            HeaderValue::from_bytes("{\"user\": \"José\", \"city\": \"Zürich\"}".as_bytes()).unwrap(),
        );
        assert_eq!(
            parse_frontmatter(&headers).unwrap(),
            "user: José\ncity: Zürich"
        );
    }

    #[test]
    fn test_non_utf8() {
        let mut headers = HeaderMap::new();
        headers.insert(
            &FRONTMATTER_HEADER,
            HeaderValue::from_bytes(b"{\"k\": \"\xff\"}").unwrap(),
        );
        assert!(matches!(
            parse_frontmatter(&headers),
            Err(FrontmatterError::NotUtf8)
        ));
    }
}
