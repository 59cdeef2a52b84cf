//! JSON/XML content negotiation.
//!
//! Request bodies are decoded by `Content-Type` (missing means JSON), responses
//! encoded by `Accept`. XML documents are rooted at the resource's singular
//! name; lists at the collection name with one child element per entity.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::errors::JsonApiError;

pub const JSON: &str = "application/json";
pub const XML: &str = "application/xml";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    pub fn mime(self) -> &'static str {
        match self {
            Format::Json => JSON,
            Format::Xml => XML,
        }
    }

    /// Format of a request body. `None` for media types we cannot decode.
    pub fn from_content_type(value: Option<&str>) -> Option<Format> {
        let Some(value) = value else { return Some(Format::Json) };
        let essence = value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match essence.as_str() {
            "application/json" => Some(Format::Json),
            "application/xml" | "text/xml" => Some(Format::Xml),
            _ => None,
        }
    }

    /// Response format for an `Accept` header. JSON when absent or tied; `None`
    /// when the header admits neither format.
    pub fn negotiate(accept: Option<&str>) -> Option<Format> {
        let Some(accept) = accept.map(str::trim).filter(|a| !a.is_empty()) else {
            return Some(Format::Json);
        };
        let ranges: Vec<MediaRange<'_>> = accept.split(',').filter_map(MediaRange::parse).collect();
        let json = quality(&ranges, "application", "json");
        let xml = quality(&ranges, "application", "xml").max(quality(&ranges, "text", "xml"));
        if json <= 0.0 && xml <= 0.0 {
            None
        } else if xml > json {
            Some(Format::Xml)
        } else {
            Some(Format::Json)
        }
    }

    pub fn decode<T: DeserializeOwned>(self, body: &[u8]) -> Result<T, String> {
        match self {
            Format::Json => serde_json::from_slice(body).map_err(|e| e.to_string()),
            Format::Xml => {
                let text = std::str::from_utf8(body).map_err(|e| e.to_string())?;
                quick_xml::de::from_str(text).map_err(|e| e.to_string())
            }
        }
    }

    pub fn encode<T: Serialize>(self, root: &str, value: &T) -> Result<String, String> {
        match self {
            Format::Json => serde_json::to_string(value).map_err(|e| e.to_string()),
            Format::Xml => quick_xml::se::to_string_with_root(root, value).map_err(|e| e.to_string()),
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<Format> {
        Format::negotiate(headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()))
    }
}

struct MediaRange<'a> {
    kind: &'a str,
    subtype: &'a str,
    q: f32,
}

impl<'a> MediaRange<'a> {
    fn parse(raw: &'a str) -> Option<Self> {
        let mut parts = raw.split(';');
        let (kind, subtype) = parts.next()?.trim().split_once('/')?;
        let mut q = 1.0;
        for param in parts {
            if let Some((k, v)) = param.split_once('=') {
                if k.trim().eq_ignore_ascii_case("q") {
                    q = v.trim().parse::<f32>().ok()?.clamp(0.0, 1.0);
                }
            }
        }
        Some(Self { kind: kind.trim(), subtype: subtype.trim(), q })
    }

    fn specificity(&self, kind: &str, subtype: &str) -> Option<u8> {
        match (self.kind, self.subtype) {
            ("*", "*") => Some(0),
            (k, "*") if k.eq_ignore_ascii_case(kind) => Some(1),
            (k, s) if k.eq_ignore_ascii_case(kind) && s.eq_ignore_ascii_case(subtype) => Some(2),
            _ => None,
        }
    }
}

/// q-value of the most specific range matching `kind/subtype`, 0 when none does.
fn quality(ranges: &[MediaRange<'_>], kind: &str, subtype: &str) -> f32 {
    ranges
        .iter()
        .filter_map(|r| r.specificity(kind, subtype).map(|s| (s, r.q)))
        .max_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)))
        .map(|(_, q)| q)
        .unwrap_or(0.0)
}

/// Response format negotiated from `Accept`; rejects with 406.
#[async_trait]
impl<S> FromRequestParts<S> for Format
where
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Format::from_headers(&parts.headers).ok_or_else(|| {
            JsonApiError::new(
                StatusCode::NOT_ACCEPTABLE,
                "Not Acceptable",
                Some(format!("supported media types: {JSON}, {XML}")),
            )
        })
    }
}

/// Sequence of entities serialised as `<collection><name/>…</collection>` in XML
/// and as a plain array in JSON.
pub struct Collection<'a, T> {
    pub element: &'static str,
    pub items: &'a [T],
}

impl<T: Serialize> Serialize for Collection<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Collection", 1)?;
        s.serialize_field(self.element, self.items)?;
        s.end()
    }
}

/// Encode `value` in `format` under `root` and wrap it in a response.
pub fn render<T: Serialize>(format: Format, status: StatusCode, root: &str, value: &T) -> Response {
    match format.encode(root, value) {
        Ok(body) => (status, [(header::CONTENT_TYPE, format.mime())], body).into_response(),
        Err(e) => JsonApiError::internal(e).into_response(),
    }
}

pub fn render_list<T: Serialize>(format: Format, collection: &str, element: &'static str, items: &[T]) -> Response {
    match format {
        Format::Json => render(format, StatusCode::OK, collection, &items),
        Format::Xml => render(format, StatusCode::OK, collection, &Collection { element, items }),
    }
}
