//! HTTP transport abstraction and response envelope decoding
//!
//! The controller never talks to the network directly; it goes through the
//! [`HttpResource`] trait, which is the crate's only external boundary. The
//! trait uses RPITIT (Return Position Impl Trait In Traits) for ergonomic
//! async methods without boxing.
//!
//! Every backend response wraps a `{ success, message, data }` envelope;
//! failures carry an `error` member. [`decode_envelope`] turns a raw
//! response into either the `data` payload or a classified [`ApiError`].

use std::future::Future;

use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, TransportError};
use crate::page::PageInfo;

mod rest;

pub use rest::{RestResource, StaticToken, TokenProvider};

/// A raw HTTP response: status plus the parsed JSON body
///
/// An empty body parses to `Value::Null`, which a 2xx status treats as an
/// empty success (the DELETE contract).
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body, `Null` when the body was empty
    pub body: Value,
}

/// Abstract REST client boundary
///
/// Concrete paths and verbs vary per entity but follow one shape uniformly;
/// the controller only ever needs this single request function.
///
/// # Example
///
/// ```rust,ignore
/// use listsync::transport::{HttpResource, RawResponse};
///
/// struct Recorder;
///
/// impl HttpResource for Recorder {
///     async fn request(
///         &self,
///         method: http::Method,
///         path: &str,
///         query: &[(String, String)],
///         body: Option<serde_json::Value>,
///     ) -> Result<RawResponse, listsync::error::TransportError> {
///         todo!()
///     }
/// }
/// ```
pub trait HttpResource: Send + Sync {
    /// Issue a single HTTP request against the backend
    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> impl Future<Output = std::result::Result<RawResponse, TransportError>> + Send;
}

/// The payload shape of a list response
#[derive(Debug, Clone, Deserialize)]
pub struct ListPayload<T> {
    /// The current page's entities, in server response order
    pub items: Vec<T>,
    /// The server's pagination block
    pub pagination: PageInfo,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error: Value,
}

#[derive(Debug, Deserialize)]
struct ItemPayload<T> {
    item: T,
}

/// Decode a raw response into its `data` payload or a classified error
///
/// Classification order: 404 becomes [`ApiError::NotFound`], 409 becomes
/// [`ApiError::Conflict`] with the structured payload, an `error` array of
/// `{field, message}` objects becomes [`ApiError::Validation`], anything
/// else unsuccessful becomes [`ApiError::Server`] with the server message
/// or a generic fallback.
pub fn decode_envelope(response: RawResponse) -> std::result::Result<Value, ApiError> {
    if response.body.is_null() {
        return if response.status.is_success() {
            Ok(Value::Null)
        } else {
            Err(classify(response.status, None, Value::Null, Value::Null))
        };
    }

    let envelope: Envelope = serde_json::from_value(response.body)
        .map_err(|e| ApiError::Decode(e.to_string()))?;

    if response.status.is_success() && envelope.success.unwrap_or(true) {
        Ok(envelope.data)
    } else {
        Err(classify(
            response.status,
            envelope.message,
            envelope.error,
            envelope.data,
        ))
    }
}

fn classify(status: StatusCode, message: Option<String>, error: Value, data: Value) -> ApiError {
    let message = message.unwrap_or_else(|| "request failed".to_string());

    if status == StatusCode::NOT_FOUND {
        return ApiError::NotFound(message);
    }
    if status == StatusCode::CONFLICT {
        let body = if error.is_null() { data } else { error };
        return ApiError::Conflict { message, body };
    }
    if let Some(fields) = field_errors(&error) {
        return ApiError::Validation { message, fields };
    }
    ApiError::Server(message)
}

/// Extract a field-to-message map from an `error` array of
/// `{field, message}` objects; the first message per field wins.
fn field_errors(error: &Value) -> Option<std::collections::HashMap<String, String>> {
    let entries = error.as_array()?;
    let mut fields = std::collections::HashMap::new();
    for entry in entries {
        let field = entry.get("field")?.as_str()?;
        let message = entry.get("message")?.as_str()?;
        fields
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }
    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}

/// Decode a list payload out of an envelope `data` value
pub fn decode_list<T: DeserializeOwned>(
    data: Value,
) -> std::result::Result<ListPayload<T>, ApiError> {
    serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Decode a single `{ item }` payload out of an envelope `data` value
pub fn decode_item<T: DeserializeOwned>(data: Value) -> std::result::Result<T, ApiError> {
    let payload: ItemPayload<T> =
        serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok(payload.item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: Value) -> RawResponse {
        RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body,
        }
    }

    #[test]
    fn test_success_envelope_yields_data() {
        let raw = response(
            200,
            json!({"success": true, "message": "ok", "data": {"item": {"id": 1}}}),
        );
        let data = decode_envelope(raw).unwrap();
        assert_eq!(data, json!({"item": {"id": 1}}));
    }

    #[test]
    fn test_empty_success_body() {
        let raw = response(200, Value::Null);
        assert_eq!(decode_envelope(raw).unwrap(), Value::Null);
    }

    #[test]
    fn test_not_found_classification() {
        let raw = response(404, json!({"success": false, "message": "Voucher not found"}));
        let err = decode_envelope(raw).unwrap_err();
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "Voucher not found"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_conflict_keeps_structured_payload() {
        let raw = response(
            409,
            json!({
                "success": false,
                "message": "Voucher already exists",
                "error": {"existingId": 17}
            }),
        );
        match decode_envelope(raw).unwrap_err() {
            ApiError::Conflict { message, body } => {
                assert_eq!(message, "Voucher already exists");
                assert_eq!(body, json!({"existingId": 17}));
            }
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_field_map() {
        let raw = response(
            422,
            json!({
                "success": false,
                "message": "Validation failed",
                "error": [
                    {"field": "title", "message": "Title is required"},
                    {"field": "title", "message": "Second message loses"},
                    {"field": "code", "message": "Code is taken"}
                ]
            }),
        );
        match decode_envelope(raw).unwrap_err() {
            ApiError::Validation { fields, .. } => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields["title"], "Title is required");
                assert_eq!(fields["code"], "Code is taken");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_failure_without_detail_is_generic() {
        let raw = response(500, json!({"success": false}));
        match decode_envelope(raw).unwrap_err() {
            ApiError::Server(msg) => assert_eq!(msg, "request failed"),
            other => panic!("expected Server, got {other:?}"),
        }
    }

    #[test]
    fn test_success_false_overrides_2xx() {
        let raw = response(200, json!({"success": false, "message": "soft failure"}));
        assert!(matches!(
            decode_envelope(raw).unwrap_err(),
            ApiError::Server(_)
        ));
    }

    #[test]
    fn test_decode_list_payload() {
        let data = json!({
            "items": [{"id": 1}, {"id": 2}],
            "pagination": {"currentPage": 1, "totalPages": 1, "totalCount": 2, "limit": 20}
        });

        #[derive(Debug, serde::Deserialize)]
        struct Row {
            id: u64,
        }

        let list: ListPayload<Row> = decode_list(data).unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[1].id, 2);
        assert_eq!(list.pagination.total_count, 2);
    }

    #[test]
    fn test_decode_item_payload() {
        #[derive(Debug, serde::Deserialize)]
        struct Row {
            id: u64,
        }

        let row: Row = decode_item(json!({"item": {"id": 9}})).unwrap();
        assert_eq!(row.id, 9);

        let err = decode_item::<Row>(json!({"id": 9})).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
