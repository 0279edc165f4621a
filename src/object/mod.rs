//! Record types and read/write operations for collection objects.
//!
//! A record is one uploaded item: an opaque binary payload transported as a
//! base64 string, plus string metadata. Records are immutable once written
//! except via delete-and-recreate, and their identifiers are server-assigned.

pub mod reader;
pub mod writer;

pub use writer::UploadItem;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BrocadeError, Result};

/// Server-assigned record identifier.
pub type RecordId = Uuid;

/// String metadata stored alongside a payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Display text for the record.
    pub text: String,
    /// Optional product identifier.
    #[serde(rename = "productId", skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
}

impl Metadata {
    /// Metadata with display text only.
    pub fn text_only<S: Into<String>>(text: S) -> Self {
        Metadata {
            text: text.into(),
            product_id: None,
        }
    }
}

/// One stored record as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Server-assigned identifier.
    pub id: RecordId,
    /// Collection the record belongs to.
    #[serde(rename = "class", default)]
    pub collection: String,
    /// Stored properties, including the base64-encoded payload.
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    /// A string property by name, if present.
    pub fn text_property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(|v| v.as_str())
    }

    /// Decode a blob property back to raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BrocadeError::NotFound`] when the property is missing and
    /// [`BrocadeError::InvalidOperation`] when it is not valid base64.
    pub fn blob_property(&self, name: &str) -> Result<Vec<u8>> {
        let encoded = self
            .text_property(name)
            .ok_or_else(|| BrocadeError::not_found(format!("property '{name}'")))?;
        BASE64.decode(encoded).map_err(|e| {
            BrocadeError::invalid_operation(format!("property '{name}' is not valid base64: {e}"))
        })
    }
}

/// Encode a payload to its text-safe transport form.
pub fn encode_payload(payload: &[u8]) -> String {
    BASE64.encode(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(properties: serde_json::Value) -> Record {
        Record {
            id: Uuid::nil(),
            collection: "Clothing".to_string(),
            properties: properties.as_object().unwrap().clone(),
        }
    }

    #[test]
    fn test_payload_round_trip() {
        let payload = b"\x89PNG\r\n\x1a\n fake image bytes";
        let encoded = encode_payload(payload);
        let record = sample_record(serde_json::json!({ "image": encoded }));
        assert_eq!(record.blob_property("image").unwrap(), payload);
    }

    #[test]
    fn test_missing_blob_property() {
        let record = sample_record(serde_json::json!({ "text": "denim jacket" }));
        let err = record.blob_property("image").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        let record = sample_record(serde_json::json!({ "image": "not@@base64!!" }));
        let err = record.blob_property("image").unwrap_err();
        assert!(matches!(err, BrocadeError::InvalidOperation(_)));
    }

    #[test]
    fn test_record_parsing() {
        let body = r#"{
            "id": "df2a2d1f-9b32-4bbe-a24e-05ba53d5e167",
            "class": "Clothing",
            "properties": { "text": "denim jacket", "productId": "sku-17" }
        }"#;
        let record: Record = serde_json::from_str(body).unwrap();
        assert_eq!(record.collection, "Clothing");
        assert_eq!(record.text_property("text"), Some("denim jacket"));
        assert_eq!(record.text_property("productId"), Some("sku-17"));
        assert_eq!(record.text_property("missing"), None);
    }

    #[test]
    fn test_metadata_serialization_skips_absent_product_id() {
        let metadata = Metadata::text_only("denim jacket");
        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value, serde_json::json!({ "text": "denim jacket" }));
    }
}
