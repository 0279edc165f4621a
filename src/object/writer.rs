//! Upload operations: single records and bounded batches.

use serde::Serialize;

use crate::batch::{self, BatchOutcome};
use crate::client::IndexClient;
use crate::error::Result;
use crate::object::{Metadata, RecordId, encode_payload};

/// One item of a batch upload.
#[derive(Debug, Clone)]
pub struct UploadItem {
    /// Label used in batch outcome reporting (typically the file name).
    pub label: String,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
    /// Metadata stored alongside the payload.
    pub metadata: Metadata,
}

/// Wire shape of an object creation request.
#[derive(Debug, Serialize)]
struct NewObject<'a> {
    class: &'a str,
    properties: serde_json::Value,
}

/// The slice of the creation response we care about.
#[derive(Debug, serde::Deserialize)]
struct CreatedObject {
    id: RecordId,
}

fn build_properties(payload: &[u8], metadata: &Metadata) -> serde_json::Value {
    let mut properties = serde_json::Map::new();
    properties.insert("image".to_string(), encode_payload(payload).into());
    properties.insert("text".to_string(), metadata.text.clone().into());
    if let Some(product_id) = &metadata.product_id {
        properties.insert("productId".to_string(), product_id.clone().into());
    }
    serde_json::Value::Object(properties)
}

impl IndexClient {
    /// Upload one record and return its server-assigned id.
    ///
    /// The payload is base64-encoded for transport. The collection must
    /// already exist. No retry on failure.
    pub async fn upload_one(
        &self,
        collection: &str,
        payload: &[u8],
        metadata: &Metadata,
    ) -> Result<RecordId> {
        let body = NewObject {
            class: collection,
            properties: build_properties(payload, metadata),
        };
        let subject = format!("collection '{collection}'");
        let created: CreatedObject = self.post_json("/v1/objects", &body, &subject).await?;
        log::debug!("uploaded '{}' as {}", metadata.text, created.id);
        Ok(created.id)
    }

    /// Upload a batch of records with at most `concurrency` in flight.
    ///
    /// Per-item failures are isolated: one failed upload never aborts the
    /// others. The returned outcomes are in completion order, which is
    /// unspecified; inspect them for per-item success or failure.
    pub async fn upload_many(
        &self,
        collection: &str,
        items: Vec<UploadItem>,
        concurrency: usize,
    ) -> Vec<BatchOutcome<RecordId>> {
        let labelled = items.into_iter().map(|item| (item.label.clone(), item));
        batch::for_each_bounded(labelled, concurrency, |item| async move {
            self.upload_one(collection, &item.payload, &item.metadata)
                .await
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_carry_encoded_payload_and_metadata() {
        let metadata = Metadata {
            text: "denim jacket".to_string(),
            product_id: Some("sku-17".to_string()),
        };
        let properties = build_properties(b"raw bytes", &metadata);

        assert_eq!(
            properties,
            serde_json::json!({
                "image": "cmF3IGJ5dGVz",
                "text": "denim jacket",
                "productId": "sku-17",
            })
        );
    }

    #[test]
    fn test_new_object_wire_shape() {
        let body = NewObject {
            class: "Clothing",
            properties: build_properties(b"x", &Metadata::text_only("shirt")),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["class"], "Clothing");
        assert_eq!(value["properties"]["text"], "shirt");
        // Absent metadata fields stay off the wire.
        assert!(value["properties"].get("productId").is_none());
    }
}
