//! Near-media similarity queries.
//!
//! A near-media query submits a reference payload (rather than a vector or a
//! keyword) as the query key; the server embeds it with the collection's
//! vectorizer and returns the nearest records by its own similarity metric.
//! The returned certainty is bounded in [0, 1] and is only meaningful
//! relative to the query that produced it; certainties from different
//! queries are not comparable.
//!
//! # Examples
//!
//! ```no_run
//! use brocade::client::{IndexClient, ServerConfig};
//!
//! # async fn example() -> brocade::error::Result<()> {
//! let client = IndexClient::new(&ServerConfig::default())?;
//! let reference = std::fs::read("test.jpeg")?;
//! let hits = client
//!     .near_media("Clothing", &reference, &["text"], 5)
//!     .await?;
//! for hit in hits {
//!     println!("{:.3}  {:?}", hit.certainty, hit.properties.get("text"));
//! }
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

use crate::client::IndexClient;
use crate::error::{BrocadeError, Result};
use crate::object::{RecordId, encode_payload};

/// One result of a similarity query.
///
/// Ephemeral, produced per-query, not persisted.
#[derive(Debug, Clone)]
pub struct QueryHit {
    /// Record identifier, when the server includes one.
    pub id: Option<RecordId>,
    /// Server-computed similarity relative to the query payload.
    pub certainty: f64,
    /// The requested properties.
    pub properties: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct GraphQlRequest {
    query: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Render the query document for a near-media search.
///
/// Base64 payloads and plain field names need no escaping inside the string
/// literal.
fn build_query(collection: &str, encoded: &str, fields: &[&str], top_k: usize) -> String {
    let fields = fields.join(" ");
    format!(
        "{{ Get {{ {collection}(nearImage: {{image: \"{encoded}\"}}, limit: {top_k}) \
         {{ {fields} _additional {{ id certainty }} }} }} }}"
    )
}

/// Pull the hit list for `collection` out of a GraphQL `data` value,
/// preserving the server's descending-certainty order.
fn parse_hits(data: &serde_json::Value, collection: &str) -> Result<Vec<QueryHit>> {
    let items = data
        .get("Get")
        .and_then(|get| get.get(collection))
        .and_then(|items| items.as_array())
        .ok_or_else(|| {
            BrocadeError::invalid_operation(format!(
                "query response has no results for collection '{collection}'"
            ))
        })?;

    let mut hits = Vec::with_capacity(items.len());
    for item in items {
        let Some(mut properties) = item.as_object().cloned() else {
            continue;
        };
        let additional = properties.remove("_additional").unwrap_or_default();
        let id = additional
            .get("id")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok());
        let certainty = additional
            .get("certainty")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        hits.push(QueryHit {
            id,
            certainty,
            properties,
        });
    }
    Ok(hits)
}

impl IndexClient {
    /// Find the `top_k` records most similar to a reference payload.
    ///
    /// Requests the named `fields` plus the record id and certainty; results
    /// come back ordered by descending certainty as computed by the server.
    /// Pure query, no state mutation.
    ///
    /// # Errors
    ///
    /// GraphQL-level errors in an otherwise successful response surface as
    /// [`BrocadeError::Api`].
    pub async fn near_media(
        &self,
        collection: &str,
        reference_payload: &[u8],
        fields: &[&str],
        top_k: usize,
    ) -> Result<Vec<QueryHit>> {
        let request = GraphQlRequest {
            query: build_query(collection, &encode_payload(reference_payload), fields, top_k),
        };
        let subject = format!("collection '{collection}'");
        let response: GraphQlResponse = self.post_json("/v1/graphql", &request, &subject).await?;

        if let Some(first) = response.errors.first() {
            return Err(BrocadeError::api(200, first.message.clone()));
        }
        let data = response
            .data
            .ok_or_else(|| BrocadeError::invalid_operation("query response carried no data"))?;
        parse_hits(&data, collection)
    }
}
