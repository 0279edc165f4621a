//! Read and delete operations: listing, fetching, and bounded batch deletes.

use serde::Deserialize;

use crate::batch::{self, BatchOutcome};
use crate::client::IndexClient;
use crate::error::Result;
use crate::object::{Record, RecordId};

/// Wire shape of a listing response.
#[derive(Debug, Deserialize)]
struct ObjectList {
    #[serde(default)]
    objects: Vec<Record>,
}

impl IndexClient {
    /// List up to `limit` records of a collection.
    ///
    /// Records come back in server-defined order, which is unspecified and
    /// not guaranteed stable across calls.
    pub async fn list(&self, collection: &str, limit: usize) -> Result<Vec<Record>> {
        let subject = format!("collection '{collection}'");
        let query = [
            ("class", collection.to_string()),
            ("limit", limit.to_string()),
        ];
        let listing: ObjectList = self.get_json("/v1/objects", &query, &subject).await?;
        Ok(listing.objects)
    }

    /// Fetch one record by id.
    pub async fn get_record(&self, collection: &str, id: RecordId) -> Result<Record> {
        let subject = format!("record {id} in '{collection}'");
        self.get_json(&format!("/v1/objects/{collection}/{id}"), &[], &subject)
            .await
    }

    /// Delete one record by id. Deleting a missing record surfaces
    /// [`crate::error::BrocadeError::NotFound`].
    pub async fn delete_record(&self, collection: &str, id: RecordId) -> Result<()> {
        let subject = format!("record {id} in '{collection}'");
        self.delete(&format!("/v1/objects/{collection}/{id}"), &subject)
            .await
    }

    /// Delete every record a `list` with the given `limit` returns.
    ///
    /// Lists up to `limit` ids, then deletes each with at most `concurrency`
    /// deletes in flight and per-item failure isolation. This does not verify
    /// the listing was exhaustive: records beyond `limit` silently survive.
    /// The listing itself failing aborts the whole operation.
    pub async fn delete_all(
        &self,
        collection: &str,
        limit: usize,
        concurrency: usize,
    ) -> Result<Vec<BatchOutcome<()>>> {
        let records = self.list(collection, limit).await?;
        let labelled = records.into_iter().map(|r| (r.id.to_string(), r.id));
        let outcomes = batch::for_each_bounded(labelled, concurrency, |id| async move {
            self.delete_record(collection, id).await
        })
        .await;
        Ok(outcomes)
    }
}
