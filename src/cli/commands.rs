//! Command implementations for the Brocade CLI.

use std::path::Path;

use crate::batch;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::client::IndexClient;
use crate::error::{BrocadeError, Result};
use crate::object::{Metadata, Record, RecordId, UploadItem};
use crate::query::QueryHit;
use crate::schema::CollectionSchema;

/// How much of a base64 payload the human listing shows.
const PAYLOAD_PREVIEW_LEN: usize = 100;

/// Execute a CLI command.
pub async fn execute_command(args: BrocadeArgs) -> Result<()> {
    let client = IndexClient::new(&args.server_config())?;

    match args.command.clone() {
        Command::Ready => ready(&client, &args).await,
        Command::CreateCollection(cmd) => create_collection(&client, cmd, &args).await,
        Command::DropCollection(cmd) => drop_collection(&client, cmd, &args).await,
        Command::Schema => show_schema(&client, &args).await,
        Command::Upload(cmd) => upload(&client, cmd, &args).await,
        Command::List(cmd) => list(&client, cmd, &args).await,
        Command::Get(cmd) => get(&client, cmd, &args).await,
        Command::Delete(cmd) => delete(&client, cmd, &args).await,
        Command::DeleteAll(cmd) => delete_all(&client, cmd, &args).await,
        Command::Search(cmd) => search(&client, cmd, &args).await,
    }
}

/// Probe the readiness endpoint.
async fn ready(client: &IndexClient, cli_args: &BrocadeArgs) -> Result<()> {
    client.ready().await?;
    output_result(
        "Server is ready",
        &ReadyReport {
            base_url: client.base_url().to_string(),
            ready: true,
        },
        cli_args,
    )
}

/// Create a media collection with the canonical image/text/productId shape.
async fn create_collection(
    client: &IndexClient,
    cmd: CreateCollectionArgs,
    cli_args: &BrocadeArgs,
) -> Result<()> {
    let schema = CollectionSchema::media(&cmd.collection);
    client.create_collection(&schema).await?;
    output_result(
        "Collection created",
        &CollectionCreated {
            collection: schema.name,
            vectorizer: schema.vectorizer,
            properties: schema.properties.len(),
        },
        cli_args,
    )
}

/// Drop a collection; with `--if-exists`, a missing one is not an error.
async fn drop_collection(
    client: &IndexClient,
    cmd: DropCollectionArgs,
    cli_args: &BrocadeArgs,
) -> Result<()> {
    let existed = match client.delete_collection(&cmd.collection).await {
        Ok(()) => true,
        Err(e) if e.is_not_found() && cmd.if_exists => false,
        Err(e) => return Err(e),
    };
    output_result(
        "Collection dropped",
        &CollectionDropped {
            collection: cmd.collection,
            existed,
        },
        cli_args,
    )
}

/// Show every collection the server knows about.
async fn show_schema(client: &IndexClient, cli_args: &BrocadeArgs) -> Result<()> {
    let schema = client.get_schema().await?;
    let collections = schema
        .classes
        .into_iter()
        .map(|class| CollectionSummary {
            name: class.name,
            vectorizer: class.vectorizer,
            vector_index_type: class.vector_index_type,
            properties: class.properties.into_iter().map(|p| p.name).collect(),
        })
        .collect();
    output_result("Server schema", &SchemaReport { collections }, cli_args)
}

/// Upload one file or every file of a directory.
async fn upload(client: &IndexClient, cmd: UploadArgs, cli_args: &BrocadeArgs) -> Result<()> {
    let mut unreadable = Vec::new();
    let items = if cmd.path.is_dir() {
        if cmd.product_id.is_some() {
            return Err(BrocadeError::invalid_operation(
                "--product-id only applies to single-file uploads",
            ));
        }
        collect_upload_items(&cmd.path, &mut unreadable)?
    } else {
        vec![read_upload_item(&cmd.path, cmd.product_id.clone())?]
    };

    if items.is_empty() && unreadable.is_empty() {
        return Err(BrocadeError::invalid_operation(format!(
            "no files to upload in {}",
            cmd.path.display()
        )));
    }

    let attempted = items.len() + unreadable.len();
    let outcomes = client
        .upload_many(&cmd.collection, items, cmd.concurrency)
        .await;

    let mut report_items = unreadable;
    report_items.extend(outcomes.iter().map(|outcome| ItemReport {
        label: outcome.label.clone(),
        id: outcome.result.as_ref().ok().map(|id| id.to_string()),
        error: outcome.result.as_ref().err().map(|e| e.to_string()),
    }));

    let succeeded = batch::succeeded(&outcomes);
    output_result(
        "Upload finished",
        &UploadReport {
            collection: cmd.collection,
            attempted,
            succeeded,
            failed: attempted - succeeded,
            items: report_items,
        },
        cli_args,
    )
}

/// List up to `--limit` records.
async fn list(client: &IndexClient, cmd: ListArgs, cli_args: &BrocadeArgs) -> Result<()> {
    let records = client.list(&cmd.collection, cmd.limit).await?;
    let summaries: Vec<_> = records.iter().map(summarize_record).collect();
    output_result(
        "Records",
        &ListReport {
            collection: cmd.collection,
            total: summaries.len(),
            records: summaries,
        },
        cli_args,
    )
}

/// Fetch one record by id.
async fn get(client: &IndexClient, cmd: GetArgs, cli_args: &BrocadeArgs) -> Result<()> {
    let record = client.get_record(&cmd.collection, cmd.id).await?;
    output_result("Record", &summarize_record(&record), cli_args)
}

/// Delete one record by id.
async fn delete(client: &IndexClient, cmd: DeleteArgs, cli_args: &BrocadeArgs) -> Result<()> {
    client.delete_record(&cmd.collection, cmd.id).await?;
    output_result(
        "Record deleted",
        &ItemReport {
            label: cmd.id.to_string(),
            id: Some(cmd.id.to_string()),
            error: None,
        },
        cli_args,
    )
}

/// Delete every record a listing returns.
async fn delete_all(client: &IndexClient, cmd: DeleteAllArgs, cli_args: &BrocadeArgs) -> Result<()> {
    let outcomes = client
        .delete_all(&cmd.collection, cmd.limit, cmd.concurrency)
        .await?;

    let deleted = batch::succeeded(&outcomes);
    let items = outcomes
        .iter()
        .map(|outcome| ItemReport {
            label: outcome.label.clone(),
            id: None,
            error: outcome.result.as_ref().err().map(|e| e.to_string()),
        })
        .collect();
    output_result(
        "Deletion finished",
        &DeleteAllReport {
            collection: cmd.collection,
            attempted: outcomes.len(),
            deleted,
            failed: outcomes.len() - deleted,
            items,
        },
        cli_args,
    )
}

/// Find records similar to a reference image.
async fn search(client: &IndexClient, cmd: SearchArgs, cli_args: &BrocadeArgs) -> Result<()> {
    let reference = tokio::fs::read(&cmd.reference).await?;
    let fields: Vec<&str> = cmd.fields.iter().map(String::as_str).collect();
    let hits = client
        .near_media(&cmd.collection, &reference, &fields, cmd.top_k)
        .await?;
    output_result(
        "Similarity results",
        &SearchReport {
            collection: cmd.collection,
            hits: hits.iter().map(summarize_hit).collect(),
        },
        cli_args,
    )
}

/// Read every regular file of a directory as an upload item, in name order.
///
/// Unreadable files become failed report items instead of aborting the batch.
fn collect_upload_items(dir: &Path, unreadable: &mut Vec<ItemReport>) -> Result<Vec<UploadItem>> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut items = Vec::new();
    for entry in entries {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match read_upload_item(&path, None) {
            Ok(item) => items.push(item),
            Err(e) => {
                log::warn!("skipping {}: {e}", path.display());
                unreadable.push(ItemReport {
                    label: file_label(&path),
                    id: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }
    Ok(items)
}

/// Build an upload item from a file: display text is the file stem, the
/// batch label is the file name.
fn read_upload_item(path: &Path, product_id: Option<String>) -> Result<UploadItem> {
    let payload = std::fs::read(path)?;
    let label = file_label(path);
    let text = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| label.clone());
    Ok(UploadItem {
        label,
        payload,
        metadata: Metadata { text, product_id },
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn summarize_record(record: &Record) -> RecordSummary {
    RecordSummary {
        id: record.id.to_string(),
        text: record.text_property("text").map(str::to_string),
        product_id: record.text_property("productId").map(str::to_string),
        payload_preview: record.text_property("image").map(preview),
    }
}

fn summarize_hit(hit: &QueryHit) -> HitReport {
    HitReport {
        id: hit.id.as_ref().map(RecordId::to_string),
        certainty: hit.certainty,
        properties: hit.properties.clone(),
    }
}

/// Truncate a base64 payload for display.
fn preview(encoded: &str) -> String {
    if encoded.len() <= PAYLOAD_PREVIEW_LEN {
        encoded.to_string()
    } else {
        format!("{}...", &encoded[..PAYLOAD_PREVIEW_LEN])
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_preview_truncates_long_payloads() {
        let short = "aGVsbG8=";
        assert_eq!(preview(short), short);

        let long = "A".repeat(300);
        let previewed = preview(&long);
        assert_eq!(previewed.len(), PAYLOAD_PREVIEW_LEN + 3);
        assert!(previewed.ends_with("..."));
    }

    #[test]
    fn test_read_upload_item_derives_text_from_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("denim-jacket.jpeg");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"fake image bytes").unwrap();

        let item = read_upload_item(&path, Some("sku-17".to_string())).unwrap();
        assert_eq!(item.label, "denim-jacket.jpeg");
        assert_eq!(item.metadata.text, "denim-jacket");
        assert_eq!(item.metadata.product_id.as_deref(), Some("sku-17"));
        assert_eq!(item.payload, b"fake image bytes");
    }

    #[test]
    fn test_collect_upload_items_orders_by_name_and_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.jpeg"), b"b").unwrap();
        std::fs::write(dir.path().join("a.jpeg"), b"a").unwrap();

        let mut unreadable = Vec::new();
        let items = collect_upload_items(dir.path(), &mut unreadable).unwrap();
        let labels: Vec<_> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["a.jpeg", "b.jpeg"]);
        assert!(unreadable.is_empty());
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = read_upload_item(Path::new("/nonexistent/x.jpeg"), None).unwrap_err();
        assert!(matches!(err, BrocadeError::Io(_)));
    }
}
