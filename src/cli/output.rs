//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{BrocadeArgs, OutputFormat};
use crate::error::Result;

/// Result structure for the readiness probe.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyReport {
    pub base_url: String,
    pub ready: bool,
}

/// Result structure for collection creation.
#[derive(Debug, Serialize, Deserialize)]
pub struct CollectionCreated {
    pub collection: String,
    pub vectorizer: String,
    pub properties: usize,
}

/// Result structure for collection deletion.
#[derive(Debug, Serialize, Deserialize)]
pub struct CollectionDropped {
    pub collection: String,
    /// False when the collection was already gone and `--if-exists` was set.
    pub existed: bool,
}

/// One collection in a schema listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub name: String,
    pub vectorizer: String,
    pub vector_index_type: String,
    pub properties: Vec<String>,
}

/// Result structure for the schema command.
#[derive(Debug, Serialize, Deserialize)]
pub struct SchemaReport {
    pub collections: Vec<CollectionSummary>,
}

/// One item of a batch report.
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemReport {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result structure for uploads.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadReport {
    pub collection: String,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub items: Vec<ItemReport>,
}

/// One record in a listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecordSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// Truncated base64 payload, for eyeballing only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_preview: Option<String>,
}

/// Result structure for listings.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListReport {
    pub collection: String,
    pub total: usize,
    pub records: Vec<RecordSummary>,
}

/// Result structure for batch deletion.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteAllReport {
    pub collection: String,
    pub attempted: usize,
    pub deleted: usize,
    pub failed: usize,
    pub items: Vec<ItemReport>,
}

/// One similarity hit.
#[derive(Debug, Serialize, Deserialize)]
pub struct HitReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub certainty: f64,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Result structure for similarity search.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchReport {
    pub collection: String,
    pub hits: Vec<HitReport>,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &BrocadeArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &BrocadeArgs) -> Result<()> {
    if args.verbosity() > 0 {
        println!("{message}");
    }

    let value = serde_json::to_value(result)?;
    match &value {
        serde_json::Value::Object(obj) if obj.contains_key("hits") => output_hits_human(obj),
        serde_json::Value::Object(obj) if obj.contains_key("records") => output_records_human(obj),
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                println!("{key}: {}", format_value(val));
            }
        }
        other => println!("{}", format_value(other)),
    }
    Ok(())
}

fn output_hits_human(obj: &serde_json::Map<String, serde_json::Value>) {
    let Some(hits) = obj.get("hits").and_then(|h| h.as_array()) else {
        return;
    };
    for (i, hit) in hits.iter().enumerate() {
        let certainty = hit.get("certainty").and_then(|c| c.as_f64()).unwrap_or(0.0);
        println!();
        println!("Hit {} (certainty {certainty:.3})", i + 1);
        if let Some(id) = hit.get("id").and_then(|v| v.as_str()) {
            println!("  id: {id}");
        }
        if let Some(properties) = hit.get("properties").and_then(|p| p.as_object()) {
            for (name, val) in properties {
                println!("  {name}: {}", format_value(val));
            }
        }
    }
    if hits.is_empty() {
        println!("No hits.");
    }
}

fn output_records_human(obj: &serde_json::Map<String, serde_json::Value>) {
    let Some(records) = obj.get("records").and_then(|r| r.as_array()) else {
        return;
    };
    for record in records {
        if let Some(fields) = record.as_object() {
            let id = fields.get("id").and_then(|v| v.as_str()).unwrap_or("?");
            println!();
            println!("ID: {id}");
            for (name, val) in fields {
                if name != "id" {
                    println!("  {name}: {}", format_value(val));
                }
            }
        }
    }
    if let Some(total) = obj.get("total").and_then(|t| t.as_u64()) {
        println!();
        println!("Total records: {total}");
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &BrocadeArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a JSON value for display.
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let formatted = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted}]")
        }
        serde_json::Value::Object(_) => "[object]".to_string(),
        serde_json::Value::Null => "null".to_string(),
    }
}
