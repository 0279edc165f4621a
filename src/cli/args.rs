//! Command line argument parsing for the Brocade CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::batch::DEFAULT_CONCURRENCY;
use crate::client::ServerConfig;

/// Brocade - a client for a media vector index server
#[derive(Parser, Debug, Clone)]
#[command(name = "brocade")]
#[command(about = "Populate and query a media vector index server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct BrocadeArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// URL scheme of the index server
    #[arg(long, env = "BROCADE_SCHEME", default_value = "http")]
    pub scheme: String,

    /// Hostname of the index server
    #[arg(long, env = "BROCADE_HOST", default_value = "localhost")]
    pub host: String,

    /// Port of the index server
    #[arg(long, env = "BROCADE_PORT", default_value = "8080")]
    pub port: u16,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl BrocadeArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }

    /// Server location assembled from the connection flags.
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::new(self.scheme.clone(), self.host.clone(), self.port)
    }
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Probe the server's readiness endpoint
    Ready,

    /// Create a media collection
    #[command(name = "create-collection")]
    CreateCollection(CreateCollectionArgs),

    /// Delete a collection and everything in it
    #[command(name = "drop-collection")]
    DropCollection(DropCollectionArgs),

    /// Show the server-side schema
    Schema,

    /// Upload an image file or a directory of image files
    Upload(UploadArgs),

    /// List records of a collection
    List(ListArgs),

    /// Fetch one record by id
    Get(GetArgs),

    /// Delete one record by id
    Delete(DeleteArgs),

    /// Delete every listed record of a collection
    #[command(name = "delete-all")]
    DeleteAll(DeleteAllArgs),

    /// Find records similar to a reference image
    Search(SearchArgs),
}

/// Arguments for creating a collection
#[derive(Parser, Debug, Clone)]
pub struct CreateCollectionArgs {
    /// Collection name
    #[arg(value_name = "COLLECTION")]
    pub collection: String,
}

/// Arguments for dropping a collection
#[derive(Parser, Debug, Clone)]
pub struct DropCollectionArgs {
    /// Collection name
    #[arg(value_name = "COLLECTION")]
    pub collection: String,

    /// Treat a missing collection as success (for cleanup scripts)
    #[arg(long)]
    pub if_exists: bool,
}

/// Arguments for uploading images
#[derive(Parser, Debug, Clone)]
pub struct UploadArgs {
    /// Collection name
    #[arg(value_name = "COLLECTION")]
    pub collection: String,

    /// Image file or directory of image files
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Product id to attach (single-file uploads only)
    #[arg(long)]
    pub product_id: Option<String>,

    /// Maximum in-flight uploads for directory ingestion
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,
}

/// Arguments for listing records
#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    /// Collection name
    #[arg(value_name = "COLLECTION")]
    pub collection: String,

    /// Maximum number of records to return
    #[arg(short, long, default_value = "100")]
    pub limit: usize,
}

/// Arguments for fetching one record
#[derive(Parser, Debug, Clone)]
pub struct GetArgs {
    /// Collection name
    #[arg(value_name = "COLLECTION")]
    pub collection: String,

    /// Record id
    #[arg(value_name = "ID")]
    pub id: uuid::Uuid,
}

/// Arguments for deleting one record
#[derive(Parser, Debug, Clone)]
pub struct DeleteArgs {
    /// Collection name
    #[arg(value_name = "COLLECTION")]
    pub collection: String,

    /// Record id
    #[arg(value_name = "ID")]
    pub id: uuid::Uuid,
}

/// Arguments for deleting all listed records
#[derive(Parser, Debug, Clone)]
pub struct DeleteAllArgs {
    /// Collection name
    #[arg(value_name = "COLLECTION")]
    pub collection: String,

    /// Listing cap; records beyond it survive
    #[arg(short, long, default_value = "1000")]
    pub limit: usize,

    /// Maximum in-flight deletes
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,
}

/// Arguments for similarity search
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Collection name
    #[arg(value_name = "COLLECTION")]
    pub collection: String,

    /// Reference image file
    #[arg(value_name = "REFERENCE")]
    pub reference: PathBuf,

    /// Number of results to return
    #[arg(short = 'k', long, default_value = "5")]
    pub top_k: usize,

    /// Properties to request for each hit
    #[arg(long, value_delimiter = ',', default_value = "text,productId")]
    pub fields: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        let args = BrocadeArgs::parse_from(["brocade", "ready"]);
        assert_eq!(args.verbosity(), 1);

        let args = BrocadeArgs::parse_from(["brocade", "-vv", "ready"]);
        assert_eq!(args.verbosity(), 2);

        let args = BrocadeArgs::parse_from(["brocade", "--quiet", "-v", "ready"]);
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_default_server_config() {
        let args = BrocadeArgs::parse_from(["brocade", "ready"]);
        assert_eq!(args.server_config(), ServerConfig::default());
    }

    #[test]
    fn test_connection_flags_override_defaults() {
        let args = BrocadeArgs::parse_from([
            "brocade", "--scheme", "https", "--host", "index.local", "--port", "9090", "ready",
        ]);
        let config = args.server_config();
        assert_eq!(config.base_url(), "https://index.local:9090");
    }

    #[test]
    fn test_search_field_list_parsing() {
        let args = BrocadeArgs::parse_from([
            "brocade", "search", "Clothing", "test.jpeg", "--fields", "text",
        ]);
        let Command::Search(search) = args.command else {
            panic!("expected search command");
        };
        assert_eq!(search.fields, vec!["text"]);
        assert_eq!(search.top_k, 5);
    }
}
