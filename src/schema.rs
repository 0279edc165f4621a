//! Collection schema definition and management.
//!
//! A [`CollectionSchema`] declares a named collection ("class" on the wire):
//! the vectorizer module that embeds its media, the vector index type, and an
//! ordered set of typed properties. Schemas are created once and deleted
//! wholesale; they are not versioned.
//!
//! Property types are passed through as declared type tags; the server owns
//! validation beyond that.
//!
//! # Examples
//!
//! ```
//! use brocade::schema::CollectionSchema;
//!
//! let schema = CollectionSchema::media("Clothing");
//! assert_eq!(schema.name, "Clothing");
//! assert_eq!(schema.vectorizer, "img2vec-neural");
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::client::IndexClient;
use crate::error::{BrocadeError, Result};

/// Vectorizer module used for media collections.
pub const MEDIA_VECTORIZER: &str = "img2vec-neural";

/// Default vector index type.
pub const DEFAULT_INDEX_TYPE: &str = "hnsw";

/// Type tag of a collection property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    /// Opaque binary payload, transported base64-encoded.
    Blob,
    /// Plain string metadata.
    #[serde(rename = "string")]
    Text,
}

/// One typed property of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Property name.
    pub name: String,
    /// Declared type tags (the wire format allows a union, we declare one).
    #[serde(rename = "dataType")]
    pub data_type: Vec<PropertyKind>,
}

impl Property {
    /// A binary blob property.
    pub fn blob<S: Into<String>>(name: S) -> Self {
        Property {
            name: name.into(),
            data_type: vec![PropertyKind::Blob],
        }
    }

    /// A string property.
    pub fn text<S: Into<String>>(name: S) -> Self {
        Property {
            name: name.into(),
            data_type: vec![PropertyKind::Text],
        }
    }
}

/// Per-module configuration, keyed by vectorizer module id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Which blob properties the vectorizer embeds.
    #[serde(rename = "imageFields", default)]
    pub image_fields: Vec<String>,
}

/// Schema of one named collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Collection name ("class" on the wire).
    #[serde(rename = "class")]
    pub name: String,
    /// Vectorizer module id, e.g. `img2vec-neural`.
    #[serde(default)]
    pub vectorizer: String,
    /// Vector index type, e.g. `hnsw`.
    #[serde(rename = "vectorIndexType", default)]
    pub vector_index_type: String,
    /// Module configuration keyed by vectorizer id.
    #[serde(rename = "moduleConfig", default, skip_serializing_if = "HashMap::is_empty")]
    pub module_config: HashMap<String, ModuleConfig>,
    /// Ordered property set.
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl CollectionSchema {
    /// Create an empty schema with the given vectorizer and index type.
    pub fn new<S: Into<String>>(name: S, vectorizer: &str, vector_index_type: &str) -> Self {
        CollectionSchema {
            name: name.into(),
            vectorizer: vectorizer.to_string(),
            vector_index_type: vector_index_type.to_string(),
            module_config: HashMap::new(),
            properties: Vec::new(),
        }
    }

    /// The canonical media collection shape: one vectorized blob property
    /// (`image`) plus `text` and `productId` string metadata.
    pub fn media<S: Into<String>>(name: S) -> Self {
        CollectionSchema::new(name, MEDIA_VECTORIZER, DEFAULT_INDEX_TYPE)
            .with_image_property("image")
            .with_text_property("text")
            .with_text_property("productId")
    }

    /// Add a blob property and register it with the vectorizer module.
    pub fn with_image_property<S: Into<String>>(mut self, name: S) -> Self {
        let name = name.into();
        self.module_config
            .entry(self.vectorizer.clone())
            .or_default()
            .image_fields
            .push(name.clone());
        self.properties.push(Property::blob(name));
        self
    }

    /// Add a plain string property.
    pub fn with_text_property<S: Into<String>>(mut self, name: S) -> Self {
        self.properties.push(Property::text(name));
        self
    }

    /// Validate the parts the client is responsible for.
    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(BrocadeError::schema("Collection name cannot be empty"));
        }
        let mut seen = std::collections::HashSet::new();
        for property in &self.properties {
            if !seen.insert(property.name.as_str()) {
                return Err(BrocadeError::schema(format!(
                    "Duplicate property '{}'",
                    property.name
                )));
            }
        }
        Ok(())
    }
}

/// The full server-side schema listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSchema {
    /// All collections known to the server.
    #[serde(default)]
    pub classes: Vec<CollectionSchema>,
}

impl IndexClient {
    /// Provision a collection server-side.
    ///
    /// # Errors
    ///
    /// Returns [`BrocadeError::AlreadyExists`] when a collection with that
    /// name is already provisioned, [`BrocadeError::Schema`] for an invalid
    /// definition, and transport/server errors otherwise.
    pub async fn create_collection(&self, schema: &CollectionSchema) -> Result<()> {
        schema.validate()?;
        let subject = format!("collection '{}'", schema.name);
        let result: Result<serde_json::Value> =
            self.post_json("/v1/schema", schema, &subject).await;
        match result {
            Ok(_) => Ok(()),
            // Duplicate class names come back as an unprocessable-entity
            // response rather than a dedicated status.
            Err(BrocadeError::Api { status: 422, message })
                if message.contains("already exists") =>
            {
                Err(BrocadeError::already_exists(subject))
            }
            Err(e) => Err(e),
        }
    }

    /// Delete a collection and every record in it.
    ///
    /// # Errors
    ///
    /// Returns [`BrocadeError::NotFound`] when the name does not exist.
    /// Cleanup flows should treat that kind as non-fatal.
    pub async fn delete_collection(&self, name: &str) -> Result<()> {
        let subject = format!("collection '{name}'");
        let result = self
            .delete(&format!("/v1/schema/{name}"), &subject)
            .await;
        match result {
            // Some server versions answer a delete of a missing class with a
            // generic bad-request instead of a 404.
            Err(BrocadeError::Api { status: 400, message })
                if message.contains("not find") || message.contains("not found") =>
            {
                Err(BrocadeError::not_found(subject))
            }
            other => other,
        }
    }

    /// Fetch the full server schema.
    pub async fn get_schema(&self) -> Result<ServerSchema> {
        self.get_json("/v1/schema", &[], "schema").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_schema_wire_shape() {
        let schema = CollectionSchema::media("Clothing");
        let value = serde_json::to_value(&schema).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "class": "Clothing",
                "vectorizer": "img2vec-neural",
                "vectorIndexType": "hnsw",
                "moduleConfig": {
                    "img2vec-neural": { "imageFields": ["image"] }
                },
                "properties": [
                    { "name": "image", "dataType": ["blob"] },
                    { "name": "text", "dataType": ["string"] },
                    { "name": "productId", "dataType": ["string"] },
                ]
            })
        );
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let schema = CollectionSchema::media("");
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_properties() {
        let schema = CollectionSchema::media("Clothing").with_text_property("text");
        let err = schema.validate().unwrap_err();
        assert_eq!(err.to_string(), "Schema error: Duplicate property 'text'");
    }

    #[test]
    fn test_server_schema_parsing() {
        let body = r#"{
            "classes": [
                {
                    "class": "Clothing",
                    "vectorizer": "img2vec-neural",
                    "vectorIndexType": "hnsw",
                    "properties": [
                        { "name": "image", "dataType": ["blob"] },
                        { "name": "text", "dataType": ["string"] }
                    ]
                }
            ]
        }"#;
        let schema: ServerSchema = serde_json::from_str(body).unwrap();
        assert_eq!(schema.classes.len(), 1);
        assert_eq!(schema.classes[0].name, "Clothing");
        assert_eq!(schema.classes[0].properties[0].data_type, vec![PropertyKind::Blob]);
    }

    #[test]
    fn test_empty_schema_listing() {
        let schema: ServerSchema = serde_json::from_str("{}").unwrap();
        assert!(schema.classes.is_empty());
    }
}
