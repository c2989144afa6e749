pub mod document;
pub mod operation;
pub mod ref_resolve;
pub mod schema;
pub mod security;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ParseError;
use document::OpenApiSpec;

/// An object that may be replaced by a `{"$ref": ...}` pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Item(T),
}

/// A parsed document: the typed view plus the raw tree that `$ref`
/// pointers are resolved against.
#[derive(Debug, Clone)]
pub struct SpecDocument {
    pub raw: Value,
    pub spec: OpenApiSpec,
}

impl SpecDocument {
    /// Build a document from an already-loaded tree.
    pub fn from_value(raw: Value) -> Result<Self, ParseError> {
        check_version(&raw)?;
        let spec: OpenApiSpec =
            serde_json::from_value(raw.clone()).map_err(ParseError::Document)?;
        Ok(Self { raw, spec })
    }
}

/// Parse a document from YAML. JSON input is accepted too.
pub fn from_yaml(input: &str) -> Result<SpecDocument, ParseError> {
    let raw: Value = serde_yaml_ng::from_str(input)?;
    SpecDocument::from_value(raw)
}

pub fn from_json(input: &str) -> Result<SpecDocument, ParseError> {
    let raw: Value = serde_json::from_str(input)?;
    SpecDocument::from_value(raw)
}

const SUPPORTED_VERSIONS: [&str; 3] = ["3.0.", "3.1.", "3.2."];

fn check_version(raw: &Value) -> Result<(), ParseError> {
    let Some(version) = raw.get("openapi").and_then(Value::as_str) else {
        return Err(ParseError::MissingField("openapi".to_string()));
    };
    if SUPPORTED_VERSIONS.iter().any(|prefix| version.starts_with(prefix)) {
        Ok(())
    } else {
        Err(ParseError::UnsupportedVersion(version.to_string()))
    }
}
