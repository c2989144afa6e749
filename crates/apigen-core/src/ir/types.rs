use indexmap::IndexMap;
use serde::Serialize;

use super::operations::{HttpMethod, IrBody, IrOperation, IrParameter};
use super::schemas::IrSchemaObject;
use crate::parse::ref_resolve::component_schema_name;

/// Operations of one path template (or webhook), keyed by method.
pub type PathOperations = IndexMap<HttpMethod, IrOperation>;

/// The canonical, version-agnostic model of an API document.
///
/// The only `$ref` values left in the model point at entries of
/// `components.schemas`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IrModel {
    pub info: IrInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<IrServer>,
    pub paths: IndexMap<String, PathOperations>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub webhooks: IndexMap<String, PathOperations>,
    pub components: IrComponents,
}

impl IrModel {
    /// Every path operation, in document order.
    pub fn operations(&self) -> impl Iterator<Item = &IrOperation> {
        self.paths.values().flat_map(|ops| ops.values())
    }

    /// Every webhook operation, in document order.
    pub fn webhook_operations(&self) -> impl Iterator<Item = &IrOperation> {
        self.webhooks.values().flat_map(|ops| ops.values())
    }

    /// Look up a component schema by its `#/components/schemas/<name>` pointer.
    pub fn component_schema(&self, ref_path: &str) -> Option<&IrSchemaObject> {
        let name = component_schema_name(ref_path)?;
        self.components.schemas.get(&name)
    }

    /// Follow `$ref` chains until an inline schema is reached.
    pub fn deref_schema<'a>(&'a self, schema: &'a IrSchemaObject) -> &'a IrSchemaObject {
        let mut current = schema;
        // A chain longer than the component table means a cycle.
        for _ in 0..=self.components.schemas.len() {
            match current.ref_path.as_deref().and_then(|r| self.component_schema(r)) {
                Some(target) => current = target,
                None => return current,
            }
        }
        current
    }
}

/// API metadata.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IrInfo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
}

/// A server URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrServer {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Named, cross-referenceable definitions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IrComponents {
    pub schemas: IndexMap<String, IrSchemaObject>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, IrParameter>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub request_bodies: IndexMap<String, IrBody>,
}
