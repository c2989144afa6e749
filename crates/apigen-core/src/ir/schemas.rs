use indexmap::IndexMap;
use serde::Serialize;

/// Structural kind of an IR schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IrSchemaType {
    Array,
    Boolean,
    Enum,
    Integer,
    Never,
    Null,
    Number,
    Object,
    String,
    Tuple,
    Undefined,
    Unknown,
    Void,
}

impl IrSchemaType {
    /// Types a pagination control field may have.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            IrSchemaType::Boolean
                | IrSchemaType::Integer
                | IrSchemaType::Number
                | IrSchemaType::String
        )
    }

    /// `null` and `void` only ever widen another type.
    pub fn is_nullish(self) -> bool {
        matches!(self, IrSchemaType::Null | IrSchemaType::Void)
    }
}

/// How multiple `items` combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    And,
    #[default]
    Or,
}

/// Whether a property only appears in responses or only in requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessScope {
    Read,
    Write,
}

/// Canonical shape of any JSON-Schema-derived type.
///
/// A schema with `ref_path` set defers its structure to the referenced
/// component. A schema with more than one item always carries a
/// `logical_operator`; use [`IrSchemaObject::with_items`] to keep that true.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IrSchemaObject {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<IrSchemaType>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, IrSchemaObject>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<IrSchemaObject>>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<IrSchemaObject>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_operator: Option<LogicalOperator>,

    // Validation facets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<serde_json::Value>,
    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,

    // Documentation facets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_scope: Option<AccessScope>,
}

impl IrSchemaObject {
    pub fn of(schema_type: IrSchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Default::default()
        }
    }

    pub fn reference(ref_path: impl Into<String>) -> Self {
        Self {
            ref_path: Some(ref_path.into()),
            ..Default::default()
        }
    }

    /// A composition of `items`. A single item is returned as-is; more than
    /// one item records `operator`.
    pub fn with_items(mut items: Vec<IrSchemaObject>, operator: LogicalOperator) -> Self {
        if items.len() == 1 {
            if let Some(item) = items.pop() {
                return item;
            }
        }
        let mut schema = Self::default();
        schema.set_items(items, operator);
        schema
    }

    /// Replace `items`, recording `operator` only when it disambiguates.
    pub fn set_items(&mut self, items: Vec<IrSchemaObject>, operator: LogicalOperator) {
        self.logical_operator = (items.len() > 1).then_some(operator);
        self.items = items;
    }

    /// Effective operator for `items`.
    pub fn operator(&self) -> LogicalOperator {
        self.logical_operator.unwrap_or_default()
    }

    pub fn is_ref(&self) -> bool {
        self.ref_path.is_some()
    }

    pub fn is_type(&self, schema_type: IrSchemaType) -> bool {
        self.schema_type == Some(schema_type)
    }

    /// True when one of the composed items is `null`.
    pub fn admits_null(&self) -> bool {
        self.is_type(IrSchemaType::Null)
            || self
                .items
                .iter()
                .any(|item| item.is_type(IrSchemaType::Null))
    }

    /// Widen this schema with a `null` alternative. Documentation facets
    /// stay on the outer schema.
    pub fn into_nullable(self) -> Self {
        if self.admits_null() {
            return self;
        }
        let mut inner = self;
        let title = inner.title.take();
        let description = inner.description.take();
        let deprecated = std::mem::take(&mut inner.deprecated);
        let access_scope = inner.access_scope.take();

        if inner.ref_path.is_none()
            && inner.schema_type.is_none()
            && inner.operator() == LogicalOperator::Or
            && !inner.items.is_empty()
        {
            let mut items = std::mem::take(&mut inner.items);
            items.push(Self::of(IrSchemaType::Null));
            inner.set_items(items, LogicalOperator::Or);
            inner.title = title;
            inner.description = description;
            inner.deprecated = deprecated;
            inner.access_scope = access_scope;
            return inner;
        }

        let mut outer = Self::with_items(
            vec![inner, Self::of(IrSchemaType::Null)],
            LogicalOperator::Or,
        );
        outer.title = title;
        outer.description = description;
        outer.deprecated = deprecated;
        outer.access_scope = access_scope;
        outer
    }
}
