use indexmap::IndexMap;
use serde::Serialize;

use super::schemas::{IrSchemaObject, IrSchemaType, LogicalOperator};
use super::types::IrServer;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }

    pub fn as_lower(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

/// A single HTTP operation.
#[derive(Debug, Clone, Serialize)]
pub struct IrOperation {
    /// Unique across the document.
    pub id: String,
    pub method: HttpMethod,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub parameters: IrParameters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<IrBody>,
    pub responses: IndexMap<String, IrResponse>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<IrSecurityScheme>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<IrServer>,
}

impl IrOperation {
    /// Split responses into success and error groups by status code.
    ///
    /// `default` counts as a success only when no explicit 2XX response exists.
    pub fn response_groups(&self) -> ResponseGroups<'_> {
        let mut groups = ResponseGroups::default();
        let mut default = None;

        for (status, response) in &self.responses {
            match StatusClass::of(status) {
                StatusClass::Success => {
                    groups.success.insert(status.as_str(), response);
                }
                StatusClass::Error => {
                    groups.errors.insert(status.as_str(), response);
                }
                StatusClass::Default => default = Some(response),
                StatusClass::Other => {}
            }
        }

        if let Some(response) = default {
            if groups.success.is_empty() {
                groups.success.insert("default", response);
            } else {
                groups.errors.insert("default", response);
            }
        }

        groups
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusClass {
    Success,
    Error,
    Default,
    Other,
}

impl StatusClass {
    fn of(status: &str) -> Self {
        if status == "default" {
            return StatusClass::Default;
        }
        match status.chars().next() {
            Some('2') => StatusClass::Success,
            Some('4' | '5') => StatusClass::Error,
            _ => StatusClass::Other,
        }
    }
}

/// Responses of one operation partitioned by outcome.
#[derive(Debug, Clone, Default)]
pub struct ResponseGroups<'a> {
    pub success: IndexMap<&'a str, &'a IrResponse>,
    pub errors: IndexMap<&'a str, &'a IrResponse>,
}

impl ResponseGroups<'_> {
    /// Union of the distinct success schemas. `void` members are dropped when
    /// any other schema is present.
    pub fn success_schema(&self) -> Option<IrSchemaObject> {
        union_of(self.success.values().map(|r| &r.schema))
    }

    pub fn error_schema(&self) -> Option<IrSchemaObject> {
        union_of(self.errors.values().map(|r| &r.schema))
    }
}

fn union_of<'a>(schemas: impl Iterator<Item = &'a IrSchemaObject>) -> Option<IrSchemaObject> {
    let mut distinct: Vec<IrSchemaObject> = Vec::new();
    for schema in schemas {
        if !distinct.contains(schema) {
            distinct.push(schema.clone());
        }
    }
    if distinct.len() > 1 {
        distinct.retain(|s| !s.is_type(IrSchemaType::Void));
    }
    if distinct.is_empty() {
        return None;
    }
    Some(IrSchemaObject::with_items(distinct, LogicalOperator::Or))
}

/// Parameters grouped by location, each keyed by parameter name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IrParameters {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub cookie: IndexMap<String, IrParameter>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub header: IndexMap<String, IrParameter>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub path: IndexMap<String, IrParameter>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub query: IndexMap<String, IrParameter>,
}

impl IrParameters {
    pub fn for_location(&self, location: IrParameterLocation) -> &IndexMap<String, IrParameter> {
        match location {
            IrParameterLocation::Cookie => &self.cookie,
            IrParameterLocation::Header => &self.header,
            IrParameterLocation::Path => &self.path,
            IrParameterLocation::Query => &self.query,
        }
    }

    /// Later insertions for the same (location, name) replace earlier ones.
    pub fn insert(&mut self, parameter: IrParameter) {
        let group = match parameter.location {
            IrParameterLocation::Cookie => &mut self.cookie,
            IrParameterLocation::Header => &mut self.header,
            IrParameterLocation::Path => &mut self.path,
            IrParameterLocation::Query => &mut self.query,
        };
        group.insert(parameter.name.clone(), parameter);
    }

    pub fn iter(&self) -> impl Iterator<Item = &IrParameter> {
        self.cookie
            .values()
            .chain(self.header.values())
            .chain(self.path.values())
            .chain(self.query.values())
    }

    pub fn is_empty(&self) -> bool {
        self.cookie.is_empty()
            && self.header.is_empty()
            && self.path.is_empty()
            && self.query.is_empty()
    }
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IrParameterLocation {
    Cookie,
    Header,
    Path,
    Query,
}

impl IrParameterLocation {
    /// Serialization style used when the document does not declare one.
    pub fn default_style(self) -> ParameterStyle {
        match self {
            IrParameterLocation::Query | IrParameterLocation::Cookie => ParameterStyle::Form,
            IrParameterLocation::Path | IrParameterLocation::Header => ParameterStyle::Simple,
        }
    }
}

/// Parameter serialization style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterStyle {
    Form,
    Simple,
    Label,
    Matrix,
    SpaceDelimited,
    PipeDelimited,
    DeepObject,
}

impl ParameterStyle {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "form" => ParameterStyle::Form,
            "simple" => ParameterStyle::Simple,
            "label" => ParameterStyle::Label,
            "matrix" => ParameterStyle::Matrix,
            "spaceDelimited" => ParameterStyle::SpaceDelimited,
            "pipeDelimited" => ParameterStyle::PipeDelimited,
            "deepObject" => ParameterStyle::DeepObject,
            _ => return None,
        })
    }
}

/// Marks a field as a pagination control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pagination {
    /// The parameter itself is the control.
    Root,
    /// The named top-level property of the schema is the control.
    Field(String),
}

/// A resolved path/query/header/cookie parameter.
#[derive(Debug, Clone, Serialize)]
pub struct IrParameter {
    pub name: String,
    pub location: IrParameterLocation,
    pub style: ParameterStyle,
    pub explode: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub allow_reserved: bool,
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: IrSchemaObject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Coarse classification of a media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKind {
    Json,
    FormData,
    UrlSearchParams,
    Text,
    OctetStream,
}

/// A request body: one retained media type.
#[derive(Debug, Clone, Serialize)]
pub struct IrBody {
    pub media_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<MediaKind>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: IrSchemaObject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// A response for one status code, status class or `default`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: IrSchemaObject,
}

/// A resolved security scheme attached to an operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrSecurityScheme {
    /// Key of the scheme in `components.securitySchemes`.
    pub name: String,
    #[serde(flatten)]
    pub kind: IrSecuritySchemeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IrSecuritySchemeKind {
    ApiKey {
        parameter: String,
        location: IrParameterLocation,
    },
    Http {
        scheme: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        bearer_format: Option<String>,
    },
    #[serde(rename = "oauth2")]
    OAuth2,
    OpenIdConnect {
        url: String,
    },
    #[serde(rename = "mutualTLS")]
    MutualTls,
}
