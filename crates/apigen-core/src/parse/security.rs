use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Scheme name → required scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

/// An entry of `components.securitySchemes`, tagged by its `type`.
/// Fields a scheme kind requires are still optional here so that an
/// incomplete scheme is reported instead of failing the whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SecurityScheme {
    #[serde(rename = "apiKey")]
    ApiKey {
        name: Option<String>,
        #[serde(rename = "in")]
        location: Option<ApiKeyLocation>,
        description: Option<String>,
    },
    #[serde(rename = "http")]
    Http {
        scheme: Option<String>,
        #[serde(rename = "bearerFormat")]
        bearer_format: Option<String>,
        description: Option<String>,
    },
    #[serde(rename = "oauth2")]
    OAuth2 { description: Option<String> },
    #[serde(rename = "openIdConnect")]
    OpenIdConnect {
        #[serde(rename = "openIdConnectUrl")]
        url: Option<String>,
        description: Option<String>,
    },
    #[serde(rename = "mutualTLS")]
    MutualTls { description: Option<String> },
}

impl SecurityScheme {
    pub fn description(&self) -> Option<&str> {
        match self {
            SecurityScheme::ApiKey { description, .. }
            | SecurityScheme::Http { description, .. }
            | SecurityScheme::OAuth2 { description }
            | SecurityScheme::OpenIdConnect { description, .. }
            | SecurityScheme::MutualTls { description } => description.as_deref(),
        }
    }
}
