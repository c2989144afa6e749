use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid OpenAPI document: {0}")]
    Document(#[source] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("circular reference detected: {0}")]
    CircularRef(String),

    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("external references are not supported: {0}")]
    External(String),

    #[error("reference target not found: {pointer} (missing segment `{segment}`)")]
    RefTargetNotFound { pointer: String, segment: String },

    #[error("reference {pointer} does not point at the expected object: {source}")]
    Shape {
        pointer: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("transform failed: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("alias for operation `{0}` must not be empty")]
    EmptyAlias(String),

    #[error("pagination keyword list must not contain empty entries")]
    EmptyPaginationKeyword,

    #[error("invalid name template `{template}` for {plugin}: {message}")]
    InvalidTemplate {
        plugin: String,
        template: String,
        message: String,
    },

    #[error("plugin `{0}` is configured more than once")]
    DuplicatePlugin(String),

    #[error("plugin `{plugin}` depends on unknown plugin `{dependency}`")]
    UnknownDependency { plugin: String, dependency: String },

    #[error("plugin dependency cycle involving `{0}`")]
    DependencyCycle(String),
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error(
        "invalid Scalar shorthand format, expected \"scalar:@organization/project\", received: {0}"
    )]
    InvalidShorthand(String),

    #[error("the Scalar {0} cannot be empty")]
    EmptySegment(&'static str),
}
