use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level project configuration loaded from `.apigen.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApigenConfig {
    /// Path, URL or `scalar:@organization/project` shorthand.
    pub input: String,
    pub output: String,
    pub naming: NamingConfig,
    pub pagination: PaginationConfig,
    pub output_options: OutputOptions,
    /// Plugins in the order they were declared. Execution order is derived
    /// from their dependencies.
    pub plugins: Vec<PluginConfig>,
}

impl Default for ApigenConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "src/client".to_string(),
            naming: NamingConfig::default(),
            pagination: PaginationConfig::default(),
            output_options: OutputOptions::default(),
            plugins: vec![
                PluginConfig::TypeScript(TypeScriptOptions::default()),
                PluginConfig::Transformers(TransformersOptions::default()),
            ],
        }
    }
}

impl ApigenConfig {
    /// Check every value that would otherwise fail late, deep inside a plugin.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (operation, alias) in &self.naming.aliases {
            if alias.trim().is_empty() {
                return Err(ConfigError::EmptyAlias(operation.clone()));
            }
        }
        if self.pagination.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::EmptyPaginationKeyword);
        }
        for plugin in &self.plugins {
            plugin.validate()?;
        }
        Ok(())
    }
}

/// Naming strategy and aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub strategy: NamingStrategy,
    /// Map from resolved operation name (operationId or route-derived) to custom alias.
    #[serde(default)]
    pub aliases: IndexMap<String, String>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            strategy: NamingStrategy::UseOperationId,
            aliases: IndexMap::new(),
        }
    }
}

/// How operation ids are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    #[default]
    UseOperationId,
    UseRouteBased,
}

/// Field names that mark a parameter or body property as a pagination control.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub keywords: Vec<String>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            keywords: ["after", "before", "cursor", "offset", "page", "start"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Output structure options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Generate an `index.ts` barrel re-exporting plugin outputs.
    pub index: bool,
    /// Prepend the auto-generated notice to every file.
    pub header: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            index: true,
            header: true,
        }
    }
}

/// Case convention applied to generated symbol names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StringCase {
    #[serde(rename = "camelCase")]
    Camel,
    #[serde(rename = "PascalCase")]
    Pascal,
    #[serde(rename = "snake_case")]
    Snake,
    #[serde(rename = "SCREAMING_SNAKE_CASE")]
    ScreamingSnake,
    #[serde(rename = "preserve")]
    Preserve,
}

/// One configured plugin. The tag is the plugin name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum PluginConfig {
    #[serde(rename = "typescript")]
    TypeScript(TypeScriptOptions),
    #[serde(rename = "transformers")]
    Transformers(TransformersOptions),
}

impl PluginConfig {
    pub const TYPESCRIPT: &'static str = "typescript";
    pub const TRANSFORMERS: &'static str = "transformers";

    pub fn name(&self) -> &'static str {
        match self {
            PluginConfig::TypeScript(_) => Self::TYPESCRIPT,
            PluginConfig::Transformers(_) => Self::TRANSFORMERS,
        }
    }

    /// Plugins whose output this plugin reads.
    pub fn dependencies(&self) -> &'static [&'static str] {
        match self {
            PluginConfig::TypeScript(_) => &[],
            PluginConfig::Transformers(_) => &[Self::TYPESCRIPT],
        }
    }

    /// Default configuration for a plugin referenced only as a dependency.
    pub fn default_for(name: &str) -> Option<PluginConfig> {
        match name {
            Self::TYPESCRIPT => Some(PluginConfig::TypeScript(TypeScriptOptions::default())),
            Self::TRANSFORMERS => Some(PluginConfig::Transformers(TransformersOptions::default())),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            PluginConfig::TypeScript(_) => Ok(()),
            PluginConfig::Transformers(options) => {
                render_name_template(self.name(), &options.schema_name, "Sample")?;
                render_name_template(self.name(), &options.response_name, "Sample")?;
                Ok(())
            }
        }
    }
}

/// Options for the `typescript` plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeScriptOptions {
    /// Logical file name, without the `.gen.ts` suffix.
    pub output: String,
    pub case: StringCase,
    /// Also emit `as const` objects for enum schemas.
    pub enums: bool,
    pub export_from_index: bool,
}

impl Default for TypeScriptOptions {
    fn default() -> Self {
        Self {
            output: "types".to_string(),
            case: StringCase::Pascal,
            enums: false,
            export_from_index: true,
        }
    }
}

/// Options for the `transformers` plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformersOptions {
    pub output: String,
    /// Convert `date` and `date-time` strings to `Date` objects.
    pub dates: bool,
    /// Convert `int64` integers to `BigInt`.
    pub bigint: bool,
    pub export_from_index: bool,
    /// Name template for per-schema helpers. `{{name}}` is the schema name.
    pub schema_name: String,
    /// Name template for per-operation response transformers.
    pub response_name: String,
}

impl Default for TransformersOptions {
    fn default() -> Self {
        Self {
            output: "transformers".to_string(),
            dates: true,
            bigint: false,
            export_from_index: true,
            schema_name: "{{name}}SchemaResponseTransformer".to_string(),
            response_name: "{{name}}ResponseTransformer".to_string(),
        }
    }
}

/// Render a `{{name}}` template. The result must mention the name so that
/// distinct schemas cannot collapse onto one symbol.
pub fn render_name_template(
    plugin: &str,
    template: &str,
    name: &str,
) -> Result<String, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidTemplate {
        plugin: plugin.to_string(),
        template: template.to_string(),
        message,
    };

    let env = Environment::new();
    let rendered = env
        .render_str(template, context! { name => name })
        .map_err(|e| invalid(e.to_string()))?;
    if !rendered.contains(name) {
        return Err(invalid("template must reference {{name}}".to_string()));
    }
    Ok(rendered)
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".apigen.yaml";

/// Load and validate config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ApigenConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ApigenConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# apigen configuration
input: openapi.yaml   # path, URL, or scalar:@organization/project
output: src/client

naming:
  strategy: use_operation_id  # use_operation_id | use_route_based
  aliases: {}
    # listPets: pets     # operation id → custom name

pagination:
  keywords: [after, before, cursor, offset, page, start]

output_options:
  index: true           # generate index.ts barrel exports
  header: true          # prepend the auto-generated notice

plugins:
  - name: typescript
    output: types
    case: PascalCase    # camelCase | PascalCase | snake_case | SCREAMING_SNAKE_CASE | preserve
    enums: false
  - name: transformers
    output: transformers
    dates: true
    bigint: false
    # schema_name: "{{name}}SchemaResponseTransformer"
    # response_name: "{{name}}ResponseTransformer"
"#
}
