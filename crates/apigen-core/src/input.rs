use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::InputError;

const SCALAR_NAMESPACE: &str = "scalar:";

static SCALAR_SHORTHAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([\w-]*)/([\w.-]*)$").expect("valid regex"));

/// Where the raw document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A local YAML or JSON file.
    Path(PathBuf),
    /// A remote document that still needs to be downloaded.
    Url(String),
    /// An API hosted on the Scalar registry.
    Registry(RegistryInput),
}

impl InputSource {
    /// The URL to download, when the input is remote.
    pub fn remote_url(&self) -> Option<&str> {
        match self {
            InputSource::Path(_) => None,
            InputSource::Url(url) => Some(url),
            InputSource::Registry(registry) => Some(&registry.url),
        }
    }
}

/// A parsed `scalar:@organization/project` shorthand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryInput {
    pub organization: String,
    pub project: String,
    pub url: String,
}

/// Classify a configured input string. Shorthands are validated eagerly.
pub fn parse_input(raw: &str) -> Result<InputSource, InputError> {
    if let Some(shorthand) = raw.strip_prefix(SCALAR_NAMESPACE) {
        return parse_scalar_shorthand(shorthand).map(InputSource::Registry);
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Ok(InputSource::Url(raw.to_string()));
    }
    Ok(InputSource::Path(PathBuf::from(raw)))
}

/// Parse `@organization/project` (without the `scalar:` prefix).
pub fn parse_scalar_shorthand(shorthand: &str) -> Result<RegistryInput, InputError> {
    let captures = SCALAR_SHORTHAND
        .captures(shorthand)
        .ok_or_else(|| InputError::InvalidShorthand(format!("{SCALAR_NAMESPACE}{shorthand}")))?;

    let organization = &captures[1];
    let project = &captures[2];
    if organization.is_empty() {
        return Err(InputError::EmptySegment("organization"));
    }
    if project.is_empty() {
        return Err(InputError::EmptySegment("project"));
    }

    Ok(RegistryInput {
        organization: organization.to_string(),
        project: project.to_string(),
        url: registry_url(organization, project),
    })
}

/// Registry download URL for an organization/project pair.
pub fn registry_url(organization: &str, project: &str) -> String {
    format!("https://registry.scalar.com/{organization}/apis/{project}/latest?format=json")
}
