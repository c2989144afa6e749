use indexmap::IndexMap;

use crate::ir::{IrParameterLocation, IrSecurityScheme, IrSecuritySchemeKind};
use crate::parse::ref_resolve::escape_segment;
use crate::parse::security::{ApiKeyLocation, SecurityRequirement, SecurityScheme};

use super::spec_to_ir::Normalizer;

impl Normalizer<'_> {
    /// Build the name → scheme map operations resolve their requirements against.
    pub(crate) fn collect_security_schemes(&mut self) -> IndexMap<String, IrSecurityScheme> {
        let spec = self.spec;
        let Some(components) = spec.components.as_ref() else {
            return IndexMap::new();
        };

        let mut schemes = IndexMap::new();
        for (name, scheme) in &components.security_schemes {
            let location = format!("#/components/securitySchemes/{}", escape_segment(name));
            match scheme_kind(scheme) {
                Ok(kind) => {
                    schemes.insert(
                        name.clone(),
                        IrSecurityScheme {
                            name: name.clone(),
                            kind,
                            description: scheme.description().map(str::to_string),
                        },
                    );
                }
                Err(missing) => self
                    .diagnostics
                    .warn(&location, format!("skipping scheme without `{missing}`")),
            }
        }
        schemes
    }
}

/// The IR kind of a scheme, or the name of the field it lacks.
fn scheme_kind(scheme: &SecurityScheme) -> Result<IrSecuritySchemeKind, &'static str> {
    Ok(match scheme {
        SecurityScheme::ApiKey { name, location, .. } => IrSecuritySchemeKind::ApiKey {
            parameter: name.clone().ok_or("name")?,
            location: match location.ok_or("in")? {
                ApiKeyLocation::Query => IrParameterLocation::Query,
                ApiKeyLocation::Header => IrParameterLocation::Header,
                ApiKeyLocation::Cookie => IrParameterLocation::Cookie,
            },
        },
        SecurityScheme::Http {
            scheme,
            bearer_format,
            ..
        } => IrSecuritySchemeKind::Http {
            scheme: scheme.as_deref().ok_or("scheme")?.to_ascii_lowercase(),
            bearer_format: bearer_format.clone(),
        },
        SecurityScheme::OAuth2 { .. } => IrSecuritySchemeKind::OAuth2,
        SecurityScheme::OpenIdConnect { url, .. } => IrSecuritySchemeKind::OpenIdConnect {
            url: url.clone().ok_or("openIdConnectUrl")?,
        },
        SecurityScheme::MutualTls { .. } => IrSecuritySchemeKind::MutualTls,
    })
}

/// Resolve requirement names against `schemes`. Unknown names are dropped;
/// the result is deduplicated by name in first-occurrence order.
pub fn flatten_security(
    requirements: &[SecurityRequirement],
    schemes: &IndexMap<String, IrSecurityScheme>,
) -> Vec<IrSecurityScheme> {
    let mut flattened: IndexMap<&str, &IrSecurityScheme> = IndexMap::new();
    for requirement in requirements {
        for name in requirement.keys() {
            match schemes.get(name) {
                Some(scheme) => {
                    flattened.entry(name.as_str()).or_insert(scheme);
                }
                None => log::debug!("dropping unknown security scheme `{name}`"),
            }
        }
    }
    flattened.into_values().cloned().collect()
}
