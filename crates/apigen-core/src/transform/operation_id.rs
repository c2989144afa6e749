use std::collections::HashSet;

use heck::ToPascalCase;
use indexmap::IndexMap;

use crate::config::{NamingStrategy, StringCase};
use crate::ir::HttpMethod;

use super::naming::{apply_case, route_to_name};

/// Derive the bare (not yet deduplicated) id of an operation.
///
/// The `operationId` wins under [`NamingStrategy::UseOperationId`]; otherwise,
/// or when it is absent, the id comes from the method and path. Aliases are
/// applied to that raw name before it is camel-cased.
pub fn derive_operation_id(
    strategy: NamingStrategy,
    aliases: &IndexMap<String, String>,
    method: HttpMethod,
    path: &str,
    operation_id: Option<&str>,
) -> String {
    let raw = match (strategy, operation_id) {
        (NamingStrategy::UseOperationId, Some(id)) if !id.trim().is_empty() => id.to_string(),
        _ => route_to_name(method, path),
    };
    let named = aliases.get(&raw).map(String::as_str).unwrap_or(&raw);
    apply_case(named, StringCase::Camel)
}

/// Hands out document-unique operation ids.
///
/// The first claimant keeps the bare id. Later ones get a suffix built from
/// their path, then a counter starting at 2.
#[derive(Debug, Clone, Default)]
pub struct OperationIdRegistry {
    used: HashSet<String>,
}

impl OperationIdRegistry {
    pub fn assign(&mut self, base: &str, path: &str) -> String {
        if self.used.insert(base.to_string()) {
            return base.to_string();
        }

        let suffix = path_suffix(path);
        if !suffix.is_empty() {
            let candidate = format!("{base}{suffix}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
        }

        let mut counter = 2;
        loop {
            let candidate = format!("{base}{counter}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// `/users/{userId}/posts` → `UsersByUserIdPosts`
pub fn path_suffix(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(param) => format!("By{}", param.to_pascal_case()),
            None => segment.to_pascal_case(),
        })
        .collect()
}
