use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ResolveError;

const SCHEMA_PREFIX: &str = "#/components/schemas/";

/// Resolves local `$ref` pointers (`#/a/b/c`) against the raw document tree.
#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'a> {
    root: &'a Value,
}

impl<'a> RefResolver<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// Walk `pointer` and return the node it names, without following any
    /// `$ref` found there.
    pub fn resolve(&self, pointer: &str) -> Result<&'a Value, ResolveError> {
        let mut current = self.root;
        for segment in parse_pointer(pointer)? {
            let next = match current {
                Value::Object(map) => map.get(&segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            current = next.ok_or_else(|| ResolveError::RefTargetNotFound {
                pointer: pointer.to_string(),
                segment: segment.clone(),
            })?;
        }
        Ok(current)
    }

    /// Resolve `pointer`, following chained `$ref` objects until a concrete
    /// node is reached. Returns the final pointer alongside the node.
    pub fn follow(&self, pointer: &str) -> Result<(String, &'a Value), ResolveError> {
        let mut visited = HashSet::new();
        let mut current = pointer.to_string();
        loop {
            if !visited.insert(current.clone()) {
                return Err(ResolveError::CircularRef(pointer.to_string()));
            }
            let node = self.resolve(&current)?;
            match node.get("$ref").and_then(Value::as_str) {
                Some(next) => current = next.to_string(),
                None => return Ok((current, node)),
            }
        }
    }

    /// Follow `pointer` and deserialize the target.
    pub fn resolve_as<T: DeserializeOwned>(&self, pointer: &str) -> Result<T, ResolveError> {
        let (target, node) = self.follow(pointer)?;
        serde_json::from_value(node.clone()).map_err(|source| ResolveError::Shape {
            pointer: target,
            source,
        })
    }
}

/// Split a local JSON pointer into unescaped segments.
pub fn parse_pointer(pointer: &str) -> Result<Vec<String>, ResolveError> {
    let Some(fragment) = pointer.strip_prefix('#') else {
        if pointer.contains('#') || pointer.contains("://") || pointer.contains('.') {
            return Err(ResolveError::External(pointer.to_string()));
        }
        return Err(ResolveError::InvalidRefFormat(pointer.to_string()));
    };
    if fragment.is_empty() {
        return Ok(Vec::new());
    }
    let path = fragment
        .strip_prefix('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(pointer.to_string()))?;
    Ok(path.split('/').map(unescape_segment).collect())
}

/// Escape a key for use as a pointer segment (`~` → `~0`, `/` → `~1`).
pub fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// The unescaped final segment of a pointer, e.g. `Pet` for `#/components/schemas/Pet`.
pub fn ref_name(pointer: &str) -> String {
    let last = pointer.rsplit('/').next().unwrap_or(pointer);
    unescape_segment(last)
}

/// Component schema name when `pointer` is `#/components/schemas/<name>`.
pub fn component_schema_name(pointer: &str) -> Option<String> {
    let rest = pointer.strip_prefix(SCHEMA_PREFIX)?;
    if rest.is_empty() || rest.contains('/') {
        return None;
    }
    Some(unescape_segment(rest))
}

/// Pointer to a named component schema.
pub fn component_schema_ref(name: &str) -> String {
    format!("{SCHEMA_PREFIX}{}", escape_segment(name))
}

fn unescape_segment(segment: &str) -> String {
    percent_decode(segment).replace("~1", "/").replace("~0", "~")
}

fn percent_decode(segment: &str) -> String {
    if !segment.contains('%') {
        return segment.to_string();
    }
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(byte) = decoded {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "paths": {
                "/pets/{id}": { "get": { "operationId": "getPet" } }
            },
            "components": {
                "schemas": {
                    "Pet": { "type": "object" },
                    "Alias": { "$ref": "#/components/schemas/Pet" },
                    "Loop": { "$ref": "#/components/schemas/Loop" },
                    "a~b": { "type": "string" }
                },
                "parameters": {
                    "list": [ { "name": "first" }, { "name": "second" } ]
                }
            }
        })
    }

    #[test]
    fn test_resolve_component() {
        let doc = document();
        let resolver = RefResolver::new(&doc);
        let pet = resolver.resolve("#/components/schemas/Pet").unwrap();
        assert_eq!(pet["type"], "object");
    }

    #[test]
    fn test_resolve_escaped_segments() {
        let doc = document();
        let resolver = RefResolver::new(&doc);
        let op = resolver.resolve("#/paths/~1pets~1%7Bid%7D/get").unwrap();
        assert_eq!(op["operationId"], "getPet");
        let tilde = resolver.resolve("#/components/schemas/a~0b").unwrap();
        assert_eq!(tilde["type"], "string");
    }

    #[test]
    fn test_resolve_array_index() {
        let doc = document();
        let resolver = RefResolver::new(&doc);
        let second = resolver.resolve("#/components/parameters/list/1").unwrap();
        assert_eq!(second["name"], "second");
    }

    #[test]
    fn test_missing_segment_reported() {
        let doc = document();
        let resolver = RefResolver::new(&doc);
        match resolver.resolve("#/components/schemas/Missing") {
            Err(ResolveError::RefTargetNotFound { segment, .. }) => assert_eq!(segment, "Missing"),
            other => panic!("expected RefTargetNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_follow_chain() {
        let doc = document();
        let resolver = RefResolver::new(&doc);
        let (target, node) = resolver.follow("#/components/schemas/Alias").unwrap();
        assert_eq!(target, "#/components/schemas/Pet");
        assert_eq!(node["type"], "object");
    }

    #[test]
    fn test_follow_cycle() {
        let doc = document();
        let resolver = RefResolver::new(&doc);
        assert!(matches!(
            resolver.follow("#/components/schemas/Loop"),
            Err(ResolveError::CircularRef(_))
        ));
    }

    #[test]
    fn test_external_ref_rejected() {
        assert!(matches!(
            parse_pointer("other.yaml#/components/schemas/Pet"),
            Err(ResolveError::External(_))
        ));
        assert!(matches!(
            parse_pointer("components/schemas/Pet"),
            Err(ResolveError::InvalidRefFormat(_))
        ));
    }

    #[test]
    fn test_names() {
        assert_eq!(ref_name("#/components/schemas/Pet"), "Pet");
        assert_eq!(
            component_schema_name("#/components/schemas/a~1b").as_deref(),
            Some("a/b")
        );
        assert_eq!(component_schema_name("#/components/parameters/Pet"), None);
        assert_eq!(component_schema_ref("a/b"), "#/components/schemas/a~1b");
    }
}
