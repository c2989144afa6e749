use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;

use apigen_core::config::StringCase;
use apigen_core::parse::ref_resolve::ref_name;
use apigen_core::transform::naming::apply_case;

use crate::error::CompilerError;

/// TypeScript distinguishes type-level and value-level bindings; a type and a
/// const may share a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Type,
    Value,
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Type => write!(f, "type"),
            Namespace::Value => write!(f, "value"),
        }
    }
}

/// Result of an identifier lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    /// Never registered.
    Unresolved,
    /// Registered under `name`. `created` is true only for the call that
    /// registered it.
    Active { name: String, created: bool },
    /// Registered, then withdrawn. No declaration exists for it.
    Suppressed,
}

impl Identifier {
    pub fn name(&self) -> Option<&str> {
        match self {
            Identifier::Active { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn created(&self) -> bool {
        matches!(self, Identifier::Active { created: true, .. })
    }
}

const RESERVED: &[&str] = &[
    "any", "arguments", "as", "async", "await", "boolean", "break", "case", "catch", "class",
    "const", "continue", "debugger", "declare", "default", "delete", "do", "else", "enum", "eval",
    "export", "extends", "false", "finally", "for", "from", "function", "if", "implements",
    "import", "in", "instanceof", "interface", "let", "new", "null", "number", "of", "package",
    "private", "protected", "public", "return", "static", "string", "super", "switch", "symbol",
    "this", "throw", "true", "try", "type", "typeof", "undefined", "var", "void", "while", "with",
    "yield",
    // Globals the generated code refers to.
    "Array", "BigInt", "Blob", "Date", "File", "Promise", "Record",
];

#[derive(Debug, Clone)]
enum Entry {
    Active(String),
    Suppressed,
}

#[derive(Debug, Clone, Default)]
struct Scope {
    entries: IndexMap<String, Entry>,
    /// Lower-cased names already handed out.
    taken: HashSet<String>,
}

#[derive(Debug, Clone)]
struct FileScope {
    case: StringCase,
    types: Scope,
    values: Scope,
}

impl FileScope {
    fn new(case: StringCase) -> Self {
        Self {
            case,
            types: Scope::default(),
            values: Scope::default(),
        }
    }

    fn scope(&self, namespace: Namespace) -> &Scope {
        match namespace {
            Namespace::Type => &self.types,
            Namespace::Value => &self.values,
        }
    }

    fn scope_mut(&mut self, namespace: Namespace) -> &mut Scope {
        match namespace {
            Namespace::Type => &mut self.types,
            Namespace::Value => &mut self.values,
        }
    }
}

/// Collision-free names keyed by (ref, namespace, file).
///
/// The same inputs always yield the same names, so output is stable across
/// runs as long as plugins request identifiers in the same order.
#[derive(Debug, Clone, Default)]
pub struct IdentifierRegistry {
    files: IndexMap<String, FileScope>,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the case convention of names created in `file`. Files never
    /// registered keep names as they are.
    pub fn register_file(&mut self, file: &str, case: StringCase) {
        self.files
            .entry(file.to_string())
            .and_modify(|scope| scope.case = case)
            .or_insert_with(|| FileScope::new(case));
    }

    pub fn identifier(
        &mut self,
        ref_path: &str,
        namespace: Namespace,
        file: &str,
        create: bool,
    ) -> Identifier {
        if let Some(entry) = self
            .files
            .get(file)
            .and_then(|f| f.scope(namespace).entries.get(ref_path))
        {
            return match entry {
                Entry::Active(name) => Identifier::Active {
                    name: name.clone(),
                    created: false,
                },
                Entry::Suppressed => Identifier::Suppressed,
            };
        }
        if !create {
            return Identifier::Unresolved;
        }

        let file_scope = self
            .files
            .entry(file.to_string())
            .or_insert_with(|| FileScope::new(StringCase::Preserve));
        let base = base_name(ref_path, file_scope.case);
        let scope = file_scope.scope_mut(namespace);
        let name = unique_name(&base, &scope.taken);

        log::debug!("{file}: {namespace} `{name}` for {ref_path}");
        scope.taken.insert(name.to_lowercase());
        scope
            .entries
            .insert(ref_path.to_string(), Entry::Active(name.clone()));
        Identifier::Active {
            name,
            created: true,
        }
    }

    /// Name of an active identifier, without creating one.
    pub fn name(&self, ref_path: &str, namespace: Namespace, file: &str) -> Option<&str> {
        match self.files.get(file)?.scope(namespace).entries.get(ref_path)? {
            Entry::Active(name) => Some(name),
            Entry::Suppressed => None,
        }
    }

    /// Withdraw an identifier whose declaration turned out to be empty.
    /// Later lookups return [`Identifier::Suppressed`]; the name stays taken.
    pub fn suppress(
        &mut self,
        ref_path: &str,
        namespace: Namespace,
        file: &str,
    ) -> Result<(), CompilerError> {
        let entry = self
            .files
            .get_mut(file)
            .and_then(|f| f.scope_mut(namespace).entries.get_mut(ref_path))
            .ok_or_else(|| CompilerError::MissingIdentifier {
                ref_path: ref_path.to_string(),
                namespace,
                file: file.to_string(),
            })?;
        *entry = Entry::Suppressed;
        Ok(())
    }
}

fn base_name(ref_path: &str, case: StringCase) -> String {
    let cased = apply_case(&ref_name(ref_path), case);
    if RESERVED.contains(&cased.as_str()) {
        format!("_{cased}")
    } else {
        cased
    }
}

fn unique_name(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(&base.to_lowercase()) {
        return base.to_string();
    }
    let mut counter = 2;
    loop {
        let candidate = format!("{base}{counter}");
        if !taken.contains(&candidate.to_lowercase()) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPES: &str = "types.gen.ts";

    fn registry() -> IdentifierRegistry {
        let mut registry = IdentifierRegistry::new();
        registry.register_file(TYPES, StringCase::Pascal);
        registry
    }

    #[test]
    fn test_unresolved_without_create() {
        let mut registry = registry();
        assert_eq!(
            registry.identifier("#/components/schemas/Pet", Namespace::Type, TYPES, false),
            Identifier::Unresolved
        );
    }

    #[test]
    fn test_leading_digit_is_prefixed() {
        let mut registry = registry();
        let id = registry.identifier("#/components/schemas/3dModel", Namespace::Type, TYPES, true);
        assert_eq!(id.name(), Some("_3dModel"));
    }

    #[test]
    fn test_create_then_memoized() {
        let mut registry = registry();
        let first = registry.identifier("#/components/schemas/pet_owner", Namespace::Type, TYPES, true);
        assert_eq!(
            first,
            Identifier::Active {
                name: "PetOwner".to_string(),
                created: true
            }
        );
        let second = registry.identifier("#/components/schemas/pet_owner", Namespace::Type, TYPES, true);
        assert_eq!(
            second,
            Identifier::Active {
                name: "PetOwner".to_string(),
                created: false
            }
        );
    }

    #[test]
    fn test_case_insensitive_collisions() {
        let mut registry = registry();
        let a = registry.identifier("#/components/schemas/pet", Namespace::Type, TYPES, true);
        let b = registry.identifier("#/components/schemas/Pet", Namespace::Type, TYPES, true);
        let c = registry.identifier("#/components/schemas/PET", Namespace::Type, TYPES, true);
        assert_eq!(a.name(), Some("Pet"));
        assert_eq!(b.name(), Some("Pet2"));
        assert_eq!(c.name(), Some("Pet3"));
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let mut registry = registry();
        let t = registry.identifier("#/components/schemas/Status", Namespace::Type, TYPES, true);
        let v = registry.identifier("#/components/schemas/Status", Namespace::Value, TYPES, true);
        assert_eq!(t.name(), Some("Status"));
        assert_eq!(v.name(), Some("Status"));
    }

    #[test]
    fn test_files_do_not_collide() {
        let mut registry = registry();
        registry.register_file("transformers.gen.ts", StringCase::Camel);
        let t = registry.identifier("#/components/schemas/Pet", Namespace::Type, TYPES, true);
        let v = registry.identifier(
            "#/components/schemas/Pet",
            Namespace::Value,
            "transformers.gen.ts",
            true,
        );
        assert_eq!(t.name(), Some("Pet"));
        assert_eq!(v.name(), Some("pet"));
    }

    #[test]
    fn test_reserved_words_prefixed() {
        let mut registry = IdentifierRegistry::new();
        let id = registry.identifier("#/components/schemas/Date", Namespace::Type, TYPES, true);
        assert_eq!(id.name(), Some("_Date"));
        let id = registry.identifier("#/components/schemas/delete", Namespace::Value, TYPES, true);
        assert_eq!(id.name(), Some("_delete"));
    }

    #[test]
    fn test_suppress_is_stable() {
        let mut registry = registry();
        registry.identifier("#/ir/listPetsResponse", Namespace::Value, TYPES, true);
        registry
            .suppress("#/ir/listPetsResponse", Namespace::Value, TYPES)
            .unwrap();
        for create in [false, true] {
            assert_eq!(
                registry.identifier("#/ir/listPetsResponse", Namespace::Value, TYPES, create),
                Identifier::Suppressed
            );
        }
        assert_eq!(
            registry.name("#/ir/listPetsResponse", Namespace::Value, TYPES),
            None
        );
    }

    #[test]
    fn test_suppress_unknown_fails() {
        let mut registry = registry();
        let err = registry
            .suppress("#/ir/nothing", Namespace::Type, TYPES)
            .unwrap_err();
        assert!(matches!(err, CompilerError::MissingIdentifier { .. }));
    }
}
