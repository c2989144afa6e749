use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use crate::ast::Stmt;
use crate::error::CompilerError;
use crate::printer::{print_stmt, quote};

const HEADER: &str = "// This file is auto-generated by apigen. Do not edit it by hand.";

/// One symbol imported from a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportItem {
    pub name: String,
    pub alias: Option<String>,
    pub type_only: bool,
}

impl ImportItem {
    pub fn value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            type_only: false,
        }
    }

    pub fn type_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            type_only: true,
        }
    }

    /// The name this import binds in the importing file.
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    fn render(&self, all_type_only: bool) -> String {
        let mut out = String::new();
        if self.type_only && !all_type_only {
            out.push_str("type ");
        }
        out.push_str(&self.name);
        if let Some(alias) = &self.alias {
            out.push_str(" as ");
            out.push_str(alias);
        }
        out
    }
}

/// A source file under construction: body nodes in order plus the imports
/// they need.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    id: String,
    path: String,
    header: bool,
    export_from_index: bool,
    /// module → (symbol, type-only) → import
    imports: IndexMap<String, IndexMap<(String, bool), ImportItem>>,
    nodes: Vec<Stmt>,
}

impl GeneratedFile {
    /// `name` is relative to the output directory. A missing extension
    /// defaults to `.ts`.
    pub fn new(id: impl Into<String>, name: &str, header: bool) -> Self {
        let name = if split_extension(name).1.is_none() {
            format!("{name}.ts")
        } else {
            name.to_string()
        };
        Self {
            id: id.into(),
            path: file_name(&name),
            header,
            export_from_index: false,
            imports: IndexMap::new(),
            nodes: Vec::new(),
        }
    }

    pub fn with_export_from_index(mut self, export: bool) -> Self {
        self.export_from_index = export;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Path relative to the output directory, e.g. `types.gen.ts`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn export_from_index(&self) -> bool {
        self.export_from_index
    }

    pub fn add(&mut self, node: impl Into<Stmt>) {
        self.nodes.push(node.into());
    }

    pub fn add_all(&mut self, nodes: impl IntoIterator<Item = Stmt>) {
        self.nodes.extend(nodes);
    }

    /// Record an import, returning the existing record when the same
    /// (module, symbol, kind) was imported before.
    pub fn import(&mut self, module: &str, item: ImportItem) -> &ImportItem {
        let key = (item.name.clone(), item.type_only);
        self.imports
            .entry(module.to_string())
            .or_default()
            .entry(key)
            .or_insert(item)
    }

    /// Only body nodes count; a file holding nothing but imports is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Stmt] {
        &self.nodes
    }

    pub fn remove_last_node(&mut self) -> Option<Stmt> {
        self.nodes.pop()
    }

    /// Header, one import declaration per module, then every node.
    pub fn to_source(&self, separator: &str) -> String {
        let mut sections: Vec<String> = Vec::new();
        if self.header {
            sections.push(HEADER.to_string());
        }

        let imports: Vec<String> = self
            .imports
            .iter()
            .map(|(module, items)| {
                let all_type_only = items.values().all(|i| i.type_only);
                let names: Vec<String> = items.values().map(|i| i.render(all_type_only)).collect();
                let keyword = if all_type_only { "import type" } else { "import" };
                format!("{keyword} {{ {} }} from {};", names.join(", "), quote(module))
            })
            .collect();
        if !imports.is_empty() {
            sections.push(imports.join("\n"));
        }

        sections.extend(self.nodes.iter().map(print_stmt));
        let mut source = sections.join(separator);
        source.push('\n');
        source
    }

    /// Finish the file. Empty files turn into deletions.
    pub fn into_output(self, separator: &str) -> OutputFile {
        let content = (!self.is_empty()).then(|| self.to_source(separator));
        OutputFile {
            path: self.path,
            export_from_index: self.export_from_index,
            content,
        }
    }
}

/// A finished artifact. `content: None` means any file at `path` should be
/// removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: String,
    pub export_from_index: bool,
    pub content: Option<String>,
}

impl OutputFile {
    pub fn write(&self, base: &Path) -> Result<(), CompilerError> {
        let target = base.join(&self.path);
        match &self.content {
            Some(content) => {
                let write_err = |source| CompilerError::Write {
                    path: target.clone(),
                    source,
                };
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(write_err)?;
                }
                fs::write(&target, content).map_err(write_err)?;
                log::debug!("wrote {}", target.display());
            }
            None => {
                if target.exists() {
                    fs::remove_file(&target).map_err(|source| CompilerError::Remove {
                        path: target.clone(),
                        source,
                    })?;
                    log::debug!("removed empty {}", target.display());
                }
            }
        }
        Ok(())
    }
}

/// `types.ts` → `types.gen.ts`. Names containing `index` are kept.
pub fn file_name(name: &str) -> String {
    if name.contains("index") {
        return name.to_string();
    }
    match split_extension(name) {
        (stem, Some(ext)) => format!("{stem}.gen.{ext}"),
        (stem, None) => format!("{stem}.gen"),
    }
}

/// Import specifier for `to` as seen from `from`; both relative to the
/// output directory.
pub fn relative_module(from: &str, to: &str) -> String {
    let target = match split_extension(to) {
        (stem, Some("ts")) => stem,
        _ => to,
    };
    let from_dirs: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let from_dirs = &from_dirs[..from_dirs.len().saturating_sub(1)];
    let to_parts: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();
    let to_dirs = &to_parts[..to_parts.len().saturating_sub(1)];

    let common = from_dirs
        .iter()
        .zip(to_dirs)
        .take_while(|(a, b)| a == b)
        .count();
    let ups = from_dirs.len() - common;
    let rest = to_parts[common..].join("/");
    if ups == 0 {
        format!("./{rest}")
    } else {
        format!("{}{rest}", "../".repeat(ups))
    }
}

/// Split off an alphanumeric extension from the last path component.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    let file_start = name.rfind('/').map_or(0, |i| i + 1);
    match name[file_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let dot = file_start + dot;
            let ext = &name[dot + 1..];
            if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                (&name[..dot], Some(ext))
            } else {
                (name, None)
            }
        }
        _ => (name, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Keyword;
    use crate::tsc;

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("types.ts"), "types.gen.ts");
        assert_eq!(file_name("client/sdk.ts"), "client/sdk.gen.ts");
        assert_eq!(file_name("index.ts"), "index.ts");
        assert_eq!(file_name("types"), "types.gen");
    }

    #[test]
    fn test_new_defaults_extension() {
        assert_eq!(GeneratedFile::new("types", "types", true).path(), "types.gen.ts");
        assert_eq!(GeneratedFile::new("index", "index", true).path(), "index.ts");
    }

    #[test]
    fn test_relative_module() {
        assert_eq!(relative_module("transformers.gen.ts", "types.gen.ts"), "./types.gen");
        assert_eq!(relative_module("a/b.gen.ts", "types.gen.ts"), "../types.gen");
        assert_eq!(relative_module("a/b.gen.ts", "a/c/d.gen.ts"), "./c/d.gen");
        assert_eq!(relative_module("index.ts", "models/types.gen.ts"), "./models/types.gen");
    }

    #[test]
    fn test_import_dedupes() {
        let mut file = GeneratedFile::new("transformers", "transformers", false);
        file.import("./types.gen", ImportItem::type_only("Pet"));
        let mut aliased = ImportItem::type_only("Pet");
        aliased.alias = Some("PetType".to_string());
        let existing = file.import("./types.gen", aliased).clone();
        assert_eq!(existing.local_name(), "Pet");
        file.import("./types.gen", ImportItem::value("Pet"));
        assert_eq!(file.imports["./types.gen"].len(), 2);
    }

    #[test]
    fn test_is_empty_ignores_imports() {
        let mut file = GeneratedFile::new("types", "types", true);
        file.import("./other.gen", ImportItem::value("x"));
        assert!(file.is_empty());
        file.add(tsc::type_alias("A", tsc::keyword(Keyword::String)));
        assert!(!file.is_empty());
        file.remove_last_node();
        assert!(file.is_empty());
    }

    #[test]
    fn test_to_source_merges_imports() {
        let mut file = GeneratedFile::new("transformers", "transformers", true);
        file.import("./types.gen", ImportItem::type_only("Pet"));
        file.import("./types.gen", ImportItem::type_only("Owner"));
        file.import("./client.gen", ImportItem::type_only("Options"));
        file.import("./client.gen", ImportItem::value("client"));
        file.add(tsc::type_alias("A", tsc::type_reference("Pet")).exported());

        insta::assert_snapshot!(file.to_source("\n\n"), @r"
        // This file is auto-generated by apigen. Do not edit it by hand.

        import type { Pet, Owner } from './types.gen';
        import { type Options, client } from './client.gen';

        export type A = Pet;
        ");
    }

    #[test]
    fn test_write_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = GeneratedFile::new("types", "nested/types", false);
        file.add(tsc::type_alias("A", tsc::keyword(Keyword::String)));
        let output = file.into_output("\n");
        output.write(dir.path()).unwrap();
        let target = dir.path().join("nested/types.gen.ts");
        assert_eq!(fs::read_to_string(&target).unwrap(), "type A = string;\n");

        let empty = GeneratedFile::new("types", "nested/types", false).into_output("\n");
        assert!(empty.content.is_none());
        empty.write(dir.path()).unwrap();
        assert!(!target.exists());
    }
}
