use indexmap::IndexMap;

use apigen_compiler::{CompilerError, GeneratedFile, Identifier, IdentifierRegistry, Namespace};
use apigen_core::Diagnostics;
use apigen_core::config::{ApigenConfig, PluginConfig, StringCase};
use apigen_core::ir::{IrBody, IrModel, IrOperation, IrParameter, IrSchemaObject, IrServer};

use crate::error::PluginError;

/// Kinds of IR entries a plugin can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Server,
    Schema,
    Parameter,
    RequestBody,
    Operation,
    Webhook,
}

/// One IR entry handed to a plugin callback.
#[derive(Debug, Clone, Copy)]
pub enum IrEvent<'a> {
    Server(&'a IrServer),
    Schema {
        name: &'a str,
        schema: &'a IrSchemaObject,
    },
    Parameter {
        name: &'a str,
        parameter: &'a IrParameter,
    },
    RequestBody {
        name: &'a str,
        body: &'a IrBody,
    },
    Operation(&'a IrOperation),
    Webhook {
        name: &'a str,
        operation: &'a IrOperation,
    },
}

impl IrEvent<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            IrEvent::Server(_) => EventKind::Server,
            IrEvent::Schema { .. } => EventKind::Schema,
            IrEvent::Parameter { .. } => EventKind::Parameter,
            IrEvent::RequestBody { .. } => EventKind::RequestBody,
            IrEvent::Operation(_) => EventKind::Operation,
            IrEvent::Webhook { .. } => EventKind::Webhook,
        }
    }
}

/// Every IR entry in model order: servers, component schemas, component
/// parameters, component request bodies, path operations, webhooks.
fn events(ir: &IrModel) -> impl Iterator<Item = IrEvent<'_>> {
    let components = &ir.components;
    ir.servers
        .iter()
        .map(IrEvent::Server)
        .chain(
            components
                .schemas
                .iter()
                .map(|(name, schema)| IrEvent::Schema { name, schema }),
        )
        .chain(
            components
                .parameters
                .iter()
                .map(|(name, parameter)| IrEvent::Parameter { name, parameter }),
        )
        .chain(
            components
                .request_bodies
                .iter()
                .map(|(name, body)| IrEvent::RequestBody { name, body }),
        )
        .chain(ir.operations().map(IrEvent::Operation))
        .chain(ir.webhooks.iter().flat_map(|(name, operations)| {
            operations
                .values()
                .map(move |operation| IrEvent::Webhook { name, operation })
        }))
}

/// Shared state of one generation run.
///
/// The IR and configuration are borrowed for the whole run; the identifier
/// registry, files and diagnostics are owned here and handed from plugin to
/// plugin.
pub struct PluginContext<'a> {
    ir: &'a IrModel,
    config: &'a ApigenConfig,
    registry: IdentifierRegistry,
    files: IndexMap<String, GeneratedFile>,
    diagnostics: Diagnostics,
}

impl<'a> PluginContext<'a> {
    pub fn new(ir: &'a IrModel, config: &'a ApigenConfig) -> Self {
        Self {
            ir,
            config,
            registry: IdentifierRegistry::new(),
            files: IndexMap::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn ir(&self) -> &'a IrModel {
        self.ir
    }

    pub fn config(&self) -> &'a ApigenConfig {
        self.config
    }

    /// Options of a configured plugin, if the user listed it.
    pub fn plugin_config(&self, name: &str) -> Option<&'a PluginConfig> {
        self.config.plugins.iter().find(|p| p.name() == name)
    }

    /// Create the file `id`, replacing any earlier file with the same id.
    /// Identifiers created for it follow `case`.
    pub fn create_file(
        &mut self,
        id: &str,
        name: &str,
        case: StringCase,
        export_from_index: bool,
    ) -> &mut GeneratedFile {
        let file = GeneratedFile::new(id, name, self.config.output_options.header)
            .with_export_from_index(export_from_index);
        log::debug!("file `{id}` → {}", file.path());
        self.registry.register_file(id, case);
        let (index, _) = self.files.insert_full(id.to_string(), file);
        &mut self.files[index]
    }

    pub fn file(&self, id: &str) -> Option<&GeneratedFile> {
        self.files.get(id)
    }

    pub fn file_mut(&mut self, id: &str) -> Option<&mut GeneratedFile> {
        self.files.get_mut(id)
    }

    /// Look up a file `plugin` cannot work without.
    pub fn require_file(&self, plugin: &str, id: &str) -> Result<&GeneratedFile, PluginError> {
        self.files.get(id).ok_or_else(|| PluginError::MissingFile {
            plugin: plugin.to_string(),
            file: id.to_string(),
        })
    }

    pub fn require_file_mut(
        &mut self,
        plugin: &str,
        id: &str,
    ) -> Result<&mut GeneratedFile, PluginError> {
        self.files.get_mut(id).ok_or_else(|| PluginError::MissingFile {
            plugin: plugin.to_string(),
            file: id.to_string(),
        })
    }

    pub fn identifier(
        &mut self,
        file: &str,
        ref_path: &str,
        namespace: Namespace,
        create: bool,
    ) -> Identifier {
        self.registry.identifier(ref_path, namespace, file, create)
    }

    pub fn name(&self, file: &str, ref_path: &str, namespace: Namespace) -> Option<&str> {
        self.registry.name(ref_path, namespace, file)
    }

    /// Like [`Self::name`], for identifiers another plugin must have declared.
    pub fn require_name(
        &self,
        file: &str,
        ref_path: &str,
        namespace: Namespace,
    ) -> Result<&str, PluginError> {
        self.name(file, ref_path, namespace).ok_or_else(|| {
            CompilerError::MissingIdentifier {
                ref_path: ref_path.to_string(),
                namespace,
                file: file.to_string(),
            }
            .into()
        })
    }

    pub fn suppress(
        &mut self,
        file: &str,
        ref_path: &str,
        namespace: Namespace,
    ) -> Result<(), PluginError> {
        Ok(self.registry.suppress(ref_path, namespace, file)?)
    }

    pub fn warn(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.diagnostics.warn(location, message);
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Call `callback` for every IR entry whose kind is in `kinds`, in model
    /// order. Each entry is visited once; the first error stops the walk.
    pub fn for_each<F>(&mut self, kinds: &[EventKind], mut callback: F) -> Result<(), PluginError>
    where
        F: FnMut(&mut Self, IrEvent<'a>) -> Result<(), PluginError>,
    {
        let ir = self.ir;
        for event in events(ir) {
            if kinds.contains(&event.kind()) {
                callback(self, event)?;
            }
        }
        Ok(())
    }

    /// Files in creation order plus every warning raised by plugins.
    pub fn finish(self) -> (Vec<GeneratedFile>, Diagnostics) {
        (self.files.into_values().collect(), self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apigen_core::ir::{HttpMethod, IrSchemaType};

    fn operation(id: &str) -> IrOperation {
        IrOperation {
            id: id.to_string(),
            method: HttpMethod::Post,
            path: "/".to_string(),
            operation_id: None,
            summary: None,
            description: None,
            deprecated: false,
            tags: vec![],
            parameters: Default::default(),
            body: None,
            responses: IndexMap::new(),
            security: vec![],
            servers: vec![],
        }
    }

    fn model() -> IrModel {
        let mut ir = IrModel::default();
        ir.servers.push(IrServer {
            url: "https://api.example.com".to_string(),
            description: None,
        });
        ir.components
            .schemas
            .insert("Pet".to_string(), IrSchemaObject::of(IrSchemaType::Object));
        ir.components
            .schemas
            .insert("Tag".to_string(), IrSchemaObject::of(IrSchemaType::String));
        let mut ops = IndexMap::new();
        ops.insert(HttpMethod::Post, operation("createPet"));
        ir.paths.insert("/pets".to_string(), ops);
        let mut hooks = IndexMap::new();
        hooks.insert(HttpMethod::Post, operation("newPet"));
        ir.webhooks.insert("newPet".to_string(), hooks);
        ir
    }

    #[test]
    fn test_for_each_filters_and_orders() {
        let ir = model();
        let config = ApigenConfig::default();
        let mut ctx = PluginContext::new(&ir, &config);
        let mut seen = Vec::new();
        ctx.for_each(
            &[EventKind::Webhook, EventKind::Schema, EventKind::Operation],
            |_, event| {
                seen.push(match event {
                    IrEvent::Schema { name, .. } => format!("schema:{name}"),
                    IrEvent::Operation(op) => format!("operation:{}", op.id),
                    IrEvent::Webhook { name, .. } => format!("webhook:{name}"),
                    other => panic!("unexpected event {other:?}"),
                });
                Ok(())
            },
        )
        .unwrap();
        assert_eq!(
            seen,
            vec![
                "schema:Pet",
                "schema:Tag",
                "operation:createPet",
                "webhook:newPet"
            ]
        );
    }

    #[test]
    fn test_for_each_stops_on_error() {
        let ir = model();
        let config = ApigenConfig::default();
        let mut ctx = PluginContext::new(&ir, &config);
        let mut calls = 0;
        let result = ctx.for_each(&[EventKind::Schema], |ctx, _| {
            calls += 1;
            ctx.require_file("test", "missing").map(|_| ())
        });
        assert!(matches!(result, Err(PluginError::MissingFile { .. })));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_create_file_registers_case() {
        let ir = IrModel::default();
        let config = ApigenConfig::default();
        let mut ctx = PluginContext::new(&ir, &config);
        ctx.create_file("types", "types", StringCase::Pascal, true);
        let id = ctx.identifier("types", "#/ir/listPetsData", Namespace::Type, true);
        assert_eq!(id.name(), Some("ListPetsData"));
        assert_eq!(ctx.file("types").map(|f| f.path()), Some("types.gen.ts"));
        assert!(ctx.file("types").is_some_and(|f| f.export_from_index()));
    }

    #[test]
    fn test_require_file_names_plugin() {
        let ir = IrModel::default();
        let config = ApigenConfig::default();
        let ctx = PluginContext::new(&ir, &config);
        let err = ctx.require_file("transformers", "types").unwrap_err();
        assert_eq!(
            err.to_string(),
            "plugin `transformers` needs file `types`, which no plugin has created"
        );
    }
}
