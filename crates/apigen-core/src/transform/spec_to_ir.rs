use indexmap::IndexMap;

use crate::config::{ApigenConfig, NamingStrategy, PaginationConfig};
use crate::diagnostic::Diagnostics;
use crate::error::{ConfigError, TransformError};
use crate::ir::*;
use crate::parse::SpecDocument;
use crate::parse::document::{OpenApiSpec, Server};
use crate::parse::operation::PathItem;
use crate::parse::ref_resolve::{RefResolver, escape_segment};

use super::operation_id::OperationIdRegistry;
use super::pagination::PaginationMatcher;

/// Options controlling how the transform phase names and annotates operations.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    pub naming_strategy: NamingStrategy,
    pub aliases: IndexMap<String, String>,
    pub pagination_keywords: Vec<String>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            naming_strategy: NamingStrategy::default(),
            aliases: IndexMap::new(),
            pagination_keywords: PaginationConfig::default().keywords,
        }
    }
}

impl TransformOptions {
    pub fn from_config(config: &ApigenConfig) -> Self {
        Self {
            naming_strategy: config.naming.strategy,
            aliases: config.naming.aliases.clone(),
            pagination_keywords: config.pagination.keywords.clone(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (operation, alias) in &self.aliases {
            if alias.trim().is_empty() {
                return Err(ConfigError::EmptyAlias(operation.clone()));
            }
        }
        Ok(())
    }
}

/// Transform a parsed document into the IR with default options.
pub fn transform(doc: &SpecDocument) -> Result<IrModel, TransformError> {
    transform_with_options(doc, &TransformOptions::default()).map(|(ir, _)| ir)
}

/// Transform with explicit options, returning the warnings collected on the way.
pub fn transform_with_options(
    doc: &SpecDocument,
    options: &TransformOptions,
) -> Result<(IrModel, Diagnostics), TransformError> {
    options.validate()?;
    let mut normalizer = Normalizer::new(doc, options);
    normalizer.run();
    Ok((normalizer.ir, normalizer.diagnostics))
}

/// Which top-level map an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Paths,
    Webhooks,
}

impl Section {
    fn pointer(self) -> &'static str {
        match self {
            Section::Paths => "#/paths",
            Section::Webhooks => "#/webhooks",
        }
    }
}

/// State shared by every conversion function during one transform.
pub(crate) struct Normalizer<'a> {
    pub(crate) spec: &'a OpenApiSpec,
    pub(crate) resolver: RefResolver<'a>,
    pub(crate) options: &'a TransformOptions,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) ir: IrModel,
    pub(crate) security_schemes: IndexMap<String, IrSecurityScheme>,
    pub(crate) operation_ids: OperationIdRegistry,
    pub(crate) pagination: PaginationMatcher,
    /// Non-component pointers currently being inlined.
    pub(crate) inline_stack: Vec<String>,
}

impl<'a> Normalizer<'a> {
    fn new(doc: &'a SpecDocument, options: &'a TransformOptions) -> Self {
        Self {
            spec: &doc.spec,
            resolver: RefResolver::new(&doc.raw),
            options,
            diagnostics: Diagnostics::new(),
            ir: IrModel::default(),
            security_schemes: IndexMap::new(),
            operation_ids: OperationIdRegistry::default(),
            pagination: PaginationMatcher::new(options.pagination_keywords.clone()),
            inline_stack: Vec::new(),
        }
    }

    fn run(&mut self) {
        let spec = self.spec;

        self.ir.info = IrInfo {
            title: spec.info.title.clone(),
            description: spec.info.description.clone(),
            version: spec.info.version.clone(),
        };
        self.add_servers(&spec.servers);
        self.security_schemes = self.collect_security_schemes();

        // Components first: operations look them up for pagination.
        self.collect_components();

        for (path, item) in &spec.paths {
            self.collect_path_item(Section::Paths, path, item);
        }
        for (name, item) in &spec.webhooks {
            self.collect_path_item(Section::Webhooks, name, item);
        }
    }

    fn collect_components(&mut self) {
        let spec = self.spec;
        let Some(components) = spec.components.as_ref() else {
            return;
        };

        for (name, schema) in &components.schemas {
            let location = format!("#/components/schemas/{}", escape_segment(name));
            let ir_schema = self.schema_or_ref(schema, &location);
            self.ir.components.schemas.insert(name.clone(), ir_schema);
        }
        for (name, parameter) in &components.parameters {
            let location = format!("#/components/parameters/{}", escape_segment(name));
            if let Some(ir_param) = self.parameter_or_ref(parameter, &location) {
                self.ir.components.parameters.insert(name.clone(), ir_param);
            }
        }
        for (name, body) in &components.request_bodies {
            let location = format!("#/components/requestBodies/{}", escape_segment(name));
            if let Some(ir_body) = self.request_body_or_ref(body, &location) {
                self.ir.components.request_bodies.insert(name.clone(), ir_body);
            }
        }
    }

    fn collect_path_item(&mut self, section: Section, key: &str, item: &PathItem) {
        let location = format!("{}/{}", section.pointer(), escape_segment(key));
        let resolved;
        let item = match item.ref_path.as_deref() {
            Some(ref_path) => match self.resolver.resolve_as::<PathItem>(ref_path) {
                Ok(target) => {
                    resolved = target;
                    &resolved
                }
                Err(e) => {
                    self.diagnostics
                        .warn(&location, format!("skipping path item: {e}"));
                    return;
                }
            },
            None => item,
        };

        self.add_servers(&item.servers);
        let shared = self.parameter_list(&item.parameters, &location);

        for (method, op) in item.operations() {
            let op_location = format!("{location}/{}", method.as_lower());
            let ir_op = self.operation(method, key, op, &shared, &op_location);
            let target = match section {
                Section::Paths => &mut self.ir.paths,
                Section::Webhooks => &mut self.ir.webhooks,
            };
            target
                .entry(key.to_string())
                .or_default()
                .insert(method, ir_op);
        }
    }

    /// Append servers not seen yet, keeping declaration order.
    pub(crate) fn add_servers(&mut self, servers: &[Server]) {
        for server in servers {
            let ir_server = IrServer {
                url: server.url.clone(),
                description: server.description.clone(),
            };
            if !self.ir.servers.contains(&ir_server) {
                self.ir.servers.push(ir_server);
            }
        }
    }
}
