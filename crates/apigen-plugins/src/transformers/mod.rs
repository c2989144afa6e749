//! The `transformers` plugin: response transformers that revive values JSON
//! cannot carry (dates, big integers) after a response body is parsed.

pub mod expressions;

use apigen_compiler::Namespace;
use apigen_compiler::ast::{ArrowFunction, Expr, Keyword, Stmt};
use apigen_compiler::{ImportItem, relative_module, tsc};
use apigen_core::config::{PluginConfig, StringCase, TransformersOptions, render_name_template};
use apigen_core::ir::{IrOperation, IrSchemaObject, IrSchemaType, LogicalOperator};
use apigen_core::parse::ref_resolve::{component_schema_name, escape_segment};

use crate::context::{EventKind, IrEvent, PluginContext};
use crate::error::PluginError;
use crate::plugin::Plugin;
use crate::typescript::{TYPES_FILE_ID, operation_type_ref};

use expressions::{Extension, bigint_expressions, date_expressions};

/// Id of the file holding every transformer.
pub const TRANSFORMERS_FILE_ID: &str = "transformers";

const DATA: &str = "data";
const ITEM: &str = "item";
const MAX_DEPTH: usize = 32;

pub struct TransformersPlugin {
    options: TransformersOptions,
    extensions: Vec<Extension>,
}

impl TransformersPlugin {
    pub fn new(options: TransformersOptions) -> Self {
        let mut extensions: Vec<Extension> = Vec::new();
        if options.dates {
            extensions.push(date_expressions);
        }
        if options.bigint {
            extensions.push(bigint_expressions);
        }
        Self {
            options,
            extensions,
        }
    }

    fn operation(
        &self,
        ctx: &mut PluginContext<'_>,
        operation: &IrOperation,
    ) -> Result<(), PluginError> {
        let groups = operation.response_groups();

        let mut distinct: Vec<&IrSchemaObject> = Vec::new();
        for response in groups.success.values() {
            let schema = &response.schema;
            if !schema.is_type(IrSchemaType::Void) && !distinct.contains(&schema) {
                distinct.push(schema);
            }
        }
        if distinct.len() > 1 {
            log::debug!(
                "{} {} has {} non-void success responses; no response transformer generated",
                operation.method.as_str(),
                operation.path,
                distinct.len()
            );
            return Ok(());
        }
        let Some(response) = groups.success_schema() else {
            return Ok(());
        };

        let response_type = ctx
            .require_name(
                TYPES_FILE_ID,
                &operation_type_ref(&operation.id, "Response"),
                Namespace::Type,
            )?
            .to_string();

        let transformer =
            render_name_template(self.name(), &self.options.response_name, &operation.id)?;
        let transformer_ref = format!("#/ir/{}", escape_segment(&transformer));
        let Some(transformer_name) = ctx
            .identifier(TRANSFORMERS_FILE_ID, &transformer_ref, Namespace::Value, true)
            .name()
            .map(str::to_string)
        else {
            return Ok(());
        };

        let location = format!("#/ir/{}/responses", operation.id);
        let nodes = self.function_body(ctx, &response, &location, 0)?;
        if nodes.is_empty() {
            ctx.suppress(TRANSFORMERS_FILE_ID, &transformer_ref, Namespace::Value)?;
            return Ok(());
        }

        let types_path = ctx.require_file(self.name(), TYPES_FILE_ID)?.path().to_string();
        let file = ctx.require_file_mut(self.name(), TRANSFORMERS_FILE_ID)?;
        let module = relative_module(file.path(), &types_path);
        let local = file
            .import(&module, ImportItem::type_only(response_type))
            .local_name()
            .to_string();

        let function = ArrowFunction {
            is_async: true,
            parameters: vec![tsc::parameter(DATA, Some(tsc::keyword(Keyword::Any)))],
            return_type: Some(tsc::generic_type("Promise", vec![tsc::type_reference(local)])),
            body: nodes,
        };
        file.add(tsc::const_variable(transformer_name, Expr::Arrow(Box::new(function))).exported());
        Ok(())
    }

    /// Statements transforming `data` in place, ending with `return data`.
    /// Empty when nothing needs transforming.
    fn function_body(
        &self,
        ctx: &mut PluginContext<'_>,
        schema: &IrSchemaObject,
        location: &str,
        depth: usize,
    ) -> Result<Vec<Stmt>, PluginError> {
        let data = tsc::identifier(DATA);
        let mut nodes = self.guarded(ctx, schema, &data, location, depth)?;
        if nodes.last().is_some_and(|n| !n.is_return()) {
            nodes.push(tsc::return_stmt(data));
        }
        Ok(nodes)
    }

    /// Like [`Self::process`], wrapped in a presence check when the value may
    /// be `null`.
    fn guarded(
        &self,
        ctx: &mut PluginContext<'_>,
        schema: &IrSchemaObject,
        target: &Expr,
        location: &str,
        depth: usize,
    ) -> Result<Vec<Stmt>, PluginError> {
        let nodes = self.process(ctx, schema, target, location, depth)?;
        if nodes.is_empty() || !schema.admits_null() {
            return Ok(nodes);
        }
        Ok(vec![tsc::if_stmt(tsc::is_present(target.clone()), nodes)])
    }

    /// Statements converting the value at `target` according to `schema`.
    fn process(
        &self,
        ctx: &mut PluginContext<'_>,
        schema: &IrSchemaObject,
        target: &Expr,
        location: &str,
        depth: usize,
    ) -> Result<Vec<Stmt>, PluginError> {
        if depth > MAX_DEPTH {
            ctx.warn(
                location,
                format!("schema nests deeper than {MAX_DEPTH} levels; transformer truncated"),
            );
            return Ok(vec![]);
        }

        if let Some(ref_path) = &schema.ref_path {
            return self.reference(ctx, ref_path, target, location, depth);
        }
        match schema.schema_type {
            Some(IrSchemaType::Array) => return self.array(ctx, schema, target, location, depth),
            Some(IrSchemaType::Object) => return self.object(ctx, schema, target, location, depth),
            Some(IrSchemaType::Tuple | IrSchemaType::Enum) => return Ok(vec![]),
            _ => {}
        }

        if !schema.items.is_empty() {
            return self.composition(ctx, schema, target, location, depth);
        }

        Ok(self
            .extensions
            .iter()
            .find_map(|extension| extension(schema, target))
            .unwrap_or_default())
    }

    /// One call to the memoized helper of the referenced component.
    fn reference(
        &self,
        ctx: &mut PluginContext<'_>,
        ref_path: &str,
        target: &Expr,
        location: &str,
        depth: usize,
    ) -> Result<Vec<Stmt>, PluginError> {
        let Some(schema_name) = component_schema_name(ref_path) else {
            ctx.warn(location, format!("cannot transform non-component reference {ref_path}"));
            return Ok(vec![]);
        };
        let helper = render_name_template(self.name(), &self.options.schema_name, &schema_name)?;
        let helper_ref = format!("#/transformers/schemas/{}", escape_segment(&helper));

        let identifier = ctx.identifier(TRANSFORMERS_FILE_ID, &helper_ref, Namespace::Value, true);
        let name = match (identifier.created(), identifier.name()) {
            (true, Some(name)) => {
                let name = name.to_string();
                let body = match ctx.ir().component_schema(ref_path) {
                    Some(schema) => self.function_body(ctx, schema, ref_path, depth + 1)?,
                    None => vec![],
                };
                if body.is_empty() {
                    ctx.suppress(TRANSFORMERS_FILE_ID, &helper_ref, Namespace::Value)?;
                    return Ok(vec![]);
                }
                let function = tsc::arrow_function(
                    vec![tsc::parameter(DATA, Some(tsc::keyword(Keyword::Any)))],
                    body,
                );
                ctx.require_file_mut(self.name(), TRANSFORMERS_FILE_ID)?
                    .add(tsc::const_variable(&name, Expr::Arrow(Box::new(function))));
                name
            }
            (false, Some(name)) => name.to_string(),
            (_, None) => return Ok(vec![]),
        };

        let call = tsc::call(tsc::identifier(name), vec![target.clone()]);
        Ok(vec![tsc::expr_stmt(tsc::assign(target.clone(), call))])
    }

    /// `target = target.map((item: any) => { ...; return item; })`.
    fn array(
        &self,
        ctx: &mut PluginContext<'_>,
        schema: &IrSchemaObject,
        target: &Expr,
        location: &str,
        depth: usize,
    ) -> Result<Vec<Stmt>, PluginError> {
        let Some(element) = schema.items.first() else {
            return Ok(vec![]);
        };
        let item = tsc::identifier(ITEM);
        let mut body =
            self.guarded(ctx, element, &item, &format!("{location}/items"), depth + 1)?;
        if body.is_empty() {
            return Ok(vec![]);
        }

        // `item = f(item)` alone collapses to `return f(item)`.
        let collapsed = match body.as_slice() {
            [Stmt::Expr(Expr::Assign { target: assigned, value })] if **assigned == item => {
                Some(tsc::return_stmt((**value).clone()))
            }
            _ => None,
        };
        match collapsed {
            Some(node) => body = vec![node],
            None if !body.iter().any(Stmt::is_return) => body.push(tsc::return_stmt(item)),
            None => {}
        }

        let callback = tsc::arrow_function(
            vec![tsc::parameter(ITEM, Some(tsc::keyword(Keyword::Any)))],
            body,
        );
        let mapped = tsc::call(
            tsc::property_access(target.clone(), "map"),
            vec![Expr::Arrow(Box::new(callback))],
        );
        Ok(vec![tsc::expr_stmt(tsc::assign(target.clone(), mapped))])
    }

    /// Each property in declaration order. Only required properties that can
    /// never be `null` go unguarded.
    fn object(
        &self,
        ctx: &mut PluginContext<'_>,
        schema: &IrSchemaObject,
        target: &Expr,
        location: &str,
        depth: usize,
    ) -> Result<Vec<Stmt>, PluginError> {
        let mut nodes = Vec::new();
        for (name, property) in &schema.properties {
            let access = tsc::property_access(target.clone(), name);
            let property_location = format!("{location}/properties/{}", escape_segment(name));
            let property_nodes =
                self.process(ctx, property, &access, &property_location, depth + 1)?;
            if property_nodes.is_empty() {
                continue;
            }
            if schema.required.contains(name) && !property.admits_null() {
                nodes.extend(property_nodes);
            } else {
                nodes.push(tsc::if_stmt(tsc::is_present(access), property_nodes));
            }
        }
        Ok(nodes)
    }

    /// `allOf` parts and nullable pairs apply to the same value. Other unions
    /// cannot be told apart at runtime and are left untouched.
    fn composition(
        &self,
        ctx: &mut PluginContext<'_>,
        schema: &IrSchemaObject,
        target: &Expr,
        location: &str,
        depth: usize,
    ) -> Result<Vec<Stmt>, PluginError> {
        let items = &schema.items;
        if let [only] = items.as_slice() {
            return self.process(ctx, only, target, &format!("{location}/items/0"), depth + 1);
        }

        let nullable_pair = items.len() == 2
            && items
                .iter()
                .any(|item| item.schema_type.is_some_and(IrSchemaType::is_nullish));
        if schema.operator() == LogicalOperator::And || nullable_pair {
            let mut nodes = Vec::new();
            for (i, item) in items.iter().enumerate() {
                let item_location = format!("{location}/items/{i}");
                nodes.extend(self.process(ctx, item, target, &item_location, depth + 1)?);
            }
            return Ok(nodes);
        }

        let complex = items.iter().any(|item| {
            !item
                .schema_type
                .is_some_and(|t| t.is_primitive() || t == IrSchemaType::Null)
        });
        if complex {
            ctx.warn(
                location,
                format!(
                    "union of {} schemas is too complex to transform; values pass through unchanged",
                    items.len()
                ),
            );
        }
        Ok(vec![])
    }
}

impl Plugin for TransformersPlugin {
    fn name(&self) -> &'static str {
        PluginConfig::TRANSFORMERS
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[PluginConfig::TYPESCRIPT]
    }

    fn run(&self, ctx: &mut PluginContext<'_>) -> Result<(), PluginError> {
        ctx.require_file(self.name(), TYPES_FILE_ID)?;
        ctx.create_file(
            TRANSFORMERS_FILE_ID,
            &self.options.output,
            StringCase::Camel,
            self.options.export_from_index,
        );

        ctx.for_each(&[EventKind::Operation], |ctx, event| match event {
            IrEvent::Operation(operation) => self.operation(ctx, operation),
            _ => Ok(()),
        })
    }
}
