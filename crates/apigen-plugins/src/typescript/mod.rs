//! The `typescript` plugin: one type alias per component schema, request
//! and response types per operation, and payload types per webhook.

pub mod type_mapper;

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::Value;

use apigen_compiler::Namespace;
use apigen_compiler::ast::{Expr, Keyword, Literal, PropertySignature, TypeNode};
use apigen_compiler::tsc;
use apigen_core::config::{PluginConfig, StringCase, TypeScriptOptions};
use apigen_core::ir::{
    IrOperation, IrParameterLocation, IrResponse, IrSchemaObject, IrSchemaType,
};
use apigen_core::parse::ref_resolve::component_schema_ref;
use apigen_core::transform::naming::apply_case;

use crate::context::{EventKind, IrEvent, PluginContext};
use crate::error::PluginError;
use crate::plugin::Plugin;

pub use type_mapper::{TypeMapper, doc_comment};

/// Id of the file holding every generated type.
pub const TYPES_FILE_ID: &str = "types";

/// Registry ref of a per-operation type, e.g. `#/ir/listPetsResponse`.
pub fn operation_type_ref(operation_id: &str, suffix: &str) -> String {
    format!("#/ir/{operation_id}{suffix}")
}

fn webhook_payload_ref(name: &str, operation: &IrOperation) -> String {
    format!(
        "#/ir/webhooks/{}/{name}WebhookPayload",
        operation.method.as_lower()
    )
}

pub struct TypeScriptPlugin {
    options: TypeScriptOptions,
}

impl TypeScriptPlugin {
    pub fn new(options: TypeScriptOptions) -> Self {
        Self { options }
    }

    /// Date and bigint types follow what the transformers plugin converts.
    fn mapper(&self, ctx: &PluginContext<'_>) -> TypeMapper {
        match ctx.plugin_config(PluginConfig::TRANSFORMERS) {
            Some(PluginConfig::Transformers(options)) => TypeMapper {
                dates: options.dates,
                bigint: options.bigint,
            },
            _ => TypeMapper::default(),
        }
    }

    fn schema(
        &self,
        ctx: &mut PluginContext<'_>,
        mapper: TypeMapper,
        name: &str,
        schema: &IrSchemaObject,
    ) -> Result<(), PluginError> {
        let ref_path = component_schema_ref(name);
        let Some(type_name) = ctx
            .identifier(TYPES_FILE_ID, &ref_path, Namespace::Type, true)
            .name()
            .map(str::to_string)
        else {
            return Ok(());
        };
        let comment = doc_comment(schema);

        if self.options.enums && schema.is_type(IrSchemaType::Enum) {
            if let Some(value_name) = ctx
                .identifier(TYPES_FILE_ID, &ref_path, Namespace::Value, true)
                .name()
                .map(str::to_string)
            {
                let object = tsc::as_const(tsc::object_literal(enum_members(schema)));
                let mut members = vec![tsc::value_of_type(&value_name)];
                if schema.admits_null() {
                    members.push(tsc::keyword(Keyword::Null));
                }
                let file = ctx.require_file_mut(self.name(), TYPES_FILE_ID)?;
                file.add(
                    tsc::const_variable(&value_name, object)
                        .exported()
                        .with_comment(comment.clone()),
                );
                file.add(
                    tsc::type_alias(&type_name, tsc::union_type(members))
                        .exported()
                        .with_comment(comment),
                );
                return Ok(());
            }
        }

        let type_node = mapper.map(ctx, schema);
        let file = ctx.require_file_mut(self.name(), TYPES_FILE_ID)?;
        file.add(
            tsc::type_alias(type_name, type_node)
                .exported()
                .with_comment(comment),
        );
        Ok(())
    }

    fn operation(
        &self,
        ctx: &mut PluginContext<'_>,
        mapper: TypeMapper,
        operation: &IrOperation,
    ) -> Result<(), PluginError> {
        let data = self.data_type(ctx, mapper, operation);
        self.declare(ctx, &operation_type_ref(&operation.id, "Data"), data, vec![])?;

        let groups = operation.response_groups();

        if !groups.errors.is_empty() {
            let errors = self.status_map(ctx, mapper, &groups.errors);
            self.declare(ctx, &operation_type_ref(&operation.id, "Errors"), errors, vec![])?;
            if let Some(schema) = groups.error_schema() {
                let error = mapper.map(ctx, &schema);
                self.declare(ctx, &operation_type_ref(&operation.id, "Error"), error, vec![])?;
            }
        }

        if !groups.success.is_empty() {
            let responses = self.status_map(ctx, mapper, &groups.success);
            self.declare(
                ctx,
                &operation_type_ref(&operation.id, "Responses"),
                responses,
                vec![],
            )?;
            if let Some(schema) = groups.success_schema() {
                let response = mapper.map(ctx, &schema);
                self.declare(
                    ctx,
                    &operation_type_ref(&operation.id, "Response"),
                    response,
                    vec![],
                )?;
            }
        }
        Ok(())
    }

    fn webhook(
        &self,
        ctx: &mut PluginContext<'_>,
        mapper: TypeMapper,
        name: &str,
        operation: &IrOperation,
    ) -> Result<(), PluginError> {
        let Some(body) = &operation.body else {
            return Ok(());
        };
        let payload = mapper.map(ctx, &body.schema);
        let comment = body.description.iter().cloned().collect();
        self.declare(ctx, &webhook_payload_ref(name, operation), payload, comment)
    }

    /// `{ body, headers, path, query, url }` describing a request. Groups with
    /// nothing in them are typed `never`.
    fn data_type(
        &self,
        ctx: &mut PluginContext<'_>,
        mapper: TypeMapper,
        operation: &IrOperation,
    ) -> TypeNode {
        let mut properties = Vec::new();

        properties.push(match &operation.body {
            Some(body) => {
                let mut property =
                    tsc::property_signature("body", mapper.map(ctx, &body.schema), !body.required);
                property.comment = body.description.iter().cloned().collect();
                property
            }
            None => tsc::property_signature("body", tsc::keyword(Keyword::Never), true),
        });

        for (key, location) in [
            ("headers", IrParameterLocation::Header),
            ("path", IrParameterLocation::Path),
            ("query", IrParameterLocation::Query),
        ] {
            let parameters = operation.parameters.for_location(location);
            if parameters.is_empty() {
                properties.push(tsc::property_signature(key, tsc::keyword(Keyword::Never), true));
                continue;
            }
            let fields: Vec<PropertySignature> = parameters
                .values()
                .map(|parameter| {
                    let mut field = tsc::property_signature(
                        &parameter.name,
                        mapper.map(ctx, &parameter.schema),
                        !parameter.required,
                    );
                    field.comment = parameter.description.iter().cloned().collect();
                    if parameter.deprecated {
                        field.comment.push("@deprecated".to_string());
                    }
                    field
                })
                .collect();
            let required = parameters.values().any(|p| p.required);
            properties.push(tsc::property_signature(
                key,
                tsc::object_type(fields, None),
                !required,
            ));
        }

        properties.push(tsc::property_signature(
            "url",
            tsc::literal_type(Literal::String(operation.path.clone())),
            false,
        ));
        tsc::object_type(properties, None)
    }

    /// Status code → schema, documented with each response's description.
    fn status_map(
        &self,
        ctx: &mut PluginContext<'_>,
        mapper: TypeMapper,
        responses: &IndexMap<&str, &IrResponse>,
    ) -> TypeNode {
        let properties = responses
            .iter()
            .map(|(status, response)| {
                let mut property =
                    tsc::property_signature(*status, mapper.map(ctx, &response.schema), false);
                property.comment = response.description.iter().cloned().collect();
                property
            })
            .collect();
        tsc::object_type(properties, None)
    }

    fn declare(
        &self,
        ctx: &mut PluginContext<'_>,
        ref_path: &str,
        type_node: TypeNode,
        comment: Vec<String>,
    ) -> Result<(), PluginError> {
        let Some(name) = ctx
            .identifier(TYPES_FILE_ID, ref_path, Namespace::Type, true)
            .name()
            .map(str::to_string)
        else {
            return Ok(());
        };
        ctx.require_file_mut(self.name(), TYPES_FILE_ID)?
            .add(tsc::type_alias(name, type_node).exported().with_comment(comment));
        Ok(())
    }
}

impl Plugin for TypeScriptPlugin {
    fn name(&self) -> &'static str {
        PluginConfig::TYPESCRIPT
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[]
    }

    fn run(&self, ctx: &mut PluginContext<'_>) -> Result<(), PluginError> {
        ctx.create_file(
            TYPES_FILE_ID,
            &self.options.output,
            self.options.case,
            self.options.export_from_index,
        );
        let mapper = self.mapper(ctx);

        ctx.for_each(
            &[EventKind::Schema, EventKind::Operation, EventKind::Webhook],
            |ctx, event| match event {
                IrEvent::Schema { name, schema } => self.schema(ctx, mapper, name, schema),
                IrEvent::Operation(operation) => self.operation(ctx, mapper, operation),
                IrEvent::Webhook { name, operation } => self.webhook(ctx, mapper, name, operation),
                _ => Ok(()),
            },
        )
    }
}

/// `KEY: value` entries of an `as const` enum object. `null` members have
/// no key; duplicate keys get a numeric suffix.
fn enum_members(schema: &IrSchemaObject) -> Vec<(String, Expr)> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut members = Vec::new();
    for item in &schema.items {
        let (label, value) = match &item.const_value {
            Some(Value::String(s)) => (s.clone(), tsc::string_literal(s)),
            Some(Value::Number(n)) => (n.to_string(), tsc::number_literal(n)),
            Some(Value::Bool(b)) => (b.to_string(), Expr::Literal(Literal::Boolean(*b))),
            _ => continue,
        };
        let base = enum_key(&label);
        let mut key = base.clone();
        let mut counter = 2;
        while !taken.insert(key.clone()) {
            key = format!("{base}_{counter}");
            counter += 1;
        }
        members.push((key, value));
    }
    members
}

fn enum_key(label: &str) -> String {
    apply_case(label, StringCase::ScreamingSnake)
}
