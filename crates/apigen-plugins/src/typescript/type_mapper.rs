use serde_json::Value;

use apigen_compiler::Namespace;
use apigen_compiler::ast::{Keyword, Literal, PropertySignature, TypeNode};
use apigen_compiler::tsc;
use apigen_core::ir::{IrSchemaObject, IrSchemaType, LogicalOperator};

use crate::context::PluginContext;

use super::TYPES_FILE_ID;

/// Maps IR schemas to TypeScript type nodes for the types file.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeMapper {
    /// `date`/`date-time` strings become `Date`.
    pub dates: bool,
    /// `int64` integers become `bigint`.
    pub bigint: bool,
}

impl TypeMapper {
    pub fn map(&self, ctx: &mut PluginContext<'_>, schema: &IrSchemaObject) -> TypeNode {
        if let Some(ref_path) = &schema.ref_path {
            return match ctx
                .identifier(TYPES_FILE_ID, ref_path, Namespace::Type, true)
                .name()
            {
                Some(name) => tsc::type_reference(name),
                None => tsc::keyword(Keyword::Unknown),
            };
        }
        if let Some(value) = &schema.const_value {
            return literal(value);
        }

        match schema.schema_type {
            Some(IrSchemaType::Array) => {
                let element = match schema.items.first() {
                    Some(item) => self.map(ctx, item),
                    None => tsc::keyword(Keyword::Unknown),
                };
                tsc::array_type(element)
            }
            Some(IrSchemaType::Tuple) => {
                let elements = schema.items.iter().map(|item| self.map(ctx, item)).collect();
                tsc::tuple_type(elements)
            }
            Some(IrSchemaType::Enum) => {
                let members = schema.items.iter().map(|item| self.map(ctx, item)).collect();
                tsc::union_type(members)
            }
            Some(IrSchemaType::Object) => self.object(ctx, schema),
            Some(IrSchemaType::String) => self.string(schema),
            Some(IrSchemaType::Integer) if self.bigint && schema.format.as_deref() == Some("int64") => {
                tsc::keyword(Keyword::Bigint)
            }
            Some(IrSchemaType::Integer | IrSchemaType::Number) => tsc::keyword(Keyword::Number),
            Some(IrSchemaType::Boolean) => tsc::keyword(Keyword::Boolean),
            Some(IrSchemaType::Null) => tsc::keyword(Keyword::Null),
            Some(IrSchemaType::Never) => tsc::keyword(Keyword::Never),
            Some(IrSchemaType::Undefined) => tsc::keyword(Keyword::Undefined),
            Some(IrSchemaType::Void) => tsc::keyword(Keyword::Void),
            Some(IrSchemaType::Unknown) => tsc::keyword(Keyword::Unknown),
            None if !schema.items.is_empty() => {
                let members = schema.items.iter().map(|item| self.map(ctx, item)).collect();
                match schema.operator() {
                    LogicalOperator::And => tsc::intersection_type(members),
                    LogicalOperator::Or => tsc::union_type(members),
                }
            }
            None => tsc::keyword(Keyword::Unknown),
        }
    }

    fn string(&self, schema: &IrSchemaObject) -> TypeNode {
        match schema.format.as_deref() {
            Some("binary") => tsc::union_type(vec![
                tsc::type_reference("Blob"),
                tsc::type_reference("File"),
            ]),
            Some("date" | "date-time") if self.dates => tsc::type_reference("Date"),
            _ => tsc::keyword(Keyword::String),
        }
    }

    fn object(&self, ctx: &mut PluginContext<'_>, schema: &IrSchemaObject) -> TypeNode {
        let properties: Vec<PropertySignature> = schema
            .properties
            .iter()
            .map(|(name, property)| {
                let mut signature = tsc::property_signature(
                    name,
                    self.map(ctx, property),
                    !schema.required.contains(name),
                );
                signature.comment = doc_comment(property);
                signature
            })
            .collect();

        let index = match schema.additional_properties.as_deref() {
            None => None,
            Some(additional) if additional.is_type(IrSchemaType::Never) => None,
            Some(additional) => {
                let additional = self.map(ctx, additional);
                if properties.is_empty() {
                    Some(additional)
                } else {
                    // Declared properties must stay assignable to the index signature.
                    let mut members: Vec<TypeNode> =
                        properties.iter().map(|p| p.type_node.clone()).collect();
                    if properties.iter().any(|p| p.optional) {
                        members.push(tsc::keyword(Keyword::Undefined));
                    }
                    members.push(additional);
                    Some(tsc::union_type(members))
                }
            }
        };
        tsc::object_type(properties, index)
    }
}

/// JSDoc lines for a schema: description, then `@deprecated`.
pub fn doc_comment(schema: &IrSchemaObject) -> Vec<String> {
    let mut lines: Vec<String> = schema
        .description
        .iter()
        .flat_map(|d| d.lines())
        .map(str::to_string)
        .collect();
    if schema.deprecated {
        lines.push("@deprecated".to_string());
    }
    lines
}

fn literal(value: &Value) -> TypeNode {
    match value {
        Value::Null => tsc::keyword(Keyword::Null),
        Value::Bool(b) => tsc::literal_type(Literal::Boolean(*b)),
        Value::Number(n) => tsc::literal_type(Literal::Number(n.to_string())),
        Value::String(s) => tsc::literal_type(Literal::String(s.clone())),
        Value::Array(_) | Value::Object(_) => tsc::keyword(Keyword::Unknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apigen_compiler::printer::print_type;
    use apigen_core::config::{ApigenConfig, StringCase};
    use apigen_core::ir::IrModel;

    fn print(mapper: TypeMapper, schema: &IrSchemaObject) -> String {
        let ir = IrModel::default();
        let config = ApigenConfig::default();
        let mut ctx = PluginContext::new(&ir, &config);
        ctx.create_file(TYPES_FILE_ID, "types", StringCase::Pascal, true);
        let node = mapper.map(&mut ctx, schema);
        print_type(&node)
    }

    fn string_with_format(format: &str) -> IrSchemaObject {
        let mut schema = IrSchemaObject::of(IrSchemaType::String);
        schema.format = Some(format.to_string());
        schema
    }

    #[test]
    fn test_primitives() {
        let mapper = TypeMapper::default();
        assert_eq!(print(mapper, &IrSchemaObject::of(IrSchemaType::Integer)), "number");
        assert_eq!(print(mapper, &IrSchemaObject::of(IrSchemaType::Boolean)), "boolean");
        assert_eq!(print(mapper, &IrSchemaObject::of(IrSchemaType::Void)), "void");
        assert_eq!(print(mapper, &IrSchemaObject::default()), "unknown");
    }

    #[test]
    fn test_string_formats() {
        let plain = TypeMapper::default();
        let dates = TypeMapper {
            dates: true,
            bigint: false,
        };
        assert_eq!(print(plain, &string_with_format("date-time")), "string");
        assert_eq!(print(dates, &string_with_format("date-time")), "Date");
        assert_eq!(print(dates, &string_with_format("binary")), "Blob | File");
    }

    #[test]
    fn test_int64_bigint() {
        let mut schema = IrSchemaObject::of(IrSchemaType::Integer);
        schema.format = Some("int64".to_string());
        assert_eq!(print(TypeMapper::default(), &schema), "number");
        let bigint = TypeMapper {
            dates: false,
            bigint: true,
        };
        assert_eq!(print(bigint, &schema), "bigint");
    }

    #[test]
    fn test_ref_uses_registry_name() {
        let schema = IrSchemaObject::reference("#/components/schemas/pet_owner");
        assert_eq!(print(TypeMapper::default(), &schema), "PetOwner");
    }

    #[test]
    fn test_nullable_array() {
        let mut array = IrSchemaObject::of(IrSchemaType::Array);
        array.set_items(
            vec![IrSchemaObject::of(IrSchemaType::String).into_nullable()],
            LogicalOperator::Or,
        );
        assert_eq!(print(TypeMapper::default(), &array), "(string | null)[]");
    }

    #[test]
    fn test_enum_literals() {
        let mut schema = IrSchemaObject::of(IrSchemaType::Enum);
        let items = ["available", "sold"]
            .into_iter()
            .map(|v| {
                let mut item = IrSchemaObject::of(IrSchemaType::String);
                item.const_value = Some(Value::String(v.to_string()));
                item
            })
            .collect();
        schema.set_items(items, LogicalOperator::Or);
        assert_eq!(print(TypeMapper::default(), &schema), "'available' | 'sold'");
    }

    #[test]
    fn test_object_with_additional_properties() {
        let mut schema = IrSchemaObject::of(IrSchemaType::Object);
        schema
            .properties
            .insert("id".to_string(), IrSchemaObject::of(IrSchemaType::Integer));
        schema.required = vec!["id".to_string()];
        schema.additional_properties = Some(Box::new(IrSchemaObject::of(IrSchemaType::String)));
        insta::assert_snapshot!(print(TypeMapper::default(), &schema), @r"
        {
            id: number;
            [key: string]: number | string;
        }
        ");
    }

    #[test]
    fn test_free_form_object() {
        let mut schema = IrSchemaObject::of(IrSchemaType::Object);
        schema.additional_properties = Some(Box::new(IrSchemaObject::of(IrSchemaType::Unknown)));
        insta::assert_snapshot!(print(TypeMapper::default(), &schema), @r"
        {
            [key: string]: unknown;
        }
        ");
    }
}
