use serde_json::Value;

use crate::ir::{AccessScope, IrSchemaObject, IrSchemaType, LogicalOperator};
use crate::parse::ref_resolve::{component_schema_name, component_schema_ref, escape_segment};
use crate::parse::schema::{
    AdditionalProperties, Annotations, ExclusiveBound, Schema, SchemaOrRef, SchemaType, TypeSet,
};

use super::spec_to_ir::Normalizer;

impl Normalizer<'_> {
    /// Convert any schema position (component, property, parameter, body) to IR.
    pub(crate) fn schema_or_ref(&mut self, schema: &SchemaOrRef, location: &str) -> IrSchemaObject {
        match schema {
            SchemaOrRef::Ref { ref_path } => self.schema_ref(ref_path, location),
            SchemaOrRef::Bool(true) => IrSchemaObject::of(IrSchemaType::Unknown),
            SchemaOrRef::Bool(false) => IrSchemaObject::of(IrSchemaType::Never),
            SchemaOrRef::Schema(schema) => self.schema(schema, location),
        }
    }

    /// Component schema refs stay refs; any other local pointer is inlined.
    fn schema_ref(&mut self, ref_path: &str, location: &str) -> IrSchemaObject {
        if let Some(name) = component_schema_name(ref_path) {
            let exists = self
                .spec
                .components
                .as_ref()
                .is_some_and(|c| c.schemas.contains_key(&name));
            if exists {
                return IrSchemaObject::reference(component_schema_ref(&name));
            }
            self.diagnostics
                .warn(location, format!("unresolved schema reference {ref_path}"));
            return IrSchemaObject::of(IrSchemaType::Unknown);
        }

        if self.inline_stack.iter().any(|p| p == ref_path) {
            self.diagnostics.warn(
                location,
                format!("circular reference {ref_path} outside components"),
            );
            return IrSchemaObject::of(IrSchemaType::Unknown);
        }

        let target = self.resolver.resolve(ref_path).and_then(|node| {
            serde_json::from_value::<SchemaOrRef>(node.clone()).map_err(|source| {
                crate::error::ResolveError::Shape {
                    pointer: ref_path.to_string(),
                    source,
                }
            })
        });
        match target {
            Ok(target) => {
                self.inline_stack.push(ref_path.to_string());
                let schema = self.schema_or_ref(&target, ref_path);
                self.inline_stack.pop();
                schema
            }
            Err(e) => {
                self.diagnostics.warn(location, e.to_string());
                IrSchemaObject::of(IrSchemaType::Unknown)
            }
        }
    }

    fn schema(&mut self, schema: &Schema, location: &str) -> IrSchemaObject {
        let mut ir = self.schema_body(schema, location);
        apply_documentation(&mut ir, &schema.annotations);
        if schema.nullable {
            ir = ir.into_nullable();
        }
        ir
    }

    fn schema_body(&mut self, schema: &Schema, location: &str) -> IrSchemaObject {
        if let Some(value) = &schema.const_value {
            return const_schema(value);
        }
        if !schema.enum_values.is_empty() {
            return enum_schema(&schema.enum_values);
        }
        if !schema.all_of.is_empty() {
            return self.all_of(schema, location);
        }
        if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
            return self.union(schema, location);
        }
        self.typed(schema, location)
    }

    fn all_of(&mut self, schema: &Schema, location: &str) -> IrSchemaObject {
        let mut items: Vec<IrSchemaObject> = schema
            .all_of
            .iter()
            .enumerate()
            .map(|(i, s)| self.schema_or_ref(s, &format!("{location}/allOf/{i}")))
            .collect();
        if let Some(own) = self.own_structure(schema, location) {
            items.push(own);
        }
        IrSchemaObject::with_items(items, LogicalOperator::And)
    }

    fn union(&mut self, schema: &Schema, location: &str) -> IrSchemaObject {
        let (keyword, variants) = if schema.one_of.is_empty() {
            ("anyOf", &schema.any_of)
        } else {
            ("oneOf", &schema.one_of)
        };
        let items: Vec<IrSchemaObject> = variants
            .iter()
            .enumerate()
            .map(|(i, s)| self.schema_or_ref(s, &format!("{location}/{keyword}/{i}")))
            .collect();
        let union = IrSchemaObject::with_items(items, LogicalOperator::Or);
        match self.own_structure(schema, location) {
            Some(own) => IrSchemaObject::with_items(vec![union, own], LogicalOperator::And),
            None => union,
        }
    }

    /// Properties declared next to a composition keyword.
    fn own_structure(&mut self, schema: &Schema, location: &str) -> Option<IrSchemaObject> {
        if schema.properties.is_empty() {
            return None;
        }
        Some(self.object(schema, location))
    }

    fn typed(&mut self, schema: &Schema, location: &str) -> IrSchemaObject {
        match &schema.schema_type {
            Some(TypeSet::Single(t)) => self.single_type(t, schema, location),
            Some(TypeSet::Multiple(types)) => {
                let items: Vec<IrSchemaObject> = types
                    .iter()
                    .map(|t| self.single_type(t, schema, location))
                    .collect();
                IrSchemaObject::with_items(items, LogicalOperator::Or)
            }
            None => {
                if !schema.properties.is_empty() || schema.additional_properties.is_some() {
                    self.object(schema, location)
                } else if schema.items.is_some() || !schema.prefix_items.is_empty() {
                    self.array(schema, location)
                } else {
                    IrSchemaObject::of(IrSchemaType::Unknown)
                }
            }
        }
    }

    fn single_type(&mut self, t: &SchemaType, schema: &Schema, location: &str) -> IrSchemaObject {
        let mut ir = match t {
            SchemaType::String => IrSchemaObject::of(IrSchemaType::String),
            SchemaType::Number => IrSchemaObject::of(IrSchemaType::Number),
            SchemaType::Integer => IrSchemaObject::of(IrSchemaType::Integer),
            SchemaType::Boolean => IrSchemaObject::of(IrSchemaType::Boolean),
            SchemaType::Null => return IrSchemaObject::of(IrSchemaType::Null),
            SchemaType::Array => return self.array(schema, location),
            SchemaType::Object => return self.object(schema, location),
            SchemaType::Unknown => {
                self.diagnostics
                    .warn(location, "unrecognized `type`; schema treated as unknown");
                return IrSchemaObject::of(IrSchemaType::Unknown);
            }
        };
        apply_validation(&mut ir, schema);
        ir
    }

    fn array(&mut self, schema: &Schema, location: &str) -> IrSchemaObject {
        let mut ir = if !schema.prefix_items.is_empty() {
            let items: Vec<IrSchemaObject> = schema
                .prefix_items
                .iter()
                .enumerate()
                .map(|(i, s)| self.schema_or_ref(s, &format!("{location}/prefixItems/{i}")))
                .collect();
            let mut tuple = IrSchemaObject::of(IrSchemaType::Tuple);
            tuple.set_items(items, LogicalOperator::And);
            tuple
        } else {
            let item = match &schema.items {
                Some(items) => self.schema_or_ref(items, &format!("{location}/items")),
                None => IrSchemaObject::of(IrSchemaType::Unknown),
            };
            let mut array = IrSchemaObject::of(IrSchemaType::Array);
            array.set_items(vec![item], LogicalOperator::Or);
            array
        };
        ir.min_items = schema.bounds.min_items;
        ir.max_items = schema.bounds.max_items;
        ir
    }

    fn object(&mut self, schema: &Schema, location: &str) -> IrSchemaObject {
        let mut ir = IrSchemaObject::of(IrSchemaType::Object);
        for (name, property) in &schema.properties {
            let property_location = format!("{location}/properties/{}", escape_segment(name));
            let converted = self.schema_or_ref(property, &property_location);
            ir.properties.insert(name.clone(), converted);
        }
        ir.required = schema.required.clone();
        ir.additional_properties = match &schema.additional_properties {
            Some(AdditionalProperties::Schema(s)) => Some(Box::new(
                self.schema_or_ref(s, &format!("{location}/additionalProperties")),
            )),
            Some(AdditionalProperties::Bool(true)) => {
                Some(Box::new(IrSchemaObject::of(IrSchemaType::Unknown)))
            }
            Some(AdditionalProperties::Bool(false)) => {
                Some(Box::new(IrSchemaObject::of(IrSchemaType::Never)))
            }
            None if schema.properties.is_empty() => {
                Some(Box::new(IrSchemaObject::of(IrSchemaType::Unknown)))
            }
            None => None,
        };
        ir
    }
}

fn const_schema(value: &Value) -> IrSchemaObject {
    let mut ir = IrSchemaObject::of(json_value_type(value));
    ir.const_value = Some(value.clone());
    ir
}

fn enum_schema(values: &[Value]) -> IrSchemaObject {
    let mut ir = IrSchemaObject::of(IrSchemaType::Enum);
    let items = values.iter().map(const_schema).collect();
    ir.set_items(items, LogicalOperator::Or);
    ir
}

fn json_value_type(value: &Value) -> IrSchemaType {
    match value {
        Value::Null => IrSchemaType::Null,
        Value::Bool(_) => IrSchemaType::Boolean,
        Value::Number(n) if n.is_i64() || n.is_u64() => IrSchemaType::Integer,
        Value::Number(_) => IrSchemaType::Number,
        Value::String(_) => IrSchemaType::String,
        Value::Array(_) | Value::Object(_) => IrSchemaType::Unknown,
    }
}

fn apply_validation(ir: &mut IrSchemaObject, schema: &Schema) {
    let bounds = &schema.bounds;
    ir.format = schema.format.clone();
    ir.pattern = bounds.pattern.clone();
    ir.min_length = bounds.min_length;
    ir.max_length = bounds.max_length;
    ir.minimum = bounds.minimum;
    ir.maximum = bounds.maximum;
    ir.exclusive_minimum = exclusive(bounds.exclusive_minimum, &mut ir.minimum);
    ir.exclusive_maximum = exclusive(bounds.exclusive_maximum, &mut ir.maximum);
}

/// A 3.1 bound is taken as is; a 3.0 `true` flag moves the inclusive bound.
fn exclusive(bound: Option<ExclusiveBound>, inclusive: &mut Option<f64>) -> Option<f64> {
    match bound {
        Some(ExclusiveBound::Value(v)) => Some(v),
        Some(ExclusiveBound::Flag(true)) => inclusive.take(),
        Some(ExclusiveBound::Flag(false)) | None => None,
    }
}

/// Annotations override what a referenced or composed base already set.
fn apply_documentation(ir: &mut IrSchemaObject, annotations: &Annotations) {
    if let Some(title) = &annotations.title {
        ir.title = Some(title.clone());
    }
    if let Some(description) = &annotations.description {
        ir.description = Some(description.clone());
    }
    if let Some(default) = &annotations.default_value {
        ir.default_value = Some(default.clone());
    }
    if let Some(example) = &annotations.example {
        ir.example = Some(example.clone());
    }
    ir.deprecated |= annotations.deprecated;
    if annotations.read_only {
        ir.access_scope = Some(AccessScope::Read);
    } else if annotations.write_only {
        ir.access_scope = Some(AccessScope::Write);
    }
}
