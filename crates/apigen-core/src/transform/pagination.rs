use std::collections::HashSet;

use crate::ir::{IrModel, IrSchemaObject, IrSchemaType, LogicalOperator, Pagination};

/// Matches pagination control fields by name.
///
/// Only the field itself or the top-level properties of its schema are
/// inspected. Deeper structures are never searched.
#[derive(Debug, Clone)]
pub struct PaginationMatcher {
    keywords: Vec<String>,
}

impl PaginationMatcher {
    pub fn new(keywords: Vec<String>) -> Self {
        Self { keywords }
    }

    pub fn is_keyword(&self, name: &str) -> bool {
        self.keywords.iter().any(|k| k == name)
    }

    /// A parameter is a control when its own name matches, or when one of
    /// its object properties does.
    pub fn for_parameter(
        &self,
        name: &str,
        schema: &IrSchemaObject,
        ir: &IrModel,
    ) -> Option<Pagination> {
        if self.is_keyword(name) {
            return Some(Pagination::Root);
        }
        self.for_body(schema, ir)
    }

    /// A body carries a control when one of its top-level properties matches.
    pub fn for_body(&self, schema: &IrSchemaObject, ir: &IrModel) -> Option<Pagination> {
        let mut visited = HashSet::new();
        self.search(schema, ir, &mut visited)
    }

    fn search<'a>(
        &self,
        schema: &'a IrSchemaObject,
        ir: &'a IrModel,
        visited: &mut HashSet<&'a str>,
    ) -> Option<Pagination> {
        let schema = match schema.ref_path.as_deref() {
            Some(ref_path) => {
                if !visited.insert(ref_path) {
                    return None;
                }
                ir.component_schema(ref_path)?
            }
            None => schema,
        };

        // allOf members contribute properties to the same level.
        if schema.operator() == LogicalOperator::And && schema.items.len() > 1 {
            for item in &schema.items {
                if let Some(found) = self.search(item, ir, visited) {
                    return Some(found);
                }
            }
        }

        schema
            .properties
            .iter()
            .find(|(name, property)| self.is_keyword(name) && is_primitive_like(property, ir))
            .map(|(name, _)| Pagination::Field(name.clone()))
    }
}

/// Primitive, or a composition of exactly one primitive and nulls.
fn is_primitive_like(schema: &IrSchemaObject, ir: &IrModel) -> bool {
    let schema = ir.deref_schema(schema);
    if let Some(t) = schema.schema_type {
        return t.is_primitive();
    }
    let mut non_null = schema
        .items
        .iter()
        .map(|item| ir.deref_schema(item))
        .filter(|item| !item.schema_type.is_some_and(IrSchemaType::is_nullish));
    match (non_null.next(), non_null.next()) {
        (Some(only), None) => only.schema_type.is_some_and(IrSchemaType::is_primitive),
        _ => false,
    }
}
