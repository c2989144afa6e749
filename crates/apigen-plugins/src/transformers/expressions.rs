//! Extension transformers for leaf values.

use apigen_compiler::ast::{Expr, Stmt};
use apigen_compiler::tsc;
use apigen_core::ir::{IrSchemaObject, IrSchemaType};

/// Statements converting the value at `target`, or `None` when the schema is
/// not handled.
pub type Extension = fn(&IrSchemaObject, &Expr) -> Option<Vec<Stmt>>;

/// `target = new Date(target)` for `date` and `date-time` strings.
pub fn date_expressions(schema: &IrSchemaObject, target: &Expr) -> Option<Vec<Stmt>> {
    if !schema.is_type(IrSchemaType::String)
        || !matches!(schema.format.as_deref(), Some("date" | "date-time"))
    {
        return None;
    }
    let value = tsc::new_expr(tsc::identifier("Date"), vec![target.clone()]);
    Some(vec![tsc::expr_stmt(tsc::assign(target.clone(), value))])
}

/// `target = BigInt(target.toString())` for `int64` integers.
pub fn bigint_expressions(schema: &IrSchemaObject, target: &Expr) -> Option<Vec<Stmt>> {
    if !schema.is_type(IrSchemaType::Integer) || schema.format.as_deref() != Some("int64") {
        return None;
    }
    let text = tsc::call(tsc::property_access(target.clone(), "toString"), vec![]);
    let value = tsc::call(tsc::identifier("BigInt"), vec![text]);
    Some(vec![tsc::expr_stmt(tsc::assign(target.clone(), value))])
}
