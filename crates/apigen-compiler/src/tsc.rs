//! Constructor facade over [`crate::ast`].
//!
//! Plugins build nodes through these functions rather than the raw enums, so
//! normalizations like union flattening happen in one place.

use crate::ast::*;

// Types

pub fn keyword(keyword: Keyword) -> TypeNode {
    TypeNode::Keyword(keyword)
}

pub fn type_reference(name: impl Into<String>) -> TypeNode {
    TypeNode::Reference {
        name: name.into(),
        arguments: Vec::new(),
    }
}

pub fn generic_type(name: impl Into<String>, arguments: Vec<TypeNode>) -> TypeNode {
    TypeNode::Reference {
        name: name.into(),
        arguments,
    }
}

pub fn literal_type(literal: Literal) -> TypeNode {
    TypeNode::Literal(literal)
}

pub fn array_type(element: TypeNode) -> TypeNode {
    TypeNode::Array(Box::new(element))
}

pub fn tuple_type(elements: Vec<TypeNode>) -> TypeNode {
    TypeNode::Tuple(elements)
}

/// Union of `types`: nested unions are flattened and duplicates dropped. An
/// empty union is `never`; a single member is returned as-is.
pub fn union_type(types: Vec<TypeNode>) -> TypeNode {
    let mut members: Vec<TypeNode> = Vec::new();
    for t in types {
        let flattened = match t {
            TypeNode::Union(inner) => inner,
            other => vec![other],
        };
        for member in flattened {
            if !members.contains(&member) {
                members.push(member);
            }
        }
    }
    match members.len() {
        0 => keyword(Keyword::Never),
        1 => members.remove(0),
        _ => TypeNode::Union(members),
    }
}

/// Intersection of `types`, flattened. An empty intersection is `unknown`.
pub fn intersection_type(types: Vec<TypeNode>) -> TypeNode {
    let mut members: Vec<TypeNode> = Vec::new();
    for t in types {
        match t {
            TypeNode::Intersection(inner) => members.extend(inner),
            other => members.push(other),
        }
    }
    match members.len() {
        0 => keyword(Keyword::Unknown),
        1 => members.remove(0),
        _ => TypeNode::Intersection(members),
    }
}

pub fn object_type(properties: Vec<PropertySignature>, index: Option<TypeNode>) -> TypeNode {
    TypeNode::Object(ObjectType {
        properties,
        index: index.map(Box::new),
    })
}

pub fn property_signature(
    name: impl Into<String>,
    type_node: TypeNode,
    optional: bool,
) -> PropertySignature {
    PropertySignature {
        name: name.into(),
        optional,
        readonly: false,
        type_node,
        comment: Vec::new(),
    }
}

/// `(typeof name)[keyof typeof name]`
pub fn value_of_type(name: impl Into<String>) -> TypeNode {
    TypeNode::ValueOf(name.into())
}

// Expressions

pub fn identifier(name: impl Into<String>) -> Expr {
    Expr::Identifier(name.into())
}

pub fn string_literal(value: impl Into<String>) -> Expr {
    Expr::Literal(Literal::String(value.into()))
}

pub fn number_literal(value: impl ToString) -> Expr {
    Expr::Literal(Literal::Number(value.to_string()))
}

pub fn property_access(object: Expr, name: impl Into<String>) -> Expr {
    Expr::PropertyAccess {
        object: Box::new(object),
        name: name.into(),
    }
}

pub fn call(callee: Expr, arguments: Vec<Expr>) -> Expr {
    Expr::Call {
        callee: Box::new(callee),
        arguments,
    }
}

pub fn new_expr(callee: Expr, arguments: Vec<Expr>) -> Expr {
    Expr::New {
        callee: Box::new(callee),
        arguments,
    }
}

pub fn assign(target: Expr, value: Expr) -> Expr {
    Expr::Assign {
        target: Box::new(target),
        value: Box::new(value),
    }
}

pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

/// `expr !== undefined && expr !== null`
pub fn is_present(expr: Expr) -> Expr {
    binary(
        binary(expr.clone(), BinaryOp::StrictNe, identifier("undefined")),
        BinaryOp::And,
        binary(expr, BinaryOp::StrictNe, Expr::Literal(Literal::Null)),
    )
}

pub fn parameter(name: impl Into<String>, type_node: Option<TypeNode>) -> Parameter {
    Parameter {
        name: name.into(),
        type_node,
    }
}

pub fn arrow_function(parameters: Vec<Parameter>, body: Vec<Stmt>) -> ArrowFunction {
    ArrowFunction {
        is_async: false,
        parameters,
        return_type: None,
        body,
    }
}

pub fn object_literal(entries: Vec<(String, Expr)>) -> Expr {
    Expr::Object(entries)
}

pub fn as_const(expr: Expr) -> Expr {
    Expr::AsConst(Box::new(expr))
}

// Statements

pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expr(expr)
}

pub fn return_stmt(expr: Expr) -> Stmt {
    Stmt::Return(Some(expr))
}

pub fn if_stmt(condition: Expr, then: Vec<Stmt>) -> Stmt {
    Stmt::If { condition, then }
}

pub fn type_alias(name: impl Into<String>, type_node: TypeNode) -> TypeAlias {
    TypeAlias {
        name: name.into(),
        exported: false,
        type_node,
        comment: Vec::new(),
    }
}

pub fn const_variable(name: impl Into<String>, value: Expr) -> VariableDecl {
    VariableDecl {
        name: name.into(),
        exported: false,
        type_node: None,
        value,
        comment: Vec::new(),
    }
}

pub fn export_all(module: impl Into<String>) -> Stmt {
    Stmt::ExportAll(module.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_flattens_and_dedupes() {
        let inner = union_type(vec![keyword(Keyword::String), keyword(Keyword::Null)]);
        let outer = union_type(vec![inner, keyword(Keyword::String), keyword(Keyword::Number)]);
        assert_eq!(
            outer,
            TypeNode::Union(vec![
                keyword(Keyword::String),
                keyword(Keyword::Null),
                keyword(Keyword::Number),
            ])
        );
    }

    #[test]
    fn test_union_edge_sizes() {
        assert_eq!(union_type(vec![]), keyword(Keyword::Never));
        assert_eq!(
            union_type(vec![type_reference("Pet")]),
            type_reference("Pet")
        );
    }

    #[test]
    fn test_intersection_flattens() {
        let inner = intersection_type(vec![type_reference("A"), type_reference("B")]);
        let outer = intersection_type(vec![inner, type_reference("C")]);
        match outer {
            TypeNode::Intersection(members) => assert_eq!(members.len(), 3),
            other => panic!("expected intersection, got {other:?}"),
        }
        assert_eq!(intersection_type(vec![]), keyword(Keyword::Unknown));
    }
}
