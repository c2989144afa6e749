//! Render AST nodes as TypeScript source.
//!
//! Output uses four-space indentation, single-quoted strings and semicolons.

use crate::ast::*;

const INDENT: &str = "    ";

pub fn print_stmt(stmt: &Stmt) -> String {
    let mut printer = Printer::default();
    printer.stmt(stmt);
    printer.finish()
}

pub fn print_type(type_node: &TypeNode) -> String {
    let mut printer = Printer::default();
    printer.type_node(type_node);
    printer.finish()
}

pub fn print_expr(expr: &Expr) -> String {
    let mut printer = Printer::default();
    printer.expr(expr);
    printer.finish()
}

/// Quote `value` as a single-quoted string literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// True when `name` can appear unquoted as a property name or after `.`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn property_name(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

fn escape_comment(line: &str) -> String {
    line.replace("*/", "*\\/")
}

#[derive(Default)]
struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn finish(self) -> String {
        self.out
    }

    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }

    fn comment(&mut self, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        self.push("/**");
        for line in lines.iter().flat_map(|l| l.lines()) {
            self.newline();
            if line.is_empty() {
                self.push(" *");
            } else {
                self.push(" * ");
                self.push(&escape_comment(line));
            }
        }
        self.newline();
        self.push(" */");
        self.newline();
    }

    fn block(&mut self, body: &[Stmt]) {
        if body.is_empty() {
            self.push("{}");
            return;
        }
        self.push("{");
        self.depth += 1;
        for stmt in body {
            self.newline();
            self.stmt(stmt);
        }
        self.depth -= 1;
        self.newline();
        self.push("}");
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => {
                self.expr(expr);
                self.push(";");
            }
            Stmt::Return(None) => self.push("return;"),
            Stmt::Return(Some(expr)) => {
                self.push("return ");
                self.expr(expr);
                self.push(";");
            }
            Stmt::If { condition, then } => {
                self.push("if (");
                self.expr(condition);
                self.push(") ");
                self.block(then);
            }
            Stmt::Const(decl) => {
                self.comment(&decl.comment);
                if decl.exported {
                    self.push("export ");
                }
                self.push("const ");
                self.push(&decl.name);
                if let Some(type_node) = &decl.type_node {
                    self.push(": ");
                    self.type_node(type_node);
                }
                self.push(" = ");
                self.expr(&decl.value);
                self.push(";");
            }
            Stmt::TypeAlias(alias) => {
                self.comment(&alias.comment);
                if alias.exported {
                    self.push("export ");
                }
                self.push("type ");
                self.push(&alias.name);
                self.push(" = ");
                self.type_node(&alias.type_node);
                self.push(";");
            }
            Stmt::ExportAll(module) => {
                self.push("export * from ");
                self.push(&quote(module));
                self.push(";");
            }
            Stmt::Raw(text) => self.push(text),
        }
    }

    fn literal(&mut self, literal: &Literal) {
        match literal {
            Literal::String(s) => self.push(&quote(s)),
            Literal::Number(n) => self.push(n),
            Literal::Boolean(b) => self.push(if *b { "true" } else { "false" }),
            Literal::Null => self.push("null"),
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Identifier(name) => self.push(name),
            Expr::Literal(literal) => self.literal(literal),
            Expr::PropertyAccess { object, name } => {
                self.expr(object);
                if is_identifier(name) {
                    self.push(".");
                    self.push(name);
                } else {
                    self.push("[");
                    self.push(&quote(name));
                    self.push("]");
                }
            }
            Expr::Call { callee, arguments } => {
                self.expr(callee);
                self.arguments(arguments);
            }
            Expr::New { callee, arguments } => {
                self.push("new ");
                self.expr(callee);
                self.arguments(arguments);
            }
            Expr::Arrow(arrow) => self.arrow(arrow),
            Expr::Assign { target, value } => {
                self.expr(target);
                self.push(" = ");
                self.expr(value);
            }
            Expr::Binary { left, op, right } => {
                self.expr(left);
                self.push(" ");
                self.push(op.as_str());
                self.push(" ");
                self.expr(right);
            }
            Expr::Object(entries) => {
                if entries.is_empty() {
                    self.push("{}");
                    return;
                }
                self.push("{");
                self.depth += 1;
                for (i, (key, value)) in entries.iter().enumerate() {
                    self.newline();
                    self.push(&property_name(key));
                    self.push(": ");
                    self.expr(value);
                    if i + 1 < entries.len() {
                        self.push(",");
                    }
                }
                self.depth -= 1;
                self.newline();
                self.push("}");
            }
            Expr::AsConst(inner) => {
                self.expr(inner);
                self.push(" as const");
            }
        }
    }

    fn arguments(&mut self, arguments: &[Expr]) {
        self.push("(");
        for (i, argument) in arguments.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.expr(argument);
        }
        self.push(")");
    }

    fn arrow(&mut self, arrow: &ArrowFunction) {
        if arrow.is_async {
            self.push("async ");
        }
        self.push("(");
        for (i, parameter) in arrow.parameters.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push(&parameter.name);
            if let Some(type_node) = &parameter.type_node {
                self.push(": ");
                self.type_node(type_node);
            }
        }
        self.push(")");
        if let Some(return_type) = &arrow.return_type {
            self.push(": ");
            self.type_node(return_type);
        }
        self.push(" => ");
        self.block(&arrow.body);
    }

    fn type_node(&mut self, type_node: &TypeNode) {
        match type_node {
            TypeNode::Keyword(keyword) => self.push(keyword.as_str()),
            TypeNode::Literal(literal) => self.literal(literal),
            TypeNode::Reference { name, arguments } => {
                self.push(name);
                if !arguments.is_empty() {
                    self.push("<");
                    for (i, argument) in arguments.iter().enumerate() {
                        if i > 0 {
                            self.push(", ");
                        }
                        self.type_node(argument);
                    }
                    self.push(">");
                }
            }
            TypeNode::Array(element) => {
                let wrap = matches!(
                    **element,
                    TypeNode::Union(_) | TypeNode::Intersection(_) | TypeNode::ValueOf(_)
                );
                if wrap {
                    self.push("(");
                }
                self.type_node(element);
                if wrap {
                    self.push(")");
                }
                self.push("[]");
            }
            TypeNode::Tuple(elements) => {
                self.push("[");
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.type_node(element);
                }
                self.push("]");
            }
            TypeNode::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        self.push(" | ");
                    }
                    self.type_node(member);
                }
            }
            TypeNode::Intersection(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        self.push(" & ");
                    }
                    let wrap = matches!(member, TypeNode::Union(_));
                    if wrap {
                        self.push("(");
                    }
                    self.type_node(member);
                    if wrap {
                        self.push(")");
                    }
                }
            }
            TypeNode::Object(object) => self.object_type(object),
            TypeNode::ValueOf(name) => {
                self.push("(typeof ");
                self.push(name);
                self.push(")[keyof typeof ");
                self.push(name);
                self.push("]");
            }
        }
    }

    fn object_type(&mut self, object: &ObjectType) {
        if object.properties.is_empty() && object.index.is_none() {
            self.push("{}");
            return;
        }
        self.push("{");
        self.depth += 1;
        for property in &object.properties {
            self.newline();
            self.comment(&property.comment);
            if property.readonly {
                self.push("readonly ");
            }
            self.push(&property_name(&property.name));
            if property.optional {
                self.push("?");
            }
            self.push(": ");
            self.type_node(&property.type_node);
            self.push(";");
        }
        if let Some(index) = &object.index {
            self.newline();
            self.push("[key: string]: ");
            self.type_node(index);
            self.push(";");
        }
        self.depth -= 1;
        self.newline();
        self.push("}");
    }
}
