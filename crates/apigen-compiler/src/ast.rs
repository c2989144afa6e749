//! Syntax tree for the subset of TypeScript the plugins emit.
//!
//! Nodes are plain data. Build them through [`crate::tsc`] and render them
//! with [`crate::printer`].

/// Built-in type keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Any,
    Bigint,
    Boolean,
    Never,
    Null,
    Number,
    String,
    Undefined,
    Unknown,
    Void,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Any => "any",
            Keyword::Bigint => "bigint",
            Keyword::Boolean => "boolean",
            Keyword::Never => "never",
            Keyword::Null => "null",
            Keyword::Number => "number",
            Keyword::String => "string",
            Keyword::Undefined => "undefined",
            Keyword::Unknown => "unknown",
            Keyword::Void => "void",
        }
    }
}

/// A literal usable both as a value and as a type.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    /// Kept as source text so integers print without a fraction.
    Number(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Keyword(Keyword),
    Literal(Literal),
    Reference {
        name: String,
        arguments: Vec<TypeNode>,
    },
    Array(Box<TypeNode>),
    Tuple(Vec<TypeNode>),
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    Object(ObjectType),
    /// `(typeof Name)[keyof typeof Name]`
    ValueOf(String),
}

/// An object type literal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectType {
    pub properties: Vec<PropertySignature>,
    /// `[key: string]: T`
    pub index: Option<Box<TypeNode>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertySignature {
    pub name: String,
    pub optional: bool,
    pub readonly: bool,
    pub type_node: TypeNode,
    pub comment: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    StrictEq,
    StrictNe,
    And,
    Or,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNe => "!==",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub type_node: Option<TypeNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrowFunction {
    pub is_async: bool,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeNode>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(String),
    Literal(Literal),
    PropertyAccess {
        object: Box<Expr>,
        name: String,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    New {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Arrow(Box<ArrowFunction>),
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Object(Vec<(String, Expr)>),
    AsConst(Box<Expr>),
}

/// `export type Name = ...;`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAlias {
    pub name: String,
    pub exported: bool,
    pub type_node: TypeNode,
    pub comment: Vec<String>,
}

/// `export const name: T = ...;`
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub name: String,
    pub exported: bool,
    pub type_node: Option<TypeNode>,
    pub value: Expr,
    pub comment: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Return(Option<Expr>),
    If {
        condition: Expr,
        then: Vec<Stmt>,
    },
    Const(VariableDecl),
    TypeAlias(TypeAlias),
    /// `export * from 'module';`
    ExportAll(String),
    /// Emitted verbatim.
    Raw(String),
}

impl Stmt {
    pub fn is_return(&self) -> bool {
        matches!(self, Stmt::Return(_))
    }
}

impl From<Expr> for Stmt {
    fn from(expr: Expr) -> Self {
        Stmt::Expr(expr)
    }
}

impl From<TypeAlias> for Stmt {
    fn from(alias: TypeAlias) -> Self {
        Stmt::TypeAlias(alias)
    }
}

impl From<VariableDecl> for Stmt {
    fn from(decl: VariableDecl) -> Self {
        Stmt::Const(decl)
    }
}

impl TypeAlias {
    pub fn exported(mut self) -> Self {
        self.exported = true;
        self
    }

    pub fn with_comment(mut self, comment: Vec<String>) -> Self {
        self.comment = comment;
        self
    }
}

impl VariableDecl {
    pub fn exported(mut self) -> Self {
        self.exported = true;
        self
    }

    pub fn with_type(mut self, type_node: TypeNode) -> Self {
        self.type_node = Some(type_node);
        self
    }

    pub fn with_comment(mut self, comment: Vec<String>) -> Self {
        self.comment = comment;
        self
    }
}
