use std::sync::Arc;

pub use crate::parser::tokenizer::{Position, Span};

/// Abstract Syntax Tree
///
/// The tree is flat: nodes appear in document order and blocks are
/// delimited by `BlockEnd` rather than nested children. The parser
/// guarantees every `TypeDecl` and `Member` is matched by a `BlockEnd`.
#[derive(Debug, Clone)]
pub struct Ast {
    pub nodes: Vec<Node>,
    pub source: Arc<str>,
}

impl Ast {
    pub fn new(nodes: Vec<Node>, source: Arc<str>) -> Self {
        Self { nodes, source }
    }
}

/// AST Node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Import(ImportNode),
    TypeDecl(TypeDeclNode),
    Visibility(VisibilityNode),
    Member(MemberNode),
    Statement(StatementNode),
    BlockEnd(BlockEndNode),
}

/// `import name`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportNode {
    pub library: String,
    pub span: Span,
}

/// `class Name`, `struct Name` or `enum Name`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDeclNode {
    pub keyword: String,
    pub name: String,
    pub span: Span,
}

/// `public` or `private`
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityNode {
    pub keyword: String,
    pub span: Span,
}

/// Member function header: `int bar(int a) {`
#[derive(Debug, Clone, PartialEq)]
pub struct MemberNode {
    pub return_type: String,
    pub name: String,
    /// Parameter tokens without the enclosing parentheses
    pub params: Vec<String>,
    pub span: Span,
}

/// One statement of a member function body
#[derive(Debug, Clone, PartialEq)]
pub struct StatementNode {
    pub kind: StatementKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// `cout expr ;`
    Output(Vec<String>),
    /// Any other run of body tokens, kept as text
    Code(Vec<Fragment>),
}

/// Piece of an opaque statement
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Token(String),
    /// `new Type`
    Allocate(String),
    /// `delete name`
    Release(String),
}

/// Closing brace of a member function or a type declaration
#[derive(Debug, Clone, PartialEq)]
pub struct BlockEndNode {
    pub block: Block,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Function,
    Type,
}
