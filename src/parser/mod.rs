pub mod tokenizer;
mod tree_builder;

pub use tokenizer::{LexMode, Position, Span, Token, TokenKind, tokenize, tokenize_with};
use tree_builder::TreeBuilder;

use crate::ast::Ast;
use crate::error::ParseError;
use std::sync::Arc;

/// Parser trait - converts source code to AST
pub trait Parser {
    fn parse(&self, source: &str) -> Result<Ast, ParseError>;
}

/// FL source parser
#[derive(Debug, Clone, Default)]
pub struct FlParser {
    mode: LexMode,
}

impl FlParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: LexMode) -> Self {
        Self { mode }
    }
}

impl Parser for FlParser {
    fn parse(&self, source: &str) -> Result<Ast, ParseError> {
        // Tokenize
        let tokens = tokenize_with(source, self.mode)?;

        // Build AST
        let source_arc: Arc<str> = Arc::from(source);
        let mut builder = TreeBuilder::new(tokens, source_arc.clone());
        let nodes = builder.build()?;

        Ok(Ast::new(nodes, source_arc))
    }
}
