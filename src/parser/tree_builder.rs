use super::tokenizer::{Position, Span, Token, TokenKind};
use crate::ast::*;
use crate::error::{ErrorKind, ParseError};
use crate::vocabulary;
use std::sync::Arc;

/// The type declaration currently being parsed
#[derive(Debug)]
struct OpenType {
    name: String,
    span: Span,
}

/// The member function currently being parsed
#[derive(Debug)]
struct OpenFunction {
    name: String,
    span: Span,
    /// Braces opened inside the body and not yet closed
    depth: usize,
    /// Tokens of the statement being accumulated
    pending: Vec<Fragment>,
    pending_span: Option<Span>,
}

/// Builds a flat AST from a token stream.
///
/// One builder parses one file. Its context fields are the only parser
/// state: at most one open type, and at most one open function inside it.
pub struct TreeBuilder {
    tokens: Vec<Token>,
    pos: usize,
    source: Arc<str>,
    open_type: Option<OpenType>,
    open_function: Option<OpenFunction>,
}

impl TreeBuilder {
    pub fn new(tokens: Vec<Token>, source: Arc<str>) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            open_type: None,
            open_function: None,
        }
    }

    pub fn build(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();

        while !self.is_at_end() {
            self.parse_node(&mut nodes)?;
        }

        if let Some(function) = &self.open_function {
            return Err(ParseError::new(
                ErrorKind::UnclosedFunction,
                format!("The body of '{}' is never closed.", function.name),
                self.current_span(),
            )
            .with_related(function.span)
            .with_help("Close the function body with '}'"));
        }

        if let Some(open) = &self.open_type {
            return Err(ParseError::new(
                ErrorKind::UnclosedType,
                format!("Type '{}' is never closed.", open.name),
                self.current_span(),
            )
            .with_related(open.span)
            .with_help("Close the type declaration with '}'"));
        }

        Ok(nodes)
    }

    fn parse_node(&mut self, nodes: &mut Vec<Node>) -> Result<(), ParseError> {
        let token = self.tokens[self.pos].clone();
        let text = token.text.as_str();

        if text == "import" {
            self.advance();
            let (library, name_span) = self.expect_word("import", "a library name")?;
            nodes.push(Node::Import(ImportNode {
                library,
                span: token.span.to(name_span),
            }));
        } else if vocabulary::is_type_declaration(text) {
            if let Some(open) = &self.open_type {
                return Err(ParseError::new(
                    ErrorKind::NestedType,
                    format!("A {} cannot be declared inside '{}'.", text, open.name),
                    token.span,
                )
                .with_related(open.span)
                .with_related_label("enclosing type opened here")
                .with_help("Nested types are not supported. Close the enclosing type with '}' first"));
            }
            self.advance();
            let (name, name_span) = self.expect_word(text, "a type name")?;
            let span = token.span.to(name_span);
            self.open_type = Some(OpenType { name: name.clone(), span });
            nodes.push(Node::TypeDecl(TypeDeclNode {
                keyword: token.text.clone(),
                name,
                span,
            }));
        } else if text == "new" || text == "delete" {
            if self.open_function.is_none() {
                return Err(ParseError::new(
                    ErrorKind::StatementOutsideFunction,
                    format!("'{}' can only appear inside a member function body.", text),
                    token.span,
                ));
            }
            self.advance();
            let what = if text == "new" { "a type name" } else { "a variable name" };
            let (operand, operand_span) = self.expect_word(text, what)?;
            let fragment = if text == "new" {
                Fragment::Allocate(operand)
            } else {
                Fragment::Release(operand)
            };
            self.push_fragment(fragment, token.span.to(operand_span));
        } else if vocabulary::is_visibility(text) {
            if self.open_type.is_none() {
                return Err(ParseError::new(
                    ErrorKind::VisibilityOutsideType,
                    format!("'{}' is only meaningful inside a class, struct or enum.", text),
                    token.span,
                ));
            }
            self.advance();
            nodes.push(Node::Visibility(VisibilityNode {
                keyword: token.text.clone(),
                span: token.span,
            }));
        } else if vocabulary::is_member_type(text) && self.open_function.is_none() {
            if self.open_type.is_none() {
                return Err(ParseError::new(
                    ErrorKind::MemberOutsideType,
                    format!("Member declaration '{}' is outside of any type.", text),
                    token.span,
                )
                .with_help("Declare functions inside a class, struct or enum"));
            }
            self.parse_member(&token, nodes)?;
        } else if self.open_function.is_some() {
            self.parse_body_token(&token, nodes);
        } else if text == "}" {
            if self.open_type.take().is_none() {
                return Err(ParseError::new(
                    ErrorKind::UnmatchedBrace,
                    "This '}' does not close anything.",
                    token.span,
                ));
            }
            self.advance();
            nodes.push(Node::BlockEnd(BlockEndNode {
                block: Block::Type,
                span: token.span,
            }));
        } else {
            // Anything else outside a function body (the type's own '{',
            // stray identifiers) carries no meaning
            self.advance();
        }

        Ok(())
    }

    /// `<type> <name> <params...> {`
    fn parse_member(&mut self, type_token: &Token, nodes: &mut Vec<Node>) -> Result<(), ParseError> {
        self.advance();
        let (name, name_span) = self.expect_word(&type_token.text, "a member name")?;

        let mut params = Vec::new();
        loop {
            let Some(token) = self.peek() else {
                return Err(self.missing_body(&name, type_token.span.to(name_span)));
            };
            match token.text.as_str() {
                "{" => break,
                ";" | "}" => return Err(self.missing_body(&name, type_token.span.to(name_span))),
                _ => {
                    params.push(token.text.clone());
                    self.advance();
                }
            }
        }

        if params.first().map(String::as_str) == Some("(") && params.last().map(String::as_str) == Some(")") {
            params.pop();
            params.remove(0);
        }

        let brace_span = self.current_span();
        self.advance();

        let span = type_token.span.to(brace_span);
        self.open_function = Some(OpenFunction {
            name: name.clone(),
            span,
            depth: 0,
            pending: Vec::new(),
            pending_span: None,
        });
        nodes.push(Node::Member(MemberNode {
            return_type: type_token.text.clone(),
            name,
            params,
            span,
        }));
        Ok(())
    }

    fn missing_body(&self, name: &str, span: Span) -> ParseError {
        ParseError::new(
            ErrorKind::MissingBody,
            format!("Member '{}' has no body.", name),
            self.current_span(),
        )
        .with_related(span)
        .with_related_label("member declared here")
        .with_help("Members must be functions with a body: `int name() { ... }`")
    }

    /// Any token inside an open function that no earlier rule claimed
    fn parse_body_token(&mut self, token: &Token, nodes: &mut Vec<Node>) {
        self.advance();
        match token.text.as_str() {
            vocabulary::OUTPUT_STATEMENT => {
                self.flush_statement(nodes);
                let mut expr = Vec::new();
                let mut span = token.span;
                while let Some(next) = self.peek() {
                    if next.is("}") {
                        break;
                    }
                    span = span.to(next.span);
                    let is_terminator = next.is(";");
                    if !is_terminator {
                        expr.push(next.text.clone());
                    }
                    self.advance();
                    if is_terminator {
                        break;
                    }
                }
                nodes.push(Node::Statement(StatementNode {
                    kind: StatementKind::Output(expr),
                    span,
                }));
            }
            "{" => {
                self.push_fragment(Fragment::Token(token.text.clone()), token.span);
                if let Some(function) = self.open_function.as_mut() {
                    function.depth += 1;
                }
                self.flush_statement(nodes);
            }
            "}" => {
                self.flush_statement(nodes);
                let Some(function) = self.open_function.as_mut() else {
                    return;
                };
                if function.depth > 0 {
                    function.depth -= 1;
                    nodes.push(Node::Statement(StatementNode {
                        kind: StatementKind::Code(vec![Fragment::Token(token.text.clone())]),
                        span: token.span,
                    }));
                } else {
                    self.open_function = None;
                    nodes.push(Node::BlockEnd(BlockEndNode {
                        block: Block::Function,
                        span: token.span,
                    }));
                }
            }
            ";" => {
                self.push_fragment(Fragment::Token(token.text.clone()), token.span);
                self.flush_statement(nodes);
            }
            _ => self.push_fragment(Fragment::Token(token.text.clone()), token.span),
        }
    }

    fn push_fragment(&mut self, fragment: Fragment, span: Span) {
        if let Some(function) = self.open_function.as_mut() {
            function.pending.push(fragment);
            function.pending_span = Some(match function.pending_span {
                Some(start) => start.to(span),
                None => span,
            });
        }
    }

    /// Emit the accumulated statement tokens, if any
    fn flush_statement(&mut self, nodes: &mut Vec<Node>) {
        let Some(function) = self.open_function.as_mut() else {
            return;
        };
        if function.pending.is_empty() {
            return;
        }
        let fragments = std::mem::take(&mut function.pending);
        let span = function.pending_span.take().unwrap_or_default();
        nodes.push(Node::Statement(StatementNode {
            kind: StatementKind::Code(fragments),
            span,
        }));
    }

    /// Consume a word (identifier or keyword) following `after`
    fn expect_word(&mut self, after: &str, what: &str) -> Result<(String, Span), ParseError> {
        match self.peek() {
            Some(token) if token.kind != TokenKind::Punctuation => {
                let word = (token.text.clone(), token.span);
                self.advance();
                Ok(word)
            }
            Some(token) => Err(ParseError::new(
                ErrorKind::MissingIdentifier,
                format!("Expected {} after '{}', found '{}'.", what, after, token.text),
                token.span,
            )),
            None => Err(ParseError::new(
                ErrorKind::MissingIdentifier,
                format!("Expected {} after '{}', found end of file.", what, after),
                self.current_span(),
            )),
        }
    }

    /// Span of the current token. At EOF, the point just past the last
    /// token (or the end of the source when there are no tokens).
    fn current_span(&self) -> Span {
        if let Some(token) = self.peek() {
            token.span
        } else if let Some(last) = self.tokens.last() {
            Span::at(last.span.end)
        } else {
            let byte = self.source.len();
            let line = self.source.matches('\n').count();
            let col = self
                .source
                .rsplit('\n')
                .next()
                .map(|l| l.chars().count())
                .unwrap_or(0);
            Span::at(Position { byte, line, col })
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}
