use crate::error::{ErrorKind, ParseError};
use crate::vocabulary;

/// Position in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset in source
    pub byte: usize,
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters)
    pub col: usize,
}

impl Position {
    pub fn new() -> Self {
        Self { byte: 0, line: 0, col: 0 }
    }
}

/// Span in source code (a range from start position to end position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn at(position: Position) -> Self {
        Self { start: position, end: position }
    }

    /// Smallest span covering both `self` and `other`
    pub fn to(self, other: Span) -> Self {
        Self { start: self.start, end: other.end }
    }
}

/// Lexical category of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Punctuation,
}

/// A lexical unit: its category and exact source text
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }
}

/// What to do with characters outside the vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexMode {
    /// Drop them silently
    #[default]
    Permissive,
    /// Fail with an `UnrecognizedCharacter` error
    Strict,
}

/// Tokenizer for FL source files
pub struct Tokenizer<'a> {
    source: &'a str,
    position: Position,
    mode: LexMode,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str, mode: LexMode) -> Self {
        Self {
            source,
            position: Position::new(),
            mode,
        }
    }

    /// Tokenize the entire source
    pub fn tokenize(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            if c.is_ascii_alphabetic() || c == '_' {
                tokens.push(self.scan_word());
            } else if vocabulary::is_punctuation(c) {
                let start = self.position;
                self.bump(c);
                tokens.push(Token {
                    kind: TokenKind::Punctuation,
                    text: c.to_string(),
                    span: Span { start, end: self.position },
                });
            } else if c.is_whitespace() {
                self.bump(c);
            } else {
                let start = self.position;
                self.bump(c);
                if self.mode == LexMode::Strict {
                    return Err(ParseError::new(
                        ErrorKind::UnrecognizedCharacter,
                        format!("Unrecognized character '{}'.", c.escape_default()),
                        Span { start, end: self.position },
                    )
                    .with_help("Only identifiers, keywords and { } ( ) , ; = + - * / are part of the language"));
                }
            }
        }

        Ok(tokens)
    }

    /// Scan a whole identifier, then classify it. Keywords never split a
    /// longer identifier (`classy` is one identifier).
    fn scan_word(&mut self) -> Token {
        let start = self.position;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.bump(c);
            } else {
                break;
            }
        }

        let text = &self.source[start.byte..self.position.byte];
        let kind = if vocabulary::is_keyword(text) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };

        Token {
            kind,
            text: text.to_string(),
            span: Span { start, end: self.position },
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.position.byte..].chars().next()
    }

    fn bump(&mut self, c: char) {
        self.position.byte += c.len_utf8();
        if c == '\n' {
            self.position.line += 1;
            self.position.col = 0;
        } else {
            self.position.col += 1;
        }
    }
}

/// Tokenize permissively, discarding anything outside the vocabulary
pub fn tokenize(source: &str) -> Vec<Token> {
    // Permissive mode has no failure path
    Tokenizer::new(source, LexMode::Permissive)
        .tokenize()
        .unwrap_or_default()
}

/// Tokenize with an explicit lexing mode
pub fn tokenize_with(source: &str, mode: LexMode) -> Result<Vec<Token>, ParseError> {
    Tokenizer::new(source, mode).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_class_header() {
        let tokens = tokenize("class Foo {\n");
        assert_eq!(texts(&tokens), ["class", "Foo", "{"]);
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert!(tokens[1].is_identifier());
        assert_eq!(tokens[2].kind, TokenKind::Punctuation);
    }

    #[test]
    fn test_keyword_prefix_is_not_split() {
        let tokens = tokenize("classy integer newer");
        assert_eq!(texts(&tokens), ["classy", "integer", "newer"]);
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Identifier));
    }

    #[test]
    fn test_unrecognized_characters_vanish() {
        let tokens = tokenize("a && b[0] \"hi, there\";");
        assert_eq!(texts(&tokens), ["a", "b", "hi", ",", "there", ";"]);
    }

    #[test]
    fn test_strict_mode_reports_position() {
        let err = tokenize_with("int x;\nx = y & z;", LexMode::Strict).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnrecognizedCharacter);
        assert_eq!(err.span.start.line, 1);
        assert_eq!(err.span.start.col, 6);
    }

    #[test]
    fn test_strict_mode_accepts_vocabulary() {
        let tokens = tokenize_with("void f(int a, int b) { a = a + b * 2 / c - d; }", LexMode::Strict);
        // Digits are outside the vocabulary
        assert!(tokens.is_err());

        let tokens = tokenize_with("void f(int a, int b) { a = a + b / c - d; }", LexMode::Strict).unwrap();
        assert_eq!(tokens.len(), 21);
    }

    #[test]
    fn test_spans_track_lines() {
        let tokens = tokenize("class A\n{\n}\n");
        assert_eq!(tokens[2].span.start.line, 1);
        assert_eq!(tokens[3].span.start.line, 2);
        assert_eq!(tokens[3].span.start.byte, 10);
    }

    #[test]
    fn test_restartable() {
        let source = "import math class A { }";
        assert_eq!(tokenize(source), tokenize(source));
    }
}
