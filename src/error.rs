use crate::parser::tokenizer::Span;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Kind of parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ErrorKind {
    // Lexical
    UnrecognizedCharacter,

    // Structural
    NestedType,
    MemberOutsideType,
    VisibilityOutsideType,
    StatementOutsideFunction,
    UnclosedType,
    UnclosedFunction,
    MissingIdentifier,
    MissingBody,
    UnmatchedBrace,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnrecognizedCharacter => "Unrecognized character",
            ErrorKind::NestedType => "Nested type",
            ErrorKind::MemberOutsideType => "Member outside type",
            ErrorKind::VisibilityOutsideType => "Visibility outside type",
            ErrorKind::StatementOutsideFunction => "Statement outside function",
            ErrorKind::UnclosedType => "Unclosed type",
            ErrorKind::UnclosedFunction => "Unclosed function",
            ErrorKind::MissingIdentifier => "Missing identifier",
            ErrorKind::MissingBody => "Missing body",
            ErrorKind::UnmatchedBrace => "Unmatched brace",
        }
    }

    /// Lexical errors only occur in strict mode; everything else is structural.
    pub fn is_lexical(&self) -> bool {
        matches!(self, ErrorKind::UnrecognizedCharacter)
    }
}

/// Error during tokenizing or parsing
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
    pub related_span: Option<Span>,
    pub related_label: Option<String>,
    pub help: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            related_span: None,
            related_label: None,
            help: None,
        }
    }

    /// Add a related span (e.g. where the unclosed block was opened)
    pub fn with_related(mut self, span: Span) -> Self {
        self.related_span = Some(span);
        self
    }

    /// Set the label for the related span
    pub fn with_related_label(mut self, label: impl Into<String>) -> Self {
        self.related_label = Some(label.into());
        self
    }

    /// Add help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render the error with source context
    pub fn render(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, false)
    }

    /// Render the error with ANSI color codes
    pub fn render_color(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, true)
    }

    fn render_inner(&self, source: &str, filename: &str, color: bool) -> String {
        let red = if color { "\x1b[1;31m" } else { "" };
        let dim = if color { "\x1b[2m" } else { "" };
        let cyan = if color { "\x1b[1;36m" } else { "" };
        let reset = if color { "\x1b[0m" } else { "" };

        let mut output = String::new();

        let line = self.span.start.line + 1;
        let col = self.span.start.col + 1;
        output.push_str(&format!(" file: {}:{}:{}\n", filename, line, col));
        output.push_str(&format!("{}error:{} {}\n", red, reset, self.message));

        if let Some(snippet) = snippet(source, &self.span, red, dim, reset, None) {
            output.push_str(&snippet);
        }

        if let Some(ref related) = self.related_span {
            let label = self.related_label.as_deref().unwrap_or("opened here");
            if let Some(snippet) = snippet(source, related, dim, dim, reset, Some(label)) {
                output.push_str(&snippet);
            }
        }

        if let Some(ref help) = self.help {
            output.push('\n');
            output.push_str(&format!(" {}help:{} {}\n", cyan, reset, help));
        }

        output
    }
}

/// Source line plus caret underline for `span`
fn snippet(
    source: &str,
    span: &Span,
    caret_color: &str,
    dim: &str,
    reset: &str,
    label: Option<&str>,
) -> Option<String> {
    // Errors at end of input point one past the last line
    let source_line = source.lines().nth(span.start.line).unwrap_or("");
    if span.start.line > source.lines().count() {
        return None;
    }

    let line_number = span.start.line + 1;
    let width = format!("{}", line_number).len().max(2);

    let underline_len = if span.end.line == span.start.line {
        span.end.col.saturating_sub(span.start.col).max(1)
    } else {
        source_line.chars().count().saturating_sub(span.start.col).max(1)
    };

    let mut out = String::new();
    out.push_str(&format!("{}{:>width$} |{} {}\n", dim, line_number, reset, source_line, width = width));
    out.push_str(&format!(
        "{}{:>width$} |{} {}{}{}{}",
        dim,
        "",
        reset,
        " ".repeat(span.start.col),
        caret_color,
        "^".repeat(underline_len),
        reset,
        width = width
    ));
    if let Some(label) = label {
        out.push_str(&format!(" {}{}{}", dim, label, reset));
    }
    out.push('\n');
    Some(out)
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}:{}",
            self.message,
            self.span.start.line + 1,
            self.span.start.col + 1
        )
    }
}

impl std::error::Error for ParseError {}

/// Error while translating one unit
#[derive(Debug)]
pub enum CompileError {
    Lex(ParseError),
    Structural(ParseError),
    Io { path: PathBuf, source: io::Error },
}

impl CompileError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CompileError::Io { path: path.into(), source }
    }

    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            CompileError::Lex(err) | CompileError::Structural(err) => Some(err),
            CompileError::Io { .. } => None,
        }
    }

    /// Render the error with source context (no color)
    pub fn render(&self, source: &str, filename: &str) -> String {
        match self.parse_error() {
            Some(err) => err.render(source, filename),
            None => format!("error: {}\n", self),
        }
    }

    /// Render the error with ANSI color codes
    pub fn render_color(&self, source: &str, filename: &str) -> String {
        match self.parse_error() {
            Some(err) => err.render_color(source, filename),
            None => format!("\x1b[1;31merror\x1b[0m: \x1b[1m{}\x1b[0m\n", self),
        }
    }
}

impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> Self {
        if err.kind.is_lexical() {
            CompileError::Lex(err)
        } else {
            CompileError::Structural(err)
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Lex(err) => write!(f, "Lex error: {}", err),
            CompileError::Structural(err) => write!(f, "Structural error: {}", err),
            CompileError::Io { path, source } => write!(f, "I/O error on {}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Lex(err) | CompileError::Structural(err) => Some(err),
            CompileError::Io { source, .. } => Some(source),
        }
    }
}
