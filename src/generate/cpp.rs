use super::{GenerateOptions, GenerateResult, Generator, Output, finalize_header, finalize_source};
use crate::ast::*;
use crate::transform::TransformMetadata;
use crate::vocabulary;

/// Emits a C++ header/source pair from an FL AST
pub struct CppGenerator;

impl CppGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Class opening plus the synthesized constructor and destructor
    fn emit_type(&self, decl: &TypeDeclNode, declarations: &mut Output, definitions: &mut Output) {
        let name = &decl.name;

        declarations.line(0, &format!("{} {} {{", decl.keyword, name));
        declarations.line(0, "public:");
        declarations.line(1, &format!("{}();", name));
        declarations.line(1, &format!("~{}();", name));

        definitions.line(0, &format!("{name}::{name}() {{"));
        definitions.line(1, &format!("std::cout << \"Constructor for {name}\" << std::endl;"));
        definitions.line(0, "}");
        definitions.blank();

        definitions.line(0, &format!("{name}::~{name}() {{"));
        definitions.line(1, &format!("std::cout << \"Destructor for {name}\" << std::endl;"));
        definitions.line(0, "}");
        definitions.blank();
    }

    fn emit_member(&self, member: &MemberNode, owner: &str, declarations: &mut Output, definitions: &mut Output) {
        let return_type = vocabulary::cpp_type(&member.return_type);
        let params = render_tokens(&member.params);

        declarations.line(1, &format!("{} {}({});", return_type, member.name, params));
        definitions.line(0, &format!("{} {}::{}({}) {{", return_type, owner, member.name, params));
    }

    fn statement_text(&self, kind: &StatementKind) -> String {
        match kind {
            StatementKind::Output(expr) if expr.is_empty() => "std::cout << std::endl;".to_string(),
            StatementKind::Output(expr) => format!("std::cout << {} << std::endl;", render_tokens(expr)),
            StatementKind::Code(fragments) => {
                let pieces: Vec<String> = fragments
                    .iter()
                    .map(|fragment| match fragment {
                        Fragment::Token(text) => text.clone(),
                        Fragment::Allocate(ty) => format!("new {}()", vocabulary::cpp_type(ty)),
                        Fragment::Release(name) => format!("delete {}", name),
                    })
                    .collect();
                render_tokens(&pieces)
            }
        }
    }
}

impl Default for CppGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for CppGenerator {
    fn generate(&self, ast: &Ast, metadata: &TransformMetadata, options: &GenerateOptions) -> GenerateResult {
        let mut declarations = Output::new();
        let mut definitions = Output::new();
        let mut owner: Option<&str> = None;
        // Indent level of the next body statement
        let mut depth: usize = 0;

        for node in &ast.nodes {
            match node {
                // Includes come from metadata.imports at finalization
                Node::Import(_) => {}
                Node::TypeDecl(decl) => {
                    self.emit_type(decl, &mut declarations, &mut definitions);
                    owner = Some(decl.name.as_str());
                }
                Node::Visibility(visibility) => {
                    declarations.line(0, &format!("{}:", visibility.keyword));
                }
                Node::Member(member) => {
                    self.emit_member(member, owner.unwrap_or_default(), &mut declarations, &mut definitions);
                    depth = 1;
                }
                Node::Statement(statement) => {
                    let text = self.statement_text(&statement.kind);
                    if text == "}" {
                        depth = depth.saturating_sub(1).max(1);
                    }
                    definitions.line(depth, &text);
                    if text.ends_with('{') {
                        depth += 1;
                    }
                }
                Node::BlockEnd(end) => match end.block {
                    Block::Function => {
                        definitions.line(0, "}");
                        definitions.blank();
                        depth = 0;
                    }
                    Block::Type => {
                        declarations.line(0, "};");
                        declarations.blank();
                        owner = None;
                    }
                },
            }
        }

        GenerateResult {
            header: finalize_header(&options.unit_name, &declarations.finish()),
            source: finalize_source(&options.unit_name, &metadata.imports, &definitions.finish()),
        }
    }
}

/// Join tokens into C++ text: space separated, except tight around
/// parentheses, before `,` and `;`, and between a callee and its `(`.
/// Member type names get their C++ spelling.
pub fn render_tokens(tokens: &[String]) -> String {
    let mut out = String::new();
    let mut prev: Option<&str> = None;

    for token in tokens {
        let text = token.as_str();
        if let Some(prev) = prev {
            let callee = text == "(" && is_word(prev) && !vocabulary::is_keyword(prev);
            let tight = matches!(text, "," | ";" | ")") || prev == "(" || callee;
            if !tight {
                out.push(' ');
            }
        }
        out.push_str(&vocabulary::cpp_type(text));
        prev = Some(text);
    }

    out
}

fn is_word(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
}
