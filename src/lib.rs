//! FL to C++ transpiler.
//!
//! Source text goes through three stages: the tokenizer and tree builder
//! produce a flat AST, analysis plugins collect imports and type
//! summaries, and the C++ generator emits a header/source pair.
//!
//! ```
//! use fl_transpiler::translate;
//!
//! let unit = translate("class Foo { int bar() { cout x; } }", "Foo").unwrap();
//! assert!(unit.header.contains("int bar();"));
//! assert!(unit.source.contains("int Foo::bar() {"));
//! ```

pub mod ast;
pub mod build;
pub mod error;
pub mod generate;
pub mod parser;
pub mod transform;
pub mod units;
pub mod vocabulary;

pub use error::{CompileError, ErrorKind, ParseError};
pub use generate::{GenerateOptions, GenerateResult};
pub use parser::LexMode;
pub use transform::TypeSummary;

use generate::{CppGenerator, Generator};
use parser::{FlParser, Parser};
use serde::Serialize;
use transform::Transformer;

/// Configuration for one translation.
#[derive(Debug, Clone)]
pub struct Options {
    /// Base name of the generated `.h`/`.cpp` pair (default: "main")
    pub unit_name: String,
    /// How to treat characters outside the language vocabulary
    pub lex_mode: LexMode,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            unit_name: "main".to_string(),
            lex_mode: LexMode::Permissive,
        }
    }
}

impl Options {
    pub fn for_unit(unit_name: impl Into<String>) -> Self {
        Self {
            unit_name: unit_name.into(),
            ..Self::default()
        }
    }
}

/// One translated unit: the declaration and definition text plus what
/// the analysis passes found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    pub unit: String,
    pub header: String,
    pub source: String,
    pub imports: Vec<String>,
    pub types: Vec<TypeSummary>,
}

/// Parse → analyze → generate.
///
/// A pipeline holds no per-file state; every `compile` call starts from a
/// fresh parser and fresh plugin metadata, so one pipeline can be reused
/// and separate pipelines can run on separate threads.
pub struct Pipeline {
    plugins: fn() -> Transformer,
    generator: CppGenerator,
}

impl Pipeline {
    /// Pipeline with the standard analysis plugins
    pub fn standard() -> Self {
        Self {
            plugins: transform::standard_plugins,
            generator: CppGenerator::new(),
        }
    }

    pub fn compile(&self, source: &str, options: &Options) -> Result<Translation, CompileError> {
        let ast = FlParser::with_mode(options.lex_mode).parse(source)?;

        let mut transformer = (self.plugins)();
        let metadata = transformer.transform(&ast);

        let generate_options = GenerateOptions {
            unit_name: options.unit_name.clone(),
        };
        let generated = self.generator.generate(&ast, metadata, &generate_options);

        Ok(Translation {
            unit: options.unit_name.clone(),
            header: generated.header,
            source: generated.source,
            imports: metadata.imports.iter().map(str::to_string).collect(),
            types: metadata.types.clone(),
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

/// Translate `source` permissively as unit `unit_name`
pub fn translate(source: &str, unit_name: &str) -> Result<Translation, CompileError> {
    Pipeline::standard().compile(source, &Options::for_unit(unit_name))
}

/// Translate `source` with explicit options
pub fn translate_with(source: &str, options: &Options) -> Result<Translation, CompileError> {
    Pipeline::standard().compile(source, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_metadata() {
        let unit = translate("import math import math class A { void f() { } int g() { } }", "A").unwrap();
        assert_eq!(unit.unit, "A");
        assert_eq!(unit.imports, ["math"]);
        assert_eq!(unit.types.len(), 1);
        assert_eq!(unit.types[0].members, ["f", "g"]);
    }

    #[test]
    fn test_pipeline_is_reusable() {
        let pipeline = Pipeline::standard();
        let options = Options::for_unit("A");
        let first = pipeline.compile("import gl class A { }", &options).unwrap();
        let second = pipeline.compile("class A { }", &options).unwrap();
        assert_eq!(first.imports, ["gl"]);
        assert!(second.imports.is_empty());
    }

    #[test]
    fn test_strict_mode_is_lex_error() {
        let options = Options {
            unit_name: "A".to_string(),
            lex_mode: LexMode::Strict,
        };
        let err = translate_with("class A { void f() { x = y && z; } }", &options).unwrap_err();
        assert!(matches!(err, CompileError::Lex(_)));

        // The same input is accepted permissively
        assert!(translate("class A { void f() { x = y && z; } }", "A").is_ok());
    }

    #[test]
    fn test_structural_error_produces_no_text() {
        let err = translate("class A { void f() { cout x;", "A").unwrap_err();
        let CompileError::Structural(parse) = err else { panic!("expected structural error") };
        assert_eq!(parse.kind, ErrorKind::UnclosedFunction);
    }
}
