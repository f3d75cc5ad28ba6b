mod assembler;
mod cpp;
mod output;

pub use assembler::{STANDARD_INCLUDES, finalize_header, finalize_source, include_guard};
pub use cpp::{CppGenerator, render_tokens};
pub use output::Output;

use crate::ast::Ast;
use crate::transform::TransformMetadata;

/// Generator options
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Base name of the output files (`<unit>.h`, `<unit>.cpp`)
    pub unit_name: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            unit_name: "main".to_string(),
        }
    }
}

/// Generation result: the finalized declaration and definition units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateResult {
    pub header: String,
    pub source: String,
}

/// Generator trait - converts AST to code
pub trait Generator {
    fn generate(&self, ast: &Ast, metadata: &TransformMetadata, options: &GenerateOptions) -> GenerateResult;
}
