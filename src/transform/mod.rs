mod import_registry;
mod metadata;
mod type_summary;

pub use import_registry::{ImportCollectionPlugin, ImportRegistry};
pub use metadata::{TransformMetadata, TypeSummary};
pub use type_summary::TypeSummaryPlugin;

use crate::ast::{Ast, Node};

/// Visitor trait for AST analysis passes
pub trait Visitor {
    /// Called once per node, in document order.
    fn visit(&mut self, node: &Node, metadata: &mut TransformMetadata);

    /// Called after the last node.
    fn finish(&mut self, _metadata: &mut TransformMetadata) {}
}

/// Transformer that applies a series of plugins to an AST
pub struct Transformer {
    plugins: Vec<Box<dyn Visitor + Send>>,
    pub metadata: TransformMetadata,
}

impl Transformer {
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            metadata: TransformMetadata::new(),
        }
    }

    pub fn add<V: Visitor + Send + 'static>(mut self, visitor: V) -> Self {
        self.plugins.push(Box::new(visitor));
        self
    }

    pub fn transform(&mut self, ast: &Ast) -> &TransformMetadata {
        for plugin in &mut self.plugins {
            for node in &ast.nodes {
                plugin.visit(node, &mut self.metadata);
            }
            plugin.finish(&mut self.metadata);
        }

        &self.metadata
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a transformer with the standard plugins
pub fn standard_plugins() -> Transformer {
    Transformer::new()
        .add(ImportCollectionPlugin)
        .add(TypeSummaryPlugin::default())
}
