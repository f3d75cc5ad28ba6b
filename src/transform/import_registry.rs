use super::{TransformMetadata, Visitor};
use crate::ast::Node;
use indexmap::IndexSet;

/// Libraries imported by one translation unit, each recorded once in
/// first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRegistry {
    libraries: IndexSet<String>,
}

impl ImportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the library was not registered before.
    pub fn register(&mut self, library: &str) -> bool {
        if self.libraries.contains(library) {
            return false;
        }
        self.libraries.insert(library.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.libraries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

/// Collects `import` nodes into the registry
pub struct ImportCollectionPlugin;

impl Visitor for ImportCollectionPlugin {
    fn visit(&mut self, node: &Node, metadata: &mut TransformMetadata) {
        if let Node::Import(import) = node {
            metadata.imports.register(&import.library);
        }
    }
}
