use super::ImportRegistry;

/// A type declared in the unit
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TypeSummary {
    pub keyword: String,
    pub name: String,
    pub members: Vec<String>,
}

/// Metadata collected during transformation
/// This is populated by analysis plugins and used by the generator
#[derive(Debug, Clone, Default)]
pub struct TransformMetadata {
    pub imports: ImportRegistry,
    pub types: Vec<TypeSummary>,
}

impl TransformMetadata {
    pub fn new() -> Self {
        Self::default()
    }
}
