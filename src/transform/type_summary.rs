use super::{TransformMetadata, TypeSummary, Visitor};
use crate::ast::Node;

/// Records each declared type and the names of its members
#[derive(Default)]
pub struct TypeSummaryPlugin {
    current: Option<TypeSummary>,
}

impl Visitor for TypeSummaryPlugin {
    fn visit(&mut self, node: &Node, metadata: &mut TransformMetadata) {
        match node {
            Node::TypeDecl(decl) => {
                self.current = Some(TypeSummary {
                    keyword: decl.keyword.clone(),
                    name: decl.name.clone(),
                    members: Vec::new(),
                });
            }
            Node::Member(member) => {
                if let Some(current) = self.current.as_mut() {
                    current.members.push(member.name.clone());
                }
            }
            Node::BlockEnd(end) if end.block == crate::ast::Block::Type => {
                if let Some(done) = self.current.take() {
                    metadata.types.push(done);
                }
            }
            _ => {}
        }
    }
}
