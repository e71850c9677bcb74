use crate::node::Node;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Allocates incarnation numbers for one query compilation.
///
/// Every relation of a compiled query binds a distinct incarnation, which makes
/// SQL aliases unique even when the same table is used many times.
#[derive(Debug)]
pub struct IncarnationContext {
    next: AtomicU64,
}

impl Default for IncarnationContext {
    fn default() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}

impl IncarnationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A number never returned before by this context.
    pub fn fresh(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Deep copy of `node` where every incarnation is replaced by a fresh one.
    ///
    /// References to the same incarnation inside `node` keep referring to the same one in the copy.
    pub fn reincarnate(&self, node: &Node) -> Node {
        let mut copy = node.clone();
        let mut mapping = HashMap::new();
        copy.walk_mut(&mut |node| {
            if let Some(incarnation) = node.kind.incarnation_mut() {
                *incarnation = *mapping
                    .entry(*incarnation)
                    .or_insert_with(|| self.fresh());
            }
            if let Some(dynamic_type) = &mut node.dynamic_type {
                dynamic_type.walk_mut(&mut |node| {
                    if let Some(incarnation) = node.kind.incarnation_mut() {
                        *incarnation = *mapping
                            .entry(*incarnation)
                            .or_insert_with(|| self.fresh());
                    }
                });
            }
        });
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(context: &IncarnationContext) -> Node {
        let a = context.fresh();
        let b = context.fresh();
        Node::select(
            Node::product(vec![
                Node::relation("statements", a),
                Node::relation("version_statement", b),
            ]),
            Node::equal(
                Node::field_ref("statements", a, "id"),
                Node::field_ref("version_statement", b, "stmt_id"),
            ),
        )
    }

    #[test]
    fn copies_are_disjoint() {
        let context = IncarnationContext::new();
        let original = template(&context);
        let copy = context.reincarnate(&original);
        let again = context.reincarnate(&original);
        assert_eq!(copy.incarnations().len(), 2);
        assert!(original.incarnations().is_disjoint(&copy.incarnations()));
        assert!(copy.incarnations().is_disjoint(&again.incarnations()));
    }

    #[test]
    fn references_follow_their_relation() {
        let context = IncarnationContext::new();
        let copy = context.reincarnate(&template(&context));
        let relation_incarnations: Vec<_> = copy.children[0]
            .children
            .iter()
            .filter_map(|r| r.kind.incarnation())
            .collect();
        let field_incarnations: Vec<_> = copy.children[1]
            .children
            .iter()
            .filter_map(|r| r.kind.incarnation())
            .collect();
        assert_eq!(relation_incarnations, field_incarnations);
    }
}
