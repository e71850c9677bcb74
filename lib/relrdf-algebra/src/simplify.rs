//! Algebraic simplifications run on mapped queries before SQL emission.

use crate::node::{Node, NodeKind};
use crate::rewrite::{Rewritten, apply_infallible};
use std::mem::take;

/// Simplifies the tree until a fixed point is reached.
///
/// * associative nodes (`Product`, `And`, `Or`, `Union`, `Intersection`) containing nodes of the same kind are flattened,
/// * `Select`s are promoted out of `Product`s, conjoining their predicates,
/// * nested `Select`s are merged into one.
pub fn simplify(mut node: Node) -> Node {
    loop {
        let rewritten = apply_infallible(node, simplify_node);
        if !rewritten.modified {
            return rewritten.node;
        }
        node = rewritten.node;
    }
}

fn simplify_node(node: Node) -> Rewritten {
    match &node.kind {
        NodeKind::Product => promote_selects(flatten(node)),
        NodeKind::And | NodeKind::Or | NodeKind::Union { .. } | NodeKind::Intersection { .. } => {
            flatten(node)
        }
        NodeKind::Select => merge_selects(node),
        _ => Rewritten::unchanged(node),
    }
}

fn flatten(mut node: Node) -> Rewritten {
    if !node.children.iter().any(|child| child.kind == node.kind) {
        return Rewritten::unchanged(node);
    }
    let children = take(&mut node.children);
    for child in children {
        if child.kind == node.kind {
            node.children.extend(child.children);
        } else {
            node.children.push(child);
        }
    }
    Rewritten::replaced(node)
}

fn promote_selects(rewritten: Rewritten) -> Rewritten {
    let Rewritten { mut node, modified } = rewritten;
    if !node
        .children
        .iter()
        .any(|child| child.kind == NodeKind::Select)
    {
        return Rewritten { node, modified };
    }
    let mut predicates = Vec::new();
    let children = take(&mut node.children);
    for child in children {
        if child.kind == NodeKind::Select {
            let mut parts = child.children.into_iter();
            if let (Some(relation), Some(predicate)) = (parts.next(), parts.next()) {
                node.children.push(relation);
                predicates.push(predicate);
            }
        } else {
            node.children.push(child);
        }
    }
    Rewritten::replaced(Node::select(node, Node::and_all(predicates)))
}

fn merge_selects(mut node: Node) -> Rewritten {
    if node.children.first().map(|c| &c.kind) != Some(&NodeKind::Select) {
        return Rewritten::unchanged(node);
    }
    let mut children = take(&mut node.children).into_iter();
    let (Some(inner), Some(outer_predicate)) = (children.next(), children.next()) else {
        return Rewritten::unchanged(node);
    };
    let mut inner_parts = inner.children.into_iter();
    let (Some(relation), Some(inner_predicate)) = (inner_parts.next(), inner_parts.next()) else {
        return Rewritten::unchanged(node);
    };
    Rewritten::replaced(Node::select(
        relation,
        Node::and_all(vec![inner_predicate, outer_predicate]),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(i: u64) -> Node {
        Node::relation("statements", i)
    }

    fn cond(i: u64) -> Node {
        Node::equal(Node::field_ref("statements", i, "subject"), Node::literal("a"))
    }

    #[test]
    fn flattens_products_and_conjunctions() {
        let node = Node::product(vec![rel(1), Node::product(vec![rel(2), Node::product(vec![rel(3)])])]);
        assert_eq!(simplify(node), Node::product(vec![rel(1), rel(2), rel(3)]));
        let node = Node::new(NodeKind::And, vec![cond(1), Node::new(NodeKind::And, vec![cond(2), cond(3)])]);
        assert_eq!(
            simplify(node),
            Node::new(NodeKind::And, vec![cond(1), cond(2), cond(3)])
        );
    }

    #[test]
    fn promotes_selects_out_of_products() {
        let node = Node::product(vec![
            Node::select(rel(1), cond(1)),
            rel(2),
            Node::select(rel(3), cond(3)),
        ]);
        assert_eq!(
            simplify(node),
            Node::select(
                Node::product(vec![rel(1), rel(2), rel(3)]),
                Node::new(NodeKind::And, vec![cond(1), cond(3)])
            )
        );
    }

    #[test]
    fn merges_nested_selects() {
        let node = Node::select(
            Node::select(Node::product(vec![rel(1), Node::select(rel(2), cond(2))]), cond(1)),
            cond(3),
        );
        assert_eq!(
            simplify(node),
            Node::select(
                Node::product(vec![rel(1), rel(2)]),
                Node::new(NodeKind::And, vec![cond(2), cond(1), cond(3)])
            )
        );
    }

    #[test]
    fn fixed_point_is_stable() {
        let node = Node::select(Node::product(vec![rel(1), rel(2)]), cond(1));
        assert_eq!(simplify(node.clone()), node);
    }
}
