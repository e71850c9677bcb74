//! Dereferencing of the URIs stored as a suffix of a base URI.

use crate::emit::quote_string;
use relrdf_algebra::rewrite::{Rewriter, Rewritten, Visit, rewrite};
use relrdf_algebra::{Node, NodeKind};
use relrdf_model::Uri;
use std::convert::Infallible;
use std::mem::take;

/// Replaces the value references by SQL expressions.
///
/// Comparisons between a value reference and a constant URI compare the stored suffix
/// instead, which lets the database use its indexes. A constant outside the base of the
/// reference never matches it. `aliases` maps constants to the URI the view stores for them.
pub(crate) fn dereference_values(node: Node, aliases: &[(Uri, Uri)]) -> Rewritten {
    let Ok(rewritten) = rewrite(&mut ValueRefs { aliases }, node);
    rewritten
}

struct ValueRefs<'a> {
    aliases: &'a [(Uri, Uri)],
}

impl Rewriter for ValueRefs<'_> {
    type Error = Infallible;

    fn pre(&mut self, node: Node) -> Result<Visit, Infallible> {
        Ok(match node.kind {
            NodeKind::Equal | NodeKind::Different if node.children.len() == 2 => {
                match dereference_comparison(&node, self.aliases) {
                    Some(comparison) => Visit::Done(Rewritten::replaced(comparison)),
                    None => Visit::Descend(node),
                }
            }
            _ => Visit::Descend(node),
        })
    }

    fn post(&mut self, mut node: Node) -> Result<Rewritten, Infallible> {
        let NodeKind::ValueRef { base } = &node.kind else {
            return Ok(Rewritten::unchanged(node));
        };
        let template = format!("({} || $1)", quote_string(base));
        Ok(Rewritten::replaced(Node::sql_expr(
            template,
            take(&mut node.children),
        )))
    }
}

fn dereference_comparison(node: &Node, aliases: &[(Uri, Uri)]) -> Option<Node> {
    let [a, b] = node.children.as_slice() else {
        return None;
    };
    match (&a.kind, &b.kind) {
        (NodeKind::ValueRef { base }, NodeKind::Uri(uri))
        | (NodeKind::Uri(uri), NodeKind::ValueRef { base }) => {
            let reference = if matches!(a.kind, NodeKind::ValueRef { .. }) { a } else { b };
            let uri = aliases
                .iter()
                .find(|(alias, _)| alias == uri)
                .map_or(uri, |(_, stored)| stored);
            Some(match (uri.strip_base(base), reference.children.first()) {
                (Some(suffix), Some(internal)) => suffix_comparison(&node.kind, internal, suffix),
                _ => constant(node.kind == NodeKind::Different),
            })
        }
        (NodeKind::ValueRef { base: base_a }, NodeKind::ValueRef { base: base_b })
            if base_a == base_b =>
        {
            Some(Node::new(
                node.kind.clone(),
                a.children.iter().chain(&b.children).cloned().collect(),
            ))
        }
        _ => None,
    }
}

/// Canonical decimal suffixes are compared as integers. The other ones are compared
/// with the text of the stored value, so that `version01` never matches the integer 1.
fn suffix_comparison(kind: &NodeKind, internal: &Node, suffix: &str) -> Node {
    let canonical_integer = !suffix.is_empty()
        && suffix.bytes().all(|b| b.is_ascii_digit())
        && (suffix == "0" || !suffix.starts_with('0'))
        && suffix.len() < 19;
    let operands = if canonical_integer {
        vec![internal.clone(), Node::sql_expr(suffix, Vec::new())]
    } else {
        vec![
            Node::sql_expr("CAST($1 AS TEXT)", vec![internal.clone()]),
            Node::sql_expr(quote_string(suffix), Vec::new()),
        ]
    };
    Node::new(kind.clone(), operands)
}

/// An empty conjunction is true, an empty disjunction false.
fn constant(value: bool) -> Node {
    Node::new(if value { NodeKind::And } else { NodeKind::Or }, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relrdf_model::Uri;

    const BASE: &str = "http://example.com/version";

    fn reference() -> Node {
        Node::value_ref(BASE, Node::sql_field_ref(1, "version_id"))
    }

    fn as_text() -> Node {
        Node::sql_expr("CAST($1 AS TEXT)", vec![Node::sql_field_ref(1, "version_id")])
    }

    fn uri(value: &str) -> Node {
        Node::uri(Uri::new_unchecked(value))
    }

    #[test]
    fn comparison_with_shared_base() {
        let node = dereference_values(Node::equal(reference(), uri("http://example.com/version12")), &[]).node;
        assert_eq!(
            node,
            Node::equal(Node::sql_field_ref(1, "version_id"), Node::sql_expr("12", Vec::new()))
        );
        let node = dereference_values(Node::different(uri("http://example.com/versionX"), reference()), &[]).node;
        assert_eq!(
            node,
            Node::different(as_text(), Node::sql_expr("'X'", Vec::new()))
        );
    }

    #[test]
    fn non_canonical_numbers_are_compared_as_text() {
        for suffix in ["012", "00", "1.0", "+1"] {
            let node = dereference_values(
                Node::equal(reference(), uri(&format!("http://example.com/version{suffix}"))),
                &[],
            )
            .node;
            assert_eq!(
                node,
                Node::equal(as_text(), Node::sql_expr(format!("'{suffix}'"), Vec::new()))
            );
        }
    }

    #[test]
    fn aliases_are_resolved_before_comparing() {
        let aliases = [(
            Uri::new_unchecked("http://example.com/versionBA"),
            Uri::new_unchecked("http://example.com/versionAB"),
        )];
        let node = dereference_values(Node::equal(reference(), uri("http://example.com/versionBA")), &aliases).node;
        assert_eq!(node, Node::equal(as_text(), Node::sql_expr("'AB'", Vec::new())));
    }

    #[test]
    fn comparison_with_another_base() {
        let node = dereference_values(Node::equal(reference(), uri("http://example.org/a")), &[]).node;
        assert_eq!(node, Node::new(NodeKind::Or, Vec::new()));
        let node = dereference_values(Node::different(reference(), uri("http://example.org/a")), &[]).node;
        assert_eq!(node, Node::new(NodeKind::And, Vec::new()));
    }

    #[test]
    fn references_with_the_same_base() {
        let other = Node::value_ref(BASE, Node::sql_field_ref(2, "version_id"));
        let node = dereference_values(Node::equal(reference(), other), &[]).node;
        assert_eq!(
            node,
            Node::equal(Node::sql_field_ref(1, "version_id"), Node::sql_field_ref(2, "version_id"))
        );
    }

    #[test]
    fn remaining_references_are_concatenated() {
        let rewritten = dereference_values(Node::map_result(
            vec!["g".into()],
            Node::sql_relation(1, "version_statement", Vec::new()),
            vec![reference()],
        ), &[]);
        assert!(rewritten.modified);
        assert_eq!(
            rewritten.node.subexpr_by_name("g"),
            Some(&Node::sql_expr(
                "('http://example.com/version' || $1)",
                vec![Node::sql_field_ref(1, "version_id")]
            ))
        );
        assert!(!dereference_values(rewritten.node, &[]).modified);
    }
}
