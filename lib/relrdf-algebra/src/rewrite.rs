//! Generic tree rewriting.
//!
//! A [`Rewriter`] sees every node twice: [`Rewriter::pre`] before its children are
//! rewritten, and [`Rewriter::post`] with the rewritten children.
//! A pre-handler may take over the whole subtree, for example to push a scope,
//! rewrite the children itself in a specific order and pop the scope.

use crate::node::{Node, NodeKind};
use std::convert::Infallible;
use std::mem::take;

/// The result of rewriting a subtree.
#[must_use]
#[derive(Debug)]
pub struct Rewritten {
    pub node: Node,
    /// The subtree differs from the input.
    pub modified: bool,
}

impl Rewritten {
    #[inline]
    pub fn unchanged(node: Node) -> Self {
        Self {
            node,
            modified: false,
        }
    }

    #[inline]
    pub fn replaced(node: Node) -> Self {
        Self {
            node,
            modified: true,
        }
    }

    #[inline]
    pub fn into_node(self) -> Node {
        self.node
    }
}

/// What a pre-handler decided about a node.
pub enum Visit {
    /// Rewrite the children, then call the post-handler.
    Descend(Node),
    /// The subtree is already rewritten.
    Done(Rewritten),
}

pub trait Rewriter {
    type Error;

    fn pre(&mut self, node: Node) -> Result<Visit, Self::Error> {
        Ok(Visit::Descend(node))
    }

    fn post(&mut self, node: Node) -> Result<Rewritten, Self::Error> {
        Ok(Rewritten::unchanged(node))
    }
}

/// Rewrites `node` with `rewriter`.
///
/// Each node is visited once, children in order, and the modification flag
/// is propagated from the children to their parents.
pub fn rewrite<R: Rewriter + ?Sized>(rewriter: &mut R, node: Node) -> Result<Rewritten, R::Error> {
    let node = match rewriter.pre(node)? {
        Visit::Done(rewritten) => return Ok(rewritten),
        Visit::Descend(node) => node,
    };
    let with_children = rewrite_children(rewriter, node)?;
    let mut rewritten = rewriter.post(with_children.node)?;
    rewritten.modified |= with_children.modified;
    Ok(rewritten)
}

/// Rewrites the children of `node` in order, leaving `node` itself to the caller.
pub fn rewrite_children<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    mut node: Node,
) -> Result<Rewritten, R::Error> {
    let mut modified = false;
    let children = take(&mut node.children);
    node.children = children
        .into_iter()
        .map(|child| {
            let rewritten = rewrite(rewriter, child)?;
            modified |= rewritten.modified;
            Ok(rewritten.node)
        })
        .collect::<Result<_, R::Error>>()?;
    Ok(Rewritten { node, modified })
}

struct Apply<F, M> {
    handler: F,
    matches: M,
}

impl<E, F: FnMut(Node) -> Result<Rewritten, E>, M: Fn(&NodeKind) -> bool> Rewriter
    for Apply<F, M>
{
    type Error = E;

    fn post(&mut self, node: Node) -> Result<Rewritten, E> {
        if (self.matches)(&node.kind) {
            (self.handler)(node)
        } else {
            Ok(Rewritten::unchanged(node))
        }
    }
}

/// Bottom-up rewrite calling `handler` on every node after its children.
pub fn apply<E>(
    node: Node,
    handler: impl FnMut(Node) -> Result<Rewritten, E>,
) -> Result<Rewritten, E> {
    rewrite(
        &mut Apply {
            handler,
            matches: |_: &NodeKind| true,
        },
        node,
    )
}

/// Like [`apply`] but only calls `handler` on nodes whose kind `matches`.
pub fn match_apply<E>(
    node: Node,
    matches: impl Fn(&NodeKind) -> bool,
    handler: impl FnMut(Node) -> Result<Rewritten, E>,
) -> Result<Rewritten, E> {
    rewrite(&mut Apply { handler, matches }, node)
}

/// [`apply`] for handlers that cannot fail.
pub fn apply_infallible(node: Node, mut handler: impl FnMut(Node) -> Rewritten) -> Rewritten {
    let Ok(rewritten) = apply::<Infallible>(node, |node| Ok(handler(node)));
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Node {
        Node::and_all(vec![
            Node::var("a"),
            Node::not(Node::var("b")),
            Node::var("c"),
        ])
    }

    #[test]
    fn apply_visits_in_post_order() {
        let mut visited = Vec::new();
        let rewritten = apply_infallible(tree(), |node| {
            visited.push(node.kind.name());
            Rewritten::unchanged(node)
        });
        assert!(!rewritten.modified);
        assert_eq!(visited, ["var", "var", "not", "var", "and"]);
    }

    #[test]
    fn modification_propagates() {
        let rewritten = apply_infallible(tree(), |node| match node.var_name() {
            Some("b") => Rewritten::replaced(Node::var("d")),
            _ => Rewritten::unchanged(node),
        });
        assert!(rewritten.modified);
        assert_eq!(
            rewritten.node,
            Node::and_all(vec![Node::var("a"), Node::not(Node::var("d")), Node::var("c")])
        );
    }

    #[test]
    fn match_apply_filters_kinds() -> Result<(), String> {
        let mut count = 0;
        let rewritten = match_apply(
            tree(),
            |kind| matches!(kind, NodeKind::Not),
            |node| {
                count += 1;
                Ok::<_, String>(Rewritten::unchanged(node))
            },
        )?;
        assert_eq!(count, 1);
        assert!(!rewritten.modified);
        Ok(())
    }

    #[test]
    fn errors_abort() {
        let result = apply(tree(), |node| match node.var_name() {
            Some("b") => Err("unexpected b"),
            _ => Ok(Rewritten::unchanged(node)),
        });
        assert!(matches!(result, Err("unexpected b")));
    }

    struct SkipNot {
        vars: Vec<String>,
    }

    impl Rewriter for SkipNot {
        type Error = Infallible;

        fn pre(&mut self, node: Node) -> Result<Visit, Infallible> {
            Ok(if node.kind == NodeKind::Not {
                Visit::Done(Rewritten::unchanged(node))
            } else {
                Visit::Descend(node)
            })
        }

        fn post(&mut self, node: Node) -> Result<Rewritten, Infallible> {
            if let Some(name) = node.var_name() {
                self.vars.push(name.to_owned());
            }
            Ok(Rewritten::unchanged(node))
        }
    }

    #[test]
    fn pre_handler_can_skip_subtrees() {
        let mut rewriter = SkipNot { vars: Vec::new() };
        let Ok(rewritten) = rewrite(&mut rewriter, tree());
        assert!(!rewritten.modified);
        assert_eq!(rewriter.vars, ["a", "c"]);
    }
}
