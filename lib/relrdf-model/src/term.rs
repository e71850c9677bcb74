use crate::blank_node::BlankNode;
use crate::literal::Literal;
use crate::uri::Uri;
use std::fmt;

/// A node of the graph, written the N-Triples way by [`Display`](fmt::Display).
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub enum Term {
    Uri(Uri),
    BlankNode(BlankNode),
    Literal(Literal),
}

impl Term {
    /// The text the store keeps in a subject or object column.
    ///
    /// Literals lose their datatype here, the store records it in a separate type column.
    pub fn to_stored(&self) -> String {
        match self {
            Self::Uri(uri) => uri.as_str().to_owned(),
            Self::BlankNode(node) => node.to_stored(),
            Self::Literal(literal) => literal.value().to_owned(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri(uri) => write!(f, "{uri}"),
            Self::BlankNode(node) => write!(f, "{node}"),
            Self::Literal(literal) => write!(f, "{literal}"),
        }
    }
}

impl From<Uri> for Term {
    #[inline]
    fn from(uri: Uri) -> Self {
        Self::Uri(uri)
    }
}

impl From<BlankNode> for Term {
    #[inline]
    fn from(node: BlankNode) -> Self {
        Self::BlankNode(node)
    }
}

impl From<Literal> for Term {
    #[inline]
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

/// A statement handed to a sink. Only URIs are allowed as predicates.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Uri,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: impl Into<Term>, predicate: impl Into<Uri>, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triple_display() {
        let triple = Triple::new(
            BlankNode::new_unchecked("b"),
            Uri::new_unchecked("http://example.com/p"),
            Literal::new_language_tagged_literal_unchecked("x", "en"),
        );
        assert_eq!(triple.to_string(), "_:b <http://example.com/p> \"x\"@en .");
        assert_eq!(triple.subject.to_stored(), "_:b");
        assert_eq!(triple.object.to_stored(), "x");
    }
}
