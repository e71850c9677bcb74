//! Static types of IR expressions.

use relrdf_model::vocab::xsd;
use relrdf_model::{Literal, UriRef};
use std::collections::BTreeMap;
use std::fmt;

/// The static type of an expression.
///
/// RDF values form the lattice
/// ```text
///               RdfNode
///             /    |    \
///       Literal  Blank  Resource
///       /   |
///  Literal(T) ...
/// ```
/// Tabular expressions have a [`RelationType`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StaticType {
    /// The type of `NULL`, a subtype of every other type.
    Null,
    /// The type of type expressions ([`DynType`](crate::NodeKind::DynType) and [`Type`](crate::NodeKind::Type)).
    Type,
    RdfNode,
    Resource,
    Blank,
    /// A literal with the given type key (`@lang` or datatype IRI).
    /// `None` is the generic literal type, the supertype of all literal types.
    Literal(Option<String>),
    Relation(RelationType),
}

impl StaticType {
    /// The type of boolean conditions.
    pub fn boolean() -> Self {
        Self::typed_literal(xsd::BOOLEAN)
    }

    pub fn typed_literal(datatype: UriRef<'_>) -> Self {
        Self::Literal(Some(datatype.as_str().to_owned()))
    }

    /// The type of a literal value. Simple literals have the `xsd:string` type.
    pub fn of_literal(literal: &Literal) -> Self {
        Self::Literal(Some(
            literal
                .type_key()
                .unwrap_or_else(|| xsd::STRING.as_str().to_owned()),
        ))
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::Literal(Some(key)) if key == xsd::BOOLEAN.as_str())
    }

    /// Types whose values all map to the same runtime type code.
    pub fn is_concrete(&self) -> bool {
        matches!(self, Self::Resource | Self::Blank | Self::Literal(Some(_)))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Literal(Some(key)) if xsd::is_numeric(UriRef::new_unchecked(key)))
    }

    /// Types of values that may appear in a statement.
    pub fn is_rdf_node(&self) -> bool {
        matches!(
            self,
            Self::RdfNode | Self::Resource | Self::Blank | Self::Literal(_)
        )
    }

    pub fn is_subtype_of(&self, other: &Self) -> bool {
        match (self, other) {
            (a, b) if a == b => true,
            (Self::Null, _) => true,
            (Self::Resource | Self::Blank | Self::Literal(_), Self::RdfNode) => true,
            (Self::Literal(Some(_)), Self::Literal(None)) => true,
            (Self::Relation(a), Self::Relation(b)) => a.is_subtype_of(b),
            _ => false,
        }
    }

    /// The most specific common supertype.
    pub fn generalize(&self, other: &Self) -> Option<Self> {
        if self.is_subtype_of(other) {
            return Some(other.clone());
        }
        if other.is_subtype_of(self) {
            return Some(self.clone());
        }
        match (self, other) {
            (Self::Literal(_), Self::Literal(_)) => Some(Self::Literal(None)),
            (Self::Relation(a), Self::Relation(b)) => a.generalize(b).map(Self::Relation),
            (a, b) if a.is_rdf_node() && b.is_rdf_node() => Some(Self::RdfNode),
            _ => None,
        }
    }

    /// The most general common subtype.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        if self.is_subtype_of(other) {
            Some(self.clone())
        } else if other.is_subtype_of(self) {
            Some(other.clone())
        } else {
            None
        }
    }
}

impl fmt::Display for StaticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Type => f.write_str("type"),
            Self::RdfNode => f.write_str("node"),
            Self::Resource => f.write_str("resource"),
            Self::Blank => f.write_str("blank node"),
            Self::Literal(None) => f.write_str("literal"),
            Self::Literal(Some(key)) if key.starts_with('@') => write!(f, "literal{key}"),
            Self::Literal(Some(key)) => write!(f, "literal(<{key}>)"),
            Self::Relation(relation) => relation.fmt(f),
        }
    }
}

/// The row type of a tabular expression: a type per column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RelationType {
    columns: BTreeMap<String, StaticType>,
}

impl RelationType {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&StaticType> {
        self.columns.get(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, column_type: StaticType) {
        self.columns.insert(column.into(), column_type);
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &StaticType)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn has_same_columns(&self, other: &Self) -> bool {
        self.columns.keys().eq(other.columns.keys())
    }

    pub fn is_subtype_of(&self, other: &Self) -> bool {
        self.has_same_columns(other)
            && self
                .columns
                .iter()
                .all(|(name, t)| other.columns.get(name).is_some_and(|o| t.is_subtype_of(o)))
    }

    /// Column-wise generalization. Relations with different column sets are incompatible.
    pub fn generalize(&self, other: &Self) -> Option<Self> {
        if !self.has_same_columns(other) {
            return None;
        }
        let mut result = Self::new();
        for (name, t) in &self.columns {
            result.insert(name.clone(), t.generalize(other.columns.get(name)?)?);
        }
        Some(result)
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("relation(")?;
        for (i, (name, t)) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {t}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> StaticType {
        StaticType::typed_literal(xsd::INTEGER)
    }

    #[test]
    fn subtypes() {
        assert!(int().is_subtype_of(&StaticType::Literal(None)));
        assert!(int().is_subtype_of(&StaticType::RdfNode));
        assert!(StaticType::Null.is_subtype_of(&StaticType::Resource));
        assert!(!StaticType::Resource.is_subtype_of(&StaticType::Literal(None)));
        assert!(!StaticType::RdfNode.is_subtype_of(&StaticType::Blank));
    }

    #[test]
    fn generalize_and_intersect() {
        assert_eq!(
            int().generalize(&StaticType::boolean()),
            Some(StaticType::Literal(None))
        );
        assert_eq!(
            StaticType::Resource.generalize(&StaticType::Blank),
            Some(StaticType::RdfNode)
        );
        assert_eq!(StaticType::Resource.generalize(&StaticType::Type), None);
        assert_eq!(
            StaticType::RdfNode.intersect(&StaticType::Resource),
            Some(StaticType::Resource)
        );
        assert_eq!(StaticType::Resource.intersect(&int()), None);
    }

    #[test]
    fn relations() {
        let mut a = RelationType::new();
        a.insert("x", StaticType::Resource);
        let mut b = RelationType::new();
        b.insert("x", StaticType::Blank);
        let mut expected = RelationType::new();
        expected.insert("x", StaticType::RdfNode);
        assert_eq!(a.generalize(&b), Some(expected));
        b.insert("y", StaticType::Blank);
        assert_eq!(a.generalize(&b), None);
        assert_eq!(a.to_string(), "relation(x: resource)");
    }

    #[test]
    fn concrete_and_numeric() {
        assert!(int().is_concrete());
        assert!(int().is_numeric());
        assert!(!StaticType::Literal(None).is_concrete());
        assert!(!StaticType::boolean().is_numeric());
        assert!(StaticType::boolean().is_boolean());
    }

    #[test]
    fn literal_types() {
        assert_eq!(
            StaticType::of_literal(&Literal::new_simple_literal("a")),
            StaticType::typed_literal(xsd::STRING)
        );
        assert_eq!(
            StaticType::of_literal(&Literal::new_language_tagged_literal_unchecked("a", "en")),
            StaticType::Literal(Some("@en".into()))
        );
        assert_eq!(
            StaticType::of_literal(&Literal::new_typed_literal("1", xsd::INTEGER)),
            int()
        );
    }
}
