use crate::uri::{Uri, UriRef};
use crate::vocab::xsd;
use oxilangtag::{LanguageTag, LanguageTagParseError};
use std::fmt;
use std::fmt::Write;

/// An owned RDF [literal](https://www.w3.org/TR/rdf11-concepts/#dfn-literal).
///
/// A literal carries a lexical form and at most one of a language tag or a datatype.
/// The default string formatter returns the N-Triples representation:
/// ```
/// use relrdf_model::Literal;
/// use relrdf_model::vocab::xsd;
///
/// assert_eq!(
///     "\"foo\\nbar\"",
///     Literal::new_simple_literal("foo\nbar").to_string()
/// );
/// assert_eq!(
///     "\"1999-01-01\"^^<http://www.w3.org/2001/XMLSchema#date>",
///     Literal::new_typed_literal("1999-01-01", xsd::DATE).to_string()
/// );
/// ```
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub struct Literal {
    value: String,
    kind: LiteralKind,
}

/// What accompanies the lexical form of a [`Literal`].
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub enum LiteralKind {
    Simple,
    LanguageTagged(String),
    Typed(Uri),
}

/// The native value of a literal with one of the XSD datatypes the query engine knows about.
#[derive(PartialEq, Debug, Clone)]
pub enum NativeValue {
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    Double(f64),
    String(String),
}

impl Literal {
    /// Builds a [simple literal](https://www.w3.org/TR/rdf11-concepts/#dfn-simple-literal).
    #[inline]
    pub fn new_simple_literal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: LiteralKind::Simple,
        }
    }

    /// Builds a typed literal. `xsd:string` literals are normalized to simple literals.
    #[inline]
    pub fn new_typed_literal(value: impl Into<String>, datatype: impl Into<Uri>) -> Self {
        let datatype = datatype.into();
        Self {
            value: value.into(),
            kind: if datatype == xsd::STRING {
                LiteralKind::Simple
            } else {
                LiteralKind::Typed(datatype)
            },
        }
    }

    /// Builds a language-tagged string, validating and lowercasing the tag.
    pub fn new_language_tagged_literal(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<Self, LanguageTagParseError> {
        let mut language = language.into();
        language.make_ascii_lowercase();
        Ok(Self::new_language_tagged_literal_unchecked(
            value,
            LanguageTag::parse(language)?.into_inner(),
        ))
    }

    /// Builds a language-tagged string without validating the tag.
    #[inline]
    pub fn new_language_tagged_literal_unchecked(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            value: value.into(),
            kind: LiteralKind::LanguageTagged(language.into()),
        }
    }

    /// The lexical form.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[inline]
    pub fn kind(&self) -> &LiteralKind {
        &self.kind
    }

    #[inline]
    pub fn language(&self) -> Option<&str> {
        match &self.kind {
            LiteralKind::LanguageTagged(language) => Some(language),
            _ => None,
        }
    }

    /// The explicit datatype, if any. Simple and language-tagged literals have none.
    #[inline]
    pub fn datatype(&self) -> Option<UriRef<'_>> {
        match &self.kind {
            LiteralKind::Typed(datatype) => Some(datatype.as_ref()),
            _ => None,
        }
    }

    #[inline]
    pub fn is_plain(&self) -> bool {
        !matches!(self.kind, LiteralKind::Typed(_))
    }

    /// The key used to intern the type of this literal in the store.
    ///
    /// Simple literals have no key, language-tagged strings use `@` followed by the tag
    /// and typed literals use their datatype IRI.
    pub fn type_key(&self) -> Option<String> {
        match &self.kind {
            LiteralKind::Simple => None,
            LiteralKind::LanguageTagged(language) => Some(format!("@{language}")),
            LiteralKind::Typed(datatype) => Some(datatype.as_str().to_owned()),
        }
    }

    /// Inverse of [`Literal::type_key`].
    pub fn from_type_key(value: impl Into<String>, key: Option<&str>) -> Self {
        match key {
            None => Self::new_simple_literal(value),
            Some(key) => match key.strip_prefix('@') {
                Some(language) => Self::new_language_tagged_literal_unchecked(value, language),
                None => Self::new_typed_literal(value, Uri::new_unchecked(key)),
            },
        }
    }

    /// Projects the literal to a native value.
    ///
    /// Returns `None` for datatypes without a projection and for invalid lexical forms.
    pub fn native(&self) -> Option<NativeValue> {
        let datatype = match &self.kind {
            LiteralKind::Simple => return Some(NativeValue::String(self.value.clone())),
            LiteralKind::LanguageTagged(_) => return None,
            LiteralKind::Typed(datatype) => datatype.as_ref(),
        };
        let value = self.value.trim();
        if datatype == xsd::BOOLEAN {
            match value {
                "true" | "1" => Some(NativeValue::Boolean(true)),
                "false" | "0" => Some(NativeValue::Boolean(false)),
                _ => None,
            }
        } else if datatype == xsd::INTEGER {
            value.parse().ok().map(NativeValue::Integer)
        } else if datatype == xsd::DECIMAL {
            if value.contains(['e', 'E']) {
                return None;
            }
            value.parse().ok().map(NativeValue::Decimal)
        } else if datatype == xsd::DOUBLE {
            match value {
                "INF" => Some(NativeValue::Double(f64::INFINITY)),
                "-INF" => Some(NativeValue::Double(f64::NEG_INFINITY)),
                "NaN" => Some(NativeValue::Double(f64::NAN)),
                _ => value.parse().ok().map(NativeValue::Double),
            }
        } else {
            None
        }
    }

    /// Checks if the literal has a datatype the backend may compare numerically.
    pub fn is_numeric(&self) -> bool {
        self.datatype().is_some_and(xsd::is_numeric)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        print_quoted_str(&self.value, f)?;
        match &self.kind {
            LiteralKind::Simple => Ok(()),
            LiteralKind::LanguageTagged(language) => write!(f, "@{language}"),
            LiteralKind::Typed(datatype) => write!(f, "^^{datatype}"),
        }
    }
}

impl From<&str> for Literal {
    #[inline]
    fn from(value: &str) -> Self {
        Self::new_simple_literal(value)
    }
}

impl From<String> for Literal {
    #[inline]
    fn from(value: String) -> Self {
        Self::new_simple_literal(value)
    }
}

impl From<bool> for Literal {
    #[inline]
    fn from(value: bool) -> Self {
        Self::new_typed_literal(value.to_string(), xsd::BOOLEAN)
    }
}

impl From<i64> for Literal {
    #[inline]
    fn from(value: i64) -> Self {
        Self::new_typed_literal(value.to_string(), xsd::INTEGER)
    }
}

impl From<f64> for Literal {
    #[inline]
    fn from(value: f64) -> Self {
        Self::new_typed_literal(
            if value == f64::INFINITY {
                "INF".to_owned()
            } else if value == f64::NEG_INFINITY {
                "-INF".to_owned()
            } else {
                value.to_string()
            },
            xsd::DOUBLE,
        )
    }
}

#[inline]
pub(crate) fn print_quoted_str(string: &str, f: &mut impl Write) -> fmt::Result {
    f.write_char('"')?;
    for c in string.chars() {
        match c {
            '\u{08}' => f.write_str("\\b"),
            '\t' => f.write_str("\\t"),
            '\n' => f.write_str("\\n"),
            '\u{0C}' => f.write_str("\\f"),
            '\r' => f.write_str("\\r"),
            '"' => f.write_str("\\\""),
            '\\' => f.write_str("\\\\"),
            '\0'..='\u{1F}' | '\u{7F}' => write!(f, "\\u{:04X}", u32::from(c)),
            _ => f.write_char(c),
        }?;
    }
    f.write_char('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xsd_string_is_simple() {
        assert_eq!(
            Literal::new_typed_literal("foo", xsd::STRING),
            Literal::new_simple_literal("foo")
        );
        assert_eq!(Literal::new_simple_literal("foo").type_key(), None);
    }

    #[test]
    fn language_tag_is_lowercased() -> Result<(), LanguageTagParseError> {
        let literal = Literal::new_language_tagged_literal("chat", "FR")?;
        assert_eq!(literal.language(), Some("fr"));
        assert_eq!(literal.type_key().as_deref(), Some("@fr"));
        assert_eq!(literal.to_string(), "\"chat\"@fr");
        Ok(())
    }

    #[test]
    fn type_key_roundtrip() {
        let typed = Literal::new_typed_literal("1", xsd::INTEGER);
        let key = typed.type_key();
        assert_eq!(Literal::from_type_key("1", key.as_deref()), typed);
        let tagged = Literal::new_language_tagged_literal_unchecked("x", "en");
        assert_eq!(Literal::from_type_key("x", Some("@en")), tagged);
    }

    #[test]
    fn native_values() {
        assert_eq!(
            Literal::new_typed_literal("true", xsd::BOOLEAN).native(),
            Some(NativeValue::Boolean(true))
        );
        assert_eq!(
            Literal::new_typed_literal(" 42 ", xsd::INTEGER).native(),
            Some(NativeValue::Integer(42))
        );
        assert_eq!(
            Literal::new_typed_literal("1.5", xsd::DECIMAL).native(),
            Some(NativeValue::Decimal(1.5))
        );
        assert_eq!(
            Literal::new_typed_literal("1e3", xsd::DOUBLE).native(),
            Some(NativeValue::Double(1000.))
        );
        assert_eq!(
            Literal::new_simple_literal("s").native(),
            Some(NativeValue::String("s".into()))
        );
        assert_eq!(Literal::new_typed_literal("x", xsd::INTEGER).native(), None);
        assert_eq!(Literal::new_typed_literal("1e3", xsd::DECIMAL).native(), None);
        assert_eq!(Literal::new_typed_literal("2000", xsd::G_YEAR).native(), None);
    }

    #[test]
    fn escapes_lexical_form() {
        assert_eq!(
            Literal::new_simple_literal("a\"b\\\u{1}").to_string(),
            "\"a\\\"b\\\\\\u0001\""
        );
    }
}
