use oxiri::{Iri, IriParseError};
use std::fmt;

/// An owned RDF URI (actually an [IRI](https://www.w3.org/TR/rdf11-concepts/#dfn-iri)).
///
/// URIs are compared by exact string equality.
/// The default string formatter returns the N-Triples representation:
/// ```
/// use relrdf_model::Uri;
///
/// assert_eq!(
///     "<http://example.com/foo>",
///     Uri::new("http://example.com/foo")?.to_string()
/// );
/// # Result::<_,relrdf_model::IriParseError>::Ok(())
/// ```
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub struct Uri {
    iri: String,
}

impl Uri {
    /// Builds and validates a URI.
    pub fn new(iri: impl Into<String>) -> Result<Self, IriParseError> {
        Ok(Self::new_unchecked(Iri::parse(iri.into())?.into_inner()))
    }

    /// Builds a URI from a string without validation.
    ///
    /// It is the caller's responsibility to ensure that `iri` is a valid IRI.
    /// Query compilation uses it for URIs built by concatenation, whose validity follows from their parts.
    #[inline]
    pub fn new_unchecked(iri: impl Into<String>) -> Self {
        Self { iri: iri.into() }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.iri.as_str()
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.iri
    }

    #[inline]
    pub fn as_ref(&self) -> UriRef<'_> {
        UriRef::new_unchecked(&self.iri)
    }

    /// Returns the part of the URI following `base`, if the URI starts with it.
    #[inline]
    pub fn strip_base(&self, base: &str) -> Option<&str> {
        self.iri.strip_prefix(base)
    }
}

impl fmt::Display for Uri {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_ref().fmt(f)
    }
}

impl PartialEq<str> for Uri {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Uri {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

/// A borrowed URI, mostly used for vocabulary constants.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Copy, Hash)]
pub struct UriRef<'a> {
    iri: &'a str,
}

impl<'a> UriRef<'a> {
    /// Builds and validates a URI.
    pub fn new(iri: &'a str) -> Result<Self, IriParseError> {
        Ok(Self::new_unchecked(Iri::parse(iri)?.into_inner()))
    }

    #[inline]
    pub const fn new_unchecked(iri: &'a str) -> Self {
        Self { iri }
    }

    #[inline]
    pub const fn as_str(self) -> &'a str {
        self.iri
    }

    #[inline]
    pub fn into_owned(self) -> Uri {
        Uri::new_unchecked(self.iri)
    }
}

impl fmt::Display for UriRef<'_> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.as_str())
    }
}

impl From<UriRef<'_>> for Uri {
    #[inline]
    fn from(uri: UriRef<'_>) -> Self {
        uri.into_owned()
    }
}

impl<'a> From<&'a Uri> for UriRef<'a> {
    #[inline]
    fn from(uri: &'a Uri) -> Self {
        uri.as_ref()
    }
}

impl PartialEq<Uri> for UriRef<'_> {
    #[inline]
    fn eq(&self, other: &Uri) -> bool {
        self.as_str() == other.as_str()
    }
}

impl PartialEq<UriRef<'_>> for Uri {
    #[inline]
    fn eq(&self, other: &UriRef<'_>) -> bool {
        self.as_str() == other.as_str()
    }
}

impl PartialEq<str> for UriRef<'_> {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_iri() {
        assert!(Uri::new("not an iri").is_err());
        assert!(Uri::new("http://example.com/a").is_ok());
    }

    #[test]
    fn strips_base() {
        let uri = Uri::new_unchecked("http://example.com/ns#version3");
        assert_eq!(uri.strip_base("http://example.com/ns#version"), Some("3"));
        assert_eq!(uri.strip_base("http://example.org/"), None);
    }

    #[test]
    fn compares_with_borrowed() {
        let uri = Uri::new_unchecked("http://example.com/a");
        assert_eq!(uri, UriRef::new_unchecked("http://example.com/a"));
        assert_eq!(uri, "http://example.com/a");
    }
}
