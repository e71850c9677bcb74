use crate::uri::{Uri, UriRef};
use std::fmt;

/// A URI prefix that builds URIs by concatenation with a local part.
///
/// ```
/// use relrdf_model::Namespace;
///
/// let ex = Namespace::new("http://example.com/ns#");
/// assert_eq!(ex.concat("a").as_str(), "http://example.com/ns#a");
/// ```
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub struct Namespace {
    base: String,
}

impl Namespace {
    #[inline]
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Concatenates the namespace with a local part.
    #[inline]
    pub fn concat(&self, local: &str) -> Uri {
        Uri::new_unchecked(format!("{}{local}", self.base))
    }

    /// Returns the local part of `uri` if it belongs to this namespace.
    #[inline]
    pub fn local_part<'a>(&self, uri: impl Into<UriRef<'a>>) -> Option<&'a str> {
        uri.into().as_str().strip_prefix(self.base.as_str())
    }
}

impl fmt::Display for Namespace {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.base)
    }
}

impl From<Uri> for Namespace {
    #[inline]
    fn from(uri: Uri) -> Self {
        Self::new(uri.into_string())
    }
}

impl From<UriRef<'_>> for Namespace {
    #[inline]
    fn from(uri: UriRef<'_>) -> Self {
        Self::new(uri.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{rdf, relrdf};

    #[test]
    fn concat_and_split() {
        let ns = Namespace::new(rdf::NAMESPACE);
        assert_eq!(ns.concat("type"), rdf::TYPE);
        assert_eq!(ns.local_part(rdf::TYPE), Some("type"));
        assert_eq!(Namespace::from(relrdf::COMP).local_part(relrdf::COMP_AB), Some("AB"));
        assert_eq!(ns.local_part(relrdf::COMP_AB), None);
    }
}
