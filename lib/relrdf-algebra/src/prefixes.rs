use relrdf_model::vocab::BASE_PREFIXES;
use relrdf_model::Uri;
use std::collections::HashMap;

/// Prefix bindings used to resolve prefixed names.
///
/// Lookups go through three tiers: the prefixes declared by the query itself,
/// the external prefixes provided by the caller (for example the ones persisted in a model base)
/// and the base prefixes every query understands.
#[derive(Debug, Clone)]
pub struct PrefixTable {
    local: HashMap<String, String>,
    external: HashMap<String, String>,
    base: HashMap<String, String>,
}

impl Default for PrefixTable {
    fn default() -> Self {
        Self {
            local: HashMap::new(),
            external: HashMap::new(),
            base: BASE_PREFIXES
                .into_iter()
                .map(|(prefix, namespace)| (prefix.to_owned(), namespace.to_owned()))
                .collect(),
        }
    }
}

impl PrefixTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_external(
        mut self,
        prefixes: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        for (prefix, namespace) in prefixes {
            self.add_external(prefix, namespace);
        }
        self
    }

    pub fn add_external(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.external.insert(prefix.into(), namespace.into());
    }

    /// Declares a query-local prefix, shadowing the other tiers.
    pub fn declare(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.local.insert(prefix.into(), namespace.into());
    }

    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.local
            .get(prefix)
            .or_else(|| self.external.get(prefix))
            .or_else(|| self.base.get(prefix))
            .map(String::as_str)
    }

    /// The URI of the prefixed name `prefix:local`.
    pub fn expand(&self, prefix: &str, local: &str) -> Option<Uri> {
        let namespace = self.resolve(prefix)?;
        let mut iri = String::with_capacity(namespace.len() + local.len());
        iri.push_str(namespace);
        iri.push_str(local);
        Some(Uri::new_unchecked(iri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relrdf_model::vocab::rdf;

    #[test]
    fn tiers_shadow_in_order() {
        let mut table = PrefixTable::new().with_external([("ex", "http://example.com/ext#")]);
        assert_eq!(table.resolve("ex"), Some("http://example.com/ext#"));
        assert_eq!(table.resolve("rdf"), Some(rdf::NAMESPACE));
        table.declare("ex", "http://example.com/local#");
        table.add_external("rdf", "http://example.com/rdf#");
        assert_eq!(table.resolve("ex"), Some("http://example.com/local#"));
        assert_eq!(table.resolve("rdf"), Some("http://example.com/rdf#"));
        assert_eq!(table.resolve("foo"), None);
    }

    #[test]
    fn expand() {
        let table = PrefixTable::new();
        assert_eq!(table.expand("rdf", "type"), Some(rdf::TYPE.into_owned()));
        assert_eq!(table.expand("foo", "bar"), None);
    }
}
