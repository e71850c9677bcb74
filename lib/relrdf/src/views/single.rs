use super::{Replacement, VersionView, version_statements};
use relrdf_algebra::{Node, StaticType};
use relrdf_model::Uri;

/// A single stored version, exposed as the context `<version_uri><version>`.
#[derive(Debug, Clone)]
pub struct SingleVersionView {
    version: u32,
    replacement: Replacement,
}

impl SingleVersionView {
    pub fn new(version: u32, version_uri: &str) -> Self {
        let context = Node::uri(Uri::new_unchecked(format!("{version_uri}{version}")))
            .with_static_type(StaticType::Resource);
        Self {
            version,
            replacement: Replacement::statements(version_statements(Some(version)), context),
        }
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }
}

impl VersionView for SingleVersionView {
    fn statement_replacement(&self, _pattern: &Node) -> &Replacement {
        &self.replacement
    }
}
