use super::{FIRST, Replacement, VersionView, field, version_statements};
use relrdf_algebra::{Node, StaticType};

/// Every stored version, each exposed as its own context `<version_uri><version>`.
#[derive(Debug, Clone)]
pub struct AllVersionsView {
    replacement: Replacement,
}

impl AllVersionsView {
    pub fn new(version_uri: &str) -> Self {
        let context = Node::value_ref(version_uri, field(FIRST, "version_id"))
            .with_static_type(StaticType::Resource);
        Self {
            replacement: Replacement::statements(version_statements(None), context),
        }
    }
}

impl VersionView for AllVersionsView {
    fn statement_replacement(&self, _pattern: &Node) -> &Replacement {
        &self.replacement
    }
}
