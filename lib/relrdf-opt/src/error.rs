use relrdf_algebra::{Extents, Node};
use std::fmt;

/// An expression whose operands do not have the expected types.
///
/// For example a literal used as the subject of a pattern or a variable bound
/// to both a resource and a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCheckError {
    extents: Option<Extents>,
    message: String,
}

impl TypeCheckError {
    pub fn new(extents: Option<Extents>, message: impl Into<String>) -> Self {
        Self {
            extents,
            message: message.into(),
        }
    }

    pub(crate) fn at(node: &Node, message: impl Into<String>) -> Self {
        Self::new(node.extents(), message)
    }

    #[inline]
    pub fn extents(&self) -> Option<&Extents> {
        self.extents.as_ref()
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TypeCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(extents) = &self.extents {
            write!(f, "{extents}: {}", self.message)
        } else {
            f.write_str(&self.message)
        }
    }
}

impl std::error::Error for TypeCheckError {}
