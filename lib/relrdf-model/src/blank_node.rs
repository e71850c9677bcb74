use rand::random;
use std::fmt;

/// A blank node label.
///
/// Labels are local: they only identify a node within one import or one result set.
/// The store keeps them as text prefixed with `_:`, see [`BlankNode::to_stored`].
///
/// ```
/// use relrdf_model::BlankNode;
///
/// let node = BlankNode::new("a122")?;
/// assert_eq!(node.to_string(), "_:a122");
/// assert_eq!(BlankNode::from_stored(&node.to_stored()), node);
/// # Result::<_,relrdf_model::BlankNodeIdParseError>::Ok(())
/// ```
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub struct BlankNode(String);

impl BlankNode {
    /// Prefix of blank nodes in the text columns of the store.
    pub const STORED_PREFIX: &'static str = "_:";

    /// Checks the label against the N-Triples `BLANK_NODE_LABEL` production.
    pub fn new(id: impl Into<String>) -> Result<Self, BlankNodeIdParseError> {
        let id = id.into();
        if is_valid_label(&id) {
            Ok(Self(id))
        } else {
            Err(BlankNodeIdParseError { label: id })
        }
    }

    #[inline]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Reads a stored value back, with or without its prefix.
    pub fn from_stored(value: &str) -> Self {
        Self::new_unchecked(value.strip_prefix(Self::STORED_PREFIX).unwrap_or(value))
    }

    pub fn to_stored(&self) -> String {
        format!("{}{}", Self::STORED_PREFIX, self.0)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for BlankNode {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::STORED_PREFIX)?;
        f.write_str(&self.0)
    }
}

impl Default for BlankNode {
    /// A fresh node with a random label.
    #[inline]
    fn default() -> Self {
        Self(format!("r{:x}", random::<u128>()))
    }
}

fn is_valid_label(id: &str) -> bool {
    let Some(first) = id.chars().next() else {
        return false;
    };
    (first.is_alphanumeric() || first == '_')
        && !id.ends_with('.')
        && id
            .chars()
            .skip(1)
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '\u{00B7}'))
}

/// The label is not a valid N-Triples blank node label.
#[derive(Debug, thiserror::Error)]
#[error("Invalid blank node label '{label}'")]
pub struct BlankNodeIdParseError {
    label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        for valid in ["b1", "_x.y", "n\u{00B7}1", "1a"] {
            assert!(BlankNode::new(valid).is_ok(), "{valid}");
        }
        for invalid in ["", "a.", "-a", "a b", "a:b"] {
            assert!(BlankNode::new(invalid).is_err(), "{invalid}");
        }
    }

    #[test]
    fn stored_form() {
        assert_eq!(BlankNode::new_unchecked("n1").to_stored(), "_:n1");
        assert_eq!(BlankNode::from_stored("_:n1").as_str(), "n1");
        assert_eq!(BlankNode::from_stored("n1").as_str(), "n1");
    }

    #[test]
    fn fresh_labels_are_distinct_and_valid() {
        let a = BlankNode::default();
        let b = BlankNode::default();
        assert_ne!(a, b);
        assert!(BlankNode::new(a.as_str()).is_ok());
    }
}
