use crate::extents::Extents;
use peg::str::LineCol;
use std::fmt;
use std::sync::Arc;

fn fmt_positioned(
    f: &mut fmt::Formatter<'_>,
    extents: Option<&Extents>,
    message: &str,
) -> fmt::Result {
    if let Some(extents) = extents {
        write!(f, "{extents}: {message}")
    } else {
        f.write_str(message)
    }
}

macro_rules! positioned_error {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            extents: Option<Extents>,
            message: String,
        }

        impl $name {
            pub fn new(extents: Option<Extents>, message: impl Into<String>) -> Self {
                Self {
                    extents,
                    message: message.into(),
                }
            }

            /// The source region the error points at, if known.
            #[inline]
            pub fn extents(&self) -> Option<&Extents> {
                self.extents.as_ref()
            }

            #[inline]
            pub fn message(&self) -> &str {
                &self.message
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt_positioned(f, self.extents.as_ref(), &self.message)
            }
        }

        impl std::error::Error for $name {}
    };
}

positioned_error!(
    /// The query text is not recognized by the grammar.
    SyntaxError
);

positioned_error!(
    /// The query is well-formed but meaningless: undefined prefix, unbound variable, mismatching set operation columns...
    SemanticError
);

positioned_error!(
    /// A valid construct the compiler cannot translate.
    NotSupportedError
);

impl SyntaxError {
    pub(crate) fn from_peg(error: &peg::error::ParseError<LineCol>, file_name: Arc<str>) -> Self {
        Self::new(
            Some(Extents::point(
                file_name,
                error.location.line,
                error.location.column,
            )),
            format!("expected {}", error.expected),
        )
    }
}

/// An error raised while parsing a query.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
    #[error(transparent)]
    NotSupported(#[from] NotSupportedError),
}

impl ParseError {
    pub fn extents(&self) -> Option<&Extents> {
        match self {
            Self::Syntax(e) => e.extents(),
            Self::Semantic(e) => e.extents(),
            Self::NotSupported(e) => e.extents(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_and_without_extents() {
        let error = SemanticError::new(None, "Unbound variable ?x");
        assert_eq!(error.to_string(), "Unbound variable ?x");
        let mut extents = Extents::point(Arc::from("q.rq"), 2, 5);
        let error = SemanticError::new(Some(extents.clone()), "Undefined namespace prefix 'ex'");
        assert_eq!(
            error.to_string(),
            "q.rq:2:5: Undefined namespace prefix 'ex'"
        );
        extents.end_column = 9;
        let error = SyntaxError::new(Some(extents), "expected one of \"}\"");
        assert_eq!(
            error.to_string(),
            "q.rq:2:5: (ends: line 2, col 9): expected one of \"}\""
        );
    }
}
