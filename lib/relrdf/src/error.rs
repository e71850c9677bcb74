use relrdf_algebra::{Extents, NotSupportedError, ParseError, SemanticError, SyntaxError};
use relrdf_opt::TypeCheckError;
use std::io;
use thiserror::Error;

/// An error raised while compiling or executing a query.
///
/// Each compilation pass reports its own error kind unchanged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QueryError {
    /// The query text is not recognized by the grammar.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// Undefined prefix, unbound variable, mismatching set operation columns...
    #[error(transparent)]
    Semantic(#[from] SemanticError),
    /// The operands of an expression do not have the expected types.
    #[error(transparent)]
    TypeCheck(#[from] TypeCheckError),
    /// A valid construct the compiler cannot translate.
    #[error(transparent)]
    NotSupported(#[from] NotSupportedError),
    /// An error from the underlying database.
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

impl QueryError {
    /// The source region the error points at, if known.
    pub fn extents(&self) -> Option<&Extents> {
        match self {
            Self::Syntax(e) => e.extents(),
            Self::Semantic(e) => e.extents(),
            Self::TypeCheck(e) => e.extents(),
            Self::NotSupported(e) => e.extents(),
            Self::Storage(_) => None,
        }
    }
}

impl From<ParseError> for QueryError {
    #[inline]
    fn from(error: ParseError) -> Self {
        match error {
            ParseError::Syntax(e) => Self::Syntax(e),
            ParseError::Semantic(e) => Self::Semantic(e),
            ParseError::NotSupported(e) => Self::NotSupported(e),
        }
    }
}

/// A malformed model base, model or sink configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct InstantiationError {
    message: String,
}

impl InstantiationError {
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An error raised while importing triples through a [`Sink`](crate::sinks::Sink).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SinkError {
    /// An error from the underlying database.
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
    /// An error while writing the triples out.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The sink is already closed.
    #[error("The sink is closed")]
    Closed,
}

/// An error raised while importing an RDF document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    /// The document is not valid or could not be read.
    #[error(transparent)]
    Syntax(#[from] oxttl::TurtleParseError),
    /// The RDF/XML document is not valid or could not be read.
    #[error(transparent)]
    RdfXml(#[from] oxrdfxml::RdfXmlParseError),
    #[error("Invalid base IRI: {0}")]
    InvalidBaseIri(String),
    /// The document uses an RDF extension the model base cannot store.
    #[error("{0} are not supported")]
    Unsupported(&'static str),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// An error related to model base operations: opening, configuring, querying the stored versions...
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelBaseError {
    /// An error from the underlying database.
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
    /// The configuration is invalid.
    #[error(transparent)]
    Instantiation(#[from] InstantiationError),
    /// An error raised by a sink.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl From<ModelBaseError> for io::Error {
    #[inline]
    fn from(error: ModelBaseError) -> Self {
        match error {
            ModelBaseError::Sink(SinkError::Io(error)) => error,
            ModelBaseError::Instantiation(_) => Self::new(io::ErrorKind::InvalidInput, error),
            _ => Self::other(error),
        }
    }
}
