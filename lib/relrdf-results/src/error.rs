use std::io;
use std::sync::Arc;

/// Error returned while writing query results.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SerializationError {
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A solution binds a variable the header does not list.
    #[error("The variable ?{0} is not declared")]
    UndeclaredVariable(String),
    /// A row does not hold one value per declared variable.
    #[error("Expecting {expected} values in a row, found {found}")]
    RowLength { expected: usize, found: usize },
}

impl From<quick_xml::Error> for SerializationError {
    fn from(error: quick_xml::Error) -> Self {
        Self::Io(xml_to_io(error))
    }
}

fn xml_to_io(error: quick_xml::Error) -> io::Error {
    match error {
        quick_xml::Error::Io(error) => {
            Arc::try_unwrap(error).unwrap_or_else(|shared| io::Error::new(shared.kind(), shared))
        }
        error => io::Error::new(io::ErrorKind::InvalidData, error),
    }
}

/// Error returned while reading query results.
#[derive(Debug, thiserror::Error)]
pub enum QueryResultsParseError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Syntax(#[from] QueryResultsSyntaxError),
}

impl From<quick_xml::Error> for QueryResultsParseError {
    fn from(error: quick_xml::Error) -> Self {
        match error {
            quick_xml::Error::Io(_) => Self::Io(xml_to_io(error)),
            error => Self::Syntax(QueryResultsSyntaxError(SyntaxErrorKind::Xml(error))),
        }
    }
}

/// The results file is not valid SPARQL XML.
#[derive(Debug, thiserror::Error)]
#[error("Invalid query results: {0}")]
pub struct QueryResultsSyntaxError(SyntaxErrorKind);

#[derive(Debug, thiserror::Error)]
enum SyntaxErrorKind {
    #[error(transparent)]
    Xml(quick_xml::Error),
    #[error("{0}")]
    Msg(String),
}

impl QueryResultsSyntaxError {
    pub(crate) fn msg(msg: impl Into<String>) -> Self {
        Self(SyntaxErrorKind::Msg(msg.into()))
    }
}
