use crate::error::{QueryResultsParseError, QueryResultsSyntaxError};
use crate::format::QueryResultsFormat;
use crate::xml::{XmlQueryResultsReader, XmlSolutionsReader};
use relrdf_model::Term;
use std::io::Read;

/// Reads expected query results. Only [`QueryResultsFormat::Xml`] is readable.
///
/// ```
/// use relrdf_model::{Literal, Term};
/// use relrdf_results::{QueryResultsFormat, QueryResultsParser, QueryResultsReader};
///
/// let parser = QueryResultsParser::from_format(QueryResultsFormat::Xml);
/// let file = br#"<sparql xmlns="http://www.w3.org/2005/sparql-results#"><head><variable name="foo"/><variable name="bar"/></head><results><result><binding name="foo"><literal>test</literal></binding></result></results></sparql>"#;
/// if let QueryResultsReader::Solutions(solutions) = parser.for_reader(file.as_slice())? {
///     assert_eq!(solutions.variables(), ["foo", "bar"]);
///     for solution in solutions {
///         assert_eq!(solution?, vec![Some(Term::from(Literal::from("test"))), None]);
///     }
/// }
/// # Result::<(), relrdf_results::QueryResultsParseError>::Ok(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct QueryResultsParser {
    format: QueryResultsFormat,
}

impl QueryResultsParser {
    #[inline]
    pub fn from_format(format: QueryResultsFormat) -> Self {
        Self { format }
    }

    /// Reads a result file. Reads are buffered.
    pub fn for_reader<R: Read>(
        &self,
        reader: R,
    ) -> Result<QueryResultsReader<R>, QueryResultsParseError> {
        match self.format {
            QueryResultsFormat::Xml => Ok(match XmlQueryResultsReader::read(reader)? {
                XmlQueryResultsReader::Boolean(value) => QueryResultsReader::Boolean(value),
                XmlQueryResultsReader::Solutions {
                    variables,
                    solutions,
                } => QueryResultsReader::Solutions(SolutionsReader {
                    variables,
                    solutions,
                }),
            }),
            format => Err(QueryResultsSyntaxError::msg(format!(
                "Reading {format} is not supported"
            ))
            .into()),
        }
    }
}

/// A results file opened by [`QueryResultsParser::for_reader`].
pub enum QueryResultsReader<R: Read> {
    Solutions(SolutionsReader<R>),
    Boolean(bool),
}

/// An iterator over query solutions.
///
/// Each solution holds one optional value per variable, in the order of [`variables`](SolutionsReader::variables).
pub struct SolutionsReader<R: Read> {
    variables: Vec<String>,
    solutions: XmlSolutionsReader<R>,
}

impl<R: Read> SolutionsReader<R> {
    /// The variables of the `<head>`, in their declaration order.
    #[inline]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

impl<R: Read> Iterator for SolutionsReader<R> {
    type Item = Result<Vec<Option<Term>>, QueryResultsParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.solutions.read_next().transpose()
    }
}
