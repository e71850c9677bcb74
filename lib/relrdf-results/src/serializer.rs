use crate::csv::{Dialect, TextSolutionsWriter};
use crate::error::SerializationError;
use crate::format::QueryResultsFormat;
use crate::json::JsonSolutionsWriter;
use crate::xml::XmlSolutionsWriter;
use relrdf_model::Term;
use std::io::Write;

/// Writes query solutions in any [`QueryResultsFormat`].
///
/// ```
/// use relrdf_model::{Literal, Term};
/// use relrdf_results::{QueryResultsFormat, QueryResultsSerializer};
///
/// let serializer = QueryResultsSerializer::from_format(QueryResultsFormat::Json);
/// let mut writer = serializer.solutions_writer(Vec::new(), vec!["foo".into(), "bar".into()])?;
/// let value = Term::from(Literal::from("test"));
/// writer.write([("foo", &value)])?;
/// assert_eq!(
///     writer.finish()?,
///     b"{\"head\":{\"vars\":[\"foo\",\"bar\"]},\"results\":{\"bindings\":[{\"foo\":{\"type\":\"literal\",\"value\":\"test\"}}]}}"
/// );
/// # Result::<_, relrdf_results::SerializationError>::Ok(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct QueryResultsSerializer {
    format: QueryResultsFormat,
}

impl QueryResultsSerializer {
    #[inline]
    pub fn from_format(format: QueryResultsFormat) -> Self {
        Self { format }
    }

    #[inline]
    pub fn format(&self) -> QueryResultsFormat {
        self.format
    }

    /// Starts writing solutions binding the given variables, in this order.
    pub fn solutions_writer<W: Write>(
        &self,
        writer: W,
        variables: Vec<String>,
    ) -> Result<SolutionsWriter<W>, SerializationError> {
        let formatter = match self.format {
            QueryResultsFormat::Xml => {
                SolutionsWriterKind::Xml(XmlSolutionsWriter::start(writer, &variables)?)
            }
            QueryResultsFormat::Json => {
                SolutionsWriterKind::Json(JsonSolutionsWriter::start(writer, &variables)?)
            }
            QueryResultsFormat::Csv => SolutionsWriterKind::Text(TextSolutionsWriter::start(
                writer,
                variables.clone(),
                Dialect::Csv,
            )?),
            QueryResultsFormat::Tsv => SolutionsWriterKind::Text(TextSolutionsWriter::start(
                writer,
                variables.clone(),
                Dialect::Tsv,
            )?),
        };
        Ok(SolutionsWriter {
            formatter,
            variables,
        })
    }
}

/// Allows writing query results solutions into a [`Write`] implementation.
///
/// Could be built using a [`QueryResultsSerializer`].
///
/// <div class="warning">
///
/// Do not forget to run the [`finish`](SolutionsWriter::finish()) method to properly write the last bytes of the file.</div>
#[must_use]
pub struct SolutionsWriter<W: Write> {
    formatter: SolutionsWriterKind<W>,
    variables: Vec<String>,
}

enum SolutionsWriterKind<W: Write> {
    Xml(XmlSolutionsWriter<W>),
    Json(JsonSolutionsWriter<W>),
    Text(TextSolutionsWriter<W>),
}

impl<W: Write> SolutionsWriter<W> {
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Writes a solution given as (variable, value) pairs. Unbound variables are omitted.
    pub fn write<'a>(
        &mut self,
        solution: impl IntoIterator<Item = (&'a str, &'a Term)>,
    ) -> Result<(), SerializationError> {
        match &mut self.formatter {
            SolutionsWriterKind::Xml(writer) => writer.write(solution),
            SolutionsWriterKind::Json(writer) => writer.write(solution),
            SolutionsWriterKind::Text(writer) => writer.write(solution),
        }
    }

    /// Writes a solution whose values are given in the order of the declared variables.
    pub fn write_row(&mut self, row: &[Option<Term>]) -> Result<(), SerializationError> {
        if row.len() != self.variables.len() {
            return Err(SerializationError::RowLength {
                expected: self.variables.len(),
                found: row.len(),
            });
        }
        let Self {
            formatter,
            variables,
        } = self;
        let solution = variables
            .iter()
            .zip(row)
            .filter_map(|(variable, value)| Some((variable.as_str(), value.as_ref()?)));
        match formatter {
            SolutionsWriterKind::Xml(writer) => writer.write(solution),
            SolutionsWriterKind::Json(writer) => writer.write(solution),
            SolutionsWriterKind::Text(writer) => writer.write(solution),
        }
    }

    /// Writes the last bytes of the file.
    pub fn finish(self) -> Result<W, SerializationError> {
        match self.formatter {
            SolutionsWriterKind::Xml(writer) => writer.finish(),
            SolutionsWriterKind::Json(writer) => writer.finish(),
            SolutionsWriterKind::Text(writer) => writer.finish(),
        }
    }
}
