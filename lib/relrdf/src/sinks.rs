//! Triple sinks: the import side of a model base.
//!
//! A [`VersionSink`] appends triples to a stored version.
//! The debug sinks count, print or collect the triples they receive.

use crate::error::{InstantiationError, SinkError};
use crate::modelbase::{BLANK_TYPE_KEY, LITERAL_TYPE_KEY, RESOURCE_TYPE_KEY};
use md5::{Digest, Md5};
use relrdf_model::{Term, Triple};
use rusqlite::{Connection, params};
use std::io::{self, Write};
use tracing::{debug, info, instrument};

/// Receives triples.
///
/// Triples are only guaranteed to be stored once [`finish`](Sink::finish) returns.
pub trait Sink {
    fn triple(&mut self, triple: &Triple) -> Result<(), SinkError>;

    /// Commits the triples received since the last commit. Returns how many were new.
    fn finish(&mut self) -> Result<u64, SinkError>;

    /// Discards the triples received since the last commit.
    fn rollback(&mut self) -> Result<(), SinkError>;

    /// Commits the pending triples and releases the sink. Later calls fail with [`SinkError::Closed`].
    fn close(&mut self) -> Result<(), SinkError>;
}

const BATCH_SIZE: usize = 1000;

/// A triple in its stored form.
#[derive(Debug)]
struct StoredTriple {
    hash: String,
    subject: String,
    predicate: String,
    object_type: String,
    object: String,
}

impl StoredTriple {
    fn new(triple: &Triple) -> Self {
        let subject = triple.subject.to_stored();
        let predicate = triple.predicate.as_str().to_owned();
        let (object_type, object) = match &triple.object {
            Term::Uri(uri) => (RESOURCE_TYPE_KEY.to_owned(), uri.as_str().to_owned()),
            Term::BlankNode(node) => (BLANK_TYPE_KEY.to_owned(), node.to_stored()),
            Term::Literal(literal) => (
                literal
                    .type_key()
                    .unwrap_or_else(|| LITERAL_TYPE_KEY.to_owned()),
                literal.value().to_owned(),
            ),
        };
        let mut hasher = Md5::new();
        for part in [&subject, &predicate, &object_type, &object] {
            hasher.update(part.as_bytes());
            hasher.update([0]);
        }
        Self {
            hash: hex::encode(hasher.finalize()),
            subject,
            predicate,
            object_type,
            object,
        }
    }
}

/// Appends triples to a version of a model base.
///
/// Triples are staged in a temporary table and merged into the store by [`Sink::finish`].
/// Adding a triple the version already contains is a no-op.
pub struct VersionSink<'a> {
    connection: &'a Connection,
    version: u32,
    buffer: Vec<StoredTriple>,
    staged: bool,
    closed: bool,
}

impl<'a> VersionSink<'a> {
    pub(crate) fn new(connection: &'a Connection, version: u32) -> Result<Self, SinkError> {
        connection.execute_batch(
            "CREATE TEMPORARY TABLE IF NOT EXISTS statements_temp (
               hash TEXT NOT NULL,
               subject TEXT NOT NULL,
               predicate TEXT NOT NULL,
               object_type TEXT NOT NULL,
               object TEXT NOT NULL
             );
             DELETE FROM statements_temp;",
        )?;
        Ok(Self {
            connection,
            version,
            buffer: Vec::with_capacity(BATCH_SIZE),
            staged: false,
            closed: false,
        })
    }

    /// The version the triples are added to.
    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        debug!(count = self.buffer.len(), "Staging triples");
        let transaction = self.connection.unchecked_transaction()?;
        {
            let mut statement = transaction.prepare_cached(
                "INSERT INTO statements_temp (hash, subject, predicate, object_type, object) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for triple in self.buffer.drain(..) {
                statement.execute(params![
                    triple.hash,
                    triple.subject,
                    triple.predicate,
                    triple.object_type,
                    triple.object
                ])?;
            }
        }
        transaction.commit()?;
        self.staged = true;
        Ok(())
    }
}

impl Sink for VersionSink<'_> {
    fn triple(&mut self, triple: &Triple) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        self.buffer.push(StoredTriple::new(triple));
        if self.buffer.len() >= BATCH_SIZE {
            self.flush()?;
        }
        Ok(())
    }

    #[instrument(skip(self), fields(version = self.version))]
    fn finish(&mut self) -> Result<u64, SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        self.flush()?;
        if !self.staged {
            return Ok(0);
        }
        let transaction = self.connection.unchecked_transaction()?;
        transaction.execute(
            "INSERT OR IGNORE INTO data_types (uri) SELECT DISTINCT object_type FROM statements_temp",
            [],
        )?;
        transaction.execute(
            "INSERT OR IGNORE INTO statements (hash, subject, predicate, object_type, object)
             SELECT t.hash, t.subject, t.predicate, d.id, t.object
             FROM statements_temp AS t JOIN data_types AS d ON d.uri = t.object_type",
            [],
        )?;
        let added = transaction.execute(
            "INSERT OR IGNORE INTO version_statement (version_id, stmt_id)
             SELECT DISTINCT ?1, s.id FROM statements_temp AS t JOIN statements AS s ON s.hash = t.hash",
            params![self.version],
        )?;
        transaction.execute("DELETE FROM statements_temp", [])?;
        transaction.commit()?;
        self.staged = false;
        info!(added, "Added statements");
        Ok(added as u64)
    }

    fn rollback(&mut self) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        self.buffer.clear();
        self.connection
            .execute("DELETE FROM statements_temp", [])?;
        self.staged = false;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        self.finish()?;
        self.connection
            .execute_batch("DROP TABLE IF EXISTS temp.statements_temp")?;
        self.closed = true;
        Ok(())
    }
}

/// Discards the triples, counting them.
#[derive(Debug, Default)]
pub struct NullSink {
    pending: u64,
    closed: bool,
}

impl Sink for NullSink {
    fn triple(&mut self, _: &Triple) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        self.pending += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<u64, SinkError> {
        Ok(std::mem::take(&mut self.pending))
    }

    fn rollback(&mut self) -> Result<(), SinkError> {
        self.pending = 0;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.closed = true;
        Ok(())
    }
}

/// Writes the triples as N-Triples.
pub struct PrintSink<W: Write> {
    writer: Option<W>,
    pending: u64,
}

impl<W: Write> PrintSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Some(writer),
            pending: 0,
        }
    }

    /// Returns the underlying writer, if the sink is not closed.
    pub fn into_inner(self) -> Option<W> {
        self.writer
    }
}

impl<W: Write> Sink for PrintSink<W> {
    fn triple(&mut self, triple: &Triple) -> Result<(), SinkError> {
        let writer = self.writer.as_mut().ok_or(SinkError::Closed)?;
        writeln!(writer, "{triple}")?;
        self.pending += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<u64, SinkError> {
        self.writer.as_mut().ok_or(SinkError::Closed)?.flush()?;
        Ok(std::mem::take(&mut self.pending))
    }

    /// Printed triples cannot be taken back.
    fn rollback(&mut self) -> Result<(), SinkError> {
        self.pending = 0;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.finish()?;
        self.writer = None;
        Ok(())
    }
}

/// Collects the committed triples in memory.
#[derive(Debug, Default)]
pub struct ListSink {
    triples: Vec<Triple>,
    committed: usize,
    closed: bool,
}

impl ListSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The received triples, including the ones not committed yet.
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// The committed triples.
    pub fn into_triples(mut self) -> Vec<Triple> {
        self.triples.truncate(self.committed);
        self.triples
    }
}

impl Sink for ListSink {
    fn triple(&mut self, triple: &Triple) -> Result<(), SinkError> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        self.triples.push(triple.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<u64, SinkError> {
        let added = self.triples.len() - self.committed;
        self.committed = self.triples.len();
        Ok(added as u64)
    }

    fn rollback(&mut self) -> Result<(), SinkError> {
        self.triples.truncate(self.committed);
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.finish()?;
        self.closed = true;
        Ok(())
    }
}

/// Builds one of the debug sinks: `null`, `print` (to the standard output) or `list`.
pub fn debug_sink(kind: &str) -> Result<Box<dyn Sink>, InstantiationError> {
    match kind.to_ascii_lowercase().as_str() {
        "null" => Ok(Box::new(NullSink::default())),
        "print" => Ok(Box::new(PrintSink::new(io::stdout()))),
        "list" => Ok(Box::new(ListSink::new())),
        _ => Err(InstantiationError::new(format!("Invalid sink type '{kind}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modelbase::ModelBase;
    use relrdf_model::vocab::xsd;
    use relrdf_model::{BlankNode, Literal, Uri};

    fn ex(name: &str) -> Uri {
        Uri::new_unchecked(format!("http://example.com/{name}"))
    }

    fn stored_rows(modelbase: &ModelBase) -> Vec<(String, String, i64, String)> {
        let Ok(connection) = modelbase.connection() else {
            return Vec::new();
        };
        let mut statement = connection
            .prepare("SELECT subject, predicate, object_type, object FROM statements ORDER BY id")
            .unwrap();
        statement
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn stored_encoding() -> Result<(), Box<dyn std::error::Error>> {
        let modelbase = ModelBase::open_in_memory()?;
        let mut sink = modelbase.version_sink(1)?;
        sink.triple(&Triple::new(ex("a"), ex("p"), ex("b")))?;
        sink.triple(&Triple::new(BlankNode::new_unchecked("n1"), ex("p"), BlankNode::new_unchecked("n2")))?;
        sink.triple(&Triple::new(ex("a"), ex("p"), Literal::from("x")))?;
        sink.triple(&Triple::new(ex("a"), ex("p"), Literal::new_typed_literal("1", xsd::INTEGER)))?;
        sink.triple(&Triple::new(ex("a"), ex("p"), Literal::new_language_tagged_literal_unchecked("chat", "fr")))?;
        assert_eq!(sink.finish()?, 5);
        let rows = stored_rows(&modelbase);
        assert_eq!(rows[0], ("http://example.com/a".into(), "http://example.com/p".into(), 1, "http://example.com/b".into()));
        assert_eq!(rows[1], ("_:n1".into(), "http://example.com/p".into(), 2, "_:n2".into()));
        assert_eq!(rows[2].2, 3);
        assert!(rows[3].2 > 3);
        assert!(rows[4].2 > 3);
        assert_ne!(rows[3].2, rows[4].2);
        Ok(())
    }

    #[test]
    fn duplicates_are_ignored() -> Result<(), Box<dyn std::error::Error>> {
        let modelbase = ModelBase::open_in_memory().unwrap();
        let mut sink = modelbase.version_sink(1)?;
        let triple = Triple::new(ex("a"), ex("p"), Literal::from("x"));
        sink.triple(&triple)?;
        sink.triple(&triple)?;
        assert_eq!(sink.finish()?, 1);
        sink.triple(&triple)?;
        assert_eq!(sink.finish()?, 0);
        Ok(())
    }

    #[test]
    fn literal_types_are_distinct() -> Result<(), Box<dyn std::error::Error>> {
        let modelbase = ModelBase::open_in_memory().unwrap();
        let mut sink = modelbase.version_sink(1)?;
        sink.triple(&Triple::new(ex("a"), ex("p"), Literal::from("1")))?;
        sink.triple(&Triple::new(ex("a"), ex("p"), Literal::new_typed_literal("1", xsd::INTEGER)))?;
        sink.triple(&Triple::new(ex("a"), ex("p"), ex("1")))?;
        assert_eq!(sink.finish()?, 3);
        Ok(())
    }

    #[test]
    fn large_imports_are_batched() -> Result<(), Box<dyn std::error::Error>> {
        let modelbase = ModelBase::open_in_memory().unwrap();
        let mut sink = modelbase.version_sink(2)?;
        for i in 0..2500 {
            sink.triple(&Triple::new(ex("a"), ex("p"), Literal::from(i64::from(i))))?;
        }
        assert_eq!(sink.finish()?, 2500);
        Ok(())
    }

    #[test]
    fn rollback_discards_pending_triples() -> Result<(), Box<dyn std::error::Error>> {
        let modelbase = ModelBase::open_in_memory().unwrap();
        let mut sink = modelbase.version_sink(1)?;
        for i in 0..1200 {
            sink.triple(&Triple::new(ex("a"), ex("p"), Literal::from(i64::from(i))))?;
        }
        sink.rollback()?;
        sink.triple(&Triple::new(ex("a"), ex("p"), Literal::from("kept")))?;
        assert_eq!(sink.finish()?, 1);
        Ok(())
    }

    #[test]
    fn closed_sink() -> Result<(), Box<dyn std::error::Error>> {
        let modelbase = ModelBase::open_in_memory().unwrap();
        let mut sink = modelbase.version_sink(1)?;
        sink.triple(&Triple::new(ex("a"), ex("p"), ex("b")))?;
        sink.close()?;
        assert!(matches!(
            sink.triple(&Triple::new(ex("a"), ex("p"), ex("c"))),
            Err(SinkError::Closed)
        ));
        assert_eq!(modelbase.versions().unwrap()[0].statements, 1);
        Ok(())
    }

    #[test]
    fn print_sink() -> Result<(), SinkError> {
        let mut sink = PrintSink::new(Vec::new());
        sink.triple(&Triple::new(ex("a"), ex("p"), Literal::from("x")))?;
        assert_eq!(sink.finish()?, 1);
        let Some(output) = sink.into_inner() else {
            panic!("the sink is not closed");
        };
        assert_eq!(
            String::from_utf8_lossy(&output),
            "<http://example.com/a> <http://example.com/p> \"x\" .\n"
        );
        Ok(())
    }

    #[test]
    fn list_sink() -> Result<(), SinkError> {
        let mut sink = ListSink::new();
        sink.triple(&Triple::new(ex("a"), ex("p"), ex("b")))?;
        assert_eq!(sink.finish()?, 1);
        sink.triple(&Triple::new(ex("a"), ex("p"), ex("c")))?;
        sink.rollback()?;
        sink.triple(&Triple::new(ex("a"), ex("p"), ex("d")))?;
        assert_eq!(sink.triples().len(), 2);
        let triples = sink.into_triples();
        assert_eq!(triples, [Triple::new(ex("a"), ex("p"), ex("b"))]);
        Ok(())
    }

    #[test]
    fn debug_sinks_by_name() {
        assert!(debug_sink("NULL").is_ok());
        assert!(debug_sink("list").is_ok());
        let Err(error) = debug_sink("rdfxml") else {
            panic!("rdfxml is not a debug sink");
        };
        assert_eq!(error.message(), "Invalid sink type 'rdfxml'");
    }
}
