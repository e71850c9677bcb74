//! The SQLite model base: the physical schema, the stored versions and the persisted prefixes.

use crate::config::ModelConfig;
use crate::error::{InstantiationError, ModelBaseError};
use crate::model::Model;
use crate::sinks::{Sink, VersionSink, debug_sink};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Type code of resources in the `object_type` column and in the runtime type columns.
pub(crate) const RESOURCE_TYPE_ID: i64 = 1;
/// Type code of blank nodes.
pub(crate) const BLANK_TYPE_ID: i64 = 2;
/// Type code of simple literals. Codes above are ids of the `data_types` table.
pub(crate) const LITERAL_TYPE_ID: i64 = 3;

/// The `data_types` keys of the reserved type codes.
pub(crate) const RESOURCE_TYPE_KEY: &str = "<RESOURCE>";
pub(crate) const BLANK_TYPE_KEY: &str = "<BLANKNODE>";
pub(crate) const LITERAL_TYPE_KEY: &str = "<LITERAL>";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS data_types (
  id INTEGER PRIMARY KEY,
  uri TEXT NOT NULL UNIQUE
);
INSERT OR IGNORE INTO data_types (id, uri) VALUES
  (1, '<RESOURCE>'),
  (2, '<BLANKNODE>'),
  (3, '<LITERAL>');
CREATE TABLE IF NOT EXISTS statements (
  id INTEGER PRIMARY KEY,
  hash TEXT NOT NULL UNIQUE,
  subject TEXT NOT NULL,
  predicate TEXT NOT NULL,
  object_type INTEGER NOT NULL,
  object TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS statements_subject ON statements (subject);
CREATE INDEX IF NOT EXISTS statements_predicate ON statements (predicate);
CREATE INDEX IF NOT EXISTS statements_object ON statements (object);
CREATE TABLE IF NOT EXISTS version_statement (
  version_id INTEGER NOT NULL,
  stmt_id INTEGER NOT NULL,
  PRIMARY KEY (version_id, stmt_id)
);
CREATE INDEX IF NOT EXISTS version_statement_stmt ON version_statement (stmt_id);
CREATE TABLE IF NOT EXISTS prefixes (
  prefix TEXT PRIMARY KEY,
  namespace TEXT NOT NULL
);
";

/// A stored version and the number of statements it contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionInfo {
    pub version: u32,
    pub statements: u64,
}

/// A database of versioned RDF models and the views it exposes.
///
/// Usage example:
/// ```
/// use relrdf::{ModelBase, ModelConfig, QueryLanguage};
/// use relrdf::sinks::Sink;
/// use relrdf_model::{Literal, Triple, Uri};
///
/// let modelbase = ModelBase::open_in_memory()?;
///
/// // import
/// let mut sink = modelbase.version_sink(1)?;
/// sink.triple(&Triple::new(
///     Uri::new("http://example.com/a")?,
///     Uri::new("http://example.com/p")?,
///     Literal::from("x"),
/// ))?;
/// assert_eq!(sink.finish()?, 1);
///
/// // query
/// let model = modelbase.model(&ModelConfig::single_version(1))?;
/// let results = model.query(QueryLanguage::Sparql, "SELECT ?o WHERE { ?s <http://example.com/p> ?o }")?;
/// assert_eq!(results.column_names(), ["o"]);
/// let rows = results.collect::<Result<Vec<_>, _>>()?;
/// assert_eq!(rows, [vec![Some(Literal::from("x").into())]]);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub struct ModelBase {
    backend: Backend,
}

enum Backend {
    Sqlite(Connection),
    /// Stores nothing, only provides the debug sinks.
    Debug,
}

impl ModelBase {
    /// Opens a model base stored in a SQLite file, creating the schema if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ModelBaseError> {
        let path = path.as_ref();
        info!(path = %path.display(), "Opening the model base");
        Self::from_connection(Connection::open(path)?)
    }

    /// Opens a new model base in memory.
    pub fn open_in_memory() -> Result<Self, ModelBaseError> {
        info!("Opening an in-memory model base");
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub(crate) fn debug() -> Self {
        Self {
            backend: Backend::Debug,
        }
    }

    fn from_connection(connection: Connection) -> Result<Self, ModelBaseError> {
        connection.execute_batch(SCHEMA)?;
        Ok(Self {
            backend: Backend::Sqlite(connection),
        })
    }

    /// The database connection, if this model base stores anything.
    pub fn connection(&self) -> Result<&Connection, ModelBaseError> {
        match &self.backend {
            Backend::Sqlite(connection) => Ok(connection),
            Backend::Debug => Err(InstantiationError::new(
                "The debug model base does not store any version",
            )
            .into()),
        }
    }

    /// Builds a view over this model base.
    ///
    /// Views may create temporary tables. They are dropped with the [`Model`].
    pub fn model(&self, config: &ModelConfig) -> Result<Model<'_>, ModelBaseError> {
        Model::new(self.connection()?, config)
    }

    /// A sink appending the triples it receives to `version`.
    pub fn version_sink(&self, version: u32) -> Result<VersionSink<'_>, ModelBaseError> {
        Ok(VersionSink::new(self.connection()?, version)?)
    }

    /// Builds a sink by name.
    ///
    /// The `version` sink reads the `version` parameter, defaulting to [`next_version`](Self::next_version).
    /// The other kinds are the debug sinks (`null`, `print` and `list`).
    pub fn sink(
        &self,
        kind: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Box<dyn Sink + '_>, ModelBaseError> {
        if !kind.eq_ignore_ascii_case("version") {
            if let Some(key) = params.keys().next() {
                return Err(InstantiationError::new(format!(
                    "Unknown parameter '{key}' for the {kind} sink"
                ))
                .into());
            }
            return Ok(debug_sink(kind)?);
        }
        let mut version = None;
        for (key, value) in params {
            if key != "version" {
                return Err(InstantiationError::new(format!(
                    "Unknown parameter '{key}' for the version sink"
                ))
                .into());
            }
            version = Some(value.parse::<u32>().map_err(|_| {
                InstantiationError::new(format!(
                    "Invalid version number '{value}' for parameter 'version'"
                ))
            })?);
        }
        let version = match version {
            Some(version) => version,
            None => self.next_version()?,
        };
        Ok(Box::new(self.version_sink(version)?))
    }

    /// The stored versions, in increasing order.
    pub fn versions(&self) -> Result<Vec<VersionInfo>, ModelBaseError> {
        let connection = self.connection()?;
        let mut statement = connection.prepare(
            "SELECT version_id, count(*) FROM version_statement GROUP BY version_id ORDER BY version_id",
        )?;
        let versions = statement
            .query_map([], |row| {
                Ok(VersionInfo {
                    version: row.get(0)?,
                    statements: u64::try_from(row.get::<_, i64>(1)?).unwrap_or_default(),
                })
            })?
            .collect::<Result<_, _>>()?;
        Ok(versions)
    }

    /// The number following the greatest stored version, 1 if no version is stored.
    pub fn next_version(&self) -> Result<u32, ModelBaseError> {
        let max: Option<u32> = self.connection()?.query_row(
            "SELECT max(version_id) FROM version_statement",
            [],
            |row| row.get(0),
        )?;
        Ok(max.map_or(1, |max| max.saturating_add(1)))
    }

    /// Removes a version. Returns the number of statements it contained.
    ///
    /// Statements no longer in any version stay interned.
    #[instrument(skip(self))]
    pub fn delete_version(&self, version: u32) -> Result<u64, ModelBaseError> {
        let removed = self.connection()?.execute(
            "DELETE FROM version_statement WHERE version_id = ?1",
            params![version],
        )?;
        info!(removed, "Deleted version");
        Ok(removed as u64)
    }

    /// Persists a prefix every query of the models of this model base can use.
    pub fn add_prefix(
        &self,
        prefix: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Result<(), ModelBaseError> {
        let (prefix, namespace) = (prefix.into(), namespace.into());
        if prefix == "_" {
            return Err(InstantiationError::new("Invalid namespace prefix '_'").into());
        }
        debug!(prefix, namespace, "Adding prefix");
        self.connection()?.execute(
            "INSERT OR REPLACE INTO prefixes (prefix, namespace) VALUES (?1, ?2)",
            params![prefix, namespace],
        )?;
        Ok(())
    }

    /// The persisted prefixes, ordered by prefix.
    pub fn prefixes(&self) -> Result<Vec<(String, String)>, ModelBaseError> {
        Ok(load_prefixes(self.connection()?)?)
    }

    /// The namespace bound to `prefix`, if any.
    pub fn prefix(&self, prefix: &str) -> Result<Option<String>, ModelBaseError> {
        Ok(self
            .connection()?
            .query_row(
                "SELECT namespace FROM prefixes WHERE prefix = ?1",
                params![prefix],
                |row| row.get(0),
            )
            .optional()?)
    }
}

pub(crate) fn load_prefixes(connection: &Connection) -> rusqlite::Result<Vec<(String, String)>> {
    let mut statement = connection.prepare("SELECT prefix, namespace FROM prefixes ORDER BY prefix")?;
    statement
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect()
}
