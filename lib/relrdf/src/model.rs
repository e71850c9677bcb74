use crate::config::{ModelConfig, ModelKind};
use crate::emit::emit_sql;
use crate::error::{InstantiationError, ModelBaseError, QueryError};
use crate::mapper::map_patterns;
use crate::modelbase::load_prefixes;
use crate::results::{QueryResults, execute};
use crate::valueref::dereference_values;
use crate::views::{VersionView, build_view};
use relrdf_algebra::simplify::simplify;
use relrdf_algebra::{IncarnationContext, Node, QueryLanguage, QueryParser, SemanticError};
use relrdf_model::Uri;
use relrdf_opt::{add_type_columns, check_types, insert_type_guards};
use rusqlite::Connection;
use std::fmt;
use tracing::{debug, instrument, warn};

/// A query compiled to SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    /// The SQL `SELECT` statement.
    pub sql: String,
    /// Its columns: the query columns followed by their `type__` columns.
    pub columns: Vec<String>,
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// A view over the versions of a [`ModelBase`](crate::ModelBase), answering SPARQL and SerQL queries.
///
/// Queries are compiled to SQL in these steps:
/// 1. parsing, resolving prefixed names with the prefixes of the model base,
/// 2. static type checking,
/// 3. addition of the runtime type columns and of the type guards of the comparisons,
/// 4. replacement of the statement patterns with the templates of the version view,
/// 5. dereferencing of the stored URI suffixes,
/// 6. algebraic simplifications,
/// 7. SQL emission.
pub struct Model<'a> {
    connection: &'a Connection,
    kind: ModelKind,
    view: Box<dyn VersionView>,
    prefixes: Vec<(String, String)>,
    base_iri: Option<String>,
}

impl<'a> Model<'a> {
    pub(crate) fn new(connection: &'a Connection, config: &ModelConfig) -> Result<Self, ModelBaseError> {
        if let Some(base) = &config.base_graph {
            Uri::new(base.as_str()).map_err(|error| {
                InstantiationError::new(format!("Invalid base graph IRI '{base}': {error}"))
            })?;
        }
        let view = build_view(config)?;
        view.prepare(connection)?;
        debug!(kind = %config.kind, "Prepared model");
        Ok(Self {
            connection,
            kind: config.kind,
            view,
            prefixes: load_prefixes(connection)?,
            base_iri: config.base_graph.clone(),
        })
    }

    #[inline]
    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    /// Evaluates a query.
    pub fn query(&self, language: QueryLanguage, query: &str) -> Result<QueryResults<'_>, QueryError> {
        self.query_named(language, query, "<unknown>")
    }

    /// Evaluates a query read from `file_name`, the name used in error positions.
    #[instrument(skip(self, query), fields(kind = %self.kind))]
    pub fn query_named(
        &self,
        language: QueryLanguage,
        query: &str,
        file_name: &str,
    ) -> Result<QueryResults<'_>, QueryError> {
        let compiled = self.compile(language, query, file_name)?;
        execute(self.connection, &compiled.sql, &compiled.columns)
    }

    /// Compiles a query to SQL without running it.
    #[instrument(skip(self, query), fields(kind = %self.kind))]
    pub fn compile(
        &self,
        language: QueryLanguage,
        query: &str,
        file_name: &str,
    ) -> Result<CompiledQuery, QueryError> {
        let mut parser = QueryParser::new(language)
            .with_file_name(file_name)
            .with_prefixes(
                self.prefixes
                    .iter()
                    .map(|(prefix, namespace)| (prefix.as_str(), namespace.as_str())),
            );
        if let Some(base) = &self.base_iri {
            parser = parser.with_base_iri(base.as_str()).map_err(|error| {
                SemanticError::new(None, format!("Invalid base IRI '{base}': {error}"))
            })?;
        }
        let node = parser.parse(query)?;
        let node = check_types(node)?;
        let node = insert_type_guards(add_type_columns(node).node).node;
        let columns = node.column_names().map(<[String]>::to_vec).unwrap_or_default();
        let node = self.map(node)?;
        let sql = emit_sql(&node)?;
        debug!(%sql, "Compiled query");
        Ok(CompiledQuery { sql, columns })
    }

    /// Compiles a query to SQL. Shortcut for [`compile`](Model::compile).
    pub fn query_sql(&self, language: QueryLanguage, query: &str) -> Result<String, QueryError> {
        Ok(self.compile(language, query, "<unknown>")?.sql)
    }

    /// Maps a type checked query tree to a tree the SQL emitter accepts.
    fn map(&self, node: Node) -> Result<Node, QueryError> {
        let incarnations = IncarnationContext::new();
        let node = map_patterns(node, self.view.as_ref(), &incarnations)?.node;
        Ok(simplify(dereference_values(node, self.view.uri_aliases()).node))
    }
}

impl Drop for Model<'_> {
    fn drop(&mut self) {
        if let Err(error) = self.view.release(self.connection) {
            warn!(%error, "Failed to release the model view");
        }
    }
}
