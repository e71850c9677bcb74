//! Version views: how statement patterns read the stored versions.
//!
//! A view replaces every statement pattern of a query with a relational template over
//! the `statements` and `version_statement` tables. The template is a result map
//! exposing one value column per pattern position and a `type__` column with its runtime type.

mod all;
mod comparison;
mod meta;
mod single;

pub use self::all::AllVersionsView;
pub use self::comparison::ComparisonView;
pub use self::meta::MetaVersionView;
pub use self::single::SingleVersionView;

use crate::config::{ModelConfig, ModelKind};
use crate::error::InstantiationError;
use relrdf_algebra::{Node, NodeKind, StaticType};
use relrdf_model::Uri;
use relrdf_model::vocab::relrdf;
use relrdf_opt::type_column;
use rusqlite::Connection;

/// The columns of a statement pattern replacement, in pattern order.
pub const STATEMENT_COLUMNS: &[&str] = &["context", "subject", "predicate", "object"];
/// The columns of a reified statement pattern replacement, in pattern order.
pub const REIFIED_COLUMNS: &[&str] = &["context", "stmt", "subject", "predicate", "object"];

/// Incarnation of the first table of the templates.
const FIRST: u64 = 1;
/// Incarnation of the `statements` table in the templates.
const STATEMENTS: u64 = 2;

/// The relational template replacing a pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    /// A result map with the value columns followed by their type columns.
    pub expression: Node,
    /// The value columns, one per pattern position.
    pub columns: &'static [&'static str],
}

impl Replacement {
    fn new(columns: &'static [&'static str], relation: Node, values: Vec<(Node, Node)>) -> Self {
        let mut names: Vec<String> = columns.iter().map(|c| (*c).to_owned()).collect();
        names.extend(columns.iter().map(|c| type_column(c)));
        let (mut expressions, types): (Vec<_>, Vec<_>) = values.into_iter().unzip();
        expressions.extend(types);
        Self {
            expression: Node::map_result(names, relation, expressions),
            columns,
        }
    }

    /// Replacement reading `version_statement` rows joined to their statements, with the given context.
    fn statements(relation: Node, context: Node) -> Self {
        Self::new(
            STATEMENT_COLUMNS,
            relation,
            vec![
                (context, resource_type()),
                (field(STATEMENTS, "subject"), subject_type()),
                (field(STATEMENTS, "predicate"), resource_type()),
                (field(STATEMENTS, "object"), field(STATEMENTS, "object_type")),
            ],
        )
    }
}

/// A strategy exposing the stored versions as contexts.
pub trait VersionView {
    /// Creates the temporary tables the view needs.
    fn prepare(&self, _connection: &Connection) -> rusqlite::Result<()> {
        Ok(())
    }

    /// Drops what [`prepare`](VersionView::prepare) created.
    fn release(&self, _connection: &Connection) -> rusqlite::Result<()> {
        Ok(())
    }

    /// The template for a statement pattern with children context, subject, predicate, object.
    fn statement_replacement(&self, pattern: &Node) -> &Replacement;

    /// The template for a reified statement pattern, if the view stores statements natively.
    fn reified_replacement(&self, _pattern: &Node) -> Option<&Replacement> {
        None
    }

    /// Constant URIs the view answers under another name, with that name.
    fn uri_aliases(&self) -> &[(Uri, Uri)] {
        &[]
    }
}

/// Builds the view a model configuration describes.
pub fn build_view(config: &ModelConfig) -> Result<Box<dyn VersionView>, InstantiationError> {
    let version = |value: Option<u32>, name: &str| {
        value.ok_or_else(|| {
            InstantiationError::new(format!(
                "Missing parameter '{name}' for a {} model",
                config.kind
            ))
        })
    };
    let version_uri = config
        .version_uri
        .as_deref()
        .unwrap_or(relrdf::VERSION.as_str());
    Ok(match config.kind {
        ModelKind::MetaVersion => Box::new(MetaVersionView::new(version_uri)),
        ModelKind::SingleVersion => Box::new(SingleVersionView::new(
            version(config.version_a, "versionA")?,
            version_uri,
        )),
        ModelKind::AllVersions => Box::new(AllVersionsView::new(version_uri)),
        ModelKind::TwoWay => Box::new(ComparisonView::new(&[
            version(config.version_a, "versionA")?,
            version(config.version_b, "versionB")?,
        ])),
        ModelKind::ThreeWay => Box::new(ComparisonView::new(&[
            version(config.version_a, "versionA")?,
            version(config.version_b, "versionB")?,
            version(config.version_c, "versionC")?,
        ])),
    })
}

fn field(incarnation: u64, name: &str) -> Node {
    Node::sql_field_ref(incarnation, name)
}

fn resource_type() -> Node {
    Node::type_node(StaticType::Resource)
}

/// Blank node subjects are stored with their `_:` prefix.
fn subject_type() -> Node {
    Node::sql_expr(
        "CASE WHEN substr($1, 1, 2) = '_:' THEN 2 ELSE 1 END",
        vec![field(STATEMENTS, "subject")],
    )
}

fn integer(value: impl ToString) -> Node {
    Node::sql_expr(value.to_string(), Vec::new())
}

/// `first` joined to `statements` on `first.stmt_id`, with an optional extra condition.
fn join_statements(first: Node, condition: Option<Node>) -> Node {
    let mut conditions = vec![Node::equal(field(FIRST, "stmt_id"), field(STATEMENTS, "id"))];
    conditions.extend(condition);
    Node::select(
        Node::product(vec![
            first,
            Node::sql_relation(STATEMENTS, "statements", Vec::new()),
        ]),
        Node::and_all(conditions),
    )
}

/// The statements of `version`, or of every version.
fn version_statements(version: Option<u32>) -> Node {
    join_statements(
        Node::sql_relation(FIRST, "version_statement", Vec::new()),
        version.map(|version| Node::equal(field(FIRST, "version_id"), integer(version))),
    )
}

/// The constant context of a pattern, if any.
fn context_uri(pattern: &Node) -> Option<&Uri> {
    match &pattern.children.first()?.kind {
        NodeKind::Uri(uri) => Some(uri),
        _ => None,
    }
}
