use super::{FIRST, Replacement, VersionView, context_uri, field, join_statements, version_statements};
use relrdf_algebra::{Node, StaticType};
use relrdf_model::Uri;
use relrdf_model::vocab::relrdf;
use rusqlite::Connection;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

static TABLE_COUNTER: AtomicU64 = AtomicU64::new(1);

const LETTERS: [char; 3] = ['A', 'B', 'C'];

/// The comparison of two or three versions.
///
/// Each stored statement of the compared versions lands in exactly one context
/// `relrdf:comp<letters>` naming the versions containing it (`compA`, `compAB`...).
/// The contexts `relrdf:model<letter>` expose the compared versions unchanged.
/// In a two-way comparison, the constant context `relrdf:compBA` is an alias of `compAB`,
/// both in `GRAPH` patterns and when compared with a `GRAPH` variable.
///
/// The classification is computed once into a temporary table by [`VersionView::prepare`].
#[derive(Debug, Clone)]
pub struct ComparisonView {
    versions: Vec<u32>,
    table: String,
    compared: Replacement,
    models: Vec<(Uri, Replacement)>,
    aliases: Vec<(Uri, Replacement)>,
    uri_aliases: Vec<(Uri, Uri)>,
}

impl ComparisonView {
    /// Compares the given versions, named A, B and C in order.
    pub fn new(versions: &[u32]) -> Self {
        let versions: Vec<u32> = versions.iter().take(LETTERS.len()).copied().collect();
        let table = format!(
            "comparison_{}",
            TABLE_COUNTER.fetch_add(1, Ordering::Relaxed)
        );
        let comparison = || Node::sql_relation(FIRST, table.clone(), Vec::new());
        let compared = Replacement::statements(
            join_statements(comparison(), None),
            Node::value_ref(relrdf::COMP.as_str(), field(FIRST, "context"))
                .with_static_type(StaticType::Resource),
        );
        let models = versions
            .iter()
            .zip(LETTERS)
            .map(|(version, letter)| {
                let uri = Uri::new_unchecked(format!("{}{letter}", relrdf::MODEL.as_str()));
                let replacement = Replacement::statements(
                    version_statements(Some(*version)),
                    Node::uri(uri.clone()).with_static_type(StaticType::Resource),
                );
                (uri, replacement)
            })
            .collect();
        let mut aliases = Vec::new();
        let mut uri_aliases = Vec::new();
        if versions.len() == 2 {
            uri_aliases.push((relrdf::COMP_BA.into(), relrdf::COMP_AB.into()));
            let shared = Node::equal(field(FIRST, "context"), Node::sql_expr("'AB'", Vec::new()));
            aliases.push((
                relrdf::COMP_BA.into(),
                Replacement::statements(
                    join_statements(comparison(), Some(shared)),
                    Node::uri(relrdf::COMP_BA).with_static_type(StaticType::Resource),
                ),
            ));
        }
        Self {
            versions,
            table,
            compared,
            models,
            aliases,
            uri_aliases,
        }
    }

    /// The name of the temporary classification table.
    #[inline]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The statement to fill the classification table.
    fn classification(&self) -> String {
        let mask = self
            .versions
            .iter()
            .enumerate()
            .map(|(i, version)| format!("{} * max(version_id = {version})", 1 << i))
            .collect::<Vec<_>>()
            .join(" + ");
        let cases = (1..1_usize << self.versions.len())
            .map(|mask| {
                let label: String = LETTERS
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << *i) != 0)
                    .map(|(_, letter)| letter)
                    .collect();
                format!("WHEN {mask} THEN '{label}'")
            })
            .collect::<Vec<_>>()
            .join(" ");
        let versions = self
            .versions
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {table} (stmt_id, context)
             SELECT stmt_id, CASE mask {cases} END
             FROM (SELECT stmt_id, {mask} AS mask
                   FROM version_statement WHERE version_id IN ({versions}) GROUP BY stmt_id)",
            table = self.table
        )
    }
}

impl VersionView for ComparisonView {
    fn prepare(&self, connection: &Connection) -> rusqlite::Result<()> {
        debug!(table = self.table, versions = ?self.versions, "Classifying statements");
        connection.execute_batch(&format!(
            "DROP TABLE IF EXISTS temp.{table};
             CREATE TEMPORARY TABLE {table} (
               stmt_id INTEGER PRIMARY KEY NOT NULL,
               context TEXT NOT NULL
             );
             CREATE INDEX temp.{table}_context ON {table} (context);",
            table = self.table
        ))?;
        connection.execute(&self.classification(), [])?;
        Ok(())
    }

    fn release(&self, connection: &Connection) -> rusqlite::Result<()> {
        connection.execute_batch(&format!("DROP TABLE IF EXISTS temp.{}", self.table))
    }

    fn uri_aliases(&self) -> &[(Uri, Uri)] {
        &self.uri_aliases
    }

    fn statement_replacement(&self, pattern: &Node) -> &Replacement {
        if let Some(context) = context_uri(pattern) {
            if let Some((_, replacement)) = self
                .models
                .iter()
                .chain(&self.aliases)
                .find(|(uri, _)| uri == context)
            {
                return replacement;
            }
        }
        &self.compared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_labels() {
        let view = ComparisonView::new(&[4, 7]);
        let sql = view.classification();
        assert!(sql.contains("1 * max(version_id = 4) + 2 * max(version_id = 7)"), "{sql}");
        assert!(sql.contains("WHEN 1 THEN 'A' WHEN 2 THEN 'B' WHEN 3 THEN 'AB' END"), "{sql}");
        let view = ComparisonView::new(&[1, 2, 3]);
        assert!(view.classification().contains("WHEN 6 THEN 'BC' WHEN 7 THEN 'ABC' END"));
    }

    #[test]
    fn tables_are_unique() {
        assert_ne!(ComparisonView::new(&[1, 2]).table(), ComparisonView::new(&[1, 2]).table());
    }

    #[test]
    fn model_contexts() {
        let view = ComparisonView::new(&[1, 2]);
        let pattern = |context: Node| {
            Node::statement_pattern(context, Node::var("s"), Node::var("p"), Node::var("o"))
        };
        assert_eq!(view.statement_replacement(&pattern(Node::joker())), &view.compared);
        assert_eq!(
            view.statement_replacement(&pattern(Node::uri(relrdf::MODEL_B))),
            &view.models[1].1
        );
        assert_eq!(
            view.statement_replacement(&pattern(Node::uri(relrdf::COMP_BA))),
            &view.aliases[0].1
        );
        assert_eq!(
            view.statement_replacement(&pattern(Node::uri(relrdf::COMP_AB))),
            &view.compared
        );
        assert_eq!(
            view.uri_aliases(),
            [(Uri::from(relrdf::COMP_BA), Uri::from(relrdf::COMP_AB))]
        );
        assert!(ComparisonView::new(&[1, 2, 3]).aliases.is_empty());
        assert!(ComparisonView::new(&[1, 2, 3]).uri_aliases().is_empty());
    }
}
