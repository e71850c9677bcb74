use super::{
    FIRST, REIFIED_COLUMNS, Replacement, STATEMENT_COLUMNS, STATEMENTS, SingleVersionView,
    VersionView, field, resource_type, subject_type,
};
use relrdf_algebra::{Node, NodeKind, StaticType};
use relrdf_model::vocab::{rdf, relrdf};
use relrdf_model::{Uri, UriRef};

/// Version 1 holding the meta information about the other versions.
///
/// Beyond the statements of version 1, the view exposes every stored statement as a
/// `relrdf:stmt<id>` resource described with the RDF reification vocabulary, and
/// `relrdf:versionContainsStmt` links each version to its statements.
/// Reified patterns match the stored statements directly.
#[derive(Debug, Clone)]
pub struct MetaVersionView {
    version: SingleVersionView,
    statement_types: Replacement,
    contains: Replacement,
    subjects: Replacement,
    predicates: Replacement,
    objects: Replacement,
    reified: Replacement,
}

impl MetaVersionView {
    pub fn new(version_uri: &str) -> Self {
        let context = || {
            Node::uri(Uri::new_unchecked(format!("{version_uri}1")))
                .with_static_type(StaticType::Resource)
        };
        let statement = |incarnation: u64, id: &str| {
            Node::value_ref(relrdf::STMT.as_str(), field(incarnation, id))
                .with_static_type(StaticType::Resource)
        };
        let constant = |uri: UriRef<'_>| Node::uri(uri).with_static_type(StaticType::Resource);
        let statements = || Node::sql_relation(STATEMENTS, "statements", Vec::new());
        let describe = |predicate: UriRef<'_>, object: (Node, Node)| {
            Replacement::new(
                STATEMENT_COLUMNS,
                statements(),
                vec![
                    (context(), resource_type()),
                    (statement(STATEMENTS, "id"), resource_type()),
                    (constant(predicate), resource_type()),
                    object,
                ],
            )
        };
        Self {
            version: SingleVersionView::new(1, version_uri),
            statement_types: describe(rdf::TYPE, (constant(rdf::STATEMENT), resource_type())),
            contains: Replacement::new(
                STATEMENT_COLUMNS,
                Node::sql_relation(FIRST, "version_statement", Vec::new()),
                vec![
                    (context(), resource_type()),
                    (
                        Node::value_ref(version_uri, field(FIRST, "version_id"))
                            .with_static_type(StaticType::Resource),
                        resource_type(),
                    ),
                    (constant(relrdf::VERSION_CONTAINS_STMT), resource_type()),
                    (statement(FIRST, "stmt_id"), resource_type()),
                ],
            ),
            subjects: describe(rdf::SUBJECT, (field(STATEMENTS, "subject"), subject_type())),
            predicates: describe(rdf::PREDICATE, (field(STATEMENTS, "predicate"), resource_type())),
            objects: describe(
                rdf::OBJECT,
                (field(STATEMENTS, "object"), field(STATEMENTS, "object_type")),
            ),
            reified: Replacement::new(
                REIFIED_COLUMNS,
                statements(),
                vec![
                    (context(), resource_type()),
                    (statement(STATEMENTS, "id"), resource_type()),
                    (field(STATEMENTS, "subject"), subject_type()),
                    (field(STATEMENTS, "predicate"), resource_type()),
                    (field(STATEMENTS, "object"), field(STATEMENTS, "object_type")),
                ],
            ),
        }
    }
}

fn constant_uri(node: Option<&Node>) -> Option<&Uri> {
    match &node?.kind {
        NodeKind::Uri(uri) => Some(uri),
        _ => None,
    }
}

impl VersionView for MetaVersionView {
    fn statement_replacement(&self, pattern: &Node) -> &Replacement {
        let Some(predicate) = constant_uri(pattern.child(2)) else {
            return self.version.statement_replacement(pattern);
        };
        if *predicate == rdf::TYPE
            && constant_uri(pattern.child(3)).is_some_and(|object| *object == rdf::STATEMENT)
        {
            &self.statement_types
        } else if *predicate == relrdf::VERSION_CONTAINS_STMT {
            &self.contains
        } else if *predicate == rdf::SUBJECT {
            &self.subjects
        } else if *predicate == rdf::PREDICATE {
            &self.predicates
        } else if *predicate == rdf::OBJECT {
            &self.objects
        } else {
            self.version.statement_replacement(pattern)
        }
    }

    fn reified_replacement(&self, _pattern: &Node) -> Option<&Replacement> {
        Some(&self.reified)
    }
}
