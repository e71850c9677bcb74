//! Pattern mapping: replaces statement patterns by the relational templates of a version view.
//!
//! Every variable of a pattern is bound to the value and type columns of the template
//! instance matching it. Variables bound several times in the same result map are joined
//! with equality conditions, and variable references are replaced by their first binding.

use crate::error::QueryError;
use crate::views::VersionView;
use relrdf_algebra::rewrite::{Rewriter, Rewritten, Visit, rewrite};
use relrdf_algebra::{
    IncarnationContext, Node, NodeKind, NotSupportedError, SemanticError, StaticType,
};
use relrdf_model::UriRef;
use relrdf_model::vocab::rdf;
use relrdf_opt::{dynamic_type, type_column};
use std::collections::{BTreeMap, HashMap};
use std::mem::take;
use tracing::trace;

/// Maps the patterns of `node` with `view`.
///
/// Mapping an already mapped tree leaves it unchanged.
pub(crate) fn map_patterns(
    node: Node,
    view: &dyn VersionView,
    incarnations: &IncarnationContext,
) -> Result<Rewritten, QueryError> {
    rewrite(
        &mut PatternMapper {
            view,
            incarnations,
            scopes: Vec::new(),
        },
        node,
    )
}

struct Binding {
    value: Node,
    dynamic_type: Node,
}

type Scope = BTreeMap<String, Vec<Binding>>;

struct PatternMapper<'a> {
    view: &'a dyn VersionView,
    incarnations: &'a IncarnationContext,
    /// One scope per enclosing result map.
    scopes: Vec<Scope>,
}

impl Rewriter for PatternMapper<'_> {
    type Error = QueryError;

    fn pre(&mut self, node: Node) -> Result<Visit, QueryError> {
        Ok(match &node.kind {
            NodeKind::MapResult { .. } => Visit::Done(self.map_result(node)?),
            NodeKind::StatementPattern | NodeKind::ReifStmtPattern => {
                Visit::Done(self.pattern(node)?)
            }
            NodeKind::Optional => {
                return Err(NotSupportedError::new(
                    node.extents(),
                    "Optional patterns are not supported",
                )
                .into());
            }
            NodeKind::DynType if node.child(0).is_some_and(|c| c.var_name().is_some()) => {
                Visit::Done(self.variable_type(node)?)
            }
            _ => Visit::Descend(node),
        })
    }

    fn post(&mut self, node: Node) -> Result<Rewritten, QueryError> {
        match &node.kind {
            NodeKind::Var(_) => self.variable(node),
            NodeKind::DynType => resolve_type(node),
            _ => Ok(Rewritten::unchanged(node)),
        }
    }
}

impl PatternMapper<'_> {
    fn map_result(&mut self, node: Node) -> Result<Rewritten, QueryError> {
        self.scopes.push(Scope::new());
        let result = self.map_result_in_scope(node);
        self.scopes.pop();
        result
    }

    /// The relation is mapped first so that the bindings are known when the columns are.
    fn map_result_in_scope(&mut self, mut node: Node) -> Result<Rewritten, QueryError> {
        let mut children = take(&mut node.children).into_iter();
        let Some(relation) = children.next() else {
            return Err(NotSupportedError::new(node.extents(), "Result map without relation").into());
        };
        let relation = rewrite(self, relation)?;
        let mut modified = relation.modified;
        let mut relation = relation.node;
        let conditions = self.join_conditions();
        if !conditions.is_empty() {
            relation = Node::select(relation, Node::and_all(conditions));
            modified = true;
        }
        node.children.push(relation);
        for child in children {
            let child = rewrite(self, child)?;
            modified |= child.modified;
            node.children.push(child.node);
        }
        Ok(Rewritten { node, modified })
    }

    /// Equalities between the bindings of the variables bound more than once in the current scope.
    fn join_conditions(&self) -> Vec<Node> {
        let Some(scope) = self.scopes.last() else {
            return Vec::new();
        };
        let mut conditions = Vec::new();
        for bindings in scope.values() {
            let Some((first, others)) = bindings.split_first() else {
                continue;
            };
            for other in others {
                conditions.push(Node::equal(
                    first.dynamic_type.clone(),
                    other.dynamic_type.clone(),
                ));
                conditions.push(Node::equal(first.value.clone(), other.value.clone()));
            }
        }
        conditions
    }

    fn lookup(&self, variable: &Node) -> Result<&Binding, QueryError> {
        let name = variable.var_name().unwrap_or_default();
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name)?.first())
            .ok_or_else(|| {
                SemanticError::new(variable.extents(), format!("Unbound variable ?{name}")).into()
            })
    }

    fn variable(&self, node: Node) -> Result<Rewritten, QueryError> {
        let binding = self.lookup(&node)?;
        let mut value = binding.value.clone();
        if node.static_type.is_some() {
            value.static_type = node.static_type;
        }
        value.dynamic_type = Some(Box::new(binding.dynamic_type.clone()));
        Ok(Rewritten::replaced(value))
    }

    fn variable_type(&self, node: Node) -> Result<Rewritten, QueryError> {
        let variable = node.child(0).unwrap_or(&node);
        Ok(Rewritten::replaced(self.lookup(variable)?.dynamic_type.clone()))
    }

    fn bind(&mut self, name: String, binding: Binding) -> Result<(), QueryError> {
        let scope = self.scopes.last_mut().ok_or_else(|| {
            NotSupportedError::new(None, "Statement pattern outside of a result map")
        })?;
        scope.entry(name).or_default().push(binding);
        Ok(())
    }

    fn pattern(&mut self, node: Node) -> Result<Rewritten, QueryError> {
        let view = self.view;
        let replacement = if node.kind == NodeKind::ReifStmtPattern {
            match view.reified_replacement(&node) {
                Some(replacement) => replacement,
                None => return self.expand_reified(node),
            }
        } else {
            view.statement_replacement(&node)
        };
        let extents = node.extents();
        let instance = self.incarnations.reincarnate(&replacement.expression);
        trace!(pattern = %node, replacement = %instance, "Mapping pattern");
        let NodeKind::MapResult { column_names } = instance.kind else {
            return Err(NotSupportedError::new(extents, "Invalid pattern replacement").into());
        };
        let mut expressions = instance.children.into_iter();
        let Some(core) = expressions.next() else {
            return Err(NotSupportedError::new(extents, "Invalid pattern replacement").into());
        };
        let mut columns: HashMap<String, Node> = column_names.into_iter().zip(expressions).collect();
        let mut conditions = Vec::new();
        for (component, column) in node.children.into_iter().zip(replacement.columns) {
            let (Some(value), Some(value_type)) =
                (columns.remove(*column), columns.remove(&type_column(column)))
            else {
                return Err(NotSupportedError::new(
                    extents,
                    format!("The pattern replacement has no {column} column"),
                )
                .into());
            };
            match &component.kind {
                NodeKind::Var(name) => {
                    let name = name.clone();
                    self.bind(
                        name,
                        Binding {
                            value,
                            dynamic_type: value_type,
                        },
                    )?;
                }
                NodeKind::Joker => (),
                _ => conditions.push(Node::and_all(vec![
                    Node::equal(dynamic_type(&component), value_type),
                    Node::equal(component, value),
                ])),
            }
        }
        Ok(Rewritten::replaced(if conditions.is_empty() {
            core
        } else {
            Node::select(core, Node::and_all(conditions))
        }))
    }

    /// Expands a reified pattern into the four patterns of the reification vocabulary.
    fn expand_reified(&mut self, node: Node) -> Result<Rewritten, QueryError> {
        let extents = node.extents();
        let mut parts = node.children.into_iter();
        let (Some(context), Some(statement), Some(subject), Some(predicate), Some(object)) =
            (parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(NotSupportedError::new(extents, "Invalid reified pattern").into());
        };
        let statement = if statement.kind == NodeKind::Joker {
            Node::var(format!("#stmt{}", self.incarnations.fresh()))
                .with_static_type(StaticType::Resource)
        } else {
            statement
        };
        let resource = |uri: UriRef<'_>| Node::uri(uri).with_static_type(StaticType::Resource);
        let patterns = [
            (resource(rdf::TYPE), resource(rdf::STATEMENT)),
            (resource(rdf::SUBJECT), subject),
            (resource(rdf::PREDICATE), predicate),
            (resource(rdf::OBJECT), object),
        ]
        .into_iter()
        .map(|(predicate, object)| {
            Node::statement_pattern(context.clone(), statement.clone(), predicate, object)
        })
        .collect();
        let expanded = rewrite(self, Node::product(patterns))?;
        Ok(Rewritten::replaced(expanded.node))
    }
}

/// Resolves the runtime type of a mapped expression.
fn resolve_type(mut node: Node) -> Result<Rewritten, QueryError> {
    let extents = node.extents();
    let Some(inner) = take(&mut node.children).into_iter().next() else {
        return Ok(Rewritten::replaced(Node::null()));
    };
    let resolved = dynamic_type(&inner);
    if resolved.kind == NodeKind::DynType {
        return Err(NotSupportedError::new(
            extents,
            format!("Cannot determine the runtime type of a {} expression", inner.kind.name()),
        )
        .into());
    }
    Ok(Rewritten::replaced(resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::SingleVersionView;
    use relrdf_algebra::{QueryLanguage, QueryParser};
    use relrdf_model::vocab::relrdf;
    use relrdf_opt::{add_type_columns, check_types, insert_type_guards};

    fn prepare(query: &str) -> Node {
        let node = QueryParser::new(QueryLanguage::Sparql)
            .with_prefix("ex", "http://example.com/")
            .parse(query)
            .unwrap();
        let node = check_types(node).unwrap();
        insert_type_guards(add_type_columns(node).node).node
    }

    fn view() -> SingleVersionView {
        SingleVersionView::new(1, relrdf::VERSION.as_str())
    }

    fn contains_kind(node: &Node, matches: impl Fn(&NodeKind) -> bool) -> bool {
        let mut found = false;
        node.walk(&mut |n| found |= matches(&n.kind));
        found
    }

    #[test]
    fn patterns_are_replaced() {
        let incarnations = IncarnationContext::new();
        let mapped = map_patterns(
            prepare("SELECT ?s ?o WHERE { ?s ex:p ?o }"),
            &view(),
            &incarnations,
        )
        .unwrap();
        assert!(mapped.modified);
        let node = mapped.node;
        assert!(!contains_kind(&node, |k| matches!(
            k,
            NodeKind::StatementPattern | NodeKind::Var(_) | NodeKind::DynType
        )));
        assert!(node.check_tree().is_ok());
        assert_eq!(
            node.subexpr_by_name("s").map(|n| &n.kind),
            Some(&NodeKind::SqlFieldRef {
                incarnation: 2,
                field: "subject".into()
            })
        );
    }

    #[test]
    fn mapping_twice_changes_nothing() {
        let incarnations = IncarnationContext::new();
        let view = view();
        let once = map_patterns(
            prepare("SELECT ?s WHERE { ?s ex:p ?o . ?o ex:q ?s FILTER(?o != ex:a) }"),
            &view,
            &incarnations,
        )
        .unwrap()
        .node;
        let twice = map_patterns(once.clone(), &view, &incarnations).unwrap();
        assert!(!twice.modified);
        assert_eq!(twice.node, once);
    }

    #[test]
    fn patterns_get_fresh_incarnations() {
        let incarnations = IncarnationContext::new();
        let node = map_patterns(
            prepare("SELECT ?s WHERE { ?s ex:p ?o . ?s ex:q ?x }"),
            &view(),
            &incarnations,
        )
        .unwrap()
        .node;
        let NodeKind::Select = &node.children[0].kind else {
            panic!("shared variables add a join condition: {node}");
        };
        assert_eq!(node.incarnations().len(), 4);
    }

    #[test]
    fn unbound_variable() {
        let incarnations = IncarnationContext::new();
        let node = Node::map_result(
            vec!["x".into()],
            Node::statement_pattern(Node::joker(), Node::var("s"), Node::var("p"), Node::var("o")),
            vec![Node::var("x")],
        );
        let Err(QueryError::Semantic(error)) = map_patterns(node, &view(), &incarnations) else {
            panic!("?x is not bound");
        };
        assert_eq!(error.message(), "Unbound variable ?x");
    }

    #[test]
    fn constants_become_conditions() {
        let incarnations = IncarnationContext::new();
        let node = map_patterns(
            prepare("SELECT ?s WHERE { ?s ex:p \"x\" }"),
            &view(),
            &incarnations,
        )
        .unwrap()
        .node;
        let Some(relation) = node.child(0) else {
            panic!("result maps have a relation");
        };
        assert_eq!(relation.kind, NodeKind::Select);
    }

    #[test]
    fn reified_patterns_expand_without_native_support() {
        let incarnations = IncarnationContext::new();
        let node = Node::map_result(
            vec!["s".into()],
            Node::reif_stmt_pattern(
                Node::joker(),
                Node::joker(),
                Node::var("s"),
                Node::var("p"),
                Node::var("o"),
            ),
            vec![Node::var("s")],
        );
        let node = map_patterns(node, &view(), &incarnations).unwrap().node;
        assert!(!contains_kind(&node, |k| *k == NodeKind::ReifStmtPattern));
        assert_eq!(node.incarnations().len(), 8);
    }
}
