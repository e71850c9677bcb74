//! Static type checking.

use crate::error::TypeCheckError;
use relrdf_algebra::rewrite::{Rewriter, Rewritten, Visit, rewrite};
use relrdf_algebra::{Function, Node, NodeKind, RelationType, StaticType};
use relrdf_model::vocab::xsd;
use std::mem::take;

/// Assigns a static type to every node of a parsed query.
///
/// Variables take the type of the same-named column of the relation they are
/// evaluated against. Patterns produce one column per variable, products
/// unify the columns they share and set operations generalize their operands.
///
/// ```
/// use relrdf_algebra::{QueryLanguage, QueryParser, StaticType};
/// use relrdf_opt::check_types;
///
/// let query = QueryParser::new(QueryLanguage::Sparql)
///     .parse("SELECT ?s WHERE { ?s <http://example.com/p> \"o\" }")?;
/// let query = check_types(query)?;
/// assert_eq!(query.children[1].static_type, Some(StaticType::Resource));
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub fn check_types(node: Node) -> Result<Node, TypeCheckError> {
    Ok(rewrite(&mut StaticTypeChecker::default(), node)?.node)
}

#[derive(Default)]
struct StaticTypeChecker {
    /// Row types of the relations the current expression is evaluated against.
    scopes: Vec<RelationType>,
}

impl StaticTypeChecker {
    /// Checks the relation child first, then the other children against its row type.
    fn check_scoped(&mut self, mut node: Node) -> Result<Rewritten, TypeCheckError> {
        let mut children = take(&mut node.children).into_iter();
        let Some(relation) = children.next() else {
            return Err(TypeCheckError::at(
                &node,
                format!("A {} without relation", node.kind.name()),
            ));
        };
        let relation = rewrite(self, relation)?;
        let mut modified = relation.modified;
        self.scopes.push(match &relation.node.static_type {
            Some(StaticType::Relation(row)) => row.clone(),
            _ => RelationType::new(),
        });
        let rest = children
            .map(|child| rewrite(self, child))
            .collect::<Result<Vec<_>, _>>();
        self.scopes.pop();
        node.children.push(relation.node);
        for child in rest? {
            modified |= child.modified;
            node.children.push(child.node);
        }
        let mut rewritten = self.post(node)?;
        rewritten.modified |= modified;
        Ok(rewritten)
    }

    /// Types the pattern variables by position and checks the constants.
    fn check_pattern(&mut self, mut node: Node) -> Result<Rewritten, TypeCheckError> {
        let roles = if node.kind == NodeKind::ReifStmtPattern {
            ["context", "statement", "subject", "predicate", "object"].as_slice()
        } else {
            ["context", "subject", "predicate", "object"].as_slice()
        };
        if node.children.len() != roles.len() {
            return Err(TypeCheckError::at(
                &node,
                format!("A {} has {} positions", node.kind.name(), roles.len()),
            ));
        }
        let mut modified = false;
        let mut row = RelationType::new();
        for (child, role) in take(&mut node.children).into_iter().zip(roles) {
            let expected = if *role == "object" {
                StaticType::RdfNode
            } else {
                StaticType::Resource
            };
            let child = match &child.kind {
                NodeKind::Joker => child,
                NodeKind::Var(name) => {
                    let column_type = match row.get(name) {
                        Some(current) => intersect_column(&child, name, current, &expected)?,
                        None => expected,
                    };
                    row.insert(name.clone(), column_type);
                    child
                }
                _ => {
                    let rewritten = rewrite(self, child)?;
                    modified |= rewritten.modified;
                    let is_expected = rewritten
                        .node
                        .static_type
                        .as_ref()
                        .is_some_and(|t| t.is_subtype_of(&expected));
                    if !is_expected {
                        return Err(TypeCheckError::at(
                            &rewritten.node,
                            format!(
                                "The {role} of a pattern must be a {expected}, found {}",
                                display_type(rewritten.node.static_type.as_ref())
                            ),
                        ));
                    }
                    rewritten.node
                }
            };
            node.children.push(child);
        }
        // Variables repeated in a pattern get the narrowest type
        for child in &mut node.children {
            if let Some(name) = child.var_name() {
                let column_type = row.get(name).cloned();
                if child.static_type != column_type {
                    child.static_type = column_type;
                    modified = true;
                }
            }
        }
        let static_type = Some(StaticType::Relation(row));
        modified |= node.static_type != static_type;
        node.static_type = static_type;
        Ok(Rewritten { node, modified })
    }

    fn type_of(&self, node: &Node) -> Result<Option<StaticType>, TypeCheckError> {
        Ok(match &node.kind {
            NodeKind::Null => Some(StaticType::Null),
            NodeKind::Uri(_) | NodeKind::ValueRef { .. } => Some(StaticType::Resource),
            NodeKind::Literal(literal) => Some(StaticType::of_literal(literal)),
            NodeKind::Var(name) => self.scopes.last().and_then(|row| row.get(name)).cloned(),
            NodeKind::QName { .. } | NodeKind::TypedLiteral(_) => {
                return Err(TypeCheckError::at(node, "Unresolved prefixed name"));
            }
            NodeKind::Joker
            | NodeKind::FieldRef { .. }
            | NodeKind::Relation { .. }
            | NodeKind::SqlRelation { .. }
            | NodeKind::SqlFieldRef { .. }
            | NodeKind::SqlFunctionCall(_)
            | NodeKind::SqlExpr(_)
            | NodeKind::StatementPattern
            | NodeKind::ReifStmtPattern => node.static_type.clone(),
            NodeKind::Equal
            | NodeKind::Different
            | NodeKind::LessThan
            | NodeKind::LessThanOrEqual
            | NodeKind::GreaterThan
            | NodeKind::GreaterThanOrEqual => {
                for operand in &node.children {
                    if let Some(t @ StaticType::Relation(_)) = &operand.static_type {
                        return Err(TypeCheckError::at(
                            operand,
                            format!("Cannot compare a {t}"),
                        ));
                    }
                }
                Some(StaticType::boolean())
            }
            NodeKind::And | NodeKind::Or | NodeKind::Not => {
                for operand in &node.children {
                    check_boolean(operand, node.kind.name())?;
                }
                Some(StaticType::boolean())
            }
            NodeKind::IsUri | NodeKind::IsBlank | NodeKind::IsLiteral => {
                Some(StaticType::boolean())
            }
            NodeKind::FunctionCall(function) => Some(match function {
                Function::Str => StaticType::typed_literal(xsd::STRING),
                Function::StrLen => StaticType::typed_literal(xsd::INTEGER),
                Function::UCase | Function::LCase => match node
                    .children
                    .first()
                    .and_then(|arg| arg.static_type.as_ref())
                {
                    Some(t @ StaticType::Literal(_)) => t.clone(),
                    _ => StaticType::typed_literal(xsd::STRING),
                },
            }),
            NodeKind::Product => Some(StaticType::Relation(product_type(node)?)),
            NodeKind::Select => {
                if let Some(predicate) = node.children.get(1) {
                    check_boolean(predicate, "selection")?;
                }
                relation_child_type(node)
            }
            NodeKind::MapResult { column_names } => {
                let mut row = RelationType::new();
                for (name, expression) in column_names.iter().zip(node.children.iter().skip(1)) {
                    row.insert(
                        name.clone(),
                        expression
                            .static_type
                            .clone()
                            .unwrap_or(StaticType::RdfNode),
                    );
                }
                Some(StaticType::Relation(row))
            }
            NodeKind::Optional
            | NodeKind::Distinct
            | NodeKind::Sort { .. }
            | NodeKind::OffsetLimit { .. } => relation_child_type(node),
            NodeKind::Union { .. }
            | NodeKind::Intersection { .. }
            | NodeKind::SetDifference { .. } => {
                let mut result: Option<StaticType> = None;
                for operand in &node.children {
                    let Some(operand_type) = &operand.static_type else {
                        continue;
                    };
                    result = Some(match result {
                        None => operand_type.clone(),
                        Some(current) => current.generalize(operand_type).ok_or_else(|| {
                            TypeCheckError::at(
                                node,
                                format!(
                                    "The operands of the {} have incompatible types: {current} and {operand_type}",
                                    node.kind.name()
                                ),
                            )
                        })?,
                    });
                }
                result
            }
            NodeKind::DynType | NodeKind::Type(_) => Some(StaticType::Type),
        })
    }
}

impl Rewriter for StaticTypeChecker {
    type Error = TypeCheckError;

    fn pre(&mut self, node: Node) -> Result<Visit, TypeCheckError> {
        Ok(match node.kind {
            NodeKind::Select | NodeKind::MapResult { .. } => {
                Visit::Done(self.check_scoped(node)?)
            }
            NodeKind::StatementPattern | NodeKind::ReifStmtPattern => {
                Visit::Done(self.check_pattern(node)?)
            }
            _ => Visit::Descend(node),
        })
    }

    fn post(&mut self, mut node: Node) -> Result<Rewritten, TypeCheckError> {
        let static_type = self.type_of(&node)?;
        let modified = node.static_type != static_type;
        node.static_type = static_type;
        Ok(Rewritten { node, modified })
    }
}

fn relation_child_type(node: &Node) -> Option<StaticType> {
    node.children.first().and_then(|c| c.static_type.clone())
}

/// Merges the row types of the product operands. Shared columns must have a common subtype.
fn product_type(node: &Node) -> Result<RelationType, TypeCheckError> {
    let mut row = RelationType::new();
    for child in &node.children {
        let Some(StaticType::Relation(child_row)) = &child.static_type else {
            return Err(TypeCheckError::at(
                child,
                format!("The operands of a product must be relations, found a {}", child.kind.name()),
            ));
        };
        for (name, column_type) in child_row.columns() {
            let column_type = match row.get(name) {
                Some(current) => intersect_column(child, name, current, column_type)?,
                None => column_type.clone(),
            };
            row.insert(name, column_type);
        }
    }
    Ok(row)
}

fn intersect_column(
    node: &Node,
    name: &str,
    a: &StaticType,
    b: &StaticType,
) -> Result<StaticType, TypeCheckError> {
    a.intersect(b).ok_or_else(|| {
        TypeCheckError::at(
            node,
            format!("Incompatible types for variable ?{name}: {a} and {b}"),
        )
    })
}

fn check_boolean(node: &Node, context: &str) -> Result<(), TypeCheckError> {
    if node.static_type.as_ref().is_some_and(StaticType::is_boolean) {
        Ok(())
    } else {
        Err(TypeCheckError::at(
            node,
            format!(
                "The operands of a {context} must be booleans, found {}",
                display_type(node.static_type.as_ref())
            ),
        ))
    }
}

fn display_type(static_type: Option<&StaticType>) -> String {
    static_type.map_or_else(|| "an untyped expression".into(), |t| format!("a {t}"))
}
