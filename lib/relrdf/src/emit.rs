//! SQL generation from mapped query trees.

use crate::modelbase::{BLANK_TYPE_ID, LITERAL_TYPE_ID, RESOURCE_TYPE_ID};
use relrdf_algebra::{Function, Node, NodeKind, NotSupportedError, SortKey, StaticType};
use relrdf_model::vocab::xsd;
use relrdf_opt::type_column;

/// Compiles a mapped and dereferenced query tree to a SQLite `SELECT` statement.
///
/// The columns of the statement are the columns of the tree, in order.
pub fn emit_sql(node: &Node) -> Result<String, NotSupportedError> {
    query(node)
}

/// Quotes a SQL string literal.
pub(crate) fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn not_supported(node: &Node, what: &str) -> NotSupportedError {
    NotSupportedError::new(
        node.extents(),
        format!("Cannot compile a {} {what} to SQL", node.kind.name()),
    )
}

fn query(node: &Node) -> Result<String, NotSupportedError> {
    match &node.kind {
        NodeKind::MapResult { .. } => select(node, false),
        NodeKind::Distinct => {
            let inner = child(node, 0)?;
            if let NodeKind::MapResult { .. } = inner.kind {
                select(inner, true)
            } else {
                Ok(format!("SELECT DISTINCT * FROM ({})", query(inner)?))
            }
        }
        NodeKind::Sort { keys } => sort(node, keys),
        NodeKind::OffsetLimit { offset, limit } => {
            let mut sql = query(child(node, 0)?)?;
            sql.push_str(" LIMIT ");
            sql.push_str(&limit.map_or_else(|| "-1".to_owned(), |limit| limit.to_string()));
            if let Some(offset) = offset {
                sql.push_str(" OFFSET ");
                sql.push_str(&offset.to_string());
            }
            Ok(sql)
        }
        NodeKind::Union { .. } => set_operation(node, "UNION"),
        NodeKind::Intersection { .. } => set_operation(node, "INTERSECT"),
        NodeKind::SetDifference { .. } => set_operation(node, "EXCEPT"),
        _ => Err(not_supported(node, "query")),
    }
}

/// Columns with a runtime type are sorted by type, then numbers by value, then by text.
///
/// The typed keys are expressions, which SQLite only accepts on a plain `SELECT`, so the
/// sorted query is wrapped.
fn sort(node: &Node, keys: &[SortKey]) -> Result<String, NotSupportedError> {
    let inner = child(node, 0)?;
    let columns = inner.column_names().unwrap_or_default();
    let mut typed = false;
    let mut terms = Vec::new();
    for key in keys {
        let direction = if key.ascending { "ASC" } else { "DESC" };
        let value = quote_identifier(&key.column);
        let type_name = type_column(&key.column);
        if columns.contains(&type_name) {
            typed = true;
            let value_type = quote_identifier(&type_name);
            terms.push(format!("{value_type} {direction}"));
            terms.push(format!(
                "CASE WHEN {value_type} IN (SELECT id FROM data_types WHERE uri IN ({})) \
                 THEN CAST({value} AS NUMERIC) END {direction}",
                numeric_type_keys()
            ));
        }
        terms.push(format!("{value} {direction}"));
    }
    let inner = query(inner)?;
    Ok(if typed {
        format!("SELECT * FROM ({inner}) ORDER BY {}", terms.join(", "))
    } else {
        format!("{inner} ORDER BY {}", terms.join(", "))
    })
}

fn numeric_type_keys() -> String {
    xsd::NUMERIC
        .iter()
        .map(|datatype| quote_string(datatype.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn set_operation(node: &Node, operator: &str) -> Result<String, NotSupportedError> {
    Ok(node
        .children
        .iter()
        .map(|operand| Ok(format!("SELECT * FROM ({})", query(operand)?)))
        .collect::<Result<Vec<_>, NotSupportedError>>()?
        .join(&format!(" {operator} ")))
}

fn select(node: &Node, distinct: bool) -> Result<String, NotSupportedError> {
    let NodeKind::MapResult { column_names } = &node.kind else {
        return Err(not_supported(node, "query"));
    };
    let mut from = Vec::new();
    let mut conditions = Vec::new();
    relation(child(node, 0)?, &mut from, &mut conditions)?;
    let columns = column_names
        .iter()
        .zip(node.children.iter().skip(1))
        .map(|(name, value)| Ok(format!("{} AS {}", expression(value)?, quote_identifier(name))))
        .collect::<Result<Vec<_>, NotSupportedError>>()?;
    let mut sql = String::from("SELECT ");
    if distinct {
        sql.push_str("DISTINCT ");
    }
    if columns.is_empty() {
        sql.push('1');
    } else {
        sql.push_str(&columns.join(", "));
    }
    if !from.is_empty() {
        sql.push_str(" FROM ");
        sql.push_str(&from.join(", "));
    }
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    Ok(sql)
}

/// Collects the `FROM` items and `WHERE` conditions of a relation.
fn relation(
    node: &Node,
    from: &mut Vec<String>,
    conditions: &mut Vec<String>,
) -> Result<(), NotSupportedError> {
    match &node.kind {
        NodeKind::Product => {
            for operand in &node.children {
                relation(operand, from, conditions)?;
            }
        }
        NodeKind::Select => {
            relation(child(node, 0)?, from, conditions)?;
            conditions.push(expression(child(node, 1)?)?);
        }
        NodeKind::SqlRelation { incarnation, sql } => {
            let sql = substitute(node, sql)?;
            if sql.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
                from.push(format!("{sql} AS rel_{incarnation}"));
            } else {
                from.push(format!("({sql}) AS rel_{incarnation}"));
            }
        }
        NodeKind::Relation { name, incarnation } => {
            from.push(format!("{name} AS {name}_{incarnation}"));
        }
        _ => return Err(not_supported(node, "relation")),
    }
    Ok(())
}

fn expression(node: &Node) -> Result<String, NotSupportedError> {
    Ok(match &node.kind {
        NodeKind::Null => "NULL".to_owned(),
        NodeKind::Uri(uri) => quote_string(uri.as_str()),
        NodeKind::Literal(literal) => quote_string(literal.value()),
        NodeKind::Type(static_type) => type_code(node, static_type)?,
        NodeKind::SqlFieldRef { incarnation, field } => format!("rel_{incarnation}.{field}"),
        NodeKind::FieldRef {
            relation,
            incarnation,
            field,
        } => format!("{relation}_{incarnation}.{field}"),
        NodeKind::SqlExpr(template) => substitute(node, template)?,
        NodeKind::SqlFunctionCall(name) => format!("{name}({})", arguments(node)?.join(", ")),
        NodeKind::Equal => {
            let operands = comparison_operands(node)?;
            conjunction(
                operands
                    .windows(2)
                    .filter_map(|pair| match pair {
                        [a, b] => Some(format!("{a} = {b}")),
                        _ => None,
                    })
                    .collect(),
            )
        }
        NodeKind::Different => {
            let operands = comparison_operands(node)?;
            let mut pairs = Vec::new();
            for (i, a) in operands.iter().enumerate() {
                for b in operands.iter().skip(i + 1) {
                    pairs.push(format!("{a} <> {b}"));
                }
            }
            conjunction(pairs)
        }
        NodeKind::LessThan => ordering(node, "<")?,
        NodeKind::LessThanOrEqual => ordering(node, "<=")?,
        NodeKind::GreaterThan => ordering(node, ">")?,
        NodeKind::GreaterThanOrEqual => ordering(node, ">=")?,
        NodeKind::And => {
            if node.children.is_empty() {
                "1".to_owned()
            } else {
                format!("({})", arguments(node)?.join(" AND "))
            }
        }
        NodeKind::Or => {
            if node.children.is_empty() {
                "0".to_owned()
            } else {
                format!("({})", arguments(node)?.join(" OR "))
            }
        }
        NodeKind::Not => format!("(NOT {})", expression(child(node, 0)?)?),
        NodeKind::FunctionCall(function) => {
            let argument = expression(child(node, 0)?)?;
            match function {
                Function::Str => argument,
                Function::StrLen => format!("length({argument})"),
                Function::UCase => format!("upper({argument})"),
                Function::LCase => format!("lower({argument})"),
            }
        }
        _ => return Err(not_supported(node, "expression")),
    })
}

fn arguments(node: &Node) -> Result<Vec<String>, NotSupportedError> {
    node.children.iter().map(expression).collect()
}

fn conjunction(parts: Vec<String>) -> String {
    match parts.len() {
        0 => "1".to_owned(),
        1 => format!("({})", parts.join("")),
        _ => format!("(({}))", parts.join(") AND (")),
    }
}

/// Numeric operands are compared by value, the other ones as strings.
fn comparison_operands(node: &Node) -> Result<Vec<String>, NotSupportedError> {
    let numeric = node
        .children
        .iter()
        .any(|child| child.static_type.as_ref().is_some_and(StaticType::is_numeric));
    node.children
        .iter()
        .map(|child| {
            let operand = expression(child)?;
            Ok(if numeric {
                format!("CAST({operand} AS NUMERIC)")
            } else {
                operand
            })
        })
        .collect()
}

fn ordering(node: &Node, operator: &str) -> Result<String, NotSupportedError> {
    let operands = comparison_operands(node)?;
    let [a, b] = operands.as_slice() else {
        return Err(not_supported(node, "comparison"));
    };
    Ok(format!("({a} {operator} {b})"))
}

/// The runtime type code of a static type.
fn type_code(node: &Node, static_type: &StaticType) -> Result<String, NotSupportedError> {
    Ok(match static_type {
        StaticType::Null => "NULL".to_owned(),
        StaticType::Resource => RESOURCE_TYPE_ID.to_string(),
        StaticType::Blank => BLANK_TYPE_ID.to_string(),
        StaticType::Literal(None) => LITERAL_TYPE_ID.to_string(),
        StaticType::Literal(Some(key)) if key == xsd::STRING.as_str() => {
            LITERAL_TYPE_ID.to_string()
        }
        StaticType::Literal(Some(key)) => format!(
            "(SELECT id FROM data_types WHERE uri = {})",
            quote_string(key)
        ),
        _ => return Err(not_supported(node, "type")),
    })
}

/// Replaces the `$n` placeholders of a template outside of its string literals.
fn substitute(node: &Node, template: &str) -> Result<String, NotSupportedError> {
    let mut result = String::with_capacity(template.len());
    let mut in_string = false;
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            in_string = !in_string;
        }
        if c != '$' || in_string {
            result.push(c);
            continue;
        }
        let mut index = String::new();
        while let Some(digit) = chars.next_if(char::is_ascii_digit) {
            index.push(digit);
        }
        if index.is_empty() {
            result.push(c);
            continue;
        }
        let argument = index
            .parse::<usize>()
            .ok()
            .and_then(|i| node.children.get(i.checked_sub(1)?))
            .ok_or_else(|| {
                NotSupportedError::new(
                    node.extents(),
                    format!("The SQL template {template:?} has no argument ${index}"),
                )
            })?;
        result.push_str(&expression(argument)?);
    }
    Ok(result)
}

fn child(node: &Node, i: usize) -> Result<&Node, NotSupportedError> {
    node.child(i)
        .ok_or_else(|| not_supported(node, "node with missing operands"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use relrdf_model::{Literal, Uri};

    fn statements(incarnation: u64) -> Node {
        Node::sql_relation(incarnation, "statements", Vec::new())
    }

    #[test]
    fn select_with_conditions() {
        let node = Node::map_result(
            vec!["s".into(), "type__s".into()],
            Node::select(
                Node::product(vec![statements(1), statements(2)]),
                Node::and_all(vec![
                    Node::equal(Node::sql_field_ref(1, "subject"), Node::sql_field_ref(2, "object")),
                    Node::equal(
                        Node::sql_field_ref(1, "predicate"),
                        Node::uri(Uri::new_unchecked("http://example.com/p")),
                    ),
                ]),
            ),
            vec![
                Node::sql_field_ref(1, "subject"),
                Node::type_node(StaticType::Resource),
            ],
        );
        assert_eq!(
            emit_sql(&node).unwrap(),
            "SELECT rel_1.subject AS \"s\", 1 AS \"type__s\" FROM statements AS rel_1, statements AS rel_2 \
             WHERE ((rel_1.subject = rel_2.object) AND (rel_1.predicate = 'http://example.com/p'))"
        );
    }

    #[test]
    fn modifiers() {
        let base = Node::map_result(vec!["x".into()], statements(1), vec![Node::sql_field_ref(1, "id")]);
        let node = Node::new(
            NodeKind::OffsetLimit {
                offset: Some(5),
                limit: None,
            },
            vec![Node::new(
                NodeKind::Sort {
                    keys: vec![SortKey {
                        column: "x".into(),
                        ascending: false,
                    }],
                },
                vec![Node::new(NodeKind::Distinct, vec![base])],
            )],
        );
        assert_eq!(
            emit_sql(&node).unwrap(),
            "SELECT DISTINCT rel_1.id AS \"x\" FROM statements AS rel_1 ORDER BY \"x\" DESC LIMIT -1 OFFSET 5"
        );
    }

    #[test]
    fn typed_sort_keys() {
        let base = Node::map_result(
            vec!["o".into(), "type__o".into()],
            statements(1),
            vec![Node::sql_field_ref(1, "object"), Node::sql_field_ref(1, "object_type")],
        );
        let node = Node::new(
            NodeKind::Sort {
                keys: vec![SortKey {
                    column: "o".into(),
                    ascending: true,
                }],
            },
            vec![base],
        );
        let sql = emit_sql(&node).unwrap();
        assert!(
            sql.starts_with("SELECT * FROM (SELECT rel_1.object AS \"o\""),
            "{sql}"
        );
        assert!(sql.contains(") ORDER BY \"type__o\" ASC, CASE WHEN \"type__o\" IN"), "{sql}");
        assert!(sql.contains("'http://www.w3.org/2001/XMLSchema#integer'"), "{sql}");
        assert!(sql.ends_with("THEN CAST(\"o\" AS NUMERIC) END ASC, \"o\" ASC"), "{sql}");
    }

    #[test]
    fn set_operations() {
        let operand = |incarnation| {
            Node::map_result(vec!["x".into()], statements(incarnation), vec![Node::sql_field_ref(incarnation, "id")])
        };
        let node = Node::new(
            NodeKind::SetDifference {
                column_names: vec!["x".into()],
            },
            vec![operand(1), operand(2)],
        );
        assert_eq!(
            emit_sql(&node).unwrap(),
            "SELECT * FROM (SELECT rel_1.id AS \"x\" FROM statements AS rel_1) EXCEPT SELECT * FROM (SELECT rel_2.id AS \"x\" FROM statements AS rel_2)"
        );
    }

    #[test]
    fn literals_and_types() {
        assert_eq!(expression(&Node::literal(Literal::from("it's"))).unwrap(), "'it''s'");
        assert_eq!(
            expression(&Node::type_node(StaticType::typed_literal(xsd::INTEGER))).unwrap(),
            "(SELECT id FROM data_types WHERE uri = 'http://www.w3.org/2001/XMLSchema#integer')"
        );
        assert_eq!(
            expression(&Node::type_node(StaticType::typed_literal(xsd::STRING))).unwrap(),
            "3"
        );
        assert_eq!(expression(&Node::new(NodeKind::Or, Vec::new())).unwrap(), "0");
        let less = Node::new(
            NodeKind::LessThan,
            vec![
                Node::sql_field_ref(1, "object"),
                Node::literal(Literal::new_typed_literal("10", xsd::INTEGER))
                    .with_static_type(StaticType::typed_literal(xsd::INTEGER)),
            ],
        );
        assert_eq!(
            expression(&less).unwrap(),
            "(CAST(rel_1.object AS NUMERIC) < CAST('10' AS NUMERIC))"
        );
    }

    #[test]
    fn templates() {
        let node = Node::sql_expr(
            "CASE WHEN substr($1, 1, 2) = '_:$1' THEN $2 END",
            vec![Node::sql_field_ref(1, "subject"), Node::sql_expr("2", Vec::new())],
        );
        assert_eq!(
            expression(&node).unwrap(),
            "CASE WHEN substr(rel_1.subject, 1, 2) = '_:$1' THEN 2 END"
        );
        assert!(expression(&Node::sql_expr("$3", Vec::new())).is_err());
        assert!(expression(&Node::var("x")).is_err());
    }
}
