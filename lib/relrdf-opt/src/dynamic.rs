//! Runtime types.
//!
//! Every value column of a compiled query has a companion `type__` column holding
//! the type code of the value. Comparisons of values that may have different
//! types are guarded by a comparison of their runtime types.

use relrdf_algebra::rewrite::{Rewriter, Rewritten, apply_infallible, rewrite};
use relrdf_algebra::{Function, Node, NodeKind, StaticType};
use std::convert::Infallible;
use std::mem::take;

/// Prefix of the columns holding the runtime type of the same-named value column.
pub const TYPE_COLUMN_PREFIX: &str = "type__";

/// The name of the runtime type column of `column`.
#[inline]
pub fn type_column(column: &str) -> String {
    format!("{TYPE_COLUMN_PREFIX}{column}")
}

/// An expression evaluating to the runtime type of `node`.
///
/// Constants and expressions with a fixed result type give a [`NodeKind::Type`] constant,
/// other expressions are wrapped in a [`NodeKind::DynType`] resolved during pattern mapping.
pub fn dynamic_type(node: &Node) -> Node {
    if let Some(dynamic_type) = &node.dynamic_type {
        return (**dynamic_type).clone();
    }
    match &node.kind {
        NodeKind::Null => Node::null(),
        NodeKind::Uri(_) | NodeKind::ValueRef { .. } => type_constant(StaticType::Resource),
        NodeKind::Literal(literal) => type_constant(StaticType::of_literal(literal)),
        NodeKind::FunctionCall(function) => match function {
            Function::UCase | Function::LCase => node
                .children
                .first()
                .map_or_else(Node::null, dynamic_type),
            _ => match &node.static_type {
                Some(t) if t.is_concrete() => type_constant(t.clone()),
                _ => type_constant(StaticType::Literal(None)),
            },
        },
        NodeKind::Equal
        | NodeKind::Different
        | NodeKind::LessThan
        | NodeKind::LessThanOrEqual
        | NodeKind::GreaterThan
        | NodeKind::GreaterThanOrEqual
        | NodeKind::And
        | NodeKind::Or
        | NodeKind::Not
        | NodeKind::IsUri
        | NodeKind::IsBlank
        | NodeKind::IsLiteral => type_constant(StaticType::boolean()),
        _ => Node::dyn_type(node.clone()).with_static_type(StaticType::Type),
    }
}

fn type_constant(static_type: StaticType) -> Node {
    Node::type_node(static_type).with_static_type(StaticType::Type)
}

/// Adds a `type__` column for every value column of the result maps and set operations.
///
/// Trees already having type columns are left unchanged.
pub fn add_type_columns(node: Node) -> Rewritten {
    apply_infallible(node, |mut node| {
        let value_columns = match &node.kind {
            NodeKind::MapResult { column_names }
            | NodeKind::Union { column_names }
            | NodeKind::Intersection { column_names }
            | NodeKind::SetDifference { column_names } => {
                if column_names
                    .iter()
                    .any(|name| name.starts_with(TYPE_COLUMN_PREFIX))
                {
                    return Rewritten::unchanged(node);
                }
                column_names.clone()
            }
            _ => return Rewritten::unchanged(node),
        };
        if let NodeKind::MapResult { .. } = node.kind {
            let types = node
                .children
                .iter()
                .skip(1)
                .map(dynamic_type)
                .collect::<Vec<_>>();
            node.children.extend(types);
        }
        let type_columns = value_columns.iter().map(|name| type_column(name));
        match &mut node.kind {
            NodeKind::MapResult { column_names }
            | NodeKind::Union { column_names }
            | NodeKind::Intersection { column_names }
            | NodeKind::SetDifference { column_names } => column_names.extend(type_columns),
            _ => (),
        }
        if let Some(StaticType::Relation(row)) = &mut node.static_type {
            for name in &value_columns {
                row.insert(type_column(name), StaticType::Type);
            }
        }
        Rewritten::replaced(node)
    })
}

/// Guards value comparisons with a comparison of the runtime types, and rewrites
/// the `is*` tests into runtime type tests.
///
/// `a = b` becomes `type(a) = type(b) AND a = b`, `a != b` becomes
/// `type(a) != type(b) OR a != b`. Ordering comparisons are guarded like `=`, values
/// of different types being unordered. Comparisons whose operands are all resources
/// or all blank nodes need no guard.
///
/// The guarded comparisons are not marked: the pass must run once per query.
pub fn insert_type_guards(node: Node) -> Rewritten {
    let Ok(rewritten) = rewrite(&mut TypeGuards, node);
    rewritten
}

struct TypeGuards;

impl Rewriter for TypeGuards {
    type Error = Infallible;

    fn post(&mut self, node: Node) -> Result<Rewritten, Infallible> {
        Ok(match node.kind {
            NodeKind::Equal
            | NodeKind::Different
            | NodeKind::LessThan
            | NodeKind::LessThanOrEqual
            | NodeKind::GreaterThan
            | NodeKind::GreaterThanOrEqual
                if needs_guard(&node) =>
            {
                guard(node)
            }
            NodeKind::IsUri => type_test(node, NodeKind::Equal, StaticType::Resource),
            NodeKind::IsBlank => type_test(node, NodeKind::Equal, StaticType::Blank),
            NodeKind::IsLiteral => type_test(
                node,
                NodeKind::GreaterThanOrEqual,
                StaticType::Literal(None),
            ),
            _ => Rewritten::unchanged(node),
        })
    }
}

fn needs_guard(node: &Node) -> bool {
    let all = |expected: &StaticType| {
        node.children
            .iter()
            .all(|child| child.static_type.as_ref() == Some(expected))
    };
    let any_type = node
        .children
        .iter()
        .any(|child| child.static_type == Some(StaticType::Type));
    !(any_type || all(&StaticType::Resource) || all(&StaticType::Blank))
}

fn guard(comparison: Node) -> Rewritten {
    let types = comparison.children.iter().map(dynamic_type).collect();
    let (type_comparison, combinator) = if comparison.kind == NodeKind::Different {
        (NodeKind::Different, NodeKind::Or)
    } else {
        (NodeKind::Equal, NodeKind::And)
    };
    let extents = comparison.extents();
    let mut guarded = Node::new(
        combinator,
        vec![
            Node::new(type_comparison, types).with_static_type(StaticType::boolean()),
            comparison,
        ],
    )
    .with_static_type(StaticType::boolean());
    guarded.extents = extents;
    Rewritten::replaced(guarded)
}

fn type_test(mut node: Node, comparison: NodeKind, expected: StaticType) -> Rewritten {
    let extents = node.extents();
    let operand = take(&mut node.children)
        .into_iter()
        .next()
        .map_or_else(Node::null, |operand| dynamic_type(&operand));
    let mut test = Node::new(comparison, vec![operand, type_constant(expected)])
        .with_static_type(StaticType::boolean());
    test.extents = extents;
    Rewritten::replaced(test)
}
