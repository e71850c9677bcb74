//! The query expression IR.

use crate::extents::Extents;
use crate::types::StaticType;
use relrdf_model::{Literal, Uri};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// A node of the query IR.
///
/// A node owns its children exclusively, so an IR value is always a tree.
/// Rewrites consume nodes and return new trees.
/// Equality is structural and only meant for tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
    /// Explicit source extents. See [`Node::extents`] for the computed ones.
    pub extents: Option<Extents>,
    /// Index of the child whose extents start this node, if not the first child with extents.
    pub start_child: Option<usize>,
    /// Index of the child whose extents end this node, if not the last child with extents.
    pub end_child: Option<usize>,
    /// Set by the static type checker.
    pub static_type: Option<StaticType>,
    /// An expression evaluating the runtime type of this node, set during pattern mapping.
    pub dynamic_type: Option<Box<Node>>,
}

/// The kind of a [`Node`] with its attributes.
///
/// The expected children are documented on each variant.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// `NULL`. No children.
    Null,
    Uri(Uri),
    /// A prefixed name not yet resolved to a [`Uri`].
    QName {
        prefix: String,
        local: String,
    },
    Literal(Literal),
    /// A literal with a datatype not yet resolved. One child: the datatype (`Uri` or `QName`).
    TypedLiteral(String),
    Var(String),
    /// A field of a [`Relation`](NodeKind::Relation) with the same name and incarnation.
    FieldRef {
        relation: String,
        incarnation: u64,
        field: String,
    },
    /// Matches anything in a pattern position.
    Joker,
    /// Children: context, subject, predicate, object.
    StatementPattern,
    /// Children: context, statement, subject, predicate, object.
    ReifStmtPattern,
    /// Two or more operands.
    Equal,
    /// Two or more operands, pairwise different.
    Different,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Or,
    And,
    Not,
    IsUri,
    IsBlank,
    IsLiteral,
    FunctionCall(Function),
    /// A table of the store.
    Relation {
        name: String,
        incarnation: u64,
    },
    /// Cartesian product of the child relations.
    Product,
    /// Children: relation, predicate.
    Select,
    /// Children: relation, then one expression per column name.
    MapResult {
        column_names: Vec<String>,
    },
    /// One child: the optional relation.
    Optional,
    Distinct,
    Sort {
        keys: Vec<SortKey>,
    },
    OffsetLimit {
        offset: Option<u64>,
        limit: Option<u64>,
    },
    Union {
        column_names: Vec<String>,
    },
    Intersection {
        column_names: Vec<String>,
    },
    SetDifference {
        column_names: Vec<String>,
    },
    /// The runtime type of the single child.
    DynType,
    /// A constant type.
    Type(StaticType),
    /// A URI stored as a suffix appended to `base`. One child: the stored suffix.
    ValueRef {
        base: String,
    },
    /// Raw SQL text used as a relation. `$1`, `$2`... refer to the children.
    SqlRelation {
        incarnation: u64,
        sql: String,
    },
    SqlFieldRef {
        incarnation: u64,
        field: String,
    },
    SqlFunctionCall(String),
    /// Raw SQL expression. `$1`, `$2`... refer to the children.
    SqlExpr(String),
}

/// A built-in function of the query languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Str,
    StrLen,
    UCase,
    LCase,
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Str => "str",
            Self::StrLen => "strlen",
            Self::UCase => "ucase",
            Self::LCase => "lcase",
        })
    }
}

/// A column of an ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortKey {
    pub column: String,
    pub ascending: bool,
}

impl Node {
    #[inline]
    pub fn new(kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            children,
            extents: None,
            start_child: None,
            end_child: None,
            static_type: None,
            dynamic_type: None,
        }
    }

    #[inline]
    pub fn leaf(kind: NodeKind) -> Self {
        Self::new(kind, Vec::new())
    }

    pub fn null() -> Self {
        Self::leaf(NodeKind::Null)
    }

    pub fn uri(uri: impl Into<Uri>) -> Self {
        Self::leaf(NodeKind::Uri(uri.into()))
    }

    pub fn qname(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self::leaf(NodeKind::QName {
            prefix: prefix.into(),
            local: local.into(),
        })
    }

    pub fn literal(literal: impl Into<Literal>) -> Self {
        Self::leaf(NodeKind::Literal(literal.into()))
    }

    pub fn typed_literal(value: impl Into<String>, datatype: Node) -> Self {
        Self::new(NodeKind::TypedLiteral(value.into()), vec![datatype])
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self::leaf(NodeKind::Var(name.into()))
    }

    pub fn joker() -> Self {
        Self::leaf(NodeKind::Joker)
    }

    pub fn statement_pattern(context: Node, subject: Node, predicate: Node, object: Node) -> Self {
        let mut node = Self::new(
            NodeKind::StatementPattern,
            vec![context, subject, predicate, object],
        );
        node.start_child = Some(1);
        node
    }

    pub fn reif_stmt_pattern(
        context: Node,
        statement: Node,
        subject: Node,
        predicate: Node,
        object: Node,
    ) -> Self {
        let mut node = Self::new(
            NodeKind::ReifStmtPattern,
            vec![context, statement, subject, predicate, object],
        );
        node.start_child = Some(2);
        node
    }

    pub fn equal(a: Node, b: Node) -> Self {
        Self::new(NodeKind::Equal, vec![a, b])
    }

    pub fn different(a: Node, b: Node) -> Self {
        Self::new(NodeKind::Different, vec![a, b])
    }

    pub fn not(inner: Node) -> Self {
        Self::new(NodeKind::Not, vec![inner])
    }

    /// Conjunction of the given conditions. A single condition is returned as is.
    pub fn and_all(mut conditions: Vec<Node>) -> Self {
        if conditions.len() == 1 {
            if let Some(condition) = conditions.pop() {
                return condition;
            }
        }
        Self::new(NodeKind::And, conditions)
    }

    /// Disjunction of the given conditions. A single condition is returned as is.
    pub fn or_all(mut conditions: Vec<Node>) -> Self {
        if conditions.len() == 1 {
            if let Some(condition) = conditions.pop() {
                return condition;
            }
        }
        Self::new(NodeKind::Or, conditions)
    }

    pub fn function_call(function: Function, args: Vec<Node>) -> Self {
        Self::new(NodeKind::FunctionCall(function), args)
    }

    pub fn relation(name: impl Into<String>, incarnation: u64) -> Self {
        Self::leaf(NodeKind::Relation {
            name: name.into(),
            incarnation,
        })
    }

    pub fn field_ref(relation: impl Into<String>, incarnation: u64, field: impl Into<String>) -> Self {
        Self::leaf(NodeKind::FieldRef {
            relation: relation.into(),
            incarnation,
            field: field.into(),
        })
    }

    pub fn product(relations: Vec<Node>) -> Self {
        Self::new(NodeKind::Product, relations)
    }

    pub fn select(relation: Node, predicate: Node) -> Self {
        Self::new(NodeKind::Select, vec![relation, predicate])
    }

    pub fn map_result(column_names: Vec<String>, relation: Node, expressions: Vec<Node>) -> Self {
        let mut children = Vec::with_capacity(expressions.len() + 1);
        children.push(relation);
        children.extend(expressions);
        Self::new(NodeKind::MapResult { column_names }, children)
    }

    pub fn dyn_type(inner: Node) -> Self {
        Self::new(NodeKind::DynType, vec![inner])
    }

    pub fn type_node(static_type: StaticType) -> Self {
        Self::leaf(NodeKind::Type(static_type))
    }

    pub fn value_ref(base: impl Into<String>, internal: Node) -> Self {
        Self::new(NodeKind::ValueRef { base: base.into() }, vec![internal])
    }

    pub fn sql_relation(incarnation: u64, sql: impl Into<String>, args: Vec<Node>) -> Self {
        Self::new(
            NodeKind::SqlRelation {
                incarnation,
                sql: sql.into(),
            },
            args,
        )
    }

    pub fn sql_field_ref(incarnation: u64, field: impl Into<String>) -> Self {
        Self::leaf(NodeKind::SqlFieldRef {
            incarnation,
            field: field.into(),
        })
    }

    pub fn sql_function_call(name: impl Into<String>, args: Vec<Node>) -> Self {
        Self::new(NodeKind::SqlFunctionCall(name.into()), args)
    }

    pub fn sql_expr(template: impl Into<String>, args: Vec<Node>) -> Self {
        Self::new(NodeKind::SqlExpr(template.into()), args)
    }

    #[must_use]
    #[inline]
    pub fn with_extents(mut self, extents: Extents) -> Self {
        self.extents = Some(extents);
        self
    }

    #[must_use]
    #[inline]
    pub fn with_static_type(mut self, static_type: StaticType) -> Self {
        self.static_type = Some(static_type);
        self
    }

    /// Makes the extents of this node start where `extents` start.
    pub fn set_start(&mut self, extents: &Extents) {
        self.extents = Some(match self.extents() {
            Some(current) => extents.span_to(&current),
            None => extents.clone(),
        });
    }

    /// Makes the extents of this node end where `extents` end.
    pub fn set_end(&mut self, extents: &Extents) {
        self.extents = Some(match self.extents() {
            Some(current) => current.span_to(extents),
            None => extents.clone(),
        });
    }

    /// The source extents of the node.
    ///
    /// Without explicit extents, they span from the start of the first child
    /// (or [`start_child`](Node::start_child)) to the end of the last child
    /// (or [`end_child`](Node::end_child)).
    pub fn extents(&self) -> Option<Extents> {
        if let Some(extents) = &self.extents {
            return Some(extents.clone());
        }
        let start = match self.start_child {
            Some(i) => self.children.get(i)?.extents(),
            None => self.children.iter().find_map(Self::extents),
        }?;
        let end = match self.end_child {
            Some(i) => self.children.get(i)?.extents(),
            None => self.children.iter().rev().find_map(Self::extents),
        }?;
        Some(start.span_to(&end))
    }

    #[inline]
    pub fn child(&self, i: usize) -> Option<&Node> {
        self.children.get(i)
    }

    #[inline]
    pub fn var_name(&self) -> Option<&str> {
        if let NodeKind::Var(name) = &self.kind {
            Some(name)
        } else {
            None
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::StatementPattern | NodeKind::ReifStmtPattern
        )
    }

    /// The column names of a tabular query node, looking through result modifiers.
    pub fn column_names(&self) -> Option<&[String]> {
        match &self.kind {
            NodeKind::MapResult { column_names }
            | NodeKind::Union { column_names }
            | NodeKind::Intersection { column_names }
            | NodeKind::SetDifference { column_names } => Some(column_names),
            NodeKind::Distinct | NodeKind::Sort { .. } | NodeKind::OffsetLimit { .. } => {
                self.children.first()?.column_names()
            }
            _ => None,
        }
    }

    /// For a `MapResult`, the expression of the named column.
    pub fn subexpr_by_name(&self, name: &str) -> Option<&Node> {
        let NodeKind::MapResult { column_names } = &self.kind else {
            return None;
        };
        let position = column_names.iter().position(|c| c == name)?;
        self.children.get(position + 1)
    }

    /// Visits the node and its descendants in pre-order.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// Mutably visits the node and its descendants in pre-order.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }

    /// The incarnation numbers used by relations and field references in this tree.
    pub fn incarnations(&self) -> BTreeSet<u64> {
        let mut incarnations = BTreeSet::new();
        self.walk(&mut |node| {
            if let Some(incarnation) = node.kind.incarnation() {
                incarnations.insert(incarnation);
            }
        });
        incarnations
    }

    /// The names of the variables of the patterns in this tree, in order of first appearance.
    pub fn pattern_variables(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut variables = Vec::new();
        self.walk(&mut |node| {
            if node.is_pattern() {
                for child in &node.children {
                    if let Some(name) = child.var_name() {
                        if seen.insert(name.to_owned()) {
                            variables.push(name.to_owned());
                        }
                    }
                }
            }
        });
        variables
    }

    /// Checks the structural invariants of the tree.
    ///
    /// No node appears at two positions, patterns and result maps have the right arity
    /// and set operation operands share their column names.
    pub fn check_tree(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        self.check_tree_inner(&mut seen)
    }

    fn check_tree_inner(&self, seen: &mut HashSet<*const Node>) -> Result<(), String> {
        if !seen.insert(std::ptr::from_ref(self)) {
            return Err(format!("Node {} appears twice in the tree", self.kind.name()));
        }
        match &self.kind {
            NodeKind::StatementPattern if self.children.len() != 4 => {
                return Err("Statement patterns have 4 children".into());
            }
            NodeKind::ReifStmtPattern if self.children.len() != 5 => {
                return Err("Reified statement patterns have 5 children".into());
            }
            NodeKind::Select if self.children.len() != 2 => {
                return Err("Selections have 2 children".into());
            }
            NodeKind::MapResult { column_names } if column_names.len() + 1 != self.children.len() => {
                return Err(format!(
                    "Result map with {} columns has {} children",
                    column_names.len(),
                    self.children.len()
                ));
            }
            NodeKind::Union { column_names }
            | NodeKind::Intersection { column_names }
            | NodeKind::SetDifference { column_names } => {
                for child in &self.children {
                    if child.column_names() != Some(column_names.as_slice()) {
                        return Err(format!(
                            "Operand of {} does not have the columns ({})",
                            self.kind.name(),
                            column_names.join(", ")
                        ));
                    }
                }
            }
            _ => (),
        }
        for child in &self.children {
            child.check_tree_inner(seen)?;
        }
        Ok(())
    }

    /// Formats using an S-expression syntax.
    fn fmt_sse(&self, f: &mut impl fmt::Write) -> fmt::Result {
        match &self.kind {
            NodeKind::Null => return f.write_str("null"),
            NodeKind::Uri(uri) => return write!(f, "{uri}"),
            NodeKind::QName { prefix, local } => return write!(f, "{prefix}:{local}"),
            NodeKind::Literal(literal) => return write!(f, "{literal}"),
            NodeKind::Var(name) => return write!(f, "?{name}"),
            NodeKind::Joker => return f.write_str("_"),
            NodeKind::FieldRef {
                relation,
                incarnation,
                field,
            } => return write!(f, "{relation}_{incarnation}.{field}"),
            NodeKind::SqlFieldRef { incarnation, field } => {
                return write!(f, "rel_{incarnation}.{field}");
            }
            NodeKind::Type(t) => return write!(f, "(type {t})"),
            _ => (),
        }
        write!(f, "({}", self.kind.name())?;
        match &self.kind {
            NodeKind::TypedLiteral(value) => write!(f, " {value:?}")?,
            NodeKind::FunctionCall(function) => write!(f, " {function}")?,
            NodeKind::Relation { name, incarnation } => write!(f, " {name}_{incarnation}")?,
            NodeKind::MapResult { column_names }
            | NodeKind::Union { column_names }
            | NodeKind::Intersection { column_names }
            | NodeKind::SetDifference { column_names } => {
                write!(f, " ({})", column_names.join(" "))?;
            }
            NodeKind::Sort { keys } => {
                f.write_str(" (")?;
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    let order = if key.ascending { "asc" } else { "desc" };
                    write!(f, "({order} {})", key.column)?;
                }
                f.write_str(")")?;
            }
            NodeKind::OffsetLimit { offset, limit } => {
                write!(f, " {}", offset.unwrap_or(0))?;
                match limit {
                    Some(limit) => write!(f, " {limit}")?,
                    None => f.write_str(" _")?,
                }
            }
            NodeKind::ValueRef { base } => write!(f, " <{base}>")?,
            NodeKind::SqlRelation { incarnation, sql } => write!(f, " {incarnation} {sql:?}")?,
            NodeKind::SqlFunctionCall(name) => write!(f, " {name}")?,
            NodeKind::SqlExpr(template) => write!(f, " {template:?}")?,
            _ => (),
        }
        for child in &self.children {
            f.write_str(" ")?;
            child.fmt_sse(f)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_sse(f)
    }
}

impl NodeKind {
    /// A short lowercase name, used in diagnostics and in the S-expression format.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Uri(_) => "uri",
            Self::QName { .. } => "qname",
            Self::Literal(_) => "literal",
            Self::TypedLiteral(_) => "typed-literal",
            Self::Var(_) => "var",
            Self::FieldRef { .. } => "field",
            Self::Joker => "joker",
            Self::StatementPattern => "pattern",
            Self::ReifStmtPattern => "reif-pattern",
            Self::Equal => "=",
            Self::Different => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::Or => "or",
            Self::And => "and",
            Self::Not => "not",
            Self::IsUri => "is-uri",
            Self::IsBlank => "is-blank",
            Self::IsLiteral => "is-literal",
            Self::FunctionCall(_) => "call",
            Self::Relation { .. } => "relation",
            Self::Product => "product",
            Self::Select => "select",
            Self::MapResult { .. } => "map",
            Self::Optional => "optional",
            Self::Distinct => "distinct",
            Self::Sort { .. } => "sort",
            Self::OffsetLimit { .. } => "slice",
            Self::Union { .. } => "union",
            Self::Intersection { .. } => "intersection",
            Self::SetDifference { .. } => "difference",
            Self::DynType => "dyn-type",
            Self::Type(_) => "type",
            Self::ValueRef { .. } => "value-ref",
            Self::SqlRelation { .. } => "sql-relation",
            Self::SqlFieldRef { .. } => "sql-field",
            Self::SqlFunctionCall(_) => "sql-call",
            Self::SqlExpr(_) => "sql",
        }
    }

    /// The incarnation bound by relations and field references.
    pub fn incarnation(&self) -> Option<u64> {
        match self {
            Self::Relation { incarnation, .. }
            | Self::FieldRef { incarnation, .. }
            | Self::SqlRelation { incarnation, .. }
            | Self::SqlFieldRef { incarnation, .. } => Some(*incarnation),
            _ => None,
        }
    }

    pub(crate) fn incarnation_mut(&mut self) -> Option<&mut u64> {
        match self {
            Self::Relation { incarnation, .. }
            | Self::FieldRef { incarnation, .. }
            | Self::SqlRelation { incarnation, .. }
            | Self::SqlFieldRef { incarnation, .. } => Some(incarnation),
            _ => None,
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::Different
                | Self::LessThan
                | Self::LessThanOrEqual
                | Self::GreaterThan
                | Self::GreaterThanOrEqual
        )
    }

    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Self::LessThan | Self::LessThanOrEqual | Self::GreaterThan | Self::GreaterThanOrEqual
        )
    }

    /// Kinds producing tables rather than values.
    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            Self::Relation { .. }
                | Self::SqlRelation { .. }
                | Self::Product
                | Self::Select
                | Self::MapResult { .. }
                | Self::Optional
                | Self::Distinct
                | Self::Sort { .. }
                | Self::OffsetLimit { .. }
                | Self::Union { .. }
                | Self::Intersection { .. }
                | Self::SetDifference { .. }
                | Self::StatementPattern
                | Self::ReifStmtPattern
        )
    }
}

/// Variables introduced for blank nodes and anonymous nodes cannot be projected.
pub fn is_hidden_variable(name: &str) -> bool {
    name.starts_with("_:") || name.starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn pattern(s: &str, o: &str) -> Node {
        Node::statement_pattern(
            Node::joker(),
            Node::var(s),
            Node::uri(Uri::new_unchecked("http://example.com/p")),
            Node::var(o),
        )
    }

    #[test]
    fn computed_extents_skip_context() {
        let at = |column| Extents::point(Arc::from("q"), 1, column);
        let mut s = Node::var("s");
        s.extents = Some(at(3));
        let mut o = Node::var("o");
        o.extents = Some(at(9));
        let mut context = Node::var("g");
        context.extents = Some(at(20));
        let node = Node::statement_pattern(context, s, Node::joker(), o);
        let extents = node.extents();
        assert_eq!(extents.as_ref().map(|e| e.start_column), Some(3));
        assert_eq!(extents.map(|e| e.end_column), Some(9));
    }

    #[test]
    fn subexpr_by_name() {
        let map = Node::map_result(
            vec!["a".into(), "b".into()],
            Node::product(vec![pattern("a", "b")]),
            vec![Node::var("a"), Node::var("b")],
        );
        assert_eq!(map.subexpr_by_name("b"), Some(&Node::var("b")));
        assert_eq!(map.subexpr_by_name("c"), None);
        assert_eq!(map.column_names(), Some(["a".to_owned(), "b".to_owned()].as_slice()));
        assert!(map.check_tree().is_ok());
    }

    #[test]
    fn check_tree_detects_bad_arity() {
        let map = Node::map_result(
            vec!["a".into(), "b".into()],
            Node::product(Vec::new()),
            vec![Node::var("a")],
        );
        assert!(map.check_tree().is_err());
    }

    #[test]
    fn check_tree_detects_column_mismatch() {
        let a = Node::map_result(vec!["x".into()], Node::product(Vec::new()), vec![Node::var("x")]);
        let b = Node::map_result(vec!["y".into()], Node::product(Vec::new()), vec![Node::var("y")]);
        let union = Node::new(
            NodeKind::Union {
                column_names: vec!["x".into()],
            },
            vec![a, b],
        );
        assert!(union.check_tree().is_err());
    }

    #[test]
    fn pattern_variables_in_order() {
        let product = Node::product(vec![pattern("s", "o"), pattern("o", "_:b1")]);
        assert_eq!(product.pattern_variables(), ["s", "o", "_:b1"]);
        assert!(is_hidden_variable("_:b1"));
        assert!(!is_hidden_variable("o"));
    }

    #[test]
    fn and_all_unwraps_single_condition() {
        assert_eq!(Node::and_all(vec![Node::var("x")]), Node::var("x"));
        assert_eq!(Node::and_all(Vec::new()).kind, NodeKind::And);
    }

    #[test]
    fn sse_format() {
        let node = Node::select(
            Node::relation("statements", 3),
            Node::equal(Node::field_ref("statements", 3, "subject"), Node::literal("a")),
        );
        assert_eq!(
            node.to_string(),
            "(select (relation statements_3) (= statements_3.subject \"a\"))"
        );
    }
}
