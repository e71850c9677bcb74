use crate::error::{NotSupportedError, ParseError, SemanticError, SyntaxError};
use crate::extents::{Extents, LineIndex};
use crate::node::{Node, NodeKind, SortKey, is_hidden_variable};
use crate::prefixes::PrefixTable;
use crate::rewrite::{Rewritten, match_apply};
use crate::{serql, sparql};
use oxiri::{Iri, IriParseError, IriRef};
use relrdf_model::{Literal, Uri};
use std::fmt;
use std::mem::replace;
use std::str::FromStr;

/// The query languages understood by [`QueryParser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryLanguage {
    Sparql,
    Serql,
}

impl QueryLanguage {
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sparql => "SPARQL",
            Self::Serql => "SerQL",
        }
    }
}

impl fmt::Display for QueryLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QueryLanguage {
    type Err = UnknownQueryLanguageError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if name.eq_ignore_ascii_case("sparql") {
            Ok(Self::Sparql)
        } else if name.eq_ignore_ascii_case("serql") {
            Ok(Self::Serql)
        } else {
            Err(UnknownQueryLanguageError(name.to_owned()))
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown query language '{0}'")]
pub struct UnknownQueryLanguageError(String);

/// A SPARQL or SerQL parser producing query IR.
///
/// ```
/// use relrdf_algebra::{QueryLanguage, QueryParser};
///
/// let query = QueryParser::new(QueryLanguage::Sparql)
///     .with_prefix("ex", "http://example.com/")
///     .parse("SELECT ?s WHERE { ?s ex:p ?o }")?;
/// assert_eq!(query.column_names(), Some(["s".to_owned()].as_slice()));
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct QueryParser {
    language: QueryLanguage,
    file_name: String,
    base_iri: Option<Iri<String>>,
    prefixes: PrefixTable,
}

impl QueryParser {
    #[inline]
    pub fn new(language: QueryLanguage) -> Self {
        Self {
            language,
            file_name: "<unknown>".into(),
            base_iri: None,
            prefixes: PrefixTable::new(),
        }
    }

    /// The file name used in error positions.
    #[inline]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Provides an IRI used to resolve the relative IRIs of the query.
    #[inline]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Result<Self, IriParseError> {
        self.base_iri = Some(Iri::parse(base_iri.into())?);
        Ok(self)
    }

    /// Binds a prefix for every query parsed. Prefixes declared in the query take precedence.
    #[inline]
    pub fn with_prefix(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.prefixes.add_external(prefix, namespace);
        self
    }

    #[inline]
    pub fn with_prefixes(
        mut self,
        prefixes: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        self.prefixes = self.prefixes.with_external(prefixes);
        self
    }

    #[inline]
    pub fn language(&self) -> QueryLanguage {
        self.language
    }

    /// Parses `query` into a tabular IR expression with resolved prefixed names.
    pub fn parse(&self, query: &str) -> Result<Node, ParseError> {
        let mut state = ParserState::new(
            LineIndex::new(&self.file_name, query),
            self.base_iri.clone(),
            self.prefixes.clone(),
        );
        let parsed = match self.language {
            QueryLanguage::Sparql => sparql::parse(query, &mut state),
            QueryLanguage::Serql => serql::parse(query, &mut state),
        };
        let node = parsed.map_err(|e| SyntaxError::from_peg(&e, state.lines.file_name()))?;
        if let Some(error) = state.error.take() {
            return Err(error);
        }
        resolve_names(node, &state.prefixes)
    }
}

pub(crate) struct ParserState {
    lines: LineIndex,
    base_iri: Option<Iri<String>>,
    prefixes: PrefixTable,
    error: Option<ParseError>,
    fresh_variables: u64,
}

impl ParserState {
    fn new(lines: LineIndex, base_iri: Option<Iri<String>>, prefixes: PrefixTable) -> Self {
        Self {
            lines,
            base_iri,
            prefixes,
            error: None,
            fresh_variables: 0,
        }
    }

    /// The extents of the bytes `start..end` of the query.
    pub(crate) fn extents(&self, start: usize, end: usize) -> Extents {
        self.lines.extents(start, end)
    }

    /// Records an error to report once parsing succeeded. Only the first one is kept.
    pub(crate) fn defer(&mut self, error: impl Into<ParseError>) {
        if self.error.is_none() {
            self.error = Some(error.into());
        }
    }

    /// A variable name no query can spell.
    pub(crate) fn fresh_variable(&mut self, hint: &str) -> String {
        self.fresh_variables += 1;
        format!("#{hint}{}", self.fresh_variables)
    }

    pub(crate) fn parse_iri(&self, iri: String) -> Result<Uri, &'static str> {
        if let Some(base_iri) = &self.base_iri {
            let iri = base_iri.resolve(&iri).map_err(|_| "IRI parsing failed")?;
            Ok(Uri::new_unchecked(iri.into_inner()))
        } else {
            let iri = IriRef::parse(iri).map_err(|_| "IRI parsing failed")?;
            Ok(Uri::new_unchecked(iri.into_inner()))
        }
    }

    pub(crate) fn set_base_iri(&mut self, iri: Uri) -> Result<(), &'static str> {
        self.base_iri = Some(Iri::parse(iri.into_string()).map_err(|_| "Invalid base IRI")?);
        Ok(())
    }

    pub(crate) fn declare_prefix(&mut self, prefix: &str, namespace: String, extents: Extents) {
        if prefix == "_" {
            self.defer(SemanticError::new(
                Some(extents),
                "Invalid namespace prefix '_'",
            ));
        } else {
            self.prefixes.declare(prefix, namespace);
        }
    }
}

/// Patterns and filters of a group, before being assembled into a relation.
#[derive(Default)]
pub(crate) struct GroupPattern {
    patterns: Vec<Node>,
    filters: Vec<Node>,
}

impl GroupPattern {
    pub(crate) fn from_patterns(patterns: Vec<Node>) -> Self {
        Self {
            patterns,
            filters: Vec::new(),
        }
    }

    pub(crate) fn from_filter(filter: Node) -> Self {
        Self {
            patterns: Vec::new(),
            filters: vec![filter],
        }
    }

    pub(crate) fn push_filter(&mut self, filter: Node) {
        self.filters.push(filter);
    }

    pub(crate) fn merge(&mut self, other: Self) {
        self.patterns.extend(other.patterns);
        self.filters.extend(other.filters);
    }

    /// The group as the single relation of an optional match.
    pub(crate) fn into_optional(self) -> Self {
        Self::from_patterns(vec![Node::new(
            NodeKind::Optional,
            vec![self.into_relation()],
        )])
    }

    /// Sets the context of the patterns that match any context.
    #[must_use]
    pub(crate) fn in_graph(mut self, context: &Node) -> Self {
        for pattern in &mut self.patterns {
            pattern.walk_mut(&mut |node| {
                if node.is_pattern() {
                    if let Some(current) = node.children.first_mut() {
                        if current.kind == NodeKind::Joker {
                            *current = context.clone();
                        }
                    }
                }
            });
        }
        self
    }

    pub(crate) fn into_relation(self) -> Node {
        let product = Node::product(self.patterns);
        if self.filters.is_empty() {
            return product;
        }
        let mut select = Node::select(product, Node::and_all(self.filters));
        // Filters may come before the patterns they constrain
        if let (Some(a), Some(b)) = (
            select.children.first().and_then(Node::extents),
            select.children.get(1).and_then(Node::extents),
        ) {
            select.extents = Some(a.cover(&b));
        }
        select
    }
}

/// The parts of a `SELECT` query.
pub(crate) struct SelectParts {
    pub distinct: bool,
    /// `None` for `*`.
    pub projection: Option<Vec<Node>>,
    pub pattern: GroupPattern,
    pub order: Vec<(SortKey, Extents)>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    /// The extents of the `SELECT` clause.
    pub extents: Extents,
}

pub(crate) fn build_select(state: &mut ParserState, parts: SelectParts) -> Node {
    let relation = parts.pattern.into_relation();
    let projection = parts.projection.unwrap_or_else(|| {
        relation
            .pattern_variables()
            .into_iter()
            .filter(|name| !is_hidden_variable(name))
            .map(Node::var)
            .collect()
    });
    let column_names: Vec<String> = projection
        .iter()
        .filter_map(|v| v.var_name().map(ToOwned::to_owned))
        .collect();
    for (key, extents) in &parts.order {
        if !column_names.contains(&key.column) {
            state.defer(NotSupportedError::new(
                Some(extents.clone()),
                format!(
                    "Ordering by the variable ?{} which is not selected",
                    key.column
                ),
            ));
        }
    }
    let mut node =
        Node::map_result(column_names, relation, projection).with_extents(parts.extents);
    if parts.distinct {
        node = Node::new(NodeKind::Distinct, vec![node]);
    }
    if !parts.order.is_empty() {
        node = Node::new(
            NodeKind::Sort {
                keys: parts.order.into_iter().map(|(key, _)| key).collect(),
            },
            vec![node],
        );
    }
    if parts.offset.is_some() || parts.limit.is_some() {
        node = Node::new(
            NodeKind::OffsetLimit {
                offset: parts.offset,
                limit: parts.limit,
            },
            vec![node],
        );
    }
    node
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum SetOperator {
    Union,
    Intersection,
    Difference,
}

impl fmt::Display for SetOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Union => "union",
            Self::Intersection => "intersection",
            Self::Difference => "difference",
        })
    }
}

/// Combines two queries. `keyword` points at the operator for error reporting.
pub(crate) fn build_set_operation(
    state: &mut ParserState,
    operator: SetOperator,
    left: Node,
    right: Node,
    keyword: Extents,
) -> Node {
    let column_names = left.column_names().map(<[String]>::to_vec).unwrap_or_default();
    let right_column_names = right.column_names().unwrap_or_default();
    if right_column_names != column_names.as_slice() {
        state.defer(SemanticError::new(
            Some(keyword),
            format!(
                "The operands of the {operator} do not select the same columns: ({}) and ({})",
                column_names.join(", "),
                right_column_names.join(", ")
            ),
        ));
    }
    let kind = match operator {
        SetOperator::Union => NodeKind::Union { column_names },
        SetOperator::Intersection => NodeKind::Intersection { column_names },
        SetOperator::Difference => NodeKind::SetDifference { column_names },
    };
    Node::new(kind, vec![left, right])
}

pub(crate) fn fold_set_operations(
    state: &mut ParserState,
    first: Node,
    rest: Vec<(SetOperator, Extents, Node)>,
) -> Node {
    rest.into_iter()
        .fold(first, |left, (operator, keyword, right)| {
            build_set_operation(state, operator, left, right, keyword)
        })
}

/// Replaces prefixed names by URIs and typed literals by literals.
fn resolve_names(node: Node, prefixes: &PrefixTable) -> Result<Node, ParseError> {
    let rewritten = match_apply(
        node,
        |kind| matches!(kind, NodeKind::QName { .. } | NodeKind::TypedLiteral(_)),
        |mut node| -> Result<Rewritten, ParseError> {
            let extents = node.extents();
            let kind = match replace(&mut node.kind, NodeKind::Null) {
                NodeKind::QName { prefix, local } => {
                    let uri = prefixes.expand(&prefix, &local).ok_or_else(|| {
                        SemanticError::new(
                            extents.clone(),
                            format!("Undefined namespace prefix '{prefix}'"),
                        )
                    })?;
                    NodeKind::Uri(uri)
                }
                NodeKind::TypedLiteral(value) => {
                    let Some(NodeKind::Uri(datatype)) = node.children.pop().map(|c| c.kind)
                    else {
                        return Err(
                            SyntaxError::new(extents, "Literal datatypes must be IRIs").into()
                        );
                    };
                    NodeKind::Literal(Literal::new_typed_literal(value, datatype))
                }
                kind => kind,
            };
            node.kind = kind;
            node.children.clear();
            node.extents = extents;
            Ok(Rewritten::replaced(node))
        },
    )?;
    Ok(rewritten.node)
}

pub(crate) fn unescape_iriref(mut input: &str) -> Result<String, &'static str> {
    let mut output = String::with_capacity(input.len());
    while let Some((before, after)) = input.split_once('\\') {
        output.push_str(before);
        let mut after = after.chars();
        let (escape, after) = match after.next() {
            Some('u') => read_hex_char::<4>(after.as_str())?,
            Some('U') => read_hex_char::<8>(after.as_str())?,
            Some(_) => {
                return Err(
                    "IRIs are only allowed to contain escape sequences \\uXXXX and \\UXXXXXXXX",
                );
            }
            None => return Err("IRIs are not allowed to end with a '\'"),
        };
        output.push(escape);
        input = after;
    }
    output.push_str(input);
    Ok(output)
}

pub(crate) fn unescape_string(mut input: &str) -> Result<String, &'static str> {
    let mut output = String::with_capacity(input.len());
    while let Some((before, after)) = input.split_once('\\') {
        output.push_str(before);
        let mut after = after.chars();
        let (escape, after) = match after.next() {
            Some('t') => ('\u{0009}', after.as_str()),
            Some('b') => ('\u{0008}', after.as_str()),
            Some('n') => ('\u{000A}', after.as_str()),
            Some('r') => ('\u{000D}', after.as_str()),
            Some('f') => ('\u{000C}', after.as_str()),
            Some('"') => ('\u{0022}', after.as_str()),
            Some('\'') => ('\u{0027}', after.as_str()),
            Some('\\') => ('\u{005C}', after.as_str()),
            Some('u') => read_hex_char::<4>(after.as_str())?,
            Some('U') => read_hex_char::<8>(after.as_str())?,
            Some(_) => return Err("The character that can be escaped in strings are tbnrf\"'\\"),
            None => return Err("strings are not allowed to end with a '\'"),
        };
        output.push(escape);
        input = after;
    }
    output.push_str(input);
    Ok(output)
}

/// Removes the `\` of the escape sequences of a local name.
pub(crate) fn unescape_pn_local(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for chunk in input.split('\\') {
        output.push_str(chunk);
    }
    output
}

fn read_hex_char<const SIZE: usize>(input: &str) -> Result<(char, &str), &'static str> {
    if let Some(escape) = input.get(..SIZE) {
        if let Some(char) = u32::from_str_radix(escape, 16)
            .ok()
            .and_then(char::from_u32)
        {
            Ok((char, &input[SIZE..]))
        } else {
            Err("\\u escape sequence should be followed by hexadecimal digits")
        }
    } else {
        Err("\\u escape sequence should be followed by hexadecimal digits")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_names() {
        assert_eq!("SPARQL".parse::<QueryLanguage>().ok(), Some(QueryLanguage::Sparql));
        assert_eq!("serql".parse::<QueryLanguage>().ok(), Some(QueryLanguage::Serql));
        assert!("sql".parse::<QueryLanguage>().is_err());
    }

    #[test]
    fn unescape() {
        assert_eq!(unescape_string(r"a\tbA"), Ok("a\tbA".to_owned()));
        assert!(unescape_string(r"a\q").is_err());
        assert_eq!(unescape_iriref(r"http://a/B"), Ok("http://a/B".to_owned()));
        assert_eq!(unescape_pn_local(r"a\.b"), "a.b");
    }

    #[test]
    fn deferred_errors_keep_the_first() {
        let mut state = ParserState::new(LineIndex::new("q", "x"), None, PrefixTable::new());
        state.defer(SemanticError::new(None, "first"));
        state.defer(SemanticError::new(None, "second"));
        assert_eq!(
            state.error.take().map(|e| e.to_string()),
            Some("first".to_owned())
        );
    }

    #[test]
    fn graph_sets_only_free_contexts() {
        let p = |context: Node| {
            Node::statement_pattern(context, Node::var("s"), Node::var("p"), Node::var("o"))
        };
        let group = GroupPattern::from_patterns(vec![p(Node::joker()), p(Node::var("inner"))])
            .in_graph(&Node::var("g"));
        let relation = group.into_relation();
        assert_eq!(relation.children[0].children[0], Node::var("g"));
        assert_eq!(relation.children[1].children[0], Node::var("inner"));
    }
}
