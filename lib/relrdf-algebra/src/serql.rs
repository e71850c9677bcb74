#![allow(clippy::ignored_unit_patterns)]
//! SerQL grammar.
//!
//! Path expressions are translated the SerQL way: every node of a node list is matched
//! independently, so the variables of the same list must bind different values.

use crate::error::NotSupportedError;
use crate::extents::Extents;
use crate::node::{Node, NodeKind};
use crate::parser::{
    GroupPattern, ParserState, SelectParts, SetOperator, build_select, fold_set_operations,
    unescape_iriref, unescape_pn_local, unescape_string,
};
use peg::parser;
use peg::str::LineCol;
use relrdf_model::vocab::xsd;
use relrdf_model::{Literal, Uri};
use std::str::FromStr;

pub(crate) fn parse(
    query: &str,
    state: &mut ParserState,
) -> Result<Node, peg::error::ParseError<LineCol>> {
    parser::QueryUnit(query, state)
}

/// The content of a `{...}` node of a path expression.
struct NodeList {
    nodes: Vec<Node>,
    /// Patterns of reified statements used as nodes.
    patterns: Vec<Node>,
}

impl NodeList {
    /// Pairwise difference of the variables of the list.
    fn independence_conditions(&self) -> Vec<Node> {
        let variables: Vec<&Node> = self.nodes.iter().filter(|n| n.var_name().is_some()).collect();
        let mut conditions = Vec::new();
        for (i, a) in variables.iter().enumerate() {
            for b in &variables[i + 1..] {
                conditions.push(Node::different((*a).clone(), (*b).clone()));
            }
        }
        conditions
    }
}

enum PathStep {
    /// Continues from the objects of the previous edge.
    Chain(Node, NodeList),
    /// Starts again from the subjects of the previous edge.
    Branch(Node, NodeList),
}

fn build_path(head: NodeList, steps: Vec<PathStep>) -> GroupPattern {
    fn add_list(group: &mut GroupPattern, list: &NodeList) {
        for condition in list.independence_conditions() {
            group.push_filter(condition);
        }
        group.merge(GroupPattern::from_patterns(list.patterns.clone()));
    }

    let mut group = GroupPattern::default();
    add_list(&mut group, &head);
    let mut subjects = head.nodes.clone();
    let mut objects = head.nodes;
    for step in steps {
        let (predicate, list) = match step {
            PathStep::Chain(predicate, list) => {
                subjects = objects;
                (predicate, list)
            }
            PathStep::Branch(predicate, list) => (predicate, list),
        };
        add_list(&mut group, &list);
        let mut patterns = Vec::with_capacity(subjects.len() * list.nodes.len());
        for subject in &subjects {
            for object in &list.nodes {
                patterns.push(Node::statement_pattern(
                    Node::joker(),
                    subject.clone(),
                    predicate.clone(),
                    object.clone(),
                ));
            }
        }
        group.merge(GroupPattern::from_patterns(patterns));
        objects = list.nodes;
    }
    group
}

fn comparison_kind(operator: &str) -> NodeKind {
    match operator {
        "=" => NodeKind::Equal,
        "!=" => NodeKind::Different,
        "<" => NodeKind::LessThan,
        "<=" => NodeKind::LessThanOrEqual,
        ">" => NodeKind::GreaterThan,
        _ => NodeKind::GreaterThanOrEqual,
    }
}

parser! {
    grammar parser(state: &mut ParserState) for str {
        pub rule QueryUnit() -> Node = _ q:Query() _ NamespaceDeclarations()? _ { q }

        rule Query() -> Node = UnsupportedQuery() / SetQuery()

        rule UnsupportedQuery() -> Node = s:position!() kw("construct") e:position!() [_]* {
            let extents = state.extents(s, e);
            state.defer(NotSupportedError::new(Some(extents), "CONSTRUCT queries are not supported"));
            Node::product(Vec::new())
        }

        rule SetQuery() -> Node = first:QueryTerm() _ rest:SetQuery_item()* {
            fold_set_operations(state, first, rest)
        }
        rule SetQuery_item() -> (SetOperator, Extents, Node) = s:position!() o:SetOperator() e:position!() _ q:QueryTerm() _ {
            (o, state.extents(s, e), q)
        }
        rule SetOperator() -> SetOperator =
            kw("union") { SetOperator::Union } /
            kw("intersect") { SetOperator::Intersection } /
            kw("minus") { SetOperator::Difference }
        rule QueryTerm() -> Node = "(" _ q:SetQuery() _ ")" { q } / SelectQuery()

        rule SelectQuery() -> Node = s:position!() kw("select") _ d:SelectQuery_distinct() _ p:Projection() e:position!() _ kw("from") _ f:(FromItem() ++ (_ "," _)) _ w:WhereClause()? _ l:LimitOffset()? {
            let mut pattern = GroupPattern::default();
            for item in f {
                pattern.merge(item);
            }
            if let Some(condition) = w {
                pattern.push_filter(condition);
            }
            let (offset, limit) = l.unwrap_or((None, None));
            let extents = state.extents(s, e);
            build_select(state, SelectParts {
                distinct: d,
                projection: p,
                pattern,
                order: Vec::new(),
                offset,
                limit,
                extents,
            })
        }
        rule SelectQuery_distinct() -> bool =
            kw("distinct") { true } /
            kw("reduced") { false } /
            { false }
        rule Projection() -> Option<Vec<Node>> =
            "*" { None } /
            v:(Var() ++ (_ "," _)) { Some(v) }

        rule WhereClause() -> Node = kw("where") _ b:BooleanExpression() { b }

        rule LimitOffset() -> (Option<u64>, Option<u64>) =
            l:Limit() _ o:Offset()? { (o, Some(l)) } /
            o:Offset() _ l:Limit()? { (Some(o), l) }
        rule Limit() -> u64 = kw("limit") _ l:$(['0'..='9']+) {?
            u64::from_str(l).map_err(|_| "The query limit should be a non negative integer")
        }
        rule Offset() -> u64 = kw("offset") _ o:$(['0'..='9']+) {?
            u64::from_str(o).map_err(|_| "The query offset should be a non negative integer")
        }

        rule FromItem() -> GroupPattern =
            kw("context") _ c:ContextNode() _ p:PathExpression() { p.in_graph(&c) } /
            PathExpression()
        rule ContextNode() -> Node = UriNode() / Var()

        rule PathExpression() -> GroupPattern =
            "[" _ p:(PathExpression() ++ (_ "," _)) _ w:WhereClause()? _ "]" {
                let mut group = GroupPattern::default();
                for item in p {
                    group.merge(item);
                }
                if let Some(condition) = w {
                    group.push_filter(condition);
                }
                group.into_optional()
            } /
            Path()

        rule Path() -> GroupPattern = head:NodeList() first:Path_edge() rest:Path_step()* {
            let mut steps = vec![PathStep::Chain(first.0, first.1)];
            steps.extend(rest);
            build_path(head, steps)
        }
        rule Path_step() -> PathStep =
            _ ";" e:Path_edge() { PathStep::Branch(e.0, e.1) } /
            e:Path_edge() { PathStep::Chain(e.0, e.1) }
        rule Path_edge() -> (Node, NodeList) = _ p:Edge() _ n:NodeList() { (p, n) }

        rule Edge() -> Node = UriNode() / Var()

        rule NodeList() -> NodeList = s:position!() "{" _ items:(NodeList_item() ** (_ "," _)) _ "}" e:position!() {
            let mut nodes = Vec::with_capacity(items.len().max(1));
            let mut patterns = Vec::new();
            for (node, pattern) in items {
                nodes.push(node);
                patterns.extend(pattern);
            }
            if nodes.is_empty() {
                let name = state.fresh_variable("anon");
                nodes.push(Node::var(name).with_extents(state.extents(s, e)));
            }
            NodeList { nodes, patterns }
        }
        rule NodeList_item() -> (Node, Option<Node>) =
            s:position!() "{" _ subject:Value() _ "}" _ predicate:Edge() _ "{" _ object:Value() _ "}" e:position!() {
                let name = state.fresh_variable("stmt");
                let statement = Node::var(name).with_extents(state.extents(s, e));
                let pattern = Node::reif_stmt_pattern(Node::joker(), statement.clone(), subject, predicate, object);
                (statement, Some(pattern))
            } /
            v:Value() { (v, None) }

        rule Value() -> Node = UriNode() / LiteralNode() / Var()

        rule BooleanExpression() -> Node = e:(AndExpression() **<1,> (_ kw("or") _)) { Node::or_all(e) }

        rule AndExpression() -> Node = e:(NotExpression() **<1,> (_ kw("and") _)) { Node::and_all(e) }

        rule NotExpression() -> Node =
            s:position!() kw("not") _ b:NotExpression() {
                let mut node = Node::not(b);
                node.set_start(&state.extents(s, s + 3));
                node
            } /
            BooleanPrimary()

        rule BooleanPrimary() -> Node = s:position!() b:BooleanPrimary_inner() e:position!() {
            b.with_extents(state.extents(s, e))
        }
        rule BooleanPrimary_inner() -> Node =
            "(" _ b:BooleanExpression() _ ")" { b } /
            kw("true") { Node::and_all(Vec::new()) } /
            kw("false") { Node::or_all(Vec::new()) } /
            kw("isResource") _ "(" _ v:Value() _ ")" {
                Node::or_all(vec![
                    Node::new(NodeKind::IsUri, vec![v.clone()]),
                    Node::new(NodeKind::IsBlank, vec![v]),
                ])
            } /
            kw("isURI") _ "(" _ v:Value() _ ")" { Node::new(NodeKind::IsUri, vec![v]) } /
            kw("isBNode") _ "(" _ v:Value() _ ")" { Node::new(NodeKind::IsBlank, vec![v]) } /
            kw("isLiteral") _ "(" _ v:Value() _ ")" { Node::new(NodeKind::IsLiteral, vec![v]) } /
            a:Value() _ o:$("=" / "!=" / "<=" / ">=" / "<" / ">") _ b:Value() {
                Node::new(comparison_kind(o), vec![a, b])
            }

        rule NamespaceDeclarations() = kw("using") _ kw("namespace") _ NamespaceDeclaration() ++ (_ "," _)
        rule NamespaceDeclaration() = s:position!() p:$(PN_PREFIX() / "_") e:position!() _ "=" _ n:IRIREF() {
            let extents = state.extents(s, e);
            state.declare_prefix(p, n.into_string(), extents)
        }

        rule Var() -> Node = s:position!() !Keyword() v:$(['a'..='z' | 'A'..='Z' | '_'] IdentifierChar()*) e:position!() {
            Node::var(v).with_extents(state.extents(s, e))
        }

        rule UriNode() -> Node = s:position!() u:UriNode_inner() e:position!() {
            u.with_extents(state.extents(s, e))
        }
        rule UriNode_inner() -> Node =
            u:IRIREF() { Node::uri(u) } /
            QName()

        rule QName() -> Node = ns:$(PN_PREFIX()?) ":" local:$(PN_LOCAL())? {
            Node::qname(ns, unescape_pn_local(local.unwrap_or_default()))
        }

        rule LiteralNode() -> Node = s:position!() l:LiteralNode_inner() e:position!() {
            l.with_extents(state.extents(s, e))
        }
        rule LiteralNode_inner() -> Node =
            value:String() "^^" datatype:UriNode() { Node::typed_literal(value, datatype) } /
            value:String() "@" language:$(['a' ..= 'z' | 'A' ..= 'Z']+ ("-" ['a' ..= 'z' | 'A' ..= 'Z' | '0' ..= '9']+)*) {?
                Literal::new_language_tagged_literal(value, language)
                    .map(Node::literal)
                    .map_err(|_| "language tag parsing failed")
            } /
            value:String() { Node::literal(Literal::new_simple_literal(value)) } /
            d:$(['+' | '-']? ['0'..='9']* "." ['0'..='9']+) { Node::literal(Literal::new_typed_literal(d, xsd::DECIMAL)) } /
            i:$(['+' | '-']? ['0'..='9']+) { Node::literal(Literal::new_typed_literal(i, xsd::INTEGER)) }

        rule String() -> String = "\"" l:$((String_simple_char() / ECHAR() / UCHAR())*) "\"" {?
             unescape_string(l)
        }
        rule String_simple_char() = !['\u{22}' | '\u{5C}' | '\u{0A}' | '\u{0D}'] [_]

        rule IRIREF() -> Uri = "<" i:$((!['>'] [_])*) ">" {?
            state.parse_iri(unescape_iriref(i)?)
        }

        rule Keyword() = (
            kw("select") / kw("construct") / kw("from") / kw("where") / kw("limit") / kw("offset") /
            kw("using") / kw("namespace") / kw("context") / kw("distinct") / kw("reduced") /
            kw("union") / kw("intersect") / kw("minus") / kw("and") / kw("or") / kw("not") /
            kw("true") / kw("false") / kw("isResource") / kw("isURI") / kw("isBNode") / kw("isLiteral")
        )

        rule IdentifierChar() = ['a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-']

        rule UCHAR() = "\\u" HEX() HEX() HEX() HEX() / "\\U" HEX() HEX() HEX() HEX() HEX() HEX() HEX() HEX()

        rule ECHAR() = "\\" ['t' | 'b' | 'n' | 'r' | 'f' | '"' |'\'' | '\\']

        rule PN_CHARS_BASE() = ['A' ..= 'Z' | 'a' ..= 'z' | '\u{00C0}'..='\u{00D6}' | '\u{00D8}'..='\u{00F6}' | '\u{00F8}'..='\u{02FF}' | '\u{0370}'..='\u{037D}' | '\u{037F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}' | '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}' | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}']

        rule PN_CHARS_U() = ['_'] / PN_CHARS_BASE()

        rule PN_CHARS() = ['-' | '0' ..= '9' | '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}'] / PN_CHARS_U()

        rule PN_PREFIX() = PN_CHARS_BASE() PN_CHARS()* ("."+ PN_CHARS()+)*

        rule PN_LOCAL() = (PN_CHARS_U() / ['0'..='9'] / PLX()) (PN_CHARS() / PLX())* (['.']+ (PN_CHARS() / PLX())+)?

        rule PLX() = PERCENT() / PN_LOCAL_ESC()

        rule PERCENT() = ['%'] HEX() HEX()

        rule HEX() = ['0' ..= '9' | 'A' ..= 'F' | 'a' ..= 'f']

        rule PN_LOCAL_ESC() = ['\\'] ['_' | '~' | '.' | '-' | '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '=' | '/' | '?' | '#' | '@' | '%']

        //space
        rule _() = quiet! { ([' ' | '\t' | '\n' | '\r'] / comment())* }

        //comment
        rule comment() = quiet! { ['#'] (!['\r' | '\n'] [_])* }

        rule kw(literal: &'static str) = i(literal) !IdentifierChar()

        rule i(literal: &'static str) = input: $([_]*<{literal.len()}>) {?
            if input.eq_ignore_ascii_case(literal) {
                Ok(())
            } else {
                Err(literal)
            }
        }
    }
}
