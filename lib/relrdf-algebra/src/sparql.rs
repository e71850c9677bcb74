#![allow(clippy::ignored_unit_patterns)]
//! SPARQL grammar.

use crate::error::NotSupportedError;
use crate::extents::Extents;
use crate::node::{Function, Node, NodeKind, SortKey};
use crate::parser::{
    GroupPattern, ParserState, SelectParts, SetOperator, build_select, fold_set_operations,
    unescape_iriref, unescape_pn_local, unescape_string,
};
use peg::parser;
use peg::str::LineCol;
use relrdf_model::vocab::{rdf, xsd};
use relrdf_model::{Literal, Uri};
use std::str::FromStr;

pub(crate) fn parse(
    query: &str,
    state: &mut ParserState,
) -> Result<Node, peg::error::ParseError<LineCol>> {
    parser::QueryUnit(query, state)
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

/// The statement patterns of a subject with its property list.
fn patterns_of(subject: &Node, properties: Vec<(Node, Vec<(Node, Vec<Node>)>)>) -> Vec<Node> {
    let mut patterns = Vec::new();
    for (predicate, objects) in properties {
        for (object, nested) in objects {
            patterns.push(Node::statement_pattern(
                Node::joker(),
                subject.clone(),
                predicate.clone(),
                object,
            ));
            patterns.extend(nested);
        }
    }
    patterns
}

fn not_supported(state: &mut ParserState, extents: Extents, message: impl Into<String>) {
    state.defer(NotSupportedError::new(Some(extents), message));
}

parser! {
    //See https://www.w3.org/TR/sparql11-query/#sparqlGrammar
    grammar parser(state: &mut ParserState) for str {
        pub rule QueryUnit() -> Node = _ Prologue() _ q:Query() _ { q }

        rule Query() -> Node = SetQuery() / SelectQuery() / UnsupportedQuery()

        rule Prologue() = (BaseDecl() _ / PrefixDecl() _)* {}

        rule BaseDecl() = i("BASE") _ i:IRIREF() {? state.set_base_iri(i) }

        rule PrefixDecl() = s:position!() i("PREFIX") _ ns:PNAME_NS() _ i:IRIREF() e:position!() {
            let extents = state.extents(s, e);
            state.declare_prefix(ns, i.into_string(), extents)
        }

        rule UnsupportedQuery() -> Node = s:position!() k:$(i("ASK") / i("CONSTRUCT") / i("DESCRIBE")) e:position!() [_]* {
            let extents = state.extents(s, e);
            not_supported(state, extents, format!("{} queries are not supported", k.to_ascii_uppercase()));
            Node::product(Vec::new())
        }

        rule SetQuery() -> Node = first:SubQuery() _ rest:SetQuery_item()+ {
            fold_set_operations(state, first, rest)
        }
        rule SetQuery_item() -> (SetOperator, Extents, Node) = s:position!() o:SetOperator() e:position!() _ q:SubQuery() _ {
            (o, state.extents(s, e), q)
        }
        rule SetOperator() -> SetOperator =
            i("UNION") { SetOperator::Union } /
            i("INTERSECT") { SetOperator::Intersection } /
            i("MINUS") { SetOperator::Difference }
        rule SubQuery() -> Node = "{" _ q:SelectQuery() _ "}" { q }

        rule SelectQuery() -> Node = s:position!() i("SELECT") _ d:SelectClause_option() _ p:SelectClause_variables() e:position!() _ i("WHERE")? _ g:GroupGraphPattern() _ o:OrderClause()? _ l:LimitOffsetClauses()? {
            let (offset, limit) = l.unwrap_or((None, None));
            let extents = state.extents(s, e);
            build_select(state, SelectParts {
                distinct: d,
                projection: p,
                pattern: g,
                order: o.unwrap_or_default(),
                offset,
                limit,
                extents,
            })
        }
        rule SelectClause_option() -> bool =
            i("DISTINCT") { true } /
            i("REDUCED") { false } /
            { false }
        rule SelectClause_variables() -> Option<Vec<Node>> =
            "*" { None } /
            p:(Var() ++ _) { Some(p) }

        rule OrderClause() -> Vec<(SortKey, Extents)> = i("ORDER") _ i("BY") _ c:(OrderCondition() ++ _) { c }
        rule OrderCondition() -> (SortKey, Extents) =
            s:position!() ascending:OrderCondition_direction() _ "(" _ v:VarName() _ ")" e:position!() {
                (SortKey { column: v.into(), ascending }, state.extents(s, e))
            } /
            s:position!() v:VarName() e:position!() {
                (SortKey { column: v.into(), ascending: true }, state.extents(s, e))
            }
        rule OrderCondition_direction() -> bool = i("ASC") { true } / i("DESC") { false }

        rule LimitOffsetClauses() -> (Option<u64>, Option<u64>) =
            l:LimitClause() _ o:OffsetClause()? { (o, Some(l)) } /
            o:OffsetClause() _ l:LimitClause()? { (Some(o), l) }
        rule LimitClause() -> u64 = i("LIMIT") _ l:$(INTEGER()) {?
            u64::from_str(l).map_err(|_| "The query limit should be a non negative integer")
        }
        rule OffsetClause() -> u64 = i("OFFSET") _ o:$(INTEGER()) {?
            u64::from_str(o).map_err(|_| "The query offset should be a non negative integer")
        }

        rule GroupGraphPattern() -> GroupPattern = "{" _ p:GroupGraphPatternSub() _ "}" { p }

        rule GroupGraphPatternSub() -> GroupPattern = a:TriplesBlock()? _ b:GroupGraphPatternSub_item()* {
            let mut group = GroupPattern::from_patterns(a.unwrap_or_default());
            for item in b {
                group.merge(item);
            }
            group
        }
        rule GroupGraphPatternSub_item() -> GroupPattern = a:GraphPatternNotTriples() _ ("." _)? b:TriplesBlock()? _ {
            let mut group = a;
            if let Some(patterns) = b {
                group.merge(GroupPattern::from_patterns(patterns));
            }
            group
        }

        rule TriplesBlock() -> Vec<Node> = hs:TriplesBlock_inner() ++ (".") ("." _)? {
            hs.into_iter().flatten().collect()
        }
        rule TriplesBlock_inner() -> Vec<Node> = _ h:TriplesSameSubject() _ { h }

        rule GraphPatternNotTriples() -> GroupPattern = GroupOrUnionGraphPattern() / OptionalGraphPattern() / GraphGraphPattern() / Filter()

        rule OptionalGraphPattern() -> GroupPattern = i("OPTIONAL") _ p:GroupGraphPattern() { p.into_optional() }

        rule GraphGraphPattern() -> GroupPattern = i("GRAPH") _ g:VarOrIri() _ p:GroupGraphPattern() { p.in_graph(&g) }

        rule GroupOrUnionGraphPattern() -> GroupPattern = p:GroupGraphPattern() _ u:GroupOrUnionGraphPattern_item()* {
            if let Some(extents) = u.into_iter().next() {
                not_supported(state, extents, "UNION of graph patterns is not supported, use a UNION of SELECT queries");
            }
            p
        }
        rule GroupOrUnionGraphPattern_item() -> Extents = s:position!() i("UNION") e:position!() _ GroupGraphPattern() _ {
            state.extents(s, e)
        }

        rule Filter() -> GroupPattern = i("FILTER") _ c:Constraint() { GroupPattern::from_filter(c) }

        rule Constraint() -> Node = BrackettedExpression() / BuiltInCall()

        rule TriplesSameSubject() -> Vec<Node> =
            s:VarOrTerm() _ po:PropertyListNotEmpty() {
                patterns_of(&s, po)
            } /
            s:BlankNodePropertyList() _ po:PropertyList() {
                let (subject, mut patterns) = s;
                patterns.extend(patterns_of(&subject, po));
                patterns
            }

        rule PropertyList() -> Vec<(Node, Vec<(Node, Vec<Node>)>)> =
            PropertyListNotEmpty() / { Vec::new() }

        rule PropertyListNotEmpty() -> Vec<(Node, Vec<(Node, Vec<Node>)>)> = hd:PropertyListNotEmpty_item() tl:PropertyListNotEmpty_tail()* {
            let mut list = vec![hd];
            list.extend(tl.into_iter().flatten());
            list
        }
        rule PropertyListNotEmpty_tail() -> Option<(Node, Vec<(Node, Vec<Node>)>)> = ";" _ p:PropertyListNotEmpty_item()? { p }
        rule PropertyListNotEmpty_item() -> (Node, Vec<(Node, Vec<Node>)>) = p:Verb() _ o:ObjectList() _ { (p, o) }

        rule Verb() -> Node = VarOrIri() / s:position!() "a" e:position!() {
            Node::uri(rdf::TYPE).with_extents(state.extents(s, e))
        }

        rule ObjectList() -> Vec<(Node, Vec<Node>)> = o:(GraphNode() ++ ("," _)) { o }

        rule GraphNode() -> (Node, Vec<Node>) =
            t:VarOrTerm() _ { (t, Vec::new()) } /
            p:BlankNodePropertyList() _ { p }

        rule BlankNodePropertyList() -> (Node, Vec<Node>) = s:position!() "[" _ po:PropertyListNotEmpty() _ "]" e:position!() {
            let name = state.fresh_variable("anon");
            let subject = Node::var(name).with_extents(state.extents(s, e));
            let patterns = patterns_of(&subject, po);
            (subject, patterns)
        }

        rule VarOrTerm() -> Node = s:position!() t:VarOrTerm_inner() e:position!() {
            t.with_extents(state.extents(s, e))
        }
        rule VarOrTerm_inner() -> Node =
            v:VarName() { Node::var(v) } /
            GraphTerm()

        rule VarOrIri() -> Node = s:position!() t:VarOrIri_inner() e:position!() {
            t.with_extents(state.extents(s, e))
        }
        rule VarOrIri_inner() -> Node =
            v:VarName() { Node::var(v) } /
            iri()

        rule Var() -> Node = s:position!() v:VarName() e:position!() {
            Node::var(v).with_extents(state.extents(s, e))
        }
        rule VarName() -> &'input str = VAR1() / VAR2()

        rule GraphTerm() -> Node =
            iri() /
            RDFLiteral() /
            l:NumericLiteral() { Node::literal(l) } /
            l:BooleanLiteral() { Node::literal(l) } /
            BlankNode()

        rule Expression() -> Node = ConditionalOrExpression()

        rule ConditionalOrExpression() -> Node = e:(ConditionalAndExpression() **<1,> (_ "||" _)) { Node::or_all(e) }

        rule ConditionalAndExpression() -> Node = e:(RelationalExpression() **<1,> (_ "&&" _)) { Node::and_all(e) }

        rule RelationalExpression() -> Node = a:UnaryExpression() _ o:RelationalExpression_inner()? {
            match o {
                Some((kind, b)) => Node::new(kind, vec![a, b]),
                None => a,
            }
        }
        rule RelationalExpression_inner() -> (NodeKind, Node) = s:$("=" / "!=" / "<=" / ">=" / "<" / ">") _ b:UnaryExpression() {
            (comparison_kind(s), b)
        }

        rule UnaryExpression() -> Node =
            s:position!() "!" _ e:PrimaryExpression() {
                let mut node = Node::not(e);
                node.set_start(&state.extents(s, s + 1));
                node
            } /
            PrimaryExpression()

        rule PrimaryExpression() -> Node = s:position!() p:PrimaryExpression_inner() e:position!() {
            p.with_extents(state.extents(s, e))
        }
        rule PrimaryExpression_inner() -> Node =
            BrackettedExpression() /
            BuiltInCall() /
            iri() /
            RDFLiteral() /
            l:NumericLiteral() { Node::literal(l) } /
            l:BooleanLiteral() { Node::literal(l) } /
            v:VarName() { Node::var(v) }

        rule BrackettedExpression() -> Node = "(" _ e:Expression() _ ")" { e }

        rule BuiltInCall() -> Node =
            i("STRLEN") _ "(" _ e:Expression() _ ")" { Node::function_call(Function::StrLen, vec![e]) } /
            i("STR") _ "(" _ e:Expression() _ ")" { Node::function_call(Function::Str, vec![e]) } /
            i("UCASE") _ "(" _ e:Expression() _ ")" { Node::function_call(Function::UCase, vec![e]) } /
            i("LCASE") _ "(" _ e:Expression() _ ")" { Node::function_call(Function::LCase, vec![e]) } /
            i("isIRI") _ "(" _ e:Expression() _ ")" { Node::new(NodeKind::IsUri, vec![e]) } /
            i("isURI") _ "(" _ e:Expression() _ ")" { Node::new(NodeKind::IsUri, vec![e]) } /
            i("isBLANK") _ "(" _ e:Expression() _ ")" { Node::new(NodeKind::IsBlank, vec![e]) } /
            i("isLITERAL") _ "(" _ e:Expression() _ ")" { Node::new(NodeKind::IsLiteral, vec![e]) } /
            i("sameTerm") _ "(" _ a:Expression() _ "," _ b:Expression() _ ")" { Node::equal(a, b) }

        rule RDFLiteral() -> Node =
            value:String() _ "^^" _ datatype:iri() { Node::typed_literal(value, datatype) } /
            value:String() _ language:LANGTAG() {?
                Literal::new_language_tagged_literal(value, language)
                    .map(Node::literal)
                    .map_err(|_| "language tag parsing failed")
            } /
            value:String() { Node::literal(Literal::new_simple_literal(value)) }

        rule NumericLiteral() -> Literal =
            d:$(("+" / "-")? DOUBLE()) { Literal::new_typed_literal(d, xsd::DOUBLE) } /
            d:$(("+" / "-")? DECIMAL()) { Literal::new_typed_literal(d, xsd::DECIMAL) } /
            i:$(("+" / "-")? INTEGER()) { Literal::new_typed_literal(i, xsd::INTEGER) }

        rule BooleanLiteral() -> Literal =
            "true" { Literal::new_typed_literal("true", xsd::BOOLEAN) } /
            "false" { Literal::new_typed_literal("false", xsd::BOOLEAN) }

        rule String() -> String = STRING_LITERAL_LONG1() / STRING_LITERAL_LONG2() / STRING_LITERAL1() / STRING_LITERAL2()

        rule iri() -> Node = i:IRIREF() { Node::uri(i) } / PrefixedName()

        rule PrefixedName() -> Node = ns:PNAME_NS() local:$(PN_LOCAL())? {
            Node::qname(ns, unescape_pn_local(local.unwrap_or_default()))
        }

        rule BlankNode() -> Node =
            "_:" b:$((['0'..='9'] / PN_CHARS_U()) PN_CHARS()* ("."+ PN_CHARS()+)*) { Node::var(format!("_:{b}")) } /
            ANON() { Node::var(state.fresh_variable("anon")) }

        rule IRIREF() -> Uri = "<" i:$((!['>'] [_])*) ">" {?
            state.parse_iri(unescape_iriref(i)?)
        }

        rule PNAME_NS() -> &'input str = ns:$(PN_PREFIX()?) ":" {
            ns
        }

        rule VAR1() -> &'input str = "?" v:$(VARNAME()) { v }

        rule VAR2() -> &'input str = "$" v:$(VARNAME()) { v }

        rule LANGTAG() -> &'input str = "@" l:$(['a' ..= 'z' | 'A' ..= 'Z']+ ("-" ['a' ..= 'z' | 'A' ..= 'Z' | '0' ..= '9']+)*) {
            l
        }

        rule INTEGER() = ['0'..='9']+

        rule DECIMAL() = ['0'..='9']* "." ['0'..='9']+

        rule DOUBLE() = (['0'..='9']+ "." ['0'..='9']* / "." ['0'..='9']+ / ['0'..='9']+) EXPONENT()

        rule EXPONENT() = ['e' | 'E'] ['+' | '-']? ['0'..='9']+

        rule STRING_LITERAL1() -> String = "'" l:$((STRING_LITERAL1_simple_char() / ECHAR() / UCHAR())*) "'" {?
             unescape_string(l)
        }
        rule STRING_LITERAL1_simple_char() = !['\u{27}' | '\u{5C}' | '\u{0A}' | '\u{0D}'] [_]

        rule STRING_LITERAL2() -> String = "\"" l:$((STRING_LITERAL2_simple_char() / ECHAR() / UCHAR())*) "\"" {?
             unescape_string(l)
        }
        rule STRING_LITERAL2_simple_char() = !['\u{22}' | '\u{5C}' | '\u{0A}' | '\u{0D}'] [_]

        rule STRING_LITERAL_LONG1() -> String = "'''" l:$(STRING_LITERAL_LONG1_inner()*) "'''" {?
             unescape_string(l)
        }
        rule STRING_LITERAL_LONG1_inner() = ("''" / "'")? (STRING_LITERAL_LONG1_simple_char() / ECHAR() / UCHAR())
        rule STRING_LITERAL_LONG1_simple_char() = !['\'' | '\\'] [_]

        rule STRING_LITERAL_LONG2() -> String = "\"\"\"" l:$(STRING_LITERAL_LONG2_inner()*) "\"\"\"" {?
             unescape_string(l)
        }
        rule STRING_LITERAL_LONG2_inner() = ("\"\"" / "\"")? (STRING_LITERAL_LONG2_simple_char() / ECHAR() / UCHAR())
        rule STRING_LITERAL_LONG2_simple_char() = !['"' | '\\'] [_]

        rule UCHAR() = "\\u" HEX() HEX() HEX() HEX() / "\\U" HEX() HEX() HEX() HEX() HEX() HEX() HEX() HEX()

        rule ECHAR() = "\\" ['t' | 'b' | 'n' | 'r' | 'f' | '"' |'\'' | '\\']

        rule WS() = quiet! { ['\u{20}' | '\u{09}' | '\u{0D}' | '\u{0A}'] }

        rule ANON() = "[" WS()* "]"

        rule PN_CHARS_BASE() = ['A' ..= 'Z' | 'a' ..= 'z' | '\u{00C0}'..='\u{00D6}' | '\u{00D8}'..='\u{00F6}' | '\u{00F8}'..='\u{02FF}' | '\u{0370}'..='\u{037D}' | '\u{037F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}' | '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}' | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}']

        rule PN_CHARS_U() = ['_'] / PN_CHARS_BASE()

        rule VARNAME() = (['0'..='9'] / PN_CHARS_U()) (['0' ..= '9' | '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}'] / PN_CHARS_U())*

        rule PN_CHARS() = ['-' | '0' ..= '9' | '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}'] / PN_CHARS_U()

        rule PN_PREFIX() = PN_CHARS_BASE() PN_CHARS()* ("."+ PN_CHARS()+)*

        rule PN_LOCAL() = (PN_CHARS_U() / [':' | '0'..='9'] / PLX()) (PN_CHARS() / [':'] / PLX())* (['.']+ (PN_CHARS() / [':'] / PLX())+)?

        rule PLX() = PERCENT() / PN_LOCAL_ESC()

        rule PERCENT() = ['%'] HEX() HEX()

        rule HEX() = ['0' ..= '9' | 'A' ..= 'F' | 'a' ..= 'f']

        rule PN_LOCAL_ESC() = ['\\'] ['_' | '~' | '.' | '-' | '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '=' | '/' | '?' | '#' | '@' | '%']

        //space
        rule _() = quiet! { ([' ' | '\t' | '\n' | '\r'] / comment())* }

        //comment
        rule comment() = quiet! { ['#'] (!['\r' | '\n'] [_])* }

        rule i(literal: &'static str) = input: $([_]*<{literal.len()}>) {?
            if input.eq_ignore_ascii_case(literal) {
                Ok(())
            } else {
                Err(literal)
            }
        }
    }
}
