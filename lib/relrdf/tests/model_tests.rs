#![cfg(test)]
#![allow(clippy::panic)]

use relrdf::sinks::Sink;
use relrdf::{ModelBase, ModelConfig, ModelKind, QueryError, QueryLanguage};
use relrdf_model::vocab::{relrdf as vocab, xsd};
use relrdf_model::{Literal, Term, Triple, Uri};

fn ex(local: &str) -> Uri {
    Uri::new_unchecked(format!("http://example.com/{local}"))
}

fn version(local: u32) -> Term {
    Uri::new_unchecked(format!("{}{local}", vocab::VERSION.as_str())).into()
}

fn load(modelbase: &ModelBase, version: u32, triples: &[Triple]) {
    let mut sink = modelbase.version_sink(version).unwrap();
    for triple in triples {
        sink.triple(triple).unwrap();
    }
    sink.close().unwrap();
}

/// Version 1: `a p "x"`, `b p "y"`. Version 2: `a p "x"`, `c p "z"`.
fn modelbase() -> ModelBase {
    let modelbase = ModelBase::open_in_memory().unwrap();
    load(
        &modelbase,
        1,
        &[
            Triple::new(ex("a"), ex("p"), Literal::from("x")),
            Triple::new(ex("b"), ex("p"), Literal::from("y")),
        ],
    );
    load(
        &modelbase,
        2,
        &[
            Triple::new(ex("a"), ex("p"), Literal::from("x")),
            Triple::new(ex("c"), ex("p"), Literal::from("z")),
        ],
    );
    modelbase
}

fn query(
    modelbase: &ModelBase,
    config: &ModelConfig,
    language: QueryLanguage,
    query: &str,
) -> Result<Vec<Vec<Option<Term>>>, QueryError> {
    let model = modelbase.model(config).unwrap();
    model.query(language, query)?.collect()
}

fn sparql(modelbase: &ModelBase, config: &ModelConfig, text: &str) -> Vec<Vec<Option<Term>>> {
    query(modelbase, config, QueryLanguage::Sparql, text).unwrap()
}

fn row(terms: impl IntoIterator<Item = Term>) -> Vec<Option<Term>> {
    terms.into_iter().map(Some).collect()
}

#[test]
fn single_version() {
    let modelbase = modelbase();
    let rows = sparql(
        &modelbase,
        &ModelConfig::single_version(1),
        "SELECT ?s ?o WHERE { ?s <http://example.com/p> ?o } ORDER BY ?s",
    );
    assert_eq!(
        rows,
        [
            row([ex("a").into(), Literal::from("x").into()]),
            row([ex("b").into(), Literal::from("y").into()]),
        ]
    );
}

#[test]
fn all_versions() {
    let modelbase = modelbase();
    let rows = sparql(
        &modelbase,
        &ModelConfig::new(ModelKind::AllVersions),
        "SELECT ?g ?s WHERE { GRAPH ?g { ?s <http://example.com/p> \"x\" } } ORDER BY ?g",
    );
    assert_eq!(
        rows,
        [row([version(1), ex("a").into()]), row([version(2), ex("a").into()])]
    );
}

#[test]
fn graph_constant_selects_a_version() {
    let modelbase = modelbase();
    let rows = sparql(
        &modelbase,
        &ModelConfig::new(ModelKind::AllVersions),
        "SELECT ?s WHERE { GRAPH relrdf:version2 { ?s ?p ?o } } ORDER BY ?s",
    );
    assert_eq!(rows, [row([ex("a").into()]), row([ex("c").into()])]);
    let rows = sparql(
        &modelbase,
        &ModelConfig::new(ModelKind::AllVersions),
        "SELECT ?s WHERE { GRAPH <http://example.org/other> { ?s ?p ?o } }",
    );
    assert!(rows.is_empty());
}

#[test]
fn version_uris_match_exactly() {
    let modelbase = modelbase();
    let config = ModelConfig::new(ModelKind::AllVersions);
    let select = |graph: &str| {
        sparql(
            &modelbase,
            &config,
            &format!("SELECT DISTINCT ?g WHERE {{ GRAPH ?g {{ ?s ?p ?o }} FILTER(?g = relrdf:{graph}) }}"),
        )
    };
    assert_eq!(select("version1"), [row([version(1)])]);
    assert!(select("version01").is_empty());
    assert!(select("version1.0").is_empty());
    assert!(
        sparql(
            &modelbase,
            &config,
            "SELECT ?s WHERE { GRAPH relrdf:version02 { ?s ?p ?o } }",
        )
        .is_empty()
    );
}

#[test]
fn two_way_comparison() {
    let modelbase = modelbase();
    let config = ModelConfig::two_way(1, 2);
    let select = |context: &str| {
        sparql(
            &modelbase,
            &config,
            &format!("SELECT ?s WHERE {{ GRAPH relrdf:{context} {{ ?s ?p ?o }} }}"),
        )
    };
    assert_eq!(select("compA"), [row([ex("b").into()])]);
    assert_eq!(select("compB"), [row([ex("c").into()])]);
    assert_eq!(select("compAB"), [row([ex("a").into()])]);
    assert_eq!(select("compBA"), [row([ex("a").into()])]);
    let mut model_a = select("modelA");
    model_a.sort_by_key(|r| format!("{r:?}"));
    assert_eq!(model_a, [row([ex("a").into()]), row([ex("b").into()])]);
}

#[test]
fn two_way_shared_context_alias_in_filters() {
    let modelbase = modelbase();
    let config = ModelConfig::two_way(1, 2);
    for context in ["compAB", "compBA"] {
        let rows = sparql(
            &modelbase,
            &config,
            &format!("SELECT ?s WHERE {{ GRAPH ?g {{ ?s ?p ?o }} FILTER(?g = relrdf:{context}) }}"),
        );
        assert_eq!(rows, [row([ex("a").into()])], "{context}");
    }
}

#[test]
fn two_way_variable_context() {
    let modelbase = modelbase();
    let rows = sparql(
        &modelbase,
        &ModelConfig::two_way(1, 2),
        "SELECT ?g ?s WHERE { GRAPH ?g { ?s ?p ?o } } ORDER BY ?s",
    );
    let comp = |label: &str| -> Term {
        Uri::new_unchecked(format!("{}{label}", vocab::COMP.as_str())).into()
    };
    assert_eq!(
        rows,
        [
            row([comp("AB"), ex("a").into()]),
            row([comp("A"), ex("b").into()]),
            row([comp("B"), ex("c").into()]),
        ]
    );
}

#[test]
fn three_way_comparison() {
    let modelbase = modelbase();
    load(
        &modelbase,
        3,
        &[
            Triple::new(ex("b"), ex("p"), Literal::from("y")),
            Triple::new(ex("c"), ex("p"), Literal::from("z")),
            Triple::new(ex("d"), ex("p"), Literal::from("w")),
        ],
    );
    let config = ModelConfig::three_way(1, 2, 3);
    let select = |context: &str| {
        sparql(
            &modelbase,
            &config,
            &format!("SELECT ?s WHERE {{ GRAPH relrdf:{context} {{ ?s ?p ?o }} }}"),
        )
    };
    assert_eq!(select("compAB"), [row([ex("a").into()])]);
    assert_eq!(select("compAC"), [row([ex("b").into()])]);
    assert_eq!(select("compBC"), [row([ex("c").into()])]);
    assert_eq!(select("compC"), [row([ex("d").into()])]);
    assert!(select("compABC").is_empty());
    assert!(select("compA").is_empty());
}

#[test]
fn comparison_tables_are_released() {
    let modelbase = modelbase();
    let temporary_tables = || -> i64 {
        modelbase
            .connection()
            .unwrap()
            .query_row(
                "SELECT count(*) FROM sqlite_temp_master WHERE type = 'table' AND name LIKE 'comparison_%'",
                [],
                |row| row.get(0),
            )
            .unwrap()
    };
    let model = modelbase.model(&ModelConfig::two_way(1, 2)).unwrap();
    assert_eq!(temporary_tables(), 1);
    drop(model);
    assert_eq!(temporary_tables(), 0);
}

#[test]
fn partially_read_results_are_dropped() {
    let modelbase = modelbase();
    let model = modelbase.model(&ModelConfig::two_way(1, 2)).unwrap();
    let mut results = model
        .query(QueryLanguage::Sparql, "SELECT ?s WHERE { ?s ?p ?o } ORDER BY ?s")
        .unwrap();
    assert_eq!(results.next().unwrap().unwrap(), row([ex("a").into()]));
    drop(results);
    drop(model);
    let remaining: i64 = modelbase
        .connection()
        .unwrap()
        .query_row(
            "SELECT count(*) FROM sqlite_temp_master WHERE type = 'table' AND name LIKE 'comparison_%'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn typed_literals_do_not_match_simple_literals() {
    let modelbase = ModelBase::open_in_memory().unwrap();
    load(
        &modelbase,
        1,
        &[Triple::new(
            ex("a"),
            ex("p"),
            Literal::new_typed_literal("1", xsd::INTEGER),
        )],
    );
    let config = ModelConfig::single_version(1);
    assert!(sparql(&modelbase, &config, "SELECT ?s WHERE { ?s <http://example.com/p> \"1\" }").is_empty());
    let rows = sparql(
        &modelbase,
        &config,
        "SELECT ?s ?o WHERE { ?s <http://example.com/p> ?o }",
    );
    assert_eq!(
        rows,
        [row([
            ex("a").into(),
            Literal::new_typed_literal("1", xsd::INTEGER).into()
        ])]
    );
    let rows = sparql(
        &modelbase,
        &config,
        "SELECT ?s WHERE { ?s <http://example.com/p> \"1\"^^<http://www.w3.org/2001/XMLSchema#integer> }",
    );
    assert_eq!(rows, [row([ex("a").into()])]);
}

/// `a p <z>`, `b p "m"`, `c p 10`, `d p 9`.
fn mixed_objects() -> ModelBase {
    let modelbase = ModelBase::open_in_memory().unwrap();
    load(
        &modelbase,
        1,
        &[
            Triple::new(ex("a"), ex("p"), ex("z")),
            Triple::new(ex("b"), ex("p"), Literal::from("m")),
            Triple::new(ex("c"), ex("p"), Literal::from(10_i64)),
            Triple::new(ex("d"), ex("p"), Literal::from(9_i64)),
        ],
    );
    modelbase
}

#[test]
fn orderings_do_not_compare_across_types() {
    let modelbase = mixed_objects();
    let config = ModelConfig::single_version(1);
    let rows = sparql(
        &modelbase,
        &config,
        "SELECT ?s WHERE { ?s <http://example.com/p> ?o FILTER(?o < \"zzz\") }",
    );
    assert_eq!(rows, [row([ex("b").into()])]);
    let rows = sparql(
        &modelbase,
        &config,
        "SELECT ?s WHERE { ?s <http://example.com/p> ?o FILTER(?o > 9) }",
    );
    assert_eq!(rows, [row([ex("c").into()])]);
    let rows = sparql(
        &modelbase,
        &config,
        "SELECT ?s WHERE { ?s <http://example.com/p> ?o FILTER(?o <= 10) } ORDER BY ?s",
    );
    assert_eq!(rows, [row([ex("c").into()]), row([ex("d").into()])]);
    let sql = modelbase
        .model(&config)
        .unwrap()
        .query_sql(
            QueryLanguage::Sparql,
            "SELECT ?s WHERE { ?s <http://example.com/p> ?o FILTER(?o >= 9) }",
        )
        .unwrap();
    assert!(sql.contains("object_type"), "{sql}");
}

#[test]
fn numbers_sort_by_value() {
    let modelbase = mixed_objects();
    let rows = sparql(
        &modelbase,
        &ModelConfig::single_version(1),
        "SELECT ?o WHERE { ?s <http://example.com/p> ?o FILTER(isLiteral(?o)) } ORDER BY DESC(?o)",
    );
    assert_eq!(
        rows,
        [
            row([Literal::from(10_i64).into()]),
            row([Literal::from(9_i64).into()]),
            row([Literal::from("m").into()]),
        ]
    );
}

#[test]
fn unbound_variable() {
    let modelbase = modelbase();
    let error = query(
        &modelbase,
        &ModelConfig::single_version(1),
        QueryLanguage::Sparql,
        "SELECT ?x WHERE { ?s ?p ?o }",
    )
    .unwrap_err();
    let QueryError::Semantic(error) = error else {
        panic!("expecting a semantic error, found {error:?}");
    };
    assert_eq!(error.message(), "Unbound variable ?x");
}

#[test]
fn set_operation_arity_mismatch() {
    let modelbase = modelbase();
    let error = query(
        &modelbase,
        &ModelConfig::single_version(1),
        QueryLanguage::Sparql,
        "{ SELECT ?x WHERE { ?x ?p ?y } }\nUNION\n{ SELECT ?x ?y WHERE { ?x ?p ?y } }",
    )
    .unwrap_err();
    assert!(matches!(error, QueryError::Semantic(_)), "{error:?}");
    assert!(error.extents().is_some());
}

#[test]
fn set_operations() {
    let modelbase = modelbase();
    let rows = sparql(
        &modelbase,
        &ModelConfig::new(ModelKind::AllVersions),
        "{ SELECT ?s WHERE { GRAPH relrdf:version1 { ?s ?p ?o } } }
         MINUS
         { SELECT ?s WHERE { GRAPH relrdf:version2 { ?s ?p ?o } } }",
    );
    assert_eq!(rows, [row([ex("b").into()])]);
    let mut rows = sparql(
        &modelbase,
        &ModelConfig::new(ModelKind::AllVersions),
        "{ SELECT ?s WHERE { GRAPH relrdf:version1 { ?s ?p ?o } } }
         UNION
         { SELECT ?s WHERE { GRAPH relrdf:version2 { ?s ?p ?o } } }",
    );
    rows.sort_by_key(|r| format!("{r:?}"));
    assert_eq!(
        rows,
        [row([ex("a").into()]), row([ex("b").into()]), row([ex("c").into()])]
    );
}

#[test]
fn modifiers_and_filters() {
    let modelbase = modelbase();
    let config = ModelConfig::new(ModelKind::AllVersions);
    let rows = sparql(
        &modelbase,
        &config,
        "SELECT DISTINCT ?s WHERE { GRAPH ?g { ?s ?p ?o } } ORDER BY DESC(?s) LIMIT 2",
    );
    assert_eq!(rows, [row([ex("c").into()]), row([ex("b").into()])]);
    let rows = sparql(
        &modelbase,
        &config,
        "SELECT DISTINCT ?s WHERE { GRAPH ?g { ?s ?p ?o } FILTER(?o != \"x\") } ORDER BY ?s OFFSET 1",
    );
    assert_eq!(rows, [row([ex("c").into()])]);
}

#[test]
fn stored_prefixes() {
    let modelbase = modelbase();
    modelbase.add_prefix("ex", "http://example.com/").unwrap();
    let rows = sparql(
        &modelbase,
        &ModelConfig::single_version(2),
        "SELECT ?o WHERE { ex:c ex:p ?o }",
    );
    assert_eq!(rows, [row([Literal::from("z").into()])]);
}

#[test]
fn serql_query() {
    let modelbase = modelbase();
    let rows = query(
        &modelbase,
        &ModelConfig::two_way(1, 2),
        QueryLanguage::Serql,
        "SELECT s, o FROM CONTEXT relrdf:compB {s} ex:p {o} USING NAMESPACE ex = <http://example.com/>",
    )
    .unwrap();
    assert_eq!(rows, [row([ex("c").into(), Literal::from("z").into()])]);
}

#[test]
fn meta_version() {
    let modelbase = modelbase();
    let config = ModelConfig::new(ModelKind::MetaVersion);
    let rows = sparql(
        &modelbase,
        &config,
        "SELECT ?v ?st WHERE { ?v relrdf:versionContainsStmt ?st }",
    );
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.iter().all(|t| matches!(t, Some(Term::Uri(_))))));
    let rows = sparql(
        &modelbase,
        &config,
        "SELECT ?st WHERE { ?st rdf:type rdf:Statement ; rdf:subject <http://example.com/c> }",
    );
    assert_eq!(rows.len(), 1);
    let Some(Some(Term::Uri(statement))) = rows[0].first() else {
        panic!("statements are URIs");
    };
    assert!(statement.as_str().starts_with(vocab::STMT.as_str()));
}

#[test]
fn meta_version_reified_patterns() {
    let modelbase = modelbase();
    let rows = query(
        &modelbase,
        &ModelConfig::new(ModelKind::MetaVersion),
        QueryLanguage::Serql,
        "SELECT v FROM {v} relrdf:versionContainsStmt {{s} ex:p {\"x\"}} USING NAMESPACE ex = <http://example.com/>",
    )
    .unwrap();
    let mut versions: Vec<_> = rows.into_iter().flatten().flatten().collect();
    versions.sort_by_key(ToString::to_string);
    assert_eq!(versions, [version(1), version(2)]);
}

#[test]
fn compiled_sql() {
    let modelbase = modelbase();
    let model = modelbase.model(&ModelConfig::single_version(1)).unwrap();
    let sql = model
        .query_sql(QueryLanguage::Sparql, "SELECT ?s WHERE { ?s ?p ?o }")
        .unwrap();
    assert!(sql.starts_with("SELECT"), "{sql}");
    assert!(sql.contains("version_statement"), "{sql}");
}

#[test]
fn debug_model_base_has_no_models() {
    let modelbase = relrdf::open_modelbase(&relrdf::ModelBaseConfig::new("debug")).unwrap();
    assert!(modelbase.model(&ModelConfig::single_version(1)).is_err());
}
