#![cfg(test)]
#![allow(clippy::panic)]

use relrdf_model::vocab::xsd;
use relrdf_model::{BlankNode, Literal, Term, Uri};
use relrdf_results::{
    QueryResultsFormat, QueryResultsParser, QueryResultsReader, QueryResultsSerializer,
};

fn sample_rows() -> Vec<Vec<Option<Term>>> {
    vec![
        vec![
            Some(Uri::new_unchecked("http://example.com/s").into()),
            Some(Literal::new_language_tagged_literal_unchecked("chat", "fr").into()),
        ],
        vec![
            Some(BlankNode::new_unchecked("b1").into()),
            Some(Literal::new_typed_literal("1.5", xsd::DECIMAL).into()),
        ],
        vec![None, Some(Literal::from("a,\"b\"").into())],
    ]
}

fn serialize(format: QueryResultsFormat) -> String {
    let serializer = QueryResultsSerializer::from_format(format);
    let mut writer = serializer
        .solutions_writer(Vec::new(), vec!["x".into(), "y".into()])
        .unwrap();
    for row in sample_rows() {
        writer.write_row(&row).unwrap();
    }
    String::from_utf8(writer.finish().unwrap()).unwrap()
}

#[test]
fn test_csv_serialization() {
    assert_eq!(
        serialize(QueryResultsFormat::Csv),
        "x,y\r\nhttp://example.com/s,chat\r\n_:b1,1.5\r\n,\"a,\"\"b\"\"\"\r\n"
    );
}

#[test]
fn test_tsv_serialization() {
    assert_eq!(
        serialize(QueryResultsFormat::Tsv),
        "?x\t?y\n<http://example.com/s>\t\"chat\"@fr\n_:b1\t1.5\n\t\"a,\\\"b\\\"\"\n"
    );
}

#[test]
fn test_json_serialization() {
    assert_eq!(
        serialize(QueryResultsFormat::Json),
        concat!(
            "{\"head\":{\"vars\":[\"x\",\"y\"]},\"results\":{\"bindings\":[",
            "{\"x\":{\"type\":\"uri\",\"value\":\"http://example.com/s\"},\"y\":{\"type\":\"literal\",\"value\":\"chat\",\"xml:lang\":\"fr\"}},",
            "{\"x\":{\"type\":\"bnode\",\"value\":\"b1\"},\"y\":{\"type\":\"literal\",\"value\":\"1.5\",\"datatype\":\"http://www.w3.org/2001/XMLSchema#decimal\"}},",
            "{\"y\":{\"type\":\"literal\",\"value\":\"a,\\\"b\\\"\"}}",
            "]}}"
        )
    );
}

#[test]
fn test_xml_round_trip() {
    let file = serialize(QueryResultsFormat::Xml);
    let parser = QueryResultsParser::from_format(QueryResultsFormat::Xml);
    let QueryResultsReader::Solutions(solutions) = parser.for_reader(file.as_bytes()).unwrap()
    else {
        panic!("expecting solutions in {file}");
    };
    assert_eq!(solutions.variables(), ["x", "y"]);
    let rows = solutions.collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(rows, sample_rows());
}

#[test]
fn test_xml_boolean() {
    let parser = QueryResultsParser::from_format(QueryResultsFormat::Xml);
    let file = r#"<?xml version="1.0"?><sparql xmlns="http://www.w3.org/2005/sparql-results#"><head/><boolean>true</boolean></sparql>"#;
    assert!(matches!(
        parser.for_reader(file.as_bytes()).unwrap(),
        QueryResultsReader::Boolean(true)
    ));
}

#[test]
fn test_xml_undeclared_binding() {
    let parser = QueryResultsParser::from_format(QueryResultsFormat::Xml);
    let file = r#"<sparql xmlns="http://www.w3.org/2005/sparql-results#"><head><variable name="x"/></head><results><result><binding name="z"><uri>http://example.com/</uri></binding></result></results></sparql>"#;
    let QueryResultsReader::Solutions(mut solutions) = parser.for_reader(file.as_bytes()).unwrap()
    else {
        panic!("expecting solutions");
    };
    let error = solutions.next().unwrap().unwrap_err();
    assert!(error.to_string().contains("'z'"), "{error}");
}

#[test]
fn test_json_is_not_readable() {
    let parser = QueryResultsParser::from_format(QueryResultsFormat::Json);
    assert!(parser.for_reader(b"{}".as_slice()).is_err());
}

#[test]
fn test_rows_must_match_variables() {
    let serializer = QueryResultsSerializer::from_format(QueryResultsFormat::Csv);
    let mut writer = serializer
        .solutions_writer(Vec::new(), vec!["x".into()])
        .unwrap();
    assert!(writer.write_row(&[None, None]).is_err());
    let value = Term::from(Literal::from("v"));
    assert!(writer.write([("y", &value)]).is_err());
}

fn read_single_row(file: &str) -> Vec<Option<Term>> {
    let parser = QueryResultsParser::from_format(QueryResultsFormat::Xml);
    let QueryResultsReader::Solutions(solutions) = parser.for_reader(file.as_bytes()).unwrap()
    else {
        panic!("expecting solutions in {file}");
    };
    let mut rows = solutions.collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(rows.len(), 1);
    rows.remove(0)
}

#[test]
fn test_xml_empty_values() {
    let row = read_single_row(
        r#"<sparql><head><variable name="l"/><variable name="b"/></head><results><result><binding name="l"><literal xml:lang="en"/></binding><binding name="b"><bnode/></binding></result></results></sparql>"#,
    );
    assert_eq!(
        row[0],
        Some(Literal::new_language_tagged_literal_unchecked("", "en").into())
    );
    assert!(matches!(row[1], Some(Term::BlankNode(_))));
}

#[test]
fn test_xml_link_and_comments_are_skipped() {
    let row = read_single_row(
        r#"<sparql><!-- c --><head><variable name="x"/><link href="meta.ttl"/></head><results><result><binding name="x"><literal datatype="http://www.w3.org/2001/XMLSchema#integer">1</literal></binding></result></results></sparql>"#,
    );
    assert_eq!(row, [Some(Literal::new_typed_literal("1", xsd::INTEGER).into())]);
}

#[test]
fn test_xml_errors() {
    let parser = QueryResultsParser::from_format(QueryResultsFormat::Xml);
    for file in [
        "<results/>",
        r#"<sparql><head><variable name="x"/><variable name="x"/></head><results/></sparql>"#,
        "<sparql><head/><boolean>maybe</boolean></sparql>",
        "<sparql><head>",
    ] {
        assert!(parser.for_reader(file.as_bytes()).is_err(), "{file}");
    }
    let file = r#"<sparql><head><variable name="x"/></head><results><result><binding name="x"><uri>a:b</uri></binding><binding name="x"><uri>a:c</uri></binding></result></results></sparql>"#;
    let QueryResultsReader::Solutions(mut solutions) = parser.for_reader(file.as_bytes()).unwrap()
    else {
        panic!("expecting solutions");
    };
    assert!(solutions.next().unwrap().is_err());
}
