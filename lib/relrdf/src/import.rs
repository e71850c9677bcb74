//! Import of N-Triples, Turtle and RDF/XML documents into a [`Sink`].

use crate::error::ImportError;
use crate::sinks::Sink;
use oxrdfxml::RdfXmlParser;
use oxttl::{NTriplesParser, TurtleParser};
use relrdf_model::{BlankNode, Literal, Term, Triple, Uri};
use std::fmt;
use std::io::Read;
use tracing::debug;

/// The RDF serializations that can be imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RdfFormat {
    NTriples,
    Turtle,
    RdfXml,
}

impl RdfFormat {
    #[inline]
    pub fn file_extension(self) -> &'static str {
        match self {
            Self::NTriples => "nt",
            Self::Turtle => "ttl",
            Self::RdfXml => "rdf",
        }
    }

    /// Looks for a format from a file extension or a short name like `nt` or `turtle`.
    ///
    /// ```
    /// use relrdf::import::RdfFormat;
    ///
    /// assert_eq!(RdfFormat::from_extension("TTL"), Some(RdfFormat::Turtle));
    /// assert_eq!(RdfFormat::from_extension("rdf"), Some(RdfFormat::RdfXml));
    /// assert_eq!(RdfFormat::from_extension("jsonld"), None);
    /// ```
    pub fn from_extension(extension: &str) -> Option<Self> {
        const EXTENSIONS: [(&str, RdfFormat); 7] = [
            ("nt", RdfFormat::NTriples),
            ("ntriples", RdfFormat::NTriples),
            ("ttl", RdfFormat::Turtle),
            ("turtle", RdfFormat::Turtle),
            ("rdf", RdfFormat::RdfXml),
            ("rdfxml", RdfFormat::RdfXml),
            ("owl", RdfFormat::RdfXml),
        ];
        EXTENSIONS
            .into_iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(extension))
            .map(|(_, format)| format)
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NTriples => "N-Triples",
            Self::Turtle => "Turtle",
            Self::RdfXml => "RDF/XML",
        })
    }
}

/// Parses `reader` and sends its triples to `sink`. Returns the number of parsed triples.
///
/// The sink is neither finished nor closed.
pub fn import(
    sink: &mut dyn Sink,
    reader: impl Read,
    format: RdfFormat,
    base_iri: Option<&str>,
) -> Result<u64, ImportError> {
    let mut count = 0;
    match format {
        RdfFormat::NTriples => {
            for triple in NTriplesParser::new().for_reader(reader) {
                sink.triple(&convert_triple(triple?)?)?;
                count += 1;
            }
        }
        RdfFormat::Turtle => {
            let mut parser = TurtleParser::new();
            if let Some(base_iri) = base_iri {
                parser = parser
                    .with_base_iri(base_iri)
                    .map_err(|error| ImportError::InvalidBaseIri(error.to_string()))?;
            }
            for triple in parser.for_reader(reader) {
                sink.triple(&convert_triple(triple?)?)?;
                count += 1;
            }
        }
        RdfFormat::RdfXml => {
            let mut parser = RdfXmlParser::new();
            if let Some(base_iri) = base_iri {
                parser = parser
                    .with_base_iri(base_iri)
                    .map_err(|error| ImportError::InvalidBaseIri(error.to_string()))?;
            }
            for triple in parser.for_reader(reader) {
                sink.triple(&convert_triple(triple?)?)?;
                count += 1;
            }
        }
    }
    debug!(count, %format, "Parsed triples");
    Ok(count)
}

fn convert_triple(triple: oxrdf::Triple) -> Result<Triple, ImportError> {
    let subject: Term = match triple.subject {
        oxrdf::Subject::NamedNode(node) => Uri::new_unchecked(node.into_string()).into(),
        oxrdf::Subject::BlankNode(node) => BlankNode::new_unchecked(node.into_string()).into(),
        #[expect(unreachable_patterns, reason = "depends on the oxrdf features")]
        _ => return Err(ImportError::Unsupported("RDF-star triples")),
    };
    let object: Term = match triple.object {
        oxrdf::Term::NamedNode(node) => Uri::new_unchecked(node.into_string()).into(),
        oxrdf::Term::BlankNode(node) => BlankNode::new_unchecked(node.into_string()).into(),
        oxrdf::Term::Literal(literal) => convert_literal(literal).into(),
        #[expect(unreachable_patterns, reason = "depends on the oxrdf features")]
        _ => return Err(ImportError::Unsupported("RDF-star triples")),
    };
    Ok(Triple::new(
        subject,
        Uri::new_unchecked(triple.predicate.into_string()),
        object,
    ))
}

fn convert_literal(literal: oxrdf::Literal) -> Literal {
    let (value, datatype, language) = literal.destruct();
    match (datatype, language) {
        (_, Some(language)) => Literal::new_language_tagged_literal_unchecked(value, language),
        (Some(datatype), None) => {
            Literal::new_typed_literal(value, Uri::new_unchecked(datatype.into_string()))
        }
        (None, None) => Literal::new_simple_literal(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::ListSink;
    use relrdf_model::vocab::xsd;

    #[test]
    fn import_turtle() -> Result<(), ImportError> {
        let mut sink = ListSink::new();
        let count = import(
            &mut sink,
            b"@prefix ex: <http://example.com/> .
              <s> ex:p \"a\", \"b\"@en, 1 ; ex:q _:b1 ."
                .as_slice(),
            RdfFormat::Turtle,
            Some("http://example.com/"),
        )?;
        assert_eq!(count, 4);
        let s = Uri::new_unchecked("http://example.com/s");
        let p = Uri::new_unchecked("http://example.com/p");
        assert_eq!(
            sink.triples()[..3],
            [
                Triple::new(s.clone(), p.clone(), Literal::from("a")),
                Triple::new(
                    s.clone(),
                    p.clone(),
                    Literal::new_language_tagged_literal_unchecked("b", "en")
                ),
                Triple::new(s, p, Literal::new_typed_literal("1", xsd::INTEGER)),
            ]
        );
        assert!(matches!(sink.triples()[3].object, Term::BlankNode(_)));
        Ok(())
    }

    #[test]
    fn import_ntriples() -> Result<(), ImportError> {
        let mut sink = ListSink::new();
        let count = import(
            &mut sink,
            b"<http://example.com/s> <http://example.com/p> \"x\"^^<http://www.w3.org/2001/XMLSchema#string> .\n"
                .as_slice(),
            RdfFormat::NTriples,
            None,
        )?;
        assert_eq!(count, 1);
        assert_eq!(sink.triples()[0].object, Term::from(Literal::from("x")));
        Ok(())
    }

    #[test]
    fn import_rdf_xml() -> Result<(), ImportError> {
        let mut sink = ListSink::new();
        let count = import(
            &mut sink,
            br#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.com/">
  <rdf:Description rdf:about="s">
    <ex:p xml:lang="en">b</ex:p>
    <ex:p rdf:datatype="http://www.w3.org/2001/XMLSchema#integer">1</ex:p>
    <ex:q rdf:resource="o"/>
  </rdf:Description>
</rdf:RDF>"#
                .as_slice(),
            RdfFormat::RdfXml,
            Some("http://example.com/"),
        )?;
        assert_eq!(count, 3);
        let s = Uri::new_unchecked("http://example.com/s");
        let p = Uri::new_unchecked("http://example.com/p");
        assert_eq!(
            sink.triples(),
            [
                Triple::new(
                    s.clone(),
                    p.clone(),
                    Literal::new_language_tagged_literal_unchecked("b", "en")
                ),
                Triple::new(s.clone(), p, Literal::new_typed_literal("1", xsd::INTEGER)),
                Triple::new(
                    s,
                    Uri::new_unchecked("http://example.com/q"),
                    Uri::new_unchecked("http://example.com/o")
                ),
            ]
        );
        Ok(())
    }

    #[test]
    fn syntax_errors() {
        let mut sink = ListSink::new();
        let result = import(&mut sink, b"<s> <p> .".as_slice(), RdfFormat::NTriples, None);
        assert!(matches!(result, Err(ImportError::Syntax(_))));
        assert!(matches!(
            import(&mut sink, b"".as_slice(), RdfFormat::Turtle, Some("not an iri")),
            Err(ImportError::InvalidBaseIri(_))
        ));
        assert!(matches!(
            import(&mut sink, b"<rdf:RDF>".as_slice(), RdfFormat::RdfXml, None),
            Err(ImportError::RdfXml(_))
        ));
    }
}
