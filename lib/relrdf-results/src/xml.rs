//! Reader and writer for the SPARQL Query Results XML Format.

use crate::error::{QueryResultsParseError, QueryResultsSyntaxError, SerializationError};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use relrdf_model::vocab::rdf;
use relrdf_model::{BlankNode, Literal, Term, Uri};
use std::io::{BufReader, Read, Write};

pub struct XmlSolutionsWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> XmlSolutionsWriter<W> {
    pub fn start(write: W, variables: &[String]) -> Result<Self, SerializationError> {
        let mut writer = Writer::new(write);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
        writer.write_event(Event::Start(BytesStart::new("sparql").with_attributes([(
            "xmlns",
            "http://www.w3.org/2005/sparql-results#",
        )])))?;
        writer.write_event(Event::Start(BytesStart::new("head")))?;
        for variable in variables {
            writer.write_event(Event::Empty(
                BytesStart::new("variable").with_attributes([("name", variable.as_str())]),
            ))?;
        }
        writer.write_event(Event::End(BytesEnd::new("head")))?;
        writer.write_event(Event::Start(BytesStart::new("results")))?;
        Ok(Self { writer })
    }

    pub fn write<'a>(
        &mut self,
        solution: impl IntoIterator<Item = (&'a str, &'a Term)>,
    ) -> Result<(), SerializationError> {
        self.writer
            .write_event(Event::Start(BytesStart::new("result")))?;
        for (variable, value) in solution {
            self.writer.write_event(Event::Start(
                BytesStart::new("binding").with_attributes([("name", variable)]),
            ))?;
            write_xml_term(&mut self.writer, value)?;
            self.writer
                .write_event(Event::End(BytesEnd::new("binding")))?;
        }
        self.writer.write_event(Event::End(BytesEnd::new("result")))?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<W, SerializationError> {
        self.writer
            .write_event(Event::End(BytesEnd::new("results")))?;
        self.writer.write_event(Event::End(BytesEnd::new("sparql")))?;
        Ok(self.writer.into_inner())
    }
}

fn write_xml_term<W: Write>(writer: &mut Writer<W>, term: &Term) -> Result<(), SerializationError> {
    let (start, value) = match term {
        Term::Uri(uri) => (BytesStart::new("uri"), uri.as_str()),
        Term::BlankNode(bnode) => (BytesStart::new("bnode"), bnode.as_str()),
        Term::Literal(literal) => {
            let mut start = BytesStart::new("literal");
            if let Some(language) = literal.language() {
                start.push_attribute(("xml:lang", language));
            } else if let Some(datatype) = literal.datatype() {
                start.push_attribute(("datatype", datatype.as_str()));
            }
            (start, literal.value())
        }
    };
    let end = start.to_end().into_owned();
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(end))?;
    Ok(())
}

pub enum XmlQueryResultsReader<R: Read> {
    Solutions {
        variables: Vec<String>,
        solutions: XmlSolutionsReader<R>,
    },
    Boolean(bool),
}

impl<R: Read> XmlQueryResultsReader<R> {
    /// Reads the document up to the start of its `<results>` or the value of its `<boolean>`.
    pub fn read(source: R) -> Result<Self, QueryResultsParseError> {
        let mut events = XmlEvents::new(source);
        events.open(b"sparql")?;
        events.open(b"head")?;
        let mut variables = Vec::<String>::new();
        loop {
            match events.next()? {
                Item::Open(element) if element.name == b"variable" => {
                    let name = element.required_attribute("name")?;
                    if variables.contains(&name) {
                        return Err(QueryResultsSyntaxError::msg(format!(
                            "The variable {name} is declared twice"
                        ))
                        .into());
                    }
                    variables.push(name);
                    events.close()?;
                }
                Item::Open(element) if element.name == b"link" => events.close()?,
                Item::Close => break,
                item => return Err(item.unexpected("a <variable> or the end of <head>").into()),
            }
        }
        loop {
            match events.next()? {
                Item::Open(element) if element.name == b"link" => events.close()?,
                Item::Open(element) if element.name == b"results" => {
                    return Ok(Self::Solutions {
                        solutions: XmlSolutionsReader {
                            events,
                            variables: variables.clone(),
                            done: false,
                        },
                        variables,
                    });
                }
                Item::Open(element) if element.name == b"boolean" => {
                    let value = events.text()?;
                    return match value.as_str() {
                        "true" => Ok(Self::Boolean(true)),
                        "false" => Ok(Self::Boolean(false)),
                        _ => Err(QueryResultsSyntaxError::msg(format!(
                            "Invalid boolean value '{value}'"
                        ))
                        .into()),
                    };
                }
                item => return Err(item.unexpected("<results> or <boolean>").into()),
            }
        }
    }
}

pub struct XmlSolutionsReader<R: Read> {
    events: XmlEvents<R>,
    variables: Vec<String>,
    done: bool,
}

impl<R: Read> XmlSolutionsReader<R> {
    /// The next `<result>`, one slot per declared variable.
    pub fn read_next(&mut self) -> Result<Option<Vec<Option<Term>>>, QueryResultsParseError> {
        if self.done {
            return Ok(None);
        }
        match self.events.next()? {
            Item::Open(element) if element.name == b"result" => {}
            Item::Close | Item::Eof => {
                self.done = true;
                return Ok(None);
            }
            item => return Err(item.unexpected("<result>").into()),
        }
        let mut row = vec![None; self.variables.len()];
        loop {
            match self.events.next()? {
                Item::Open(element) if element.name == b"binding" => {
                    let name = element.required_attribute("name")?;
                    let Some(position) = self.variables.iter().position(|v| *v == name) else {
                        return Err(QueryResultsSyntaxError::msg(format!(
                            "The variable '{name}' is bound but not declared in <head>"
                        ))
                        .into());
                    };
                    if row[position].is_some() {
                        return Err(QueryResultsSyntaxError::msg(format!(
                            "The variable '{name}' is bound twice in the same result"
                        ))
                        .into());
                    }
                    row[position] = Some(self.read_term()?);
                    self.events.close()?;
                }
                Item::Close => return Ok(Some(row)),
                item => return Err(item.unexpected("<binding> or the end of <result>").into()),
            }
        }
    }

    fn read_term(&mut self) -> Result<Term, QueryResultsParseError> {
        let element = match self.events.next()? {
            Item::Open(element) => element,
            item => return Err(item.unexpected("<uri>, <bnode> or <literal>").into()),
        };
        match element.name.as_slice() {
            b"uri" => {
                let value = self.events.text()?;
                Ok(Uri::new(value.as_str())
                    .map_err(|e| {
                        QueryResultsSyntaxError::msg(format!("Invalid IRI '{value}': {e}"))
                    })?
                    .into())
            }
            b"bnode" => {
                let value = self.events.text()?;
                if value.is_empty() {
                    return Ok(BlankNode::default().into());
                }
                Ok(BlankNode::new(value.as_str())
                    .map_err(|e| {
                        QueryResultsSyntaxError::msg(format!(
                            "Invalid blank node identifier '{value}': {e}"
                        ))
                    })?
                    .into())
            }
            b"literal" => {
                let language = element.attribute("xml:lang");
                let datatype = element
                    .attribute("datatype")
                    .map(|iri| {
                        Uri::new(iri.as_str()).map_err(|e| {
                            QueryResultsSyntaxError::msg(format!("Invalid datatype '{iri}': {e}"))
                        })
                    })
                    .transpose()?;
                let value = self.events.text()?;
                Ok(build_literal(value, language, datatype)?.into())
            }
            name => Err(QueryResultsSyntaxError::msg(format!(
                "Expecting <uri>, <bnode> or <literal>, found <{}>",
                String::from_utf8_lossy(name)
            ))
            .into()),
        }
    }
}

fn build_literal(
    value: String,
    language: Option<String>,
    datatype: Option<Uri>,
) -> Result<Literal, QueryResultsSyntaxError> {
    match (language, datatype) {
        (Some(language), Some(datatype)) if datatype != rdf::LANG_STRING => {
            Err(QueryResultsSyntaxError::msg(format!(
                "xml:lang '{language}' given together with the datatype {datatype}"
            )))
        }
        (Some(language), _) => Literal::new_language_tagged_literal(value, language.as_str())
            .map_err(|e| {
                QueryResultsSyntaxError::msg(format!("Invalid xml:lang '{language}': {e}"))
            }),
        (None, Some(datatype)) => Ok(Literal::new_typed_literal(value, datatype)),
        (None, None) => Ok(Literal::new_simple_literal(value)),
    }
}

/// A start tag with its decoded attributes, keyed by their qualified name.
struct Element {
    name: Vec<u8>,
    attributes: Vec<(String, String)>,
}

impl Element {
    fn attribute(&self, key: &str) -> Option<String> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    fn required_attribute(&self, key: &str) -> Result<String, QueryResultsSyntaxError> {
        self.attribute(key).ok_or_else(|| {
            QueryResultsSyntaxError::msg(format!(
                "The <{}> tag has no {key} attribute",
                String::from_utf8_lossy(&self.name)
            ))
        })
    }
}

enum Item {
    Open(Element),
    Text(String),
    Close,
    Eof,
}

impl Item {
    fn unexpected(self, expected: &str) -> QueryResultsSyntaxError {
        let found = match self {
            Self::Open(element) => format!("<{}>", String::from_utf8_lossy(&element.name)),
            Self::Text(text) => format!("the text '{text}'"),
            Self::Close => "a closing tag".into(),
            Self::Eof => "the end of the file".into(),
        };
        QueryResultsSyntaxError::msg(format!("Expecting {expected}, found {found}"))
    }
}

/// The document as start tags, texts and end tags, everything else skipped.
///
/// Empty elements are reported as a start tag followed by an end tag.
struct XmlEvents<R: Read> {
    reader: Reader<BufReader<R>>,
    buffer: Vec<u8>,
}

impl<R: Read> XmlEvents<R> {
    fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(BufReader::new(source));
        reader.trim_text(true);
        reader.expand_empty_elements(true);
        Self {
            reader,
            buffer: Vec::new(),
        }
    }

    fn next(&mut self) -> Result<Item, QueryResultsParseError> {
        loop {
            self.buffer.clear();
            match self.reader.read_event_into(&mut self.buffer)? {
                Event::Start(start) => {
                    let mut attributes = Vec::new();
                    for attribute in start.attributes() {
                        let attribute = attribute.map_err(quick_xml::Error::from)?;
                        let key = self.reader.decoder().decode(attribute.key.as_ref())?.into_owned();
                        let value = attribute
                            .decode_and_unescape_value(&self.reader)?
                            .into_owned();
                        attributes.push((key, value));
                    }
                    return Ok(Item::Open(Element {
                        name: start.local_name().as_ref().to_vec(),
                        attributes,
                    }));
                }
                Event::Text(text) => return Ok(Item::Text(text.unescape()?.into_owned())),
                Event::CData(data) => {
                    return Ok(Item::Text(
                        self.reader.decoder().decode(&data)?.into_owned(),
                    ));
                }
                Event::End(_) => return Ok(Item::Close),
                Event::Eof => return Ok(Item::Eof),
                _ => (),
            }
        }
    }

    fn open(&mut self, name: &[u8]) -> Result<(), QueryResultsParseError> {
        match self.next()? {
            Item::Open(element) if element.name == name => Ok(()),
            item => Err(item
                .unexpected(&format!("<{}>", String::from_utf8_lossy(name)))
                .into()),
        }
    }

    fn close(&mut self) -> Result<(), QueryResultsParseError> {
        match self.next()? {
            Item::Close => Ok(()),
            item => Err(item.unexpected("a closing tag").into()),
        }
    }

    /// The text content of the current element, which is then closed.
    fn text(&mut self) -> Result<String, QueryResultsParseError> {
        match self.next()? {
            Item::Text(text) => {
                self.close()?;
                Ok(text)
            }
            Item::Close => Ok(String::new()),
            item => Err(item.unexpected("a text value").into()),
        }
    }
}
