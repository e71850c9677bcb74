//! Writer for the SPARQL Query Results JSON Format.

use crate::error::SerializationError;
use json_event_parser::{JsonEvent, WriterJsonSerializer};
use relrdf_model::Term;
use std::io::Write;

pub struct JsonSolutionsWriter<W: Write> {
    serializer: WriterJsonSerializer<W>,
    events: Vec<JsonEvent<'static>>,
}

impl<W: Write> JsonSolutionsWriter<W> {
    /// Writes `{"head":{"vars":[...]},"results":{"bindings":[` and keeps the document open.
    pub fn start(writer: W, variables: &[String]) -> Result<Self, SerializationError> {
        let mut this = Self {
            serializer: WriterJsonSerializer::new(writer),
            events: Vec::new(),
        };
        this.events.push(JsonEvent::StartObject);
        this.events.push(JsonEvent::ObjectKey("head".into()));
        this.events.push(JsonEvent::StartObject);
        this.events.push(JsonEvent::ObjectKey("vars".into()));
        this.events.push(JsonEvent::StartArray);
        this.events.extend(
            variables
                .iter()
                .map(|variable| JsonEvent::String(variable.clone().into())),
        );
        this.events.push(JsonEvent::EndArray);
        this.events.push(JsonEvent::EndObject);
        this.events.push(JsonEvent::ObjectKey("results".into()));
        this.events.push(JsonEvent::StartObject);
        this.events.push(JsonEvent::ObjectKey("bindings".into()));
        this.events.push(JsonEvent::StartArray);
        this.flush_events()?;
        Ok(this)
    }

    pub fn write<'a>(
        &mut self,
        solution: impl IntoIterator<Item = (&'a str, &'a Term)>,
    ) -> Result<(), SerializationError> {
        self.events.push(JsonEvent::StartObject);
        for (variable, value) in solution {
            self.events.push(JsonEvent::ObjectKey(variable.to_owned().into()));
            push_term(&mut self.events, value);
        }
        self.events.push(JsonEvent::EndObject);
        self.flush_events()
    }

    pub fn finish(mut self) -> Result<W, SerializationError> {
        self.events
            .extend([JsonEvent::EndArray, JsonEvent::EndObject, JsonEvent::EndObject]);
        self.flush_events()?;
        Ok(self.serializer.finish()?)
    }

    fn flush_events(&mut self) -> Result<(), SerializationError> {
        for event in self.events.drain(..) {
            self.serializer.serialize_event(event)?;
        }
        Ok(())
    }
}

fn push_entry(events: &mut Vec<JsonEvent<'static>>, key: &'static str, value: &str) {
    events.push(JsonEvent::ObjectKey(key.into()));
    events.push(JsonEvent::String(value.to_owned().into()));
}

/// A term is an object with a `type` and a `value`, literals adding `xml:lang` or `datatype`.
fn push_term(events: &mut Vec<JsonEvent<'static>>, term: &Term) {
    events.push(JsonEvent::StartObject);
    match term {
        Term::Uri(uri) => {
            push_entry(events, "type", "uri");
            push_entry(events, "value", uri.as_str());
        }
        Term::BlankNode(bnode) => {
            push_entry(events, "type", "bnode");
            push_entry(events, "value", bnode.as_str());
        }
        Term::Literal(literal) => {
            push_entry(events, "type", "literal");
            push_entry(events, "value", literal.value());
            if let Some(language) = literal.language() {
                push_entry(events, "xml:lang", language);
            } else if let Some(datatype) = literal.datatype() {
                push_entry(events, "datatype", datatype.as_str());
            }
        }
    }
    events.push(JsonEvent::EndObject);
}
