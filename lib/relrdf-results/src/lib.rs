#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]

mod csv;
mod error;
mod format;
mod json;
mod parser;
mod serializer;
mod xml;

pub use crate::error::{QueryResultsParseError, QueryResultsSyntaxError, SerializationError};
pub use crate::format::QueryResultsFormat;
pub use crate::parser::{QueryResultsParser, QueryResultsReader, SolutionsReader};
pub use crate::serializer::{QueryResultsSerializer, SolutionsWriter};
