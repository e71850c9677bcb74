#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![doc(test(attr(deny(warnings))))]

mod error;
mod extents;
mod incarnation;
mod node;
mod parser;
mod prefixes;
pub mod rewrite;
mod serql;
pub mod simplify;
mod sparql;
mod types;

pub use crate::error::{NotSupportedError, ParseError, SemanticError, SyntaxError};
pub use crate::extents::Extents;
pub use crate::incarnation::IncarnationContext;
pub use crate::node::{Function, Node, NodeKind, SortKey, is_hidden_variable};
pub use crate::parser::{QueryLanguage, QueryParser, UnknownQueryLanguageError};
pub use crate::prefixes::PrefixTable;
pub use crate::types::{RelationType, StaticType};
