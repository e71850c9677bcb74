//! RelRDF model provides the RDF terms the RelRDF query compiler and store work with.
//!
//! It also defines the vocabularies every query understands without a prefix declaration
//! (see [`vocab::BASE_PREFIXES`]) and the [`protect`] encoding used to embed IRIs in URLs.
//!
//! Usage example:
//! ```
//! use relrdf_model::vocab::{rdf, xsd};
//! use relrdf_model::*;
//!
//! let triple = Triple::new(
//!     Uri::new("http://example.com/a")?,
//!     rdf::TYPE,
//!     Literal::new_typed_literal("1", xsd::INTEGER),
//! );
//! assert_eq!(
//!     triple.to_string(),
//!     "<http://example.com/a> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> \"1\"^^<http://www.w3.org/2001/XMLSchema#integer> ."
//! );
//! # Result::<_,Box<dyn std::error::Error>>::Ok(())
//! ```

mod blank_node;
mod literal;
mod namespace;
pub mod protect;
mod term;
mod uri;
pub mod vocab;

pub use crate::blank_node::{BlankNode, BlankNodeIdParseError};
pub use crate::literal::{Literal, LiteralKind, NativeValue};
pub use crate::namespace::Namespace;
pub use crate::term::{Term, Triple};
pub use crate::uri::{Uri, UriRef};
pub use oxilangtag::LanguageTagParseError;
pub use oxiri::IriParseError;
