#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![doc(test(attr(deny(warnings))))]

pub mod config;
mod emit;
mod error;
pub mod import;
mod mapper;
mod model;
mod modelbase;
mod results;
pub mod sinks;
mod valueref;
pub mod views;

pub use crate::config::{ModelBaseConfig, ModelConfig, ModelKind, open_modelbase};
pub use crate::emit::emit_sql;
pub use crate::error::{
    ImportError, InstantiationError, ModelBaseError, QueryError, SinkError,
};
pub use crate::model::{CompiledQuery, Model};
pub use crate::modelbase::{ModelBase, VersionInfo};
pub use crate::results::QueryResults;
pub use relrdf_algebra::QueryLanguage;
