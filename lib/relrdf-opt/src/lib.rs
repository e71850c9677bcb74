#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![doc(test(attr(deny(warnings))))]

mod dynamic;
mod error;
mod typecheck;

pub use crate::dynamic::{
    TYPE_COLUMN_PREFIX, add_type_columns, dynamic_type, insert_type_guards, type_column,
};
pub use crate::error::TypeCheckError;
pub use crate::typecheck::check_types;
