//! Decoding of the rows returned by compiled queries.

use crate::error::QueryError;
use crate::modelbase::{BLANK_TYPE_ID, LITERAL_TYPE_ID, RESOURCE_TYPE_ID};
use raw_rows::{RawRows, RawRowsTryBuilder};
use relrdf_model::{BlankNode, Literal, Term, Uri};
use relrdf_opt::{TYPE_COLUMN_PREFIX, type_column};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Statement};
use std::collections::HashMap;
use tracing::warn;

/// The solutions of a query.
///
/// Each row holds one optional term per column of [`column_names`](QueryResults::column_names).
/// Rows are read from the database one at a time, as the iterator is advanced.
pub struct QueryResults<'a> {
    columns: Vec<String>,
    /// For each column, the index of its value and type columns in the raw rows.
    layout: Vec<(usize, Option<usize>)>,
    rows: RawRows<'a>,
    data_types: HashMap<i64, String>,
}

/// A prepared statement together with the cursor over its rows.
#[allow(unsafe_code)]
mod raw_rows {
    use super::RawValue;
    use ouroboros::self_referencing;
    use rusqlite::{Rows, Statement};

    #[self_referencing(pub_extras)]
    pub struct RawRows<'a> {
        statement: Statement<'a>,
        #[borrows(mut statement)]
        #[not_covariant]
        cursor: Rows<'this>,
    }

    impl RawRows<'_> {
        pub(super) fn next_row(&mut self) -> rusqlite::Result<Option<Vec<RawValue>>> {
            self.with_cursor_mut(|cursor| {
                let Some(row) = cursor.next()? else {
                    return Ok(None);
                };
                let count = row.as_ref().column_count();
                (0..count)
                    .map(|i| Ok(RawValue::new(row.get_ref(i)?)))
                    .collect::<rusqlite::Result<Vec<_>>>()
                    .map(Some)
            })
        }
    }
}

impl QueryResults<'_> {
    /// The names of the columns, without the internal type columns.
    #[inline]
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    fn decode_row(&self, row: &[RawValue]) -> Vec<Option<Term>> {
        self.layout
            .iter()
            .map(|&(value, type_code)| {
                let value = row.get(value)?;
                let type_code = type_code.and_then(|i| row.get(i)).and_then(RawValue::as_integer);
                self.decode(value, type_code)
            })
            .collect()
    }

    fn decode(&self, value: &RawValue, type_code: Option<i64>) -> Option<Term> {
        let text = match value {
            RawValue::Null => return None,
            RawValue::Integer(value) => value.to_string(),
            RawValue::Text(value) => value.clone(),
        };
        Some(match type_code {
            Some(RESOURCE_TYPE_ID) => Uri::new_unchecked(text).into(),
            Some(BLANK_TYPE_ID) => BlankNode::from_stored(&text).into(),
            None | Some(LITERAL_TYPE_ID) => Literal::new_simple_literal(text).into(),
            Some(code) => match self.data_types.get(&code) {
                Some(key) => Literal::from_type_key(text, Some(key.as_str())).into(),
                None => {
                    warn!(code, "Unknown type code in query results, returning a simple literal");
                    Literal::new_simple_literal(text).into()
                }
            },
        })
    }
}

impl Iterator for QueryResults<'_> {
    type Item = Result<Vec<Option<Term>>, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.rows.next_row() {
            Ok(Some(row)) => Some(Ok(self.decode_row(&row))),
            Ok(None) => None,
            Err(error) => Some(Err(error.into())),
        }
    }
}

/// A column value copied out of SQLite.
#[derive(Debug, Clone, PartialEq)]
enum RawValue {
    Null,
    Integer(i64),
    Text(String),
}

impl RawValue {
    fn new(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(value) => Self::Integer(value),
            ValueRef::Real(value) => Self::Text(value.to_string()),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Self::Text(match std::str::from_utf8(bytes) {
                Ok(text) => text.to_owned(),
                Err(error) => {
                    warn!(%error, "Invalid UTF-8 in query results, replacing the invalid sequences");
                    String::from_utf8_lossy(bytes).into_owned()
                }
            }),
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Text(value) => value.parse().ok(),
            Self::Null => None,
        }
    }
}

/// Runs a compiled query whose columns are `column_names`, user columns and their type columns.
pub(crate) fn execute<'a>(
    connection: &'a Connection,
    sql: &str,
    column_names: &[String],
) -> Result<QueryResults<'a>, QueryError> {
    let columns: Vec<String> = column_names
        .iter()
        .filter(|name| !name.starts_with(TYPE_COLUMN_PREFIX))
        .cloned()
        .collect();
    let layout = columns
        .iter()
        .filter_map(|name| {
            let value = column_names.iter().position(|c| c == name)?;
            let type_name = type_column(name);
            Some((value, column_names.iter().position(|c| *c == type_name)))
        })
        .collect();
    let data_types = load_data_types(connection)?;
    let rows = RawRowsTryBuilder {
        statement: connection.prepare(sql)?,
        cursor_builder: |statement: &mut Statement<'a>| statement.query([]),
    }
    .try_build()?;
    Ok(QueryResults {
        columns,
        layout,
        rows,
        data_types,
    })
}

fn load_data_types(connection: &Connection) -> rusqlite::Result<HashMap<i64, String>> {
    let mut statement = connection.prepare_cached("SELECT id, uri FROM data_types WHERE id > ?1")?;
    statement
        .query_map([LITERAL_TYPE_ID], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect()
}
