//! Text writers for the CSV and TSV results formats.
//!
//! CSV loses term kinds and datatypes. TSV writes N-Triples terms, numbers and booleans bare.

use crate::error::SerializationError;
use relrdf_model::{Term, UriRef};
use relrdf_model::vocab::xsd;
use std::io::Write;

/// Writes text rows, one value per declared variable.
pub struct TextSolutionsWriter<W: Write> {
    writer: W,
    variables: Vec<String>,
    buffer: String,
    dialect: Dialect,
}

#[derive(Clone, Copy)]
pub enum Dialect {
    Csv,
    Tsv,
}

impl Dialect {
    fn separator(self) -> char {
        match self {
            Self::Csv => ',',
            Self::Tsv => '\t',
        }
    }

    fn line_end(self) -> &'static str {
        match self {
            Self::Csv => "\r\n",
            Self::Tsv => "\n",
        }
    }
}

impl<W: Write> TextSolutionsWriter<W> {
    pub fn start(
        mut writer: W,
        variables: Vec<String>,
        dialect: Dialect,
    ) -> Result<Self, SerializationError> {
        let mut buffer = String::new();
        for (i, variable) in variables.iter().enumerate() {
            if i > 0 {
                buffer.push(dialect.separator());
            }
            if let Dialect::Tsv = dialect {
                buffer.push('?');
            }
            buffer.push_str(variable);
        }
        buffer.push_str(dialect.line_end());
        writer.write_all(buffer.as_bytes())?;
        buffer.clear();
        Ok(Self {
            writer,
            variables,
            buffer,
            dialect,
        })
    }

    pub fn write<'a>(
        &mut self,
        solution: impl IntoIterator<Item = (&'a str, &'a Term)>,
    ) -> Result<(), SerializationError> {
        let mut values = vec![None; self.variables.len()];
        for (variable, value) in solution {
            let Some(position) = self.variables.iter().position(|v| v == variable) else {
                return Err(SerializationError::UndeclaredVariable(variable.to_owned()));
            };
            values[position] = Some(value);
        }
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.buffer.push(self.dialect.separator());
            }
            if let Some(value) = value {
                match self.dialect {
                    Dialect::Csv => write_csv_term(&mut self.buffer, value),
                    Dialect::Tsv => write_tsv_term(&mut self.buffer, value),
                }
            }
        }
        self.buffer.push_str(self.dialect.line_end());
        self.writer.write_all(self.buffer.as_bytes())?;
        self.buffer.clear();
        Ok(())
    }

    pub fn finish(mut self) -> Result<W, SerializationError> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

fn write_csv_term(output: &mut String, term: &Term) {
    match term {
        Term::Uri(uri) => output.push_str(uri.as_str()),
        Term::BlankNode(node) => output.push_str(&node.to_stored()),
        Term::Literal(literal) => write_escaped_csv_string(output, literal.value()),
    }
}

fn write_escaped_csv_string(output: &mut String, value: &str) {
    if !value.contains(['"', ',', '\n', '\r']) {
        output.push_str(value);
        return;
    }
    output.push('"');
    output.push_str(&value.replace('"', "\"\""));
    output.push('"');
}

fn write_tsv_term(output: &mut String, term: &Term) {
    let Term::Literal(literal) = term else {
        // URIs and blank nodes are written as in N-Triples
        output.push_str(&term.to_string());
        return;
    };
    let value = literal.value();
    match (literal.language(), literal.datatype()) {
        (Some(language), _) => {
            write_tsv_quoted_str(output, value);
            output.push('@');
            output.push_str(language);
        }
        (None, Some(datatype)) if is_bare_tsv_value(datatype, value) => output.push_str(value),
        (None, Some(datatype)) => {
            write_tsv_quoted_str(output, value);
            output.push_str("^^");
            output.push_str(&datatype.to_string());
        }
        (None, None) => write_tsv_quoted_str(output, value),
    }
}

fn write_tsv_quoted_str(output: &mut String, value: &str) {
    output.push('"');
    for c in value.chars() {
        let escaped = match c {
            '\t' => "\\t",
            '\n' => "\\n",
            '\r' => "\\r",
            '"' => "\\\"",
            '\\' => "\\\\",
            _ => {
                output.push(c);
                continue;
            }
        };
        output.push_str(escaped);
    }
    output.push('"');
}

/// Whether Turtle reads `value` back as a literal of `datatype` without quotes.
fn is_bare_tsv_value(datatype: UriRef<'_>, value: &str) -> bool {
    if datatype == xsd::BOOLEAN {
        matches!(value, "true" | "false")
    } else if datatype == xsd::INTEGER {
        NumberShape::of(value) == Some(NumberShape::Integer)
    } else if datatype == xsd::DECIMAL {
        NumberShape::of(value) == Some(NumberShape::Decimal)
    } else if datatype == xsd::DOUBLE {
        NumberShape::of(value) == Some(NumberShape::Double)
    } else {
        false
    }
}

/// The Turtle numeric token a string spells, if any.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum NumberShape {
    Integer,
    Decimal,
    Double,
}

impl NumberShape {
    fn of(value: &str) -> Option<Self> {
        let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
        let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
            Some((mantissa, exponent)) => (mantissa, Some(exponent)),
            None => (unsigned, None),
        };
        let (integral, fractional) = match mantissa.split_once('.') {
            Some((integral, fractional)) => (integral, Some(fractional)),
            None => (mantissa, None),
        };
        let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !digits(integral) || !fractional.is_none_or(digits) {
            return None;
        }
        let fractional_digits = fractional.map_or(0, str::len);
        if let Some(exponent) = exponent {
            let exponent = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
            return (integral.len() + fractional_digits > 0
                && !exponent.is_empty()
                && digits(exponent))
            .then_some(Self::Double);
        }
        match fractional {
            None if !integral.is_empty() => Some(Self::Integer),
            Some(_) if fractional_digits > 0 => Some(Self::Decimal),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_shapes() {
        assert_eq!(NumberShape::of("-12"), Some(NumberShape::Integer));
        assert_eq!(NumberShape::of("+"), None);
        assert_eq!(NumberShape::of(".5"), Some(NumberShape::Decimal));
        assert_eq!(NumberShape::of("5."), None);
        assert_eq!(NumberShape::of("1.e3"), Some(NumberShape::Double));
        assert_eq!(NumberShape::of("-.5E-2"), Some(NumberShape::Double));
        assert_eq!(NumberShape::of("1.5"), Some(NumberShape::Decimal));
        assert_eq!(NumberShape::of("e3"), None);
        assert_eq!(NumberShape::of("1e"), None);
        assert_eq!(NumberShape::of("1.2.3"), None);
    }

    #[test]
    fn csv_quoting() {
        let mut output = String::new();
        write_escaped_csv_string(&mut output, "plain");
        write_escaped_csv_string(&mut output, "a\"b");
        assert_eq!(output, "plain\"a\"\"b\"");
    }
}
