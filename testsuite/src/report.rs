use crate::vocab::earl;
use anyhow::Result;
use relrdf::QueryError;
use relrdf_algebra::{NotSupportedError, ParseError};
use relrdf_model::Uri;
use std::fmt::Write;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Debug)]
pub struct TestResult {
    pub test: Uri,
    pub outcome: Result<()>,
    pub date: OffsetDateTime,
}

impl TestResult {
    /// Whether the test failed on a construct the compiler does not translate.
    pub fn is_not_supported(&self) -> bool {
        let Err(error) = &self.outcome else {
            return false;
        };
        error.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<QueryError>(),
                Some(QueryError::NotSupported(_))
            ) || matches!(
                cause.downcast_ref::<ParseError>(),
                Some(ParseError::NotSupported(_))
            ) || cause.downcast_ref::<NotSupportedError>().is_some()
        })
    }
}

/// Writes the results as an EARL report in Turtle.
pub fn build_report(results: impl IntoIterator<Item = TestResult>) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "@prefix earl: <{}> .", earl::NAMESPACE);
    let _ = writeln!(
        buffer,
        "@prefix xsd: <http://www.w3.org/2001/XMLSchema#> ."
    );
    let _ = writeln!(buffer, "@prefix doap: <http://usefulinc.com/ns/doap#> .");
    let _ = writeln!(buffer);
    let _ = writeln!(
        buffer,
        "<https://github.com/relrdf/relrdf> a doap:Project ;"
    );
    let _ = writeln!(buffer, "\tdoap:name \"RelRDF\" ;");
    let _ = writeln!(buffer, "\tdoap:release [");
    let _ = writeln!(buffer, "\t\tdoap:revision \"{}\"", env!("CARGO_PKG_VERSION"));
    let _ = writeln!(buffer, "\t] .");
    for result in results {
        let outcome = match &result.outcome {
            Ok(()) => "earl:passed",
            Err(_) if result.is_not_supported() => "earl:inapplicable",
            Err(_) => "earl:failed",
        };
        let date = result
            .date
            .format(&Rfc3339)
            .unwrap_or_else(|_| result.date.to_string());
        let _ = writeln!(buffer);
        let _ = writeln!(buffer, "[] a earl:Assertion ;");
        let _ = writeln!(buffer, "\tearl:assertedBy <https://github.com/relrdf/relrdf> ;");
        let _ = writeln!(buffer, "\tearl:subject <https://github.com/relrdf/relrdf> ;");
        let _ = writeln!(buffer, "\tearl:test {} ;", result.test);
        let _ = writeln!(buffer, "\tearl:result [");
        let _ = writeln!(buffer, "\t\ta earl:TestResult ;");
        let _ = writeln!(buffer, "\t\tearl:outcome {outcome} ;");
        let _ = writeln!(buffer, "\t\tearl:date \"{date}\"^^xsd:dateTime");
        let _ = writeln!(buffer, "\t] ;");
        let _ = writeln!(buffer, "\tearl:mode earl:automatic .");
    }
    buffer
}
