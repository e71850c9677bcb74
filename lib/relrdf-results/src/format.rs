use std::fmt;

/// The formats query results are written in.
///
/// Only [`Xml`](Self::Xml) can be read back, the others are output formats.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
#[non_exhaustive]
pub enum QueryResultsFormat {
    /// SPARQL Query Results XML Format, used by the conformance tests.
    Xml,
    /// SPARQL Query Results JSON Format.
    Json,
    /// Comma separated values, terms written as plain strings.
    Csv,
    /// Tab separated values, terms written in their N-Triples form.
    Tsv,
}

struct Descriptor {
    format: QueryResultsFormat,
    extension: &'static str,
    aliases: &'static [&'static str],
    media_type: &'static str,
    label: &'static str,
}

const DESCRIPTORS: [Descriptor; 4] = [
    Descriptor {
        format: QueryResultsFormat::Xml,
        extension: "srx",
        aliases: &["xml"],
        media_type: "application/sparql-results+xml",
        label: "XML query results",
    },
    Descriptor {
        format: QueryResultsFormat::Json,
        extension: "srj",
        aliases: &["json"],
        media_type: "application/sparql-results+json",
        label: "JSON query results",
    },
    Descriptor {
        format: QueryResultsFormat::Csv,
        extension: "csv",
        aliases: &["txt"],
        media_type: "text/csv; charset=utf-8",
        label: "CSV query results",
    },
    Descriptor {
        format: QueryResultsFormat::Tsv,
        extension: "tsv",
        aliases: &[],
        media_type: "text/tab-separated-values; charset=utf-8",
        label: "TSV query results",
    },
];

impl QueryResultsFormat {
    fn descriptor(self) -> &'static Descriptor {
        match self {
            Self::Xml => &DESCRIPTORS[0],
            Self::Json => &DESCRIPTORS[1],
            Self::Csv => &DESCRIPTORS[2],
            Self::Tsv => &DESCRIPTORS[3],
        }
    }

    /// ```
    /// use relrdf_results::QueryResultsFormat;
    ///
    /// assert_eq!(
    ///     QueryResultsFormat::Json.media_type(),
    ///     "application/sparql-results+json"
    /// )
    /// ```
    #[inline]
    pub fn media_type(self) -> &'static str {
        self.descriptor().media_type
    }

    #[inline]
    pub fn file_extension(self) -> &'static str {
        self.descriptor().extension
    }

    /// Finds the format of a file extension or of a short name like `xml`.
    ///
    /// The lookup ignores case.
    ///
    /// ```
    /// use relrdf_results::QueryResultsFormat;
    ///
    /// assert_eq!(QueryResultsFormat::from_extension("json"), Some(QueryResultsFormat::Json));
    /// assert_eq!(QueryResultsFormat::from_extension("SRX"), Some(QueryResultsFormat::Xml));
    /// assert_eq!(QueryResultsFormat::from_extension("ttl"), None);
    /// ```
    pub fn from_extension(extension: &str) -> Option<Self> {
        DESCRIPTORS
            .iter()
            .find(|descriptor| {
                descriptor.extension.eq_ignore_ascii_case(extension)
                    || descriptor
                        .aliases
                        .iter()
                        .any(|alias| alias.eq_ignore_ascii_case(extension))
            })
            .map(|descriptor| descriptor.format)
    }

    /// Finds the format of a media type, parameters like `charset` being ignored.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type.split(';').next().unwrap_or_default().trim();
        DESCRIPTORS
            .iter()
            .find(|descriptor| {
                descriptor
                    .media_type
                    .split(';')
                    .next()
                    .is_some_and(|candidate| candidate.eq_ignore_ascii_case(essence))
            })
            .map(|descriptor| descriptor.format)
    }
}

impl fmt::Display for QueryResultsFormat {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor().label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_match_their_format() {
        for format in [
            QueryResultsFormat::Xml,
            QueryResultsFormat::Json,
            QueryResultsFormat::Csv,
            QueryResultsFormat::Tsv,
        ] {
            assert_eq!(format.descriptor().format, format);
            assert_eq!(QueryResultsFormat::from_extension(format.file_extension()), Some(format));
            assert_eq!(QueryResultsFormat::from_media_type(format.media_type()), Some(format));
        }
    }

    #[test]
    fn media_type_parameters_are_ignored() {
        assert_eq!(
            QueryResultsFormat::from_media_type("Text/CSV"),
            Some(QueryResultsFormat::Csv)
        );
        assert_eq!(
            QueryResultsFormat::from_media_type("application/sparql-results+xml; charset=utf-8"),
            Some(QueryResultsFormat::Xml)
        );
        assert_eq!(QueryResultsFormat::from_media_type("text/turtle"), None);
    }

    #[test]
    fn aliases() {
        assert_eq!(QueryResultsFormat::from_extension("txt"), Some(QueryResultsFormat::Csv));
        assert_eq!(QueryResultsFormat::from_extension("XML"), Some(QueryResultsFormat::Xml));
    }
}
