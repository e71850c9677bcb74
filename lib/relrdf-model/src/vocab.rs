//! Ready to use [`UriRef`](super::UriRef)s for the vocabularies every query understands without a prefix declaration.

use crate::namespace::Namespace;

/// The prefixes bound in every query, with their namespaces.
pub const BASE_PREFIXES: [(&str, &str); 6] = [
    ("rdf", rdf::NAMESPACE),
    ("rdfs", rdfs::NAMESPACE),
    ("xsd", xsd::NAMESPACE),
    ("owl", owl::NAMESPACE),
    ("serql", serql::NAMESPACE),
    ("relrdf", relrdf::NAMESPACE),
];

/// The base prefixes as [`Namespace`]s.
pub fn base_namespaces() -> impl Iterator<Item = (&'static str, Namespace)> {
    BASE_PREFIXES
        .into_iter()
        .map(|(prefix, namespace)| (prefix, Namespace::new(namespace)))
}

pub mod rdf {
    //! [RDF](https://www.w3.org/TR/rdf11-concepts/) vocabulary.
    use crate::uri::UriRef;

    /// The namespace all terms of this vocabulary share.
    pub const NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// The class of containers of alternatives.
    pub const ALT: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#Alt");
    /// The class of unordered containers.
    pub const BAG: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#Bag");
    /// The first item in the subject RDF list.
    pub const FIRST: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#first");
    /// The class of HTML literal values.
    pub const HTML: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#HTML");
    pub const LANG_STRING: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#langString");
    /// The class of RDF lists.
    pub const LIST: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#List");
    /// The empty list.
    pub const NIL: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#nil");
    /// The object of the subject RDF statement.
    pub const OBJECT: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#object");
    /// The predicate of the subject RDF statement.
    pub const PREDICATE: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#predicate");
    /// The class of RDF properties.
    pub const PROPERTY: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#Property");
    /// The rest of the subject RDF list after the first item.
    pub const REST: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#rest");
    /// The class of ordered containers.
    pub const SEQ: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#Seq");
    /// The class of RDF statements.
    pub const STATEMENT: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#Statement");
    /// The subject of the subject RDF statement.
    pub const SUBJECT: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#subject");
    /// The subject is an instance of a class.
    pub const TYPE: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#type");
    /// Idiomatic property used for structured values.
    pub const VALUE: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#value");
    /// The class of XML literal values.
    pub const XML_LITERAL: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/1999/02/22-rdf-syntax-ns#XMLLiteral");
}

pub mod rdfs {
    //! [RDFS](https://www.w3.org/TR/rdf-schema/) vocabulary.
    use crate::uri::UriRef;

    /// The namespace all terms of this vocabulary share.
    pub const NAMESPACE: &str = "http://www.w3.org/2000/01/rdf-schema#";

    /// The class of classes.
    pub const CLASS: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#Class");
    /// A description of the subject resource.
    pub const COMMENT: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#comment");
    /// The class of RDF containers.
    pub const CONTAINER: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#Container");
    /// The class of container membership properties, `rdf:_1`, `rdf:_2`, ..., all of which are sub-properties of `member`.
    pub const CONTAINER_MEMBERSHIP_PROPERTY: UriRef<'_> = UriRef::new_unchecked(
        "http://www.w3.org/2000/01/rdf-schema#ContainerMembershipProperty",
    );
    /// The class of RDF datatypes.
    pub const DATATYPE: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#Datatype");
    /// A domain of the subject property.
    pub const DOMAIN: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#domain");
    /// The definition of the subject resource.
    pub const IS_DEFINED_BY: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#isDefinedBy");
    /// A human-readable name for the subject.
    pub const LABEL: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#label");
    /// The class of literal values, e.g. textual strings and integers.
    pub const LITERAL: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#Literal");
    /// A member of the subject resource.
    pub const MEMBER: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#member");
    /// A range of the subject property.
    pub const RANGE: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#range");
    /// The class resource, everything.
    pub const RESOURCE: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#Resource");
    /// Further information about the subject resource.
    pub const SEE_ALSO: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#seeAlso");
    /// The subject is a subclass of a class.
    pub const SUB_CLASS_OF: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#subClassOf");
    /// The subject is a subproperty of a property.
    pub const SUB_PROPERTY_OF: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2000/01/rdf-schema#subPropertyOf");
}

pub mod xsd {
    //! [RDF compatible XSD datatypes](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-compatible-xsd-types).
    use crate::uri::UriRef;

    /// The namespace all terms of this vocabulary share.
    pub const NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";

    /// Absolute or relative URIs and IRIs.
    pub const ANY_URI: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#anyURI");
    /// Base64-encoded binary data.
    pub const BASE_64_BINARY: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#base64Binary");
    /// true, false.
    pub const BOOLEAN: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#boolean");
    /// 128…+127 (8 bit).
    pub const BYTE: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#byte");
    /// Dates (yyyy-mm-dd) with or without timezone.
    pub const DATE: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#date");
    /// Duration of time (days, hours, minutes, seconds only).
    pub const DAY_TIME_DURATION: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#dayTimeDuration");
    /// Date and time with or without timezone.
    pub const DATE_TIME: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#dateTime");
    /// Date and time with required timezone.
    pub const DATE_TIME_STAMP: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#dateTimeStamp");
    /// Arbitrary-precision decimal numbers.
    pub const DECIMAL: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#decimal");
    /// 64-bit floating point numbers incl. ±Inf, ±0, NaN.
    pub const DOUBLE: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#double");
    /// Duration of time.
    pub const DURATION: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#duration");
    /// 32-bit floating point numbers incl. ±Inf, ±0, NaN.
    pub const FLOAT: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#float");
    /// Gregorian calendar day of the month.
    pub const G_DAY: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#gDay");
    /// Gregorian calendar month.
    pub const G_MONTH: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#gMonth");
    /// Gregorian calendar month and day.
    pub const G_MONTH_DAY: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#gMonthDay");
    /// Gregorian calendar year.
    pub const G_YEAR: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#gYear");
    /// Gregorian calendar year and month.
    pub const G_YEAR_MONTH: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#gYearMonth");
    /// Hex-encoded binary data.
    pub const HEX_BINARY: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#hexBinary");
    /// -2147483648…+2147483647 (32 bit).
    pub const INT: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#int");
    /// Arbitrary-size integer numbers.
    pub const INTEGER: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#integer");
    /// Language tags per [BCP47](http://tools.ietf.org/html/bcp47).
    pub const LANGUAGE: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#language");
    /// -9223372036854775808…+9223372036854775807 (64 bit).
    pub const LONG: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#long");
    /// XML Names.
    pub const NAME: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#Name");
    /// XML NCName.
    pub const NC_NAME: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#NCName");
    /// Integer numbers <0.
    pub const NEGATIVE_INTEGER: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#negativeInteger");
    /// XML NMTOKENs.
    pub const NMTOKEN: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#NMTOKEN");
    /// Integer numbers ≥0.
    pub const NON_NEGATIVE_INTEGER: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#nonNegativeInteger");
    /// Integer numbers ≤0.
    pub const NON_POSITIVE_INTEGER: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#nonPositiveInteger");
    /// Whitespace-normalized strings.
    pub const NORMALIZED_STRING: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#normalizedString");
    /// Integer numbers >0.
    pub const POSITIVE_INTEGER: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#positiveInteger");
    /// Times (hh:mm:ss.sss…) with or without timezone.
    pub const TIME: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#time");
    /// -32768…+32767 (16 bit).
    pub const SHORT: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#short");
    /// Character strings (but not all Unicode character strings).
    pub const STRING: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#string");
    /// Tokenized strings.
    pub const TOKEN: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#token");
    /// 0…255 (8 bit).
    pub const UNSIGNED_BYTE: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#unsignedByte");
    /// 0…4294967295 (32 bit).
    pub const UNSIGNED_INT: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#unsignedInt");
    /// 0…18446744073709551615 (64 bit).
    pub const UNSIGNED_LONG: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#unsignedLong");
    /// 0…65535 (16 bit).
    pub const UNSIGNED_SHORT: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#unsignedShort");
    /// Duration of time (months and years only).
    pub const YEAR_MONTH_DURATION: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/XMLSchema#yearMonthDuration");

    /// The datatypes whose values the backend compares and sorts as numbers.
    pub const NUMERIC: [UriRef<'static>; 16] = [
        INTEGER,
        DECIMAL,
        DOUBLE,
        FLOAT,
        INT,
        LONG,
        SHORT,
        BYTE,
        NON_NEGATIVE_INTEGER,
        NON_POSITIVE_INTEGER,
        NEGATIVE_INTEGER,
        POSITIVE_INTEGER,
        UNSIGNED_LONG,
        UNSIGNED_INT,
        UNSIGNED_SHORT,
        UNSIGNED_BYTE,
    ];

    #[inline]
    pub fn is_numeric(datatype: UriRef<'_>) -> bool {
        NUMERIC.contains(&datatype)
    }
}

pub mod owl {
    //! A small part of the [OWL](https://www.w3.org/TR/owl2-overview/) vocabulary.
    use crate::uri::UriRef;

    pub const NAMESPACE: &str = "http://www.w3.org/2002/07/owl#";

    pub const CLASS: UriRef<'_> = UriRef::new_unchecked("http://www.w3.org/2002/07/owl#Class");
    pub const THING: UriRef<'_> = UriRef::new_unchecked("http://www.w3.org/2002/07/owl#Thing");
    pub const OBJECT_PROPERTY: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2002/07/owl#ObjectProperty");
    pub const DATATYPE_PROPERTY: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2002/07/owl#DatatypeProperty");
    pub const SAME_AS: UriRef<'_> = UriRef::new_unchecked("http://www.w3.org/2002/07/owl#sameAs");
}

pub mod serql {
    //! The SerQL built-in vocabulary.
    use crate::uri::UriRef;

    pub const NAMESPACE: &str = "http://www.openrdf.org/schema/serql#";

    pub const DIRECT_SUB_CLASS_OF: UriRef<'_> =
        UriRef::new_unchecked("http://www.openrdf.org/schema/serql#directSubClassOf");
    pub const DIRECT_SUB_PROPERTY_OF: UriRef<'_> =
        UriRef::new_unchecked("http://www.openrdf.org/schema/serql#directSubPropertyOf");
    pub const DIRECT_TYPE: UriRef<'_> =
        UriRef::new_unchecked("http://www.openrdf.org/schema/serql#directType");
}

pub mod relrdf {
    //! Terms used by the version views to name contexts and statements.
    use crate::uri::UriRef;

    pub const NAMESPACE: &str = "http://www.iese.fraunhofer.de/namespace/RelRDF#";

    /// Prefix of the context URIs naming stored versions, followed by the version number.
    pub const VERSION: UriRef<'_> =
        UriRef::new_unchecked("http://www.iese.fraunhofer.de/namespace/RelRDF#version");
    /// Prefix of the statement URIs exposed by the meta-version view, followed by the statement id.
    pub const STMT: UriRef<'_> =
        UriRef::new_unchecked("http://www.iese.fraunhofer.de/namespace/RelRDF#stmt");
    /// Prefix of the derived comparison contexts (`compA`, `compAB`, ...).
    pub const COMP: UriRef<'_> =
        UriRef::new_unchecked("http://www.iese.fraunhofer.de/namespace/RelRDF#comp");
    /// Prefix of the full model contexts (`modelA`, `modelB`, `modelC`).
    pub const MODEL: UriRef<'_> =
        UriRef::new_unchecked("http://www.iese.fraunhofer.de/namespace/RelRDF#model");
    pub const MODEL_A: UriRef<'_> =
        UriRef::new_unchecked("http://www.iese.fraunhofer.de/namespace/RelRDF#modelA");
    pub const MODEL_B: UriRef<'_> =
        UriRef::new_unchecked("http://www.iese.fraunhofer.de/namespace/RelRDF#modelB");
    pub const MODEL_C: UriRef<'_> =
        UriRef::new_unchecked("http://www.iese.fraunhofer.de/namespace/RelRDF#modelC");
    pub const COMP_A: UriRef<'_> =
        UriRef::new_unchecked("http://www.iese.fraunhofer.de/namespace/RelRDF#compA");
    pub const COMP_B: UriRef<'_> =
        UriRef::new_unchecked("http://www.iese.fraunhofer.de/namespace/RelRDF#compB");
    pub const COMP_C: UriRef<'_> =
        UriRef::new_unchecked("http://www.iese.fraunhofer.de/namespace/RelRDF#compC");
    pub const COMP_AB: UriRef<'_> =
        UriRef::new_unchecked("http://www.iese.fraunhofer.de/namespace/RelRDF#compAB");
    pub const COMP_BA: UriRef<'_> =
        UriRef::new_unchecked("http://www.iese.fraunhofer.de/namespace/RelRDF#compBA");
    pub const COMP_AC: UriRef<'_> =
        UriRef::new_unchecked("http://www.iese.fraunhofer.de/namespace/RelRDF#compAC");
    pub const COMP_BC: UriRef<'_> =
        UriRef::new_unchecked("http://www.iese.fraunhofer.de/namespace/RelRDF#compBC");
    pub const COMP_ABC: UriRef<'_> =
        UriRef::new_unchecked("http://www.iese.fraunhofer.de/namespace/RelRDF#compABC");
    pub const VERSION_CONTAINS_STMT: UriRef<'_> =
        UriRef::new_unchecked("http://www.iese.fraunhofer.de/namespace/RelRDF#versionContainsStmt");
}
