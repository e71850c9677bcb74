pub mod rs {
    use relrdf_model::UriRef;

    pub const RESULT_SET: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/sw/DataAccess/tests/result-set#ResultSet");
    pub const RESULT_VARIABLE: UriRef<'_> = UriRef::new_unchecked(
        "http://www.w3.org/2001/sw/DataAccess/tests/result-set#resultVariable",
    );
    pub const SOLUTION: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/sw/DataAccess/tests/result-set#solution");
    pub const BINDING: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/sw/DataAccess/tests/result-set#binding");
    pub const VALUE: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/sw/DataAccess/tests/result-set#value");
    pub const VARIABLE: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/sw/DataAccess/tests/result-set#variable");
    pub const INDEX: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/sw/DataAccess/tests/result-set#index");
    pub const BOOLEAN: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/sw/DataAccess/tests/result-set#boolean");
}

pub mod mf {
    use relrdf_model::UriRef;

    pub const MANIFEST: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/sw/DataAccess/tests/test-manifest#Manifest");
    pub const INCLUDE: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/sw/DataAccess/tests/test-manifest#include");
    pub const ENTRIES: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/sw/DataAccess/tests/test-manifest#entries");
    pub const NAME: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/sw/DataAccess/tests/test-manifest#name");
    pub const ACTION: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/sw/DataAccess/tests/test-manifest#action");
    pub const RESULT: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/sw/DataAccess/tests/test-manifest#result");
}

pub mod qt {
    use relrdf_model::UriRef;

    pub const QUERY: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/sw/DataAccess/tests/test-query#query");
    pub const DATA: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/sw/DataAccess/tests/test-query#data");
    pub const GRAPH_DATA: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/sw/DataAccess/tests/test-query#graphData");
}

pub mod dawgt {
    use relrdf_model::UriRef;

    pub const APPROVAL: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/sw/DataAccess/tests/test-dawg#approval");
    pub const REJECTED: UriRef<'_> =
        UriRef::new_unchecked("http://www.w3.org/2001/sw/DataAccess/tests/test-dawg#Rejected");
}

pub mod earl {
    pub const NAMESPACE: &str = "http://www.w3.org/ns/earl#";
}
