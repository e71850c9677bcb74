use crate::files::{Graph, load_graph};
use crate::vocab::{dawgt, mf, qt};
use anyhow::{Context, Result, bail};
use relrdf_model::vocab::{rdf, rdfs};
use relrdf_model::{Term, Uri, UriRef};
use std::collections::VecDeque;
use std::fmt;

/// A manifest entry.
pub struct Test {
    pub id: Uri,
    pub kinds: Vec<Uri>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub action: Action,
    /// URL of the expected results, or the result literal.
    pub result: Option<String>,
}

/// What a test runs on.
pub enum Action {
    /// A query file, for syntax tests.
    File(String),
    /// A `qt:query` with the files it is evaluated against.
    Query {
        query: Option<String>,
        data: Option<String>,
        graph_data: Vec<String>,
    },
}

impl Test {
    /// The file of a syntax test.
    pub fn action_file(&self) -> Result<&str> {
        match &self.action {
            Action::File(file) => Ok(file),
            Action::Query { .. } => bail!("{} should have a file as action", self.id),
        }
    }

    /// The query file of an evaluation test.
    pub fn query_file(&self) -> Result<&str> {
        match &self.action {
            Action::Query {
                query: Some(query), ..
            } => Ok(query),
            _ => bail!("{} has no qt:query", self.id),
        }
    }
}

impl fmt::Display for Test {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)?;
        if let Some(name) = &self.name {
            write!(f, " ({name})")?;
        }
        match &self.action {
            Action::File(file) => write!(f, " on {file}")?,
            Action::Query {
                query,
                data,
                graph_data,
            } => {
                if let Some(query) = query {
                    write!(f, " running {query}")?;
                }
                if let Some(data) = data {
                    write!(f, " over {data}")?;
                }
                for graph in graph_data {
                    write!(f, " with the named graph {graph}")?;
                }
            }
        }
        if let Some(result) = &self.result {
            write!(f, " expecting {result}")?;
        }
        if let Some(comment) = &self.comment {
            write!(f, ": {comment}")?;
        }
        Ok(())
    }
}

/// Iterates the entries of a list of manifests and of the manifests they include.
///
/// Entries approved as `dawgt:Rejected` are skipped.
pub struct TestManifest {
    pending_manifests: VecDeque<String>,
    graph: Graph,
    pending_entries: VecDeque<Term>,
}

impl TestManifest {
    pub fn new(manifest_urls: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            pending_manifests: manifest_urls.into_iter().map(Into::into).collect(),
            graph: Graph::default(),
            pending_entries: VecDeque::new(),
        }
    }

    fn open_manifest(&mut self, url: &str) -> Result<()> {
        self.graph = load_graph(url)?;
        let manifest_type = Term::from(Uri::from(mf::MANIFEST));
        let mut manifests = self
            .graph
            .subjects_for_predicate_object(rdf::TYPE, &manifest_type);
        let (Some(manifest), None) = (manifests.next(), manifests.next()) else {
            bail!("{url} should describe exactly one mf:Manifest");
        };
        let manifest = manifest.clone();
        for include in self.list_of(&manifest, mf::INCLUDE) {
            match include {
                Term::Uri(include) => self.pending_manifests.push_back(include.into_string()),
                other => bail!("{url} includes {other}, which is not a URL"),
            }
        }
        self.pending_entries = self.list_of(&manifest, mf::ENTRIES).into();
        Ok(())
    }

    fn list_of(&self, subject: &Term, predicate: UriRef<'_>) -> Vec<Term> {
        self.graph
            .object_for_subject_predicate(subject, predicate)
            .map(|root| self.graph.list(root).into_iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl Iterator for TestManifest {
    type Item = Result<Test>;

    fn next(&mut self) -> Option<Result<Test>> {
        loop {
            if let Some(entry) = self.pending_entries.pop_front() {
                match read_test(&self.graph, &entry) {
                    Ok(Some(test)) => return Some(Ok(test)),
                    Ok(None) => continue,
                    Err(error) => return Some(Err(error)),
                }
            }
            let url = self.pending_manifests.pop_front()?;
            if let Err(error) = self.open_manifest(&url) {
                return Some(Err(error.context(format!("Failed to read the manifest {url}"))));
            }
        }
    }
}

/// Reads an entry, `None` if it is rejected.
fn read_test(graph: &Graph, entry: &Term) -> Result<Option<Test>> {
    let Term::Uri(id) = entry else {
        bail!("Test entries should be URLs, found {entry}");
    };
    let rejected = Term::from(Uri::from(dawgt::REJECTED));
    if graph
        .objects_for_subject_predicate(entry, dawgt::APPROVAL)
        .any(|approval| *approval == rejected)
    {
        return Ok(None);
    }
    let kinds = graph
        .objects_for_subject_predicate(entry, rdf::TYPE)
        .map(|kind| match kind {
            Term::Uri(kind) => Ok(kind.clone()),
            other => bail!("{id} has the type {other}, which is not a URL"),
        })
        .collect::<Result<_>>()?;
    let action = match graph
        .object_for_subject_predicate(entry, mf::ACTION)
        .with_context(|| format!("{id} has no mf:action"))?
    {
        Term::Uri(file) => Action::File(file.as_str().to_owned()),
        node @ Term::BlankNode(_) => Action::Query {
            query: uri_value(graph, node, qt::QUERY),
            data: uri_value(graph, node, qt::DATA),
            graph_data: graph
                .objects_for_subject_predicate(node, qt::GRAPH_DATA)
                .filter_map(as_url)
                .collect(),
        },
        other => bail!("{id} has the action {other}, expecting a URL or a blank node"),
    };
    let result = match graph.object_for_subject_predicate(entry, mf::RESULT) {
        None => None,
        Some(Term::Uri(url)) => Some(url.as_str().to_owned()),
        Some(Term::Literal(value)) => Some(value.value().to_owned()),
        Some(other) => bail!("{id} has the result {other}, expecting a URL or a literal"),
    };
    Ok(Some(Test {
        id: id.clone(),
        kinds,
        name: literal_value(graph, entry, mf::NAME),
        comment: literal_value(graph, entry, rdfs::COMMENT),
        action,
        result,
    }))
}

fn as_url(term: &Term) -> Option<String> {
    match term {
        Term::Uri(uri) => Some(uri.as_str().to_owned()),
        _ => None,
    }
}

fn uri_value(graph: &Graph, subject: &Term, predicate: UriRef<'_>) -> Option<String> {
    graph
        .object_for_subject_predicate(subject, predicate)
        .and_then(as_url)
}

fn literal_value(graph: &Graph, subject: &Term, predicate: UriRef<'_>) -> Option<String> {
    match graph.object_for_subject_predicate(subject, predicate)? {
        Term::Literal(literal) => Some(literal.value().to_owned()),
        _ => None,
    }
}
