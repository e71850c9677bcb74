use anyhow::{Context, Result, bail};
use relrdf::import::{RdfFormat, import};
use relrdf::sinks::ListSink;
use relrdf_model::{Term, Triple, UriRef};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// The local path of a test file URL.
///
/// `file:` URLs are read as is. The W3C test suites are read from a local
/// `rdf-tests` checkout next to this crate.
pub fn local_path(url: &str) -> Result<PathBuf> {
    if let Some(path) = url.strip_prefix("file://") {
        Ok(PathBuf::from(path))
    } else if let Some(path) = url.strip_prefix("https://w3c.github.io/") {
        Ok(Path::new(env!("CARGO_MANIFEST_DIR")).join(path))
    } else {
        bail!("Not supported url for file: {url}")
    }
}

/// The `file:` URL of a file of this crate, `relative` being relative to the crate directory.
pub fn crate_file_url(relative: &str) -> String {
    format!(
        "file://{}",
        Path::new(env!("CARGO_MANIFEST_DIR")).join(relative).display()
    )
}

pub fn read_file(url: &str) -> Result<impl Read> {
    let path = local_path(url)?;
    Ok(BufReader::new(
        File::open(&path).with_context(|| format!("Failed to read {}", path.display()))?,
    ))
}

pub fn read_file_to_string(url: &str) -> Result<String> {
    let mut buf = String::new();
    read_file(url)?.read_to_string(&mut buf)?;
    Ok(buf)
}

pub fn guess_rdf_format(url: &str) -> Result<RdfFormat> {
    url.rsplit_once('.')
        .and_then(|(_, extension)| RdfFormat::from_extension(extension))
        .with_context(|| format!("Serialization type not found for {url}"))
}

/// Triples kept in memory, with the lookups the manifests and result sets need.
#[derive(Default, Debug)]
pub struct Graph {
    triples: Vec<Triple>,
}

impl Graph {
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn objects_for_subject_predicate<'a>(
        &'a self,
        subject: &'a Term,
        predicate: UriRef<'a>,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.triples
            .iter()
            .filter(move |t| t.subject == *subject && t.predicate == predicate)
            .map(|t| &t.object)
    }

    pub fn object_for_subject_predicate<'a>(
        &'a self,
        subject: &'a Term,
        predicate: UriRef<'a>,
    ) -> Option<&'a Term> {
        self.objects_for_subject_predicate(subject, predicate).next()
    }

    pub fn subjects_for_predicate_object<'a>(
        &'a self,
        predicate: UriRef<'a>,
        object: &'a Term,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.triples
            .iter()
            .filter(move |t| t.predicate == predicate && t.object == *object)
            .map(|t| &t.subject)
    }

    /// The elements of the RDF list starting at `root`.
    pub fn list<'a>(&'a self, root: &'a Term) -> Vec<&'a Term> {
        let mut elements = Vec::new();
        let mut current = Some(root);
        while let Some(node) = current {
            if matches!(node, Term::Uri(uri) if *uri == relrdf_model::vocab::rdf::NIL) {
                break;
            }
            elements.extend(self.object_for_subject_predicate(node, relrdf_model::vocab::rdf::FIRST));
            current = self.object_for_subject_predicate(node, relrdf_model::vocab::rdf::REST);
        }
        elements
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

/// Parses an N-Triples or Turtle file, relative IRIs being resolved against its URL.
pub fn load_graph(url: &str) -> Result<Graph> {
    let mut sink = ListSink::new();
    import(&mut sink, read_file(url)?, guess_rdf_format(url)?, Some(url))
        .with_context(|| format!("Failed to parse {url}"))?;
    Ok(sink.into_triples().into_iter().collect())
}
