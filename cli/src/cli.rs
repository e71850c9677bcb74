use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "relrdf")]
/// RelRDF command line toolkit: stores versions of RDF graphs and queries them with SPARQL or SerQL
pub struct Args {
    /// Format of the log messages written to stderr
    ///
    /// The messages are filtered with the RUST_LOG environment variable, "warn" by default.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a model base
    ///
    /// Opening an existing model base leaves it unchanged.
    Init {
        /// SQLite file storing the model base
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        db: PathBuf,
    },
    /// Import file(s) as a new version
    ///
    /// All the files are added to the same version.
    /// Nothing is stored if one of them is invalid.
    Load {
        /// SQLite file storing the model base
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        db: PathBuf,
        /// The version to add the triples to
        ///
        /// By default, the version following the greatest stored version.
        #[arg(short, long)]
        version: Option<u32>,
        /// The format of the file(s) to load: "nt", "ttl" or "rdf"
        ///
        /// By default, the format is guessed from the file extension.
        #[arg(long)]
        format: Option<String>,
        /// Base IRI of the file(s) to load
        #[arg(long, value_hint = ValueHint::Url)]
        base: Option<String>,
        /// File(s) to load
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        files: Vec<PathBuf>,
    },
    /// Execute a query against a model
    Query {
        /// SQLite file storing the model base
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        db: PathBuf,
        /// The view to query: metaversion, singleversion, allversions, twoway or threeway
        #[arg(short, long, default_value = "singleversion")]
        model: String,
        /// Version A of the view, the only version of a singleversion view
        #[arg(short = 'A', long)]
        version_a: Option<u32>,
        /// Version B of a twoway or threeway view
        #[arg(short = 'B', long)]
        version_b: Option<u32>,
        /// Version C of a threeway view
        #[arg(short = 'C', long)]
        version_c: Option<u32>,
        /// The query language
        #[arg(short, long, value_enum, default_value_t = Language::Sparql)]
        language: Language,
        /// The results format: "xml", "json", "tsv" or "csv"
        #[arg(short, long, default_value = "tsv")]
        format: String,
        /// Base IRI of the query
        #[arg(long, value_hint = ValueHint::Url)]
        base: Option<String>,
        /// Print the SQL translation of the query instead of running it
        #[arg(long)]
        sql: bool,
        /// File in which the query is stored
        ///
        /// If no query or query file are given, stdin is used.
        #[arg(long, conflicts_with = "query", value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// The query to execute
        query: Option<String>,
    },
    /// List the stored versions and their number of statements
    Versions {
        /// SQLite file storing the model base
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        db: PathBuf,
    },
    /// Remove a version
    Delete {
        /// SQLite file storing the model base
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        db: PathBuf,
        /// The version to remove
        version: u32,
    },
    /// Persist a prefix usable in every query
    Prefix {
        /// SQLite file storing the model base
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        db: PathBuf,
        /// The prefix, without the trailing colon
        prefix: String,
        /// The namespace IRI
        #[arg(value_hint = ValueHint::Url)]
        namespace: String,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum LogFormat {
    /// Human readable lines
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum Language {
    Sparql,
    Serql,
}
