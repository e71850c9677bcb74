#![allow(clippy::print_stderr, clippy::print_stdout)]

use crate::cli::{Args, Command, Language, LogFormat};
use anyhow::{Context, bail, ensure};
use clap::Parser;
use relrdf::import::{RdfFormat, import};
use relrdf::sinks::Sink;
use relrdf::{ModelBase, ModelConfig, ModelKind, QueryLanguage};
use relrdf_results::{QueryResultsFormat, QueryResultsSerializer};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, BufReader, Write, stdin, stdout};
use std::path::Path;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;

pub fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_format);
    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Init { db } => {
            ModelBase::open(&db)?;
            info!(db = %db.display(), "Initialized the model base");
            Ok(())
        }
        Command::Load {
            db,
            version,
            format,
            base,
            files,
        } => {
            let format = format.as_deref().map(rdf_format_from_name).transpose()?;
            let modelbase = ModelBase::open(&db)?;
            let version = match version {
                Some(version) => version,
                None => modelbase.next_version()?,
            };
            let mut sink = modelbase.version_sink(version)?;
            for file in &files {
                let format = match format {
                    Some(format) => format,
                    None => rdf_format_from_path(file)?,
                };
                let reader = BufReader::new(
                    File::open(file)
                        .with_context(|| format!("Not able to open file {}", file.display()))?,
                );
                if let Err(error) = import(&mut sink, reader, format, base.as_deref()) {
                    sink.rollback()?;
                    return Err(error)
                        .with_context(|| format!("Error while loading file {}", file.display()));
                }
            }
            let count = sink.finish()?;
            sink.close()?;
            eprintln!("{count} triples added to version {version}");
            Ok(())
        }
        Command::Query {
            db,
            model,
            version_a,
            version_b,
            version_c,
            language,
            format,
            base,
            sql,
            file,
            query,
        } => {
            let (query, file_name) = if let Some(query) = query {
                (query, "<query>".to_owned())
            } else if let Some(file) = file {
                let query = fs::read_to_string(&file)
                    .with_context(|| format!("Not able to read query file {}", file.display()))?;
                (query, file.display().to_string())
            } else {
                (io::read_to_string(stdin().lock())?, "<stdin>".to_owned())
            };
            let language = match language {
                Language::Sparql => QueryLanguage::Sparql,
                Language::Serql => QueryLanguage::Serql,
            };
            let config = ModelConfig {
                version_a,
                version_b,
                version_c,
                base_graph: base,
                ..ModelConfig::new(model.parse::<ModelKind>()?)
            };
            config.validate()?;
            let modelbase = open_existing(&db)?;
            let model = modelbase.model(&config)?;
            if sql {
                println!("{}", model.compile(language, &query, &file_name)?);
                return Ok(());
            }
            let results_format = QueryResultsFormat::from_extension(&format)
                .with_context(|| format!("The results format '{format}' is unknown"))?;
            let results = model.query_named(language, &query, &file_name)?;
            let mut writer = QueryResultsSerializer::from_format(results_format)
                .solutions_writer(stdout().lock(), results.column_names().to_vec())?;
            for row in results {
                writer.write_row(&row?)?;
            }
            writer.finish()?.flush()?;
            Ok(())
        }
        Command::Versions { db } => {
            let modelbase = open_existing(&db)?;
            let mut out = stdout().lock();
            writeln!(out, "version\tstatements")?;
            for info in modelbase.versions()? {
                writeln!(out, "{}\t{}", info.version, info.statements)?;
            }
            Ok(())
        }
        Command::Delete { db, version } => {
            let removed = open_existing(&db)?.delete_version(version)?;
            ensure!(removed > 0, "The version {version} does not exist");
            eprintln!("{removed} statements removed from version {version}");
            Ok(())
        }
        Command::Prefix {
            db,
            prefix,
            namespace,
        } => {
            open_existing(&db)?.add_prefix(prefix, namespace)?;
            Ok(())
        }
    }
}

/// Opens a model base, failing instead of creating it if the file does not exist.
fn open_existing(db: &Path) -> anyhow::Result<ModelBase> {
    ensure!(
        db.exists(),
        "The model base {} does not exist, create it with the init command",
        db.display()
    );
    Ok(ModelBase::open(db)?)
}

fn rdf_format_from_path(path: &Path) -> anyhow::Result<RdfFormat> {
    if let Some(ext) = path.extension().and_then(OsStr::to_str) {
        RdfFormat::from_extension(ext).with_context(|| {
            format!("Not able to guess the file format from file name extension '{ext}'")
        })
    } else {
        bail!(
            "The path {} has no extension to guess a file format from",
            path.display()
        )
    }
}

fn rdf_format_from_name(name: &str) -> anyhow::Result<RdfFormat> {
    if let Some(format) = RdfFormat::from_extension(name) {
        return Ok(format);
    }
    bail!("The file format '{name}' is unknown")
}
