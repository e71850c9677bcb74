#![allow(clippy::print_stdout, clippy::print_stderr)]

use anyhow::Result;
use clap::Parser;
use relrdf_testsuite::Summary;
use relrdf_testsuite::default_evaluator;
use relrdf_testsuite::manifest::TestManifest;
use relrdf_testsuite::report::build_report;

#[derive(Parser)]
/// Runs test manifests against RelRDF and prints an EARL report
struct Args {
    /// URLs of the manifests to run, file: URLs or W3C test suite URLs
    #[arg(required = true)]
    manifest: Vec<String>,
    /// Print pass and failure counts to stderr instead of the report
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let results = default_evaluator().evaluate(TestManifest::new(args.manifest))?;
    if args.summary {
        let summary = Summary::new(&results, &[]);
        for failure in &summary.failures {
            eprintln!("{failure}");
        }
        eprintln!(
            "{} passed, {} not supported, {} failed",
            summary.passed,
            summary.not_supported,
            summary.failures.len()
        );
    } else {
        print!("{}", build_report(results));
    }
    Ok(())
}
