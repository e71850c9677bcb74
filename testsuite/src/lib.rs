//! Runs DAWG style test manifests against RelRDF.
//!
//! Syntax tests parse a query file. Evaluation tests load the test data into version 1 of
//! an in-memory model base, run the query on a `singleversion` model and compare the
//! solutions with the expected ones.

pub mod evaluator;
pub mod files;
pub mod manifest;
pub mod report;
pub mod sparql_evaluator;
mod vocab;

use crate::evaluator::TestEvaluator;
use crate::manifest::TestManifest;
use crate::report::TestResult;
use crate::sparql_evaluator::register_sparql_tests;
use anyhow::{Result, bail};

/// An evaluator knowing every supported test type.
pub fn default_evaluator() -> TestEvaluator {
    let mut evaluator = TestEvaluator::default();
    register_sparql_tests(&mut evaluator);
    evaluator
}

/// Counts of a test run.
#[derive(Debug, Default)]
pub struct Summary {
    pub passed: usize,
    /// Failed on a construct the compiler does not translate.
    pub not_supported: usize,
    /// Failed tests listed as ignored.
    pub ignored: usize,
    pub failures: Vec<String>,
}

impl Summary {
    pub fn new(results: &[TestResult], ignored_tests: &[&str]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match &result.outcome {
                Ok(()) => summary.passed += 1,
                Err(_) if result.is_not_supported() => summary.not_supported += 1,
                Err(_) if ignored_tests.contains(&result.test.as_str()) => summary.ignored += 1,
                Err(error) => summary
                    .failures
                    .push(format!("{} failed: {error:#}", result.test)),
            }
        }
        summary
    }
}

/// Runs the tests of a manifest, failing if any test fails for another reason than
/// an unsupported construct. Returns the number of unsupported tests.
pub fn check_testsuite(manifest_url: &str, ignored_tests: &[&str]) -> Result<usize> {
    let results = default_evaluator().evaluate(TestManifest::new([manifest_url]))?;
    let summary = Summary::new(&results, ignored_tests);
    if !summary.failures.is_empty() {
        bail!(
            "{} of {} tests failed:\n{}",
            summary.failures.len(),
            results.len(),
            summary.failures.join("\n")
        );
    }
    Ok(summary.not_supported)
}
