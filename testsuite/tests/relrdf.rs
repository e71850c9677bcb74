#![cfg(test)]

use anyhow::{Result, ensure};
use relrdf_testsuite::check_testsuite;
use relrdf_testsuite::files::crate_file_url;

#[test]
fn relrdf_query_testsuite() -> Result<()> {
    let not_supported = check_testsuite(&crate_file_url("relrdf-tests/manifest.ttl"), &[])?;
    ensure!(
        not_supported == 2,
        "expecting the OPTIONAL and graphData tests to be unsupported, got {not_supported}"
    );
    Ok(())
}
