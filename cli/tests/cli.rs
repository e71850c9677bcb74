#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use anyhow::Result;
use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::{NamedTempFile, TempDir};
use predicates::prelude::*;

fn cli_command() -> Result<Command> {
    Ok(Command::cargo_bin("relrdf")?)
}

/// A model base with version 1 `{a p "x", b p "y"}` and version 2 `{a p "x", c p "z"}`.
fn initialized_modelbase() -> Result<(TempDir, String)> {
    let dir = TempDir::new()?;
    let db = dir.child("models.db").path().display().to_string();
    cli_command()?.arg("init").arg("--db").arg(&db).assert().success();
    for data in [
        "<http://example.com/a> <http://example.com/p> \"x\" .\n<http://example.com/b> <http://example.com/p> \"y\" .\n",
        "<http://example.com/a> <http://example.com/p> \"x\" .\n<http://example.com/c> <http://example.com/p> \"z\" .\n",
    ] {
        let file = dir.child("data.nt");
        file.write_str(data)?;
        cli_command()?
            .arg("load")
            .arg("--db")
            .arg(&db)
            .arg(file.path())
            .assert()
            .success()
            .stderr(predicate::str::contains("2 triples added"));
    }
    Ok((dir, db))
}

#[test]
fn cli_help() -> Result<()> {
    cli_command()?
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("Usage"));
    Ok(())
}

#[test]
fn cli_load_and_list_versions() -> Result<()> {
    let (_dir, db) = initialized_modelbase()?;
    cli_command()?
        .arg("versions")
        .arg("--db")
        .arg(&db)
        .assert()
        .success()
        .stdout("version\tstatements\n1\t2\n2\t2\n");
    Ok(())
}

#[test]
fn cli_load_turtle_with_base() -> Result<()> {
    let (dir, db) = initialized_modelbase()?;
    let file = dir.child("more.ttl");
    file.write_str("<d> <p> \"w\" .")?;
    cli_command()?
        .arg("load")
        .arg("--db")
        .arg(&db)
        .arg("--version")
        .arg("7")
        .arg("--base")
        .arg("http://example.com/")
        .arg(file.path())
        .assert()
        .success();
    cli_command()?
        .arg("query")
        .arg("--db")
        .arg(&db)
        .arg("-A")
        .arg("7")
        .arg("SELECT ?s WHERE { ?s <http://example.com/p> ?o }")
        .assert()
        .success()
        .stdout("?s\n<http://example.com/d>\n");
    Ok(())
}

#[test]
fn cli_invalid_file_stores_nothing() -> Result<()> {
    let (dir, db) = initialized_modelbase()?;
    let file = dir.child("broken.nt");
    file.write_str("<http://example.com/a> <http://example.com/p> .\n")?;
    cli_command()?
        .arg("load")
        .arg("--db")
        .arg(&db)
        .arg(file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("error: Error while loading file"));
    cli_command()?
        .arg("versions")
        .arg("--db")
        .arg(&db)
        .assert()
        .success()
        .stdout("version\tstatements\n1\t2\n2\t2\n");
    Ok(())
}

#[test]
fn cli_two_way_query() -> Result<()> {
    let (_dir, db) = initialized_modelbase()?;
    cli_command()?
        .arg("query")
        .arg("--db")
        .arg(&db)
        .arg("--model")
        .arg("twoway")
        .arg("-A")
        .arg("1")
        .arg("-B")
        .arg("2")
        .arg("SELECT ?s ?o WHERE { GRAPH relrdf:compB { ?s ?p ?o } }")
        .assert()
        .success()
        .stdout("?s\t?o\n<http://example.com/c>\t\"z\"\n");
    Ok(())
}

#[test]
fn cli_serql_query_file_as_json() -> Result<()> {
    let (_dir, db) = initialized_modelbase()?;
    let query = NamedTempFile::new("query.serql")?;
    query.write_str("SELECT s FROM {s} ex:p {\"y\"} USING NAMESPACE ex = <http://example.com/>")?;
    cli_command()?
        .arg("query")
        .arg("--db")
        .arg(&db)
        .arg("-A")
        .arg("1")
        .arg("--language")
        .arg("serql")
        .arg("--format")
        .arg("json")
        .arg("--file")
        .arg(query.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"s":{"type":"uri","value":"http://example.com/b"}}"#,
        ));
    Ok(())
}

#[test]
fn cli_query_from_stdin_with_prefix() -> Result<()> {
    let (_dir, db) = initialized_modelbase()?;
    cli_command()?
        .arg("prefix")
        .arg("--db")
        .arg(&db)
        .arg("ex")
        .arg("http://example.com/")
        .assert()
        .success();
    cli_command()?
        .arg("query")
        .arg("--db")
        .arg(&db)
        .arg("--model")
        .arg("allversions")
        .arg("--format")
        .arg("csv")
        .write_stdin("SELECT DISTINCT ?s WHERE { GRAPH ?g { ?s ex:p ?o } } ORDER BY ?s")
        .assert()
        .success()
        .stdout("s\r\nhttp://example.com/a\r\nhttp://example.com/b\r\nhttp://example.com/c\r\n");
    Ok(())
}

#[test]
fn cli_print_sql() -> Result<()> {
    let (_dir, db) = initialized_modelbase()?;
    cli_command()?
        .arg("query")
        .arg("--db")
        .arg(&db)
        .arg("-A")
        .arg("1")
        .arg("--sql")
        .arg("SELECT ?s WHERE { ?s ?p ?o }")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("SELECT").and(predicate::str::contains("version_statement")));
    Ok(())
}

#[test]
fn cli_query_errors_have_positions() -> Result<()> {
    let (_dir, db) = initialized_modelbase()?;
    cli_command()?
        .arg("query")
        .arg("--db")
        .arg(&db)
        .arg("-A")
        .arg("1")
        .arg("SELECT ?s WHERE { ?s ex:p ?o }")
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("error: <query>:1:"));
    Ok(())
}

#[test]
fn cli_missing_version_argument() -> Result<()> {
    let (_dir, db) = initialized_modelbase()?;
    cli_command()?
        .arg("query")
        .arg("--db")
        .arg(&db)
        .arg("--model")
        .arg("twoway")
        .arg("-A")
        .arg("1")
        .arg("SELECT ?s WHERE { ?s ?p ?o }")
        .assert()
        .code(1)
        .stderr("error: Missing parameter 'versionB' for a twoway model\n");
    cli_command()?
        .arg("query")
        .arg("--db")
        .arg(&db)
        .arg("-A")
        .arg("one")
        .arg("SELECT ?s WHERE { ?s ?p ?o }")
        .assert()
        .code(2);
    Ok(())
}

#[test]
fn cli_missing_modelbase() -> Result<()> {
    let dir = TempDir::new()?;
    cli_command()?
        .arg("versions")
        .arg("--db")
        .arg(dir.child("missing.db").path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
    Ok(())
}

#[test]
fn cli_delete_version() -> Result<()> {
    let (_dir, db) = initialized_modelbase()?;
    cli_command()?
        .arg("delete")
        .arg("--db")
        .arg(&db)
        .arg("1")
        .assert()
        .success();
    cli_command()?
        .arg("versions")
        .arg("--db")
        .arg(&db)
        .assert()
        .success()
        .stdout("version\tstatements\n2\t2\n");
    cli_command()?
        .arg("delete")
        .arg("--db")
        .arg(&db)
        .arg("1")
        .assert()
        .code(1);
    Ok(())
}

#[test]
fn cli_json_logs() -> Result<()> {
    let (_dir, db) = initialized_modelbase()?;
    cli_command()?
        .arg("--log-format")
        .arg("json")
        .arg("versions")
        .arg("--db")
        .arg(&db)
        .env("RUST_LOG", "info")
        .assert()
        .success()
        .stderr(predicate::str::contains(r#""level":"INFO""#));
    Ok(())
}
