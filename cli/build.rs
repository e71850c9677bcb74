include!("src/cli.rs");

use clap::{Command as ClapCommand, CommandFactory, ValueEnum};
use clap_complete::Shell;
use clap_mangen::Man;
use std::env::var_os;
use std::fs::create_dir_all;
use std::io::{Error, Result};
use std::path::Path;

const BIN_NAME: &str = "relrdf";

/// Shell completions land in `$OUT_DIR/complete`, man pages in `$OUT_DIR/man`.
fn main() -> Result<()> {
    let out_dir = var_os("OUT_DIR").ok_or_else(|| Error::other("OUT_DIR is not set"))?;
    let out_dir = Path::new(&out_dir);
    let command = Args::command().bin_name(BIN_NAME);
    write_completions(command.clone(), &out_dir.join("complete"))?;
    write_man_pages(&command, &out_dir.join("man"))
}

fn write_completions(mut command: ClapCommand, dir: &Path) -> Result<()> {
    create_dir_all(dir)?;
    for shell in Shell::value_variants() {
        clap_complete::generate_to(*shell, &mut command, BIN_NAME, dir)?;
    }
    Ok(())
}

/// One page for the tool, one `relrdf-<command>` page per subcommand.
fn write_man_pages(command: &ClapCommand, dir: &Path) -> Result<()> {
    create_dir_all(dir)?;
    Man::new(command.clone().disable_help_subcommand(true)).generate_to(dir)?;
    for subcommand in command.get_subcommands() {
        let page = subcommand
            .clone()
            .name(format!("{BIN_NAME}-{}", subcommand.get_name()))
            .disable_help_subcommand(true);
        Man::new(page).generate_to(dir)?;
    }
    Ok(())
}
