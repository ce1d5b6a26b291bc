//! Build script: renders the `metaterm-l10n(1)` manual page from the CLI
//! definition.

use clap::CommandFactory;
use clap_mangen::Man;
use std::{env, fs, path::PathBuf};

#[path = "src/cli.rs"]
#[expect(
    dead_code,
    reason = "Only type definitions are needed for man page generation"
)]
mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-env-changed=CARGO_PKG_VERSION");
    println!("cargo:rerun-if-env-changed=CARGO_PKG_NAME");
    println!("cargo:rerun-if-env-changed=CARGO_BIN_NAME");

    let out_dir = PathBuf::from("target/generated-man");
    if out_dir.exists() {
        fs::remove_dir_all(&out_dir)?;
    }
    fs::create_dir_all(&out_dir)?;

    let cmd = cli::Cli::command();
    let name = cmd.get_name().to_owned();
    let bin_name = env::var("CARGO_BIN_NAME")
        .or_else(|_| env::var("CARGO_PKG_NAME"))
        .unwrap_or_else(|_| name.clone());
    if name != bin_name {
        return Err(format!("CLI name '{name}' differs from binary name '{bin_name}'").into());
    }

    // One page for the tool, one per subcommand.
    let mut pages = vec![(bin_name.clone(), cmd.clone())];
    pages.extend(
        cmd.get_subcommands()
            .map(|sub| (format!("{bin_name}-{}", sub.get_name()), sub.clone())),
    );
    for (page, command) in pages {
        let mut buf = Vec::new();
        Man::new(command).title(page.clone()).render(&mut buf)?;
        fs::write(out_dir.join(format!("{page}.1")), buf)?;
    }
    Ok(())
}
