// SPDX-License-Identifier: GPL-3.0-or-later

//! Generates shell completion scripts for the `tracedb` command line interface.
//!
//! Usage: `generate-completions <shell> <output-dir>`, where `<shell>` is one
//! of the values supported by `clap_complete::Shell` (bash, zsh, fish,
//! elvish, powershell).

use clap_complete::{generate_to, Shell};
use std::path::PathBuf;
use std::str::FromStr;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let shell_name = args.next().ok_or_else(|| anyhow::anyhow!("Missing shell argument"))?;
    let out_dir = args.next().ok_or_else(|| anyhow::anyhow!("Missing output directory argument"))?;

    let shell = Shell::from_str(&shell_name)
        .map_err(|_| anyhow::anyhow!("Unrecognized shell: {shell_name}"))?;

    let out_dir = PathBuf::from(out_dir);
    std::fs::create_dir_all(&out_dir)?;

    let mut command = tracedb::args::cli();
    let name = command.get_name().to_string();
    let path = generate_to(shell, &mut command, name, &out_dir)?;

    println!("Generated completion script: {}", path.display());
    Ok(())
}
