//! `vaultkeeper completions <shell>` writes a completion script to stdout.

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

pub fn execute(shell: Shell) -> Result<()> {
    let mut out = io::stdout().lock();
    write_completions(shell, &mut out);
    out.flush()?;
    Ok(())
}

/// The binary name comes from the clap definition, not a literal.
pub fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
}
