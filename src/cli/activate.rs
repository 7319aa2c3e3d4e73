use anyhow::{Context, Result};
use clap::Args;

use crate::shell::Shell;

#[derive(Args)]
pub struct ActivateArgs {
    /// Shell to generate the activation script for (bash, zsh, fish)
    pub shell: Shell,
}

pub fn run(args: &ActivateArgs) -> Result<()> {
    // The activation script carries the absolute binary path so that bound
    // functions keep working even if cmdshim is not on PATH later.
    let exe = std::env::current_exe().context("Failed to locate the cmdshim binary")?;

    print!("{}", args.shell.activation_script(&exe));

    Ok(())
}
