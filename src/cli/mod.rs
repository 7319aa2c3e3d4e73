pub mod activate;
pub mod config;
pub mod exec;
pub mod hook;
pub mod list;
pub mod status;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cmdshim")]
#[command(author, version, about = "Transparent command interception for interactive shells")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file
    #[arg(short, long, global = true, env = "CMDSHIM_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the activation script for a shell
    Activate(activate::ActivateArgs),

    /// Shell hook plumbing (called by the activation script)
    Hook(hook::HookArgs),

    /// Run a command through the sandbox-wrapping executor
    Exec(exec::ExecArgs),

    /// Run a command directly, skipping interception
    Bypass(exec::BypassArgs),

    /// List the commands resolved for the current directory
    List,

    /// Show resolver availability and configuration
    Status,

    /// Configuration management
    Config(config::ConfigArgs),
}
