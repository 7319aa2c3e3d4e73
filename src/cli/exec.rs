//! The `exec` and `bypass` subcommands: the two entry points bound shell
//! functions forward to. Both replace the shim process on Unix so exit
//! status, streams, and signal dispositions belong to the real command.
//! They run before the Tokio runtime starts (see main.rs).

use anyhow::Result;
use clap::Args;

use crate::config::Config;
use crate::shim::{self, ResolverExecutor, Shim};

#[derive(Args)]
#[command(disable_version_flag = true)]
pub struct ExecArgs {
    /// Command to execute through the sandbox wrapper
    pub command: String,

    /// Arguments to pass to the command
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
#[command(disable_version_flag = true)]
pub struct BypassArgs {
    /// Command to execute directly, without sandboxing
    pub command: String,

    /// Arguments to pass to the command
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

pub fn run_exec(args: &ExecArgs, config: &Config) -> Result<()> {
    config
        .diag()
        .line(format!("intercept {}", args.command));

    shim::forward_wrapped(&config.resolver_program(), &args.command, &args.args)
}

pub fn run_bypass(args: &BypassArgs, config: &Config) -> Result<()> {
    config.diag().line(format!("bypass {}", args.command));

    shim::forward_direct(&args.command, &args.args)
}

/// Spawn-and-wait fallback for platforms without exec. Exits with the
/// child's code, so the caller never regains control on success.
pub async fn run_shim_exec(args: &ExecArgs, config: &Config) -> Result<()> {
    let shim = Shim::new(ResolverExecutor::new(config.resolver_program()), config.diag());
    let code = shim.intercept(&args.command, &args.args).await?;
    std::process::exit(code);
}

pub async fn run_shim_bypass(args: &BypassArgs, config: &Config) -> Result<()> {
    let shim = Shim::new(ResolverExecutor::new(config.resolver_program()), config.diag());
    let code = shim.bypass(&args.command, &args.args).await?;
    std::process::exit(code);
}
