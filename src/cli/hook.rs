use anyhow::Result;
use clap::{Args, Subcommand};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::reconcile::ReconcilePlan;
use crate::resolver::{CommandResolver, Resolver};
use crate::shell::Shell;

#[derive(Args)]
pub struct HookArgs {
    #[command(subcommand)]
    pub command: HookCommands,
}

#[derive(Subcommand)]
pub enum HookCommands {
    /// Reconcile the session's bindings and print the eval script
    Sync {
        /// Shell dialect to render
        #[arg(long)]
        shell: Shell,

        /// Currently bound names, space separated (the shell's tracking
        /// variable)
        #[arg(long, default_value = "", hide_default_value = true)]
        bound: String,
    },
}

pub async fn run(args: HookArgs, config: &Config) -> Result<()> {
    match args.command {
        HookCommands::Sync { shell, bound } => {
            let location = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            // Stdout is eval'd by the shell: only the script goes there,
            // and this path never fails. Any degradation converges on an
            // empty binding set while ordinary execution keeps working.
            let script = render_sync(shell, &bound, config, &location).await;
            print!("{}", script);
            Ok(())
        }
    }
}

/// One full reconciliation cycle for the calling session, rendered as
/// eval text: resolve at `location`, diff against the names in `bound`,
/// emit unbinds for everything previous and binds for everything current.
pub async fn render_sync(shell: Shell, bound: &str, config: &Config, location: &Path) -> String {
    let diag = config.diag();
    diag.line(format!("trigger at {}", location.display()));

    let previous: BTreeSet<String> = bound.split_whitespace().map(String::from).collect();

    let resolver = CommandResolver::from_config(config);
    let resolved = resolver.resolve(location).await.unwrap_or_default();

    let plan = ReconcilePlan::full_cycle(&previous, &resolved);
    for name in &plan.skipped {
        diag.line(format!("skipped unbindable name {:?}", name));
    }
    for name in &plan.unbind {
        diag.line(format!("unbound {}", name));
    }
    for name in &plan.bind {
        diag.line(format!("bound {}", name));
    }

    shell.sync_script(&plan)
}
