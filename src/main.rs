use anyhow::Result;
use clap::Parser;

use cmdshim::cli::{self, Cli, Commands};
use cmdshim::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // On Unix, exec/bypass replace the process image and must not start
    // the Tokio runtime first. Config errors degrade to defaults here: a
    // broken config file must never stop a command from running.
    #[cfg(unix)]
    {
        if let Commands::Exec(ref args) = cli.command {
            let config = Config::load_or_default(cli.config.as_deref());
            return cli::exec::run_exec(args, &config);
        }
        if let Commands::Bypass(ref args) = cli.command {
            let config = Config::load_or_default(cli.config.as_deref());
            return cli::exec::run_bypass(args, &config);
        }
    }

    // All other commands run on the async runtime
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    // Initialize logging. Diagnostics for the binding protocol go through
    // Diag (stderr, user-facing flag); tracing is operator-level logging.
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    match cli.command {
        Commands::Activate(args) => cli::activate::run(&args),
        Commands::Hook(args) => {
            let config = Config::load_or_default(cli.config.as_deref());
            cli::hook::run(args, &config).await
        }
        // Reached on non-Unix platforms only; Unix takes the exec path
        // before the runtime starts.
        Commands::Exec(args) => {
            let config = Config::load_or_default(cli.config.as_deref());
            cli::exec::run_shim_exec(&args, &config).await
        }
        Commands::Bypass(args) => {
            let config = Config::load_or_default(cli.config.as_deref());
            cli::exec::run_shim_bypass(&args, &config).await
        }
        Commands::List => {
            let config = Config::load_with_override(cli.config.as_deref())?;
            cli::list::run(&config).await
        }
        Commands::Status => {
            let config = Config::load_with_override(cli.config.as_deref())?;
            cli::status::run(&config).await
        }
        Commands::Config(args) => cli::config::run(args).await,
    }
}
