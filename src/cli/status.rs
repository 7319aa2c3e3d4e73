use anyhow::Result;

use crate::config::Config;
use crate::resolver::{CommandResolver, ProbeOutcome};

/// Show resolver configuration and probe its availability from the
/// current directory.
pub async fn run(config: &Config) -> Result<()> {
    let location = std::env::current_dir()?;
    let resolver = CommandResolver::from_config(config);

    println!("Resolver:");
    println!("  Program:     {}", resolver.program());
    println!("  Timeout:     {}ms", config.resolver.timeout_ms);

    match resolver.probe(&location).await {
        ProbeOutcome::Available { commands } => {
            println!("  Status:      available");
            println!("  Commands:    {} resolved here", commands);
        }
        ProbeOutcome::Failed { reason } => {
            println!("  Status:      unavailable ({})", reason);
            println!("  Commands:    none (sessions degrade to no interception)");
        }
    }

    println!();
    println!("Diagnostics:");
    println!(
        "  Enabled:     {}{}",
        config.diagnostics_enabled(),
        if std::env::var("CMDSHIM_DEBUG").is_ok() {
            " (CMDSHIM_DEBUG override)"
        } else {
            ""
        }
    );
    println!("  Prefix:      [{}]", config.diagnostics.prefix);

    Ok(())
}
