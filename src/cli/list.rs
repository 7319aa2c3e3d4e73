use anyhow::Result;

use crate::config::Config;
use crate::resolver::{CommandResolver, Resolver};

/// Print the command names resolved for the current directory, one per
/// line. Mirrors what the next `hook sync` would bind.
pub async fn run(config: &Config) -> Result<()> {
    let location = std::env::current_dir()?;
    let resolver = CommandResolver::from_config(config);
    let resolved = resolver.resolve(&location).await?;

    for name in resolved.names() {
        println!("{}", name);
    }

    Ok(())
}
