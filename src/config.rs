use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::diag::Diag;
use crate::paths::Paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Resolved XDG-compliant paths (not serialized)
    #[serde(skip)]
    pub paths: Paths,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// The resolver/executor binary. Resolution calls run `<program> list
    /// --simple`; intercepted commands run `<program> wrap <name> <args...>`.
    #[serde(default = "default_resolver_program")]
    pub program: String,

    /// Timeout for resolution calls in milliseconds.
    ///
    /// Resolution runs on every directory change, so it must stay cheap.
    /// No timeout is ever applied to wrapped command execution.
    #[serde(default = "default_resolver_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Emit one diagnostic line per lifecycle event to stderr (default: false)
    #[serde(default)]
    pub enabled: bool,

    /// Prefix for diagnostic lines: `[prefix] message`
    #[serde(default = "default_diag_prefix")]
    pub prefix: String,
}

fn default_resolver_program() -> String {
    "sheld".to_string()
}
fn default_resolver_timeout_ms() -> u64 {
    2_000
}
fn default_diag_prefix() -> String {
    "cmdshim".to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            program: default_resolver_program(),
            timeout_ms: default_resolver_timeout_ms(),
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            prefix: default_diag_prefix(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_with_override(None)
    }

    /// Load config, optionally from an explicit file path (the global
    /// `--config` flag) instead of the XDG location.
    pub fn load_with_override(file: Option<&Path>) -> Result<Self> {
        let paths = Paths::resolve()?;

        let path = match file {
            Some(p) => p.to_path_buf(),
            None => {
                paths.ensure_dirs()?;
                let path = paths.config_file();
                if !path.exists() {
                    // Create default config file on first run
                    let config = Config {
                        paths,
                        ..Config::default()
                    };
                    config.save_with_template()?;
                    return Ok(config.with_env_overrides());
                }
                path
            }
        };

        let content = fs::read_to_string(&path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.paths = paths;

        Ok(config.with_env_overrides())
    }

    /// Load config, degrading to defaults on any error.
    ///
    /// Used on the interception paths (hook sync, exec, bypass): a broken
    /// config file must never prevent ordinary command execution.
    pub fn load_or_default(file: Option<&Path>) -> Self {
        match Self::load_with_override(file) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("config load failed, using defaults: {:#}", e);
                Config::default().with_env_overrides()
            }
        }
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(program) = std::env::var("CMDSHIM_RESOLVER")
            && !program.trim().is_empty()
        {
            self.resolver.program = program;
        }
        self
    }

    pub fn save(&self) -> Result<()> {
        let path = self.paths.config_file();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;

        Ok(())
    }

    /// Save config with a helpful template (for first-time setup)
    pub fn save_with_template(&self) -> Result<()> {
        let path = self.paths.config_file();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        eprintln!("Created default config at {}", path.display());

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let paths = Paths::resolve()?;
        Ok(paths.config_file())
    }

    pub fn get_value(&self, key: &str) -> Result<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["resolver", "program"] => Ok(self.resolver.program.clone()),
            ["resolver", "timeout_ms"] => Ok(self.resolver.timeout_ms.to_string()),
            ["diagnostics", "enabled"] => Ok(self.diagnostics.enabled.to_string()),
            ["diagnostics", "prefix"] => Ok(self.diagnostics.prefix.clone()),
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["resolver", "program"] => self.resolver.program = value.to_string(),
            ["resolver", "timeout_ms"] => self.resolver.timeout_ms = value.parse()?,
            ["diagnostics", "enabled"] => self.diagnostics.enabled = value.parse()?,
            ["diagnostics", "prefix"] => self.diagnostics.prefix = value.to_string(),
            _ => anyhow::bail!("Unknown config key: {}", key),
        }

        Ok(())
    }

    /// The resolver program with `~` expanded.
    pub fn resolver_program(&self) -> String {
        shellexpand::tilde(&self.resolver.program).into_owned()
    }

    /// Whether diagnostics are on, honoring the CMDSHIM_DEBUG env override.
    pub fn diagnostics_enabled(&self) -> bool {
        match std::env::var("CMDSHIM_DEBUG") {
            Ok(v) => matches!(v.as_str(), "1" | "true" | "on"),
            Err(_) => self.diagnostics.enabled,
        }
    }

    /// Build the stderr-backed Diag handle for this config.
    pub fn diag(&self) -> Diag {
        Diag::stderr(self.diagnostics_enabled(), &self.diagnostics.prefix)
    }
}

/// Default config template with helpful comments (used for first-time setup)
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# cmdshim Configuration
# Auto-created on first run. Edit as needed.

[resolver]
# The resolver/executor binary. cmdshim asks it which commands apply to the
# current directory (`<program> list --simple`) and routes intercepted
# invocations through it (`<program> wrap <name> <args...>`).
# Override per-session with CMDSHIM_RESOLVER.
program = "sheld"

# Timeout for resolution calls, in milliseconds. Resolution runs on every
# directory change, so keep this short. Wrapped commands themselves are
# never subject to a timeout.
timeout_ms = 2000

[diagnostics]
# Emit one line per lifecycle event (trigger, resolution, bind, unbind)
# to stderr. Override per-session with CMDSHIM_DEBUG=1.
enabled = false
prefix = "cmdshim"
"#;
