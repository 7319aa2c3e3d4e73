//! XDG Base Directory compliant path resolution.
//!
//! Every directory is resolved through a three-level fallback:
//! 1. cmdshim-specific env var (CMDSHIM_CONFIG_DIR, etc.)
//! 2. XDG env var (XDG_CONFIG_HOME, etc.) via `etcetera`
//! 3. Platform default (~/.config, etc.)
//!
//! All paths are absolute. Relative paths from env vars are ignored per XDG spec.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Resolved directory paths for the application.
///
/// Created once at startup, threaded through Config. All paths are absolute.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Config directory: config.toml lives here
    pub config_dir: PathBuf,

    /// State directory: diagnostic logs, if any are ever written to disk
    pub state_dir: PathBuf,
}

impl Paths {
    /// Resolve all paths using real environment variables.
    pub fn resolve() -> Result<Self> {
        Self::resolve_with_env(|key| std::env::var(key))
    }

    /// Resolve paths with a custom env var lookup (for testing).
    pub fn resolve_with_env<F>(env_fn: F) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, std::env::VarError>,
    {
        use etcetera::BaseStrategy;

        let strategy = etcetera::choose_base_strategy()
            .map_err(|e| anyhow::anyhow!("Failed to determine base directories: {}", e))?;

        let config_dir = env_or(&env_fn, "CMDSHIM_CONFIG_DIR", || {
            strategy.config_dir().join("cmdshim")
        });

        let state_dir = env_or(&env_fn, "CMDSHIM_STATE_DIR", || {
            // state_dir() is None on platforms without XDG_STATE_HOME semantics
            let base_state = strategy.state_dir().unwrap_or_else(|| strategy.data_dir());
            base_state.join("cmdshim")
        });

        Ok(Self {
            config_dir,
            state_dir,
        })
    }

    /// Config file: config_dir/config.toml
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Create all directories with appropriate permissions.
    pub fn ensure_dirs(&self) -> Result<()> {
        create_dir_with_mode(&self.config_dir)?;
        create_dir_with_mode(&self.state_dir)?;
        Ok(())
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::resolve().unwrap_or_else(|_| {
            // Emergency fallback, should never happen in practice
            let home = etcetera::home_dir().unwrap_or_else(|_| PathBuf::from("."));
            Self {
                config_dir: home.join(".config").join("cmdshim"),
                state_dir: home.join(".local").join("state").join("cmdshim"),
            }
        })
    }
}

/// Resolve an env var with fallback. Ignores empty and relative paths per XDG spec.
fn env_or<F>(env_fn: &F, var: &str, default: impl FnOnce() -> PathBuf) -> PathBuf
where
    F: Fn(&str) -> std::result::Result<String, std::env::VarError>,
{
    env_fn(var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .filter(|p| p.is_absolute()) // XDG spec: ignore relative paths
        .unwrap_or_else(default)
}

/// Create a directory with mode 0700 per XDG spec.
fn create_dir_with_mode(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
            .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}
