//! Resolver client.
//!
//! Asks the external resolver which command names apply to a location by
//! running `<program> list --simple` there. The call is cheap, re-triggered
//! on every event, and deliberately unrecoverable-failure-free: a missing
//! binary, non-zero exit, timeout, or garbage output all degrade to an
//! empty set so the user's shell stays usable.

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;

use crate::diag::Diag;

/// The deduplicated, blank-filtered set of command names the resolver
/// reported for a location. Order of first occurrence is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSet {
    names: Vec<String>,
}

impl ResolvedSet {
    /// Parse line-oriented resolver output.
    ///
    /// Blank and whitespace-only lines are discarded (guards against
    /// trailing newlines), duplicates keep their first occurrence.
    pub fn from_lines(raw: &str) -> Self {
        let mut names = Vec::new();
        for line in raw.lines() {
            let name = line.trim();
            if name.is_empty() {
                continue;
            }
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<String> for ResolvedSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = ResolvedSet::default();
        for name in iter {
            if !set.contains(&name) {
                set.names.push(name);
            }
        }
        set
    }
}

/// Computes the set of names that should currently be intercepted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolve the applicable command names for `location`.
    ///
    /// Implementations must treat collaborator failure as an empty set;
    /// an `Err` here means the resolver client itself is misused, not
    /// that resolution failed.
    async fn resolve(&self, location: &Path) -> Result<ResolvedSet>;
}

/// Outcome of an availability probe, for `cmdshim status`.
#[derive(Debug)]
pub enum ProbeOutcome {
    Available { commands: usize },
    Failed { reason: String },
}

/// Resolver client backed by the external resolver binary.
pub struct CommandResolver {
    program: String,
    timeout: Duration,
    diag: Diag,
    /// Last non-failure result, kept for status display only. Failures
    /// still resolve to the empty set; this is never substituted.
    last_good: Mutex<Option<ResolvedSet>>,
}

impl CommandResolver {
    pub fn new(program: impl Into<String>, timeout: Duration, diag: Diag) -> Self {
        Self {
            program: program.into(),
            timeout,
            diag,
            last_good: Mutex::new(None),
        }
    }

    pub fn from_config(config: &crate::Config) -> Self {
        Self::new(
            config.resolver_program(),
            Duration::from_millis(config.resolver.timeout_ms),
            config.diag(),
        )
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The most recent successful resolution, if any.
    pub fn last_known_good(&self) -> Option<ResolvedSet> {
        self.last_good.lock().ok().and_then(|g| g.clone())
    }

    async fn run_listing(&self, location: &Path) -> Result<ResolvedSet, String> {
        let output = tokio::process::Command::new(&self.program)
            .arg("list")
            .arg("--simple")
            .current_dir(location)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, output).await {
            Ok(Ok(out)) if out.status.success() => {
                Ok(ResolvedSet::from_lines(&String::from_utf8_lossy(&out.stdout)))
            }
            Ok(Ok(out)) => Err(format!("resolver exited with {}", out.status)),
            Ok(Err(e)) => Err(format!("resolver failed to start: {}", e)),
            Err(_) => Err(format!("resolver timed out after {:?}", self.timeout)),
        }
    }

    /// Availability probe: like `resolve`, but failure details survive.
    pub async fn probe(&self, location: &Path) -> ProbeOutcome {
        match self.run_listing(location).await {
            Ok(set) => ProbeOutcome::Available {
                commands: set.len(),
            },
            Err(reason) => ProbeOutcome::Failed { reason },
        }
    }
}

#[async_trait]
impl Resolver for CommandResolver {
    async fn resolve(&self, location: &Path) -> Result<ResolvedSet> {
        match self.run_listing(location).await {
            Ok(set) => {
                self.diag
                    .line(format!("resolved {} command(s)", set.len()));
                if let Ok(mut guard) = self.last_good.lock() {
                    *guard = Some(set.clone());
                }
                Ok(set)
            }
            Err(reason) => {
                // Never fatal: the shell must stay usable with a broken
                // or absent resolver. Self-heals on the next trigger.
                self.diag.line(format!("resolution failed: {}", reason));
                tracing::debug!("resolution failed: {}", reason);
                Ok(ResolvedSet::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn from_lines_filters_blanks_and_duplicates() {
        let set = ResolvedSet::from_lines("node\n\nnpm\n  \nnode\n");
        assert_eq!(set.names(), ["node", "npm"]);
    }

    #[test]
    fn from_lines_trims_whitespace() {
        let set = ResolvedSet::from_lines("  node  \n\tnpm\n");
        assert_eq!(set.names(), ["node", "npm"]);
    }

    #[test]
    fn from_lines_empty_output() {
        assert!(ResolvedSet::from_lines("").is_empty());
        assert!(ResolvedSet::from_lines("\n\n  \n").is_empty());
    }

    /// Write a fake resolver script and return its path.
    #[cfg(unix)]
    fn fake_resolver(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-resolver");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "#!/bin/sh").unwrap();
        writeln!(f, "{}", body).unwrap();
        drop(f);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn resolve_parses_listing_output() {
        let dir = tempfile::tempdir().unwrap();
        let bin = fake_resolver(dir.path(), "printf 'node\\nnpm\\n'");

        let resolver = CommandResolver::new(
            bin.display().to_string(),
            Duration::from_secs(5),
            Diag::disabled(),
        );
        let set = resolver.resolve(dir.path()).await.unwrap();
        assert_eq!(set.names(), ["node", "npm"]);
        assert_eq!(resolver.last_known_good().unwrap().names(), ["node", "npm"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_resolves_to_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let bin = fake_resolver(dir.path(), "echo node; exit 3");

        let resolver = CommandResolver::new(
            bin.display().to_string(),
            Duration::from_secs(5),
            Diag::disabled(),
        );
        let set = resolver.resolve(dir.path()).await.unwrap();
        assert!(set.is_empty());
        assert!(resolver.last_known_good().is_none());
    }

    #[tokio::test]
    async fn missing_binary_resolves_to_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = CommandResolver::new(
            "/nonexistent/cmdshim-test-resolver",
            Duration::from_secs(5),
            Diag::disabled(),
        );
        let set = resolver.resolve(dir.path()).await.unwrap();
        assert!(set.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_resolver_times_out_to_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let bin = fake_resolver(dir.path(), "sleep 5; echo node");

        let (diag, lines) = Diag::captured("cmdshim");
        let resolver =
            CommandResolver::new(bin.display().to_string(), Duration::from_millis(100), diag);
        let set = resolver.resolve(dir.path()).await.unwrap();
        assert!(set.is_empty());

        let lines = lines.lock().unwrap();
        assert!(
            lines.iter().any(|l| l.contains("resolution failed")),
            "diagnostic missing: {:?}",
            *lines
        );
    }
}
