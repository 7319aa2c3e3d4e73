//! Interception shim.
//!
//! The single indirection point every bound name routes through. A bound
//! invocation forwards `(name, args...)` to the executor as
//! `<resolver> wrap <name> <args...>`; the bypass entry point runs the
//! underlying program directly so a user can opt out of interception for
//! one invocation without unbinding the name. Exit status, stdout, and
//! stderr pass through unchanged, and no timeout is ever applied: a
//! wrapped command may run for as long as the user lets it.

use anyhow::Result;
use async_trait::async_trait;

use crate::diag::Diag;
use crate::ShimError;

/// Exit code reported when the child was terminated by a signal and has
/// no code of its own (the spawn path only; the Unix exec path lets the
/// kernel propagate the signal disposition natively).
const SIGNALED_EXIT_CODE: i32 = -1;

/// Runs commands on behalf of the shim.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Executor: Send + Sync {
    /// Execute `name` with `args` under the sandbox wrapper, returning the
    /// exit code unchanged.
    async fn wrap(&self, name: &str, args: &[String]) -> Result<i32>;

    /// Execute `name` with `args` directly, skipping the wrapper.
    async fn run_direct(&self, name: &str, args: &[String]) -> Result<i32>;
}

/// Executor backed by the external resolver binary's `wrap` subcommand.
#[derive(Debug, Clone)]
pub struct ResolverExecutor {
    program: String,
}

impl ResolverExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn wait(mut command: tokio::process::Command, program: &str) -> Result<i32> {
        let status = command.status().await.map_err(|e| ShimError::Launch {
            program: program.to_string(),
            source: e,
        })?;
        Ok(status.code().unwrap_or(SIGNALED_EXIT_CODE))
    }
}

#[async_trait]
impl Executor for ResolverExecutor {
    async fn wrap(&self, name: &str, args: &[String]) -> Result<i32> {
        // Inherited stdio; the user is waiting on this command.
        let mut command = tokio::process::Command::new(&self.program);
        command.arg("wrap").arg(name).args(args);
        Self::wait(command, &self.program).await
    }

    async fn run_direct(&self, name: &str, args: &[String]) -> Result<i32> {
        let mut command = tokio::process::Command::new(name);
        command.args(args);
        Self::wait(command, name).await
    }
}

/// The dispatcher bound names reach.
///
/// Stateless beyond its collaborator handles; every observable side effect
/// belongs to the executor.
pub struct Shim<E: Executor> {
    executor: E,
    diag: Diag,
}

impl<E: Executor> Shim<E> {
    pub fn new(executor: E, diag: Diag) -> Self {
        Self { executor, diag }
    }

    /// Forward a bound invocation through the executor.
    pub async fn intercept(&self, name: &str, args: &[String]) -> Result<i32> {
        self.diag.line(format!("intercept {}", name));
        self.executor.wrap(name, args).await
    }

    /// Run the real program, skipping the executor entirely.
    pub async fn bypass(&self, name: &str, args: &[String]) -> Result<i32> {
        self.diag.line(format!("bypass {}", name));
        self.executor.run_direct(name, args).await
    }
}

/// Replace the current process with `<program> wrap <name> <args...>`.
///
/// The Unix fast path for the `exec` subcommand: signals, exit status, and
/// streams all propagate natively because the shim process ceases to
/// exist. Returns only on launch failure. Non-Unix spawns and exits with
/// the child's code.
pub fn forward_wrapped(program: &str, name: &str, args: &[String]) -> Result<()> {
    let mut command = std::process::Command::new(program);
    command.arg("wrap").arg(name).args(args);
    forward(command, program)
}

/// Replace the current process with `<name> <args...>`, unwrapped.
pub fn forward_direct(name: &str, args: &[String]) -> Result<()> {
    let mut command = std::process::Command::new(name);
    command.args(args);
    forward(command, name)
}

#[cfg(unix)]
fn forward(mut command: std::process::Command, program: &str) -> Result<()> {
    use std::os::unix::process::CommandExt;

    let error = command.exec();
    // exec only returns on failure
    Err(ShimError::Launch {
        program: program.to_string(),
        source: error,
    }
    .into())
}

#[cfg(not(unix))]
fn forward(mut command: std::process::Command, program: &str) -> Result<()> {
    let status = command.status().map_err(|e| ShimError::Launch {
        program: program.to_string(),
        source: e,
    })?;
    std::process::exit(status.code().unwrap_or(SIGNALED_EXIT_CODE));
}
