//! cmdshim - transparent command interception for interactive shells
//!
//! This crate provides the binding synchronization layer between an
//! interactive shell session and an external sandbox-wrapping resolver:
//! - Resolver client that asks the resolver which commands apply here
//! - Binding reconciler that keeps the session's bound names in sync
//! - Interception shim that forwards bound invocations to the executor
//! - Trigger sources (directory-change hooks, prompt polling, manual)
//! - Per-shell activation and sync script generation (bash, zsh, fish)

pub mod bindings;
pub mod cli;
pub mod config;
pub mod diag;
pub mod paths;
pub mod reconcile;
pub mod resolver;
pub mod session;
pub mod shell;
pub mod shim;
pub mod trigger;

pub use config::Config;

/// Errors raised inside the interception layer.
///
/// Most failure modes deliberately do NOT surface as errors: a broken or
/// missing resolver degrades to an empty binding set, and an unbindable
/// name is skipped during reconciliation. Only conditions a caller may
/// want to branch on are represented here.
#[derive(Debug, thiserror::Error)]
pub enum ShimError {
    /// The name cannot be defined as a shell callable.
    #[error("invalid command name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// The executor (or the underlying program, on the bypass path)
    /// could not be launched at all.
    #[error("failed to launch {program:?}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
