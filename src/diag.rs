//! Lifecycle diagnostics for the binding synchronization protocol.
//!
//! Diagnostic lines are part of the external interface: `[prefix] message`,
//! one line per lifecycle event, written to stderr and never to stdout
//! (stdout of `hook sync` is eval'd by the shell). This is distinct from
//! `tracing`, which carries operator-level logging; the diag flag is a
//! user-facing switch that must not depend on RUST_LOG.

use std::sync::{Arc, Mutex};

/// Handle for emitting protocol diagnostics.
///
/// Cheap to clone; disabled handles are fully silent. The sink is stderr in
/// production and an in-memory buffer in tests.
#[derive(Debug, Clone)]
pub struct Diag {
    enabled: bool,
    prefix: String,
    sink: Sink,
}

#[derive(Debug, Clone)]
enum Sink {
    Stderr,
    Buffer(Arc<Mutex<Vec<String>>>),
}

impl Diag {
    /// A silent handle.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            prefix: String::new(),
            sink: Sink::Stderr,
        }
    }

    /// A stderr-backed handle.
    pub fn stderr(enabled: bool, prefix: &str) -> Self {
        Self {
            enabled,
            prefix: prefix.to_string(),
            sink: Sink::Stderr,
        }
    }

    /// An always-enabled handle that collects lines in memory (for tests).
    pub fn captured(prefix: &str) -> (Self, Arc<Mutex<Vec<String>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let diag = Self {
            enabled: true,
            prefix: prefix.to_string(),
            sink: Sink::Buffer(buffer.clone()),
        };
        (diag, buffer)
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Emit one diagnostic line. No-op when disabled.
    pub fn line(&self, message: impl AsRef<str>) {
        if !self.enabled {
            return;
        }
        let formatted = format!("[{}] {}", self.prefix, message.as_ref());
        match &self.sink {
            Sink::Stderr => eprintln!("{}", formatted),
            Sink::Buffer(buffer) => {
                if let Ok(mut lines) = buffer.lock() {
                    lines.push(formatted);
                }
            }
        }
    }
}

impl Default for Diag {
    fn default() -> Self {
        Self::disabled()
    }
}
