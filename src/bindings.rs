//! The session's callable-name table.
//!
//! A binding associates a command name with the interception shim for the
//! rest of the session. The table here is the in-process model; shell
//! adapters (see [`crate::shell`]) render the same bind/unbind operations
//! as eval text for the live session.

use std::collections::BTreeSet;

use crate::ShimError;

/// Shell reserved words that can never be defined as callables.
///
/// Union of the bash/zsh and fish reserved sets, so a resolved name is
/// either bindable in every supported shell or skipped in all of them.
const RESERVED_WORDS: &[&str] = &[
    "if", "then", "elif", "else", "fi", "for", "while", "until", "do", "done", "case", "esac",
    "in", "select", "time", "function", "coproc", "return", "break", "continue", "begin", "end",
    "switch", "and", "or", "not", "command", "builtin", "eval", "exec", "source", "set",
];

/// Check that a resolved name can be safely defined as a shell callable.
///
/// The charset is deliberately conservative: anything that could read as
/// shell syntax when interpolated into a function definition is rejected.
/// `=` in particular turns `name() { ... }` into an assignment-then-syntax
/// error in bash and zsh, which would abort the whole eval'd sync block.
/// Rejected names are skipped by the reconciler, never fatal.
pub fn validate_name(name: &str) -> Result<(), ShimError> {
    if name.is_empty() {
        return Err(invalid(name, "empty"));
    }
    if RESERVED_WORDS.contains(&name) {
        return Err(invalid(name, "shell reserved word"));
    }
    if name.starts_with('-') {
        return Err(invalid(name, "leading dash"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@%^_.,:+-".contains(c))
    {
        return Err(invalid(name, "contains shell-significant characters"));
    }
    Ok(())
}

fn invalid(name: &str, reason: &'static str) -> ShimError {
    ShimError::InvalidName {
        name: name.to_string(),
        reason,
    }
}

/// A mutable callable-name table.
///
/// `bind` replaces any prior definition of the name; `unbind` removes the
/// definition entirely so the program on the search path (or the shell's
/// command-not-found behavior) takes over. Both are idempotent.
pub trait BindingTable {
    fn bind(&mut self, name: &str) -> Result<(), ShimError>;
    fn unbind(&mut self, name: &str);
    fn bound(&self) -> BTreeSet<String>;
}

/// In-process binding table.
///
/// Backs the session model and tests; a real shell session's table is the
/// set of functions installed by the generated sync scripts.
#[derive(Debug, Clone, Default)]
pub struct MemoryBindings {
    names: BTreeSet<String>,
}

impl MemoryBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl BindingTable for MemoryBindings {
    fn bind(&mut self, name: &str) -> Result<(), ShimError> {
        validate_name(name)?;
        // A set insert is naturally "bound exactly once"
        self.names.insert(name.to_string());
        Ok(())
    }

    fn unbind(&mut self, name: &str) {
        self.names.remove(name);
    }

    fn bound(&self) -> BTreeSet<String> {
        self.names.clone()
    }
}
