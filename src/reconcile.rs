//! Binding reconciliation.
//!
//! Strategy is always the full cycle in unset-then-refresh-then-set order:
//! every previously bound name is released, the resolver is consulted, and
//! every freshly resolved (valid) name is bound. The tempting "refresh-only"
//! shortcut that binds new names without releasing removed ones leaves
//! stale bindings behind and is covered by a regression test instead of a
//! code path.

use std::collections::BTreeSet;

use crate::bindings::{validate_name, BindingTable};
use crate::diag::Diag;
use crate::resolver::ResolvedSet;

/// The bind/unbind operations one reconciliation applies to a session's
/// callable-name table.
///
/// Computed as a pure function of (previous set, resolved set) so the
/// in-process table and the shell script renderer apply identical
/// semantics. Names that fail validation land in `skipped` and are
/// excluded from `bind`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub unbind: Vec<String>,
    pub bind: Vec<String>,
    pub skipped: Vec<String>,
}

impl ReconcilePlan {
    /// Full-cycle plan: unbind everything previously bound, bind every
    /// valid resolved name. A name present in both sets is still cycled;
    /// bind replaces the definition, so the result is identical and the
    /// cycle stays idempotent.
    ///
    /// The previous set goes through the same validation as the resolved
    /// set: only names this reconciler could have bound are unbound. The
    /// previous set may come from an untrusted shell variable, and an
    /// invalid token there must never reach the rendered eval text.
    pub fn full_cycle(previous: &BTreeSet<String>, resolved: &ResolvedSet) -> Self {
        let mut unbind = Vec::new();
        let mut skipped = Vec::new();
        for name in previous {
            match validate_name(name) {
                Ok(()) => unbind.push(name.clone()),
                Err(_) => skipped.push(name.clone()),
            }
        }

        let mut bind = Vec::new();
        for name in resolved.names() {
            match validate_name(name) {
                Ok(()) => bind.push(name.clone()),
                Err(_) => skipped.push(name.clone()),
            }
        }

        Self {
            unbind,
            bind,
            skipped,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.unbind.is_empty() && self.bind.is_empty()
    }
}

/// What a reconciliation actually did (for diagnostics and tests).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub bound: Vec<String>,
    pub unbound: Vec<String>,
    pub skipped: Vec<String>,
}

/// Apply a plan to a binding table, skipping names the table rejects.
///
/// Unbinds run before binds; a rejected bind never aborts the rest of the
/// reconciliation.
pub fn apply(plan: &ReconcilePlan, table: &mut dyn BindingTable, diag: &Diag) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome {
        skipped: plan.skipped.clone(),
        ..Default::default()
    };

    for name in &plan.skipped {
        diag.line(format!("skipped unbindable name {:?}", name));
    }

    for name in &plan.unbind {
        table.unbind(name);
        diag.line(format!("unbound {}", name));
        outcome.unbound.push(name.clone());
    }

    for name in &plan.bind {
        match table.bind(name) {
            Ok(()) => {
                diag.line(format!("bound {}", name));
                outcome.bound.push(name.clone());
            }
            Err(e) => {
                diag.line(format!("skipped {}: {}", name, e));
                outcome.skipped.push(name.clone());
            }
        }
    }

    outcome
}
