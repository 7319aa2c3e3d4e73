//! In-process session model.
//!
//! A [`Session`] owns the only mutable core state (the binding table plus
//! a little bookkeeping) and drives the reconciliation loop: trigger fires,
//! resolver is consulted, table converges on the resolved set. The shell
//! integration reaches the same plan computation through `hook sync`; this
//! model is what embeddings and tests drive directly.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::bindings::BindingTable;
use crate::diag::Diag;
use crate::reconcile::{self, ReconcileOutcome, ReconcilePlan};
use crate::resolver::{ResolvedSet, Resolver};

/// Session-scoped bookkeeping around the binding table.
///
/// Starts `Uninitialized`; the first reconciliation (even one that yields
/// an empty set) moves it to `Initialized`, where it stays for the life of
/// the session. No teardown: session end discards everything.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub last_location: Option<PathBuf>,
    pub initialized: bool,
}

pub struct Session<R: Resolver, B: BindingTable> {
    resolver: R,
    bindings: B,
    ctx: SessionContext,
    diag: Diag,
}

impl<R: Resolver, B: BindingTable> Session<R, B> {
    pub fn new(resolver: R, bindings: B, diag: Diag) -> Self {
        Self {
            resolver,
            bindings,
            ctx: SessionContext::default(),
            diag,
        }
    }

    /// Run one full reconciliation cycle for `location`.
    ///
    /// Ordering is unset-then-refresh-then-set: the previous bindings are
    /// released before the resolver runs, so even a resolver that hangs
    /// until its timeout can never leave a stale binding active. Resolver
    /// failure converges on the empty set and is not an error.
    pub async fn trigger(&mut self, location: &Path) -> Result<ReconcileOutcome> {
        self.diag
            .line(format!("trigger at {}", location.display()));

        let previous = self.bindings.bound();
        let mut outcome = ReconcileOutcome::default();
        for name in &previous {
            self.bindings.unbind(name);
            self.diag.line(format!("unbound {}", name));
            outcome.unbound.push(name.clone());
        }

        let resolved = self
            .resolver
            .resolve(location)
            .await
            .unwrap_or_else(|_| ResolvedSet::default());

        // Previous set is already empty here; the plan only partitions the
        // resolved names into bindable and skipped.
        let plan = ReconcilePlan::full_cycle(&Default::default(), &resolved);
        let bind_outcome = reconcile::apply(&plan, &mut self.bindings, &self.diag);
        outcome.bound = bind_outcome.bound;
        outcome.skipped = bind_outcome.skipped;

        self.ctx.last_location = Some(location.to_path_buf());
        self.ctx.initialized = true;

        Ok(outcome)
    }

    pub fn bindings(&self) -> &B {
        &self.bindings
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn is_initialized(&self) -> bool {
        self.ctx.initialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::MemoryBindings;
    use crate::resolver::MockResolver;
    use std::collections::BTreeSet;

    fn resolved(names: &[&str]) -> ResolvedSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn names(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn session_with(outputs: Vec<ResolvedSet>) -> Session<MockResolver, MemoryBindings> {
        let mut resolver = MockResolver::new();
        let mut queue = outputs.into_iter();
        resolver
            .expect_resolve()
            .returning(move |_| Ok(queue.next().unwrap_or_default()));
        Session::new(resolver, MemoryBindings::new(), Diag::disabled())
    }

    /// Convergence: after each trigger the binding set equals the
    /// deduplicated, blank-filtered resolver output.
    #[tokio::test]
    async fn converges_on_each_resolver_output() {
        let outputs = vec![
            resolved(&["node", "npm"]),
            resolved(&["node", "cargo", "rustc"]),
            resolved(&["cargo"]),
        ];
        let expectations = [
            names(&["node", "npm"]),
            names(&["node", "cargo", "rustc"]),
            names(&["cargo"]),
        ];

        let mut session = session_with(outputs);
        for expected in expectations {
            session.trigger(Path::new("/proj")).await.unwrap();
            assert_eq!(session.bindings().bound(), expected);
        }
    }

    /// Scenario B: a name dropped from the resolver output is unbound, so
    /// invoking it afterwards runs the real program, not the shim.
    #[tokio::test]
    async fn dropped_name_is_unbound() {
        let mut session = session_with(vec![resolved(&["node"]), resolved(&[])]);

        session.trigger(Path::new("/a")).await.unwrap();
        assert!(session.bindings().contains("node"));

        let outcome = session.trigger(Path::new("/b")).await.unwrap();
        assert!(!session.bindings().contains("node"));
        assert_eq!(outcome.unbound, ["node"]);
        assert!(outcome.bound.is_empty());
    }

    /// Scenario C: blanks and duplicates in resolver output collapse to a
    /// single binding (the filtering lives in ResolvedSet::from_lines).
    #[tokio::test]
    async fn duplicate_resolver_output_binds_once() {
        let set = ResolvedSet::from_lines("node\n\nnode\n");
        let mut session = session_with(vec![set]);

        session.trigger(Path::new("/a")).await.unwrap();
        assert_eq!(session.bindings().bound(), names(&["node"]));
    }

    /// Scenario D: resolver failure converges on the empty set without an
    /// error; with diagnostics disabled nothing is emitted.
    #[tokio::test]
    async fn resolver_error_yields_empty_bindings() {
        let mut resolver = MockResolver::new();
        resolver
            .expect_resolve()
            .returning(|_| Err(anyhow::anyhow!("resolver exploded")));
        let mut session = Session::new(resolver, MemoryBindings::new(), Diag::disabled());

        let outcome = session.trigger(Path::new("/a")).await.unwrap();
        assert!(session.bindings().is_empty());
        assert!(outcome.bound.is_empty());
        assert!(session.is_initialized());
    }

    #[tokio::test]
    async fn first_trigger_initializes_even_when_empty() {
        let mut session = session_with(vec![resolved(&[])]);
        assert!(!session.is_initialized());

        session.trigger(Path::new("/a")).await.unwrap();
        assert!(session.is_initialized());
        assert_eq!(
            session.context().last_location.as_deref(),
            Some(Path::new("/a"))
        );
    }

    #[tokio::test]
    async fn invalid_names_are_skipped_not_fatal() {
        let mut session = session_with(vec![resolved(&["node", "if", "npm"])]);
        let outcome = session.trigger(Path::new("/a")).await.unwrap();

        assert_eq!(session.bindings().bound(), names(&["node", "npm"]));
        assert_eq!(outcome.skipped, ["if"]);
    }

    #[tokio::test]
    async fn trigger_emits_diagnostics() {
        let mut resolver = MockResolver::new();
        resolver
            .expect_resolve()
            .returning(|_| Ok(["node".to_string()].into_iter().collect()));

        let (diag, lines) = Diag::captured("cmdshim");
        let mut session = Session::new(resolver, MemoryBindings::new(), diag);
        session.trigger(Path::new("/proj")).await.unwrap();

        let lines = lines.lock().unwrap();
        assert!(lines.iter().any(|l| l.contains("trigger at /proj")));
        assert!(lines.contains(&"[cmdshim] bound node".to_string()));
    }
}
