//! Trigger sources: when to reconcile.
//!
//! Two interchangeable adapters feed the reconciliation loop. Native-hook
//! environments (zsh chpwd, fish --on-variable PWD) register a callback for
//! directory changes; polling environments (bash) get an opportunity on
//! every prompt render and diff the location themselves. Both registration
//! paths are idempotent because activation code may be sourced more than
//! once per session. The generated shell scripts in [`crate::shell`] are
//! the live-session counterparts of these adapters.

use std::path::{Path, PathBuf};

pub type LocationCallback = Box<dyn FnMut(&Path)>;

/// Something that can announce "the resolved command set may now be stale".
pub trait TriggerSource {
    /// Register `callback` to run on every location change.
    ///
    /// Registration is keyed: registering the same key again replaces the
    /// existing callback instead of adding a second one, so re-running
    /// activation never double-fires reconciliation.
    fn on_location_changed(&mut self, key: &str, callback: LocationCallback);
}

/// Adapter for environments with a built-in "location changed" event.
#[derive(Default)]
pub struct NativeHookSource {
    hooks: Vec<(String, LocationCallback)>,
}

impl NativeHookSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registered(&self) -> usize {
        self.hooks.len()
    }

    /// Deliver a location-changed event to every registered callback.
    pub fn fire(&mut self, location: &Path) {
        for (_, callback) in &mut self.hooks {
            callback(location);
        }
    }
}

impl TriggerSource for NativeHookSource {
    fn on_location_changed(&mut self, key: &str, callback: LocationCallback) {
        if let Some(slot) = self.hooks.iter_mut().find(|(k, _)| k == key) {
            slot.1 = callback;
        } else {
            self.hooks.push((key.to_string(), callback));
        }
    }
}

/// Adapter for environments without a location-change event.
///
/// Wraps the prompt-render opportunity: on each render the current location
/// is diffed against the last observed one and callbacks fire only on a
/// change. Any prompt behavior that was already installed keeps running
/// (composed, never replaced).
pub struct PollingSource {
    hooks: NativeHookSource,
    last_seen: Option<PathBuf>,
    prior_prompt_hook: Option<LocationCallback>,
}

impl PollingSource {
    pub fn new() -> Self {
        Self::with_prior_hook(None)
    }

    /// Compose with a pre-existing prompt hook, which runs on every prompt
    /// render regardless of whether the location changed.
    pub fn with_prior_hook(prior: Option<LocationCallback>) -> Self {
        Self {
            hooks: NativeHookSource::new(),
            last_seen: None,
            prior_prompt_hook: prior,
        }
    }

    pub fn registered(&self) -> usize {
        self.hooks.registered()
    }

    pub fn last_seen(&self) -> Option<&Path> {
        self.last_seen.as_deref()
    }

    /// A prompt is being rendered at `location`. Returns whether a
    /// location change fired the callbacks.
    pub fn observe_prompt(&mut self, location: &Path) -> bool {
        if let Some(prior) = &mut self.prior_prompt_hook {
            prior(location);
        }

        if self.last_seen.as_deref() == Some(location) {
            return false;
        }
        self.last_seen = Some(location.to_path_buf());
        self.hooks.fire(location);
        true
    }

    /// Manual trigger: fire unconditionally, without a location change.
    pub fn refresh(&mut self, location: &Path) {
        self.last_seen = Some(location.to_path_buf());
        self.hooks.fire(location);
    }
}

impl Default for PollingSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerSource for PollingSource {
    fn on_location_changed(&mut self, key: &str, callback: LocationCallback) {
        self.hooks.on_location_changed(key, callback);
    }
}
