//! Per-shell integration scripts.
//!
//! Two kinds of evaluable text are generated:
//! - the activation script, sourced once at session start, which installs
//!   the trigger hooks (`cmdshim activate <shell>`);
//! - the sync script, printed by `cmdshim hook sync` and eval'd by those
//!   hooks, which applies one reconciliation to the live session.
//!
//! All three shells use the identical unset-then-set ordering and the same
//! forwarding body; bash and zsh share one POSIX renderer outright. Only
//! activation differs per shell, because that is where the trigger models
//! diverge: zsh and fish have native directory-change events, bash gets a
//! composed PROMPT_COMMAND poller.

mod bash;
mod fish;
mod zsh;

use std::fmt;
use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

use crate::reconcile::ReconcilePlan;

/// Session variable holding the currently bound names, space separated.
/// The shell passes it back via `hook sync --bound`, which is how the
/// previous binding set survives between stateless cmdshim invocations.
pub const BOUND_VAR: &str = "__CMDSHIM_BOUND";

/// Session variable holding the absolute cmdshim binary path. Bound
/// functions call through it so they never recurse via PATH lookup.
pub const BIN_VAR: &str = "__CMDSHIM_BIN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

impl Shell {
    pub const ALL: [Shell; 3] = [Shell::Bash, Shell::Zsh, Shell::Fish];

    /// The one-time activation script, with the binary path baked in.
    pub fn activation_script(&self, exe: &Path) -> String {
        let exe = exe.display().to_string();
        match self {
            Shell::Bash => bash::ACTIVATION.replace("__EXE__", &quote_posix(&exe)),
            Shell::Zsh => zsh::ACTIVATION.replace("__EXE__", &quote_posix(&exe)),
            Shell::Fish => fish::ACTIVATION.replace("__EXE__", &quote_fish(&exe)),
        }
    }

    /// Render one reconciliation as eval text for this shell.
    ///
    /// Unbind lines come first, then function definitions, then the
    /// tracking-variable assignment, so the eval'd block converges the
    /// session in one pass and ends with status 0.
    pub fn sync_script(&self, plan: &ReconcilePlan) -> String {
        match self {
            Shell::Bash | Shell::Zsh => posix_sync(plan),
            Shell::Fish => fish_sync(plan),
        }
    }
}

impl FromStr for Shell {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bash" => Ok(Shell::Bash),
            "zsh" => Ok(Shell::Zsh),
            "fish" => Ok(Shell::Fish),
            other => Err(format!(
                "unsupported shell {:?} (expected bash, zsh, or fish)",
                other
            )),
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
            Shell::Fish => "fish",
        };
        f.write_str(name)
    }
}

fn posix_sync(plan: &ReconcilePlan) -> String {
    let mut out = String::new();
    for name in &plan.unbind {
        // Removes the function definition entirely; a program of the same
        // name on PATH runs unintercepted afterwards.
        let _ = writeln!(out, "unset -f {} 2>/dev/null || true", name);
    }
    for name in &plan.bind {
        let _ = writeln!(
            out,
            "{name}() {{ \"${BIN_VAR}\" exec {name} \"$@\"; }}",
            name = name,
            BIN_VAR = BIN_VAR
        );
    }
    let _ = writeln!(out, "{}='{}'", BOUND_VAR, plan.bind.join(" "));
    out
}

fn fish_sync(plan: &ReconcilePlan) -> String {
    let mut out = String::new();
    for name in &plan.unbind {
        let _ = writeln!(out, "functions -e {} 2>/dev/null", name);
    }
    for name in &plan.bind {
        let _ = writeln!(
            out,
            "function {name}; \"${BIN_VAR}\" exec {name} $argv; end",
            name = name,
            BIN_VAR = BIN_VAR
        );
    }
    let _ = writeln!(out, "set -g {} '{}'", BOUND_VAR, plan.bind.join(" "));
    out
}

/// Single-quote a string for POSIX shells.
fn quote_posix(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Single-quote a string for fish.
fn quote_fish(s: &str) -> String {
    format!("'{}'", s.replace('\\', r"\\").replace('\'', r"\'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use crate::resolver::ResolvedSet;

    fn plan(previous: &[&str], resolved: &[&str]) -> ReconcilePlan {
        let previous: BTreeSet<String> = previous.iter().map(|s| s.to_string()).collect();
        let resolved: ResolvedSet = resolved.iter().map(|s| s.to_string()).collect();
        ReconcilePlan::full_cycle(&previous, &resolved)
    }

    #[test]
    fn shell_from_str_round_trips() {
        for shell in Shell::ALL {
            assert_eq!(shell.to_string().parse::<Shell>().unwrap(), shell);
        }
        assert_eq!("BASH".parse::<Shell>().unwrap(), Shell::Bash);
        assert!("powershell".parse::<Shell>().is_err());
    }

    #[test]
    fn posix_sync_unsets_before_defining() {
        let script = Shell::Bash.sync_script(&plan(&["npm"], &["node"]));
        let unset_pos = script.find("unset -f npm").unwrap();
        let define_pos = script.find("node()").unwrap();
        assert!(unset_pos < define_pos, "unbinds must precede binds:\n{script}");
        assert!(script.ends_with("__CMDSHIM_BOUND='node'\n"));
    }

    #[test]
    fn posix_sync_functions_forward_through_bin_var() {
        let script = Shell::Zsh.sync_script(&plan(&[], &["node"]));
        assert!(
            script.contains(r#"node() { "$__CMDSHIM_BIN" exec node "$@"; }"#),
            "{script}"
        );
    }

    #[test]
    fn bash_and_zsh_sync_are_identical() {
        // One renderer for both; diverging per-shell orderings would be a
        // defect class of their own.
        let p = plan(&["a", "b"], &["c"]);
        assert_eq!(Shell::Bash.sync_script(&p), Shell::Zsh.sync_script(&p));
    }

    #[test]
    fn fish_sync_uses_fish_syntax() {
        let script = Shell::Fish.sync_script(&plan(&["npm"], &["node"]));
        assert!(script.contains("functions -e npm"));
        assert!(
            script.contains(r#"function node; "$__CMDSHIM_BIN" exec node $argv; end"#),
            "{script}"
        );
        assert!(script.ends_with("set -g __CMDSHIM_BOUND 'node'\n"));
    }

    #[test]
    fn empty_plan_still_clears_tracking_var() {
        let script = Shell::Bash.sync_script(&ReconcilePlan::default());
        assert_eq!(script, "__CMDSHIM_BOUND=''\n");
    }

    #[test]
    fn skipped_names_never_reach_the_script() {
        let script = Shell::Bash.sync_script(&plan(&[], &["node", "if", "a;b"]));
        assert!(!script.contains("if()"));
        assert!(!script.contains("a;b"));
    }

    /// A resolved name containing `=` would render as `a=b() { ... }`,
    /// a bash/zsh syntax error that aborts the eval'd block before the
    /// tracking-variable assignment runs. It must be skipped so the rest
    /// of the sync, including that assignment, still applies.
    #[test]
    fn equals_sign_name_is_skipped_and_sync_stays_whole() {
        let p = plan(&[], &["a=b", "node"]);
        assert_eq!(p.bind, ["node"]);
        assert_eq!(p.skipped, ["a=b"]);

        for shell in Shell::ALL {
            let script = shell.sync_script(&p);
            assert!(!script.contains("a=b"), "{shell}:\n{script}");
        }
        let script = Shell::Bash.sync_script(&p);
        assert!(script.ends_with("__CMDSHIM_BOUND='node'\n"));
    }

    /// Unbind lines come from the session's tracking variable; a token
    /// tampered into it must be dropped rather than interpolated into
    /// eval text.
    #[test]
    fn tampered_previous_name_never_reaches_the_script() {
        let p = plan(&["foo;rm -rf x", "node"], &[]);
        let script = Shell::Bash.sync_script(&p);
        assert!(script.contains("unset -f node"));
        assert!(!script.contains("rm -rf"), "{script}");
        assert!(script.ends_with("__CMDSHIM_BOUND=''\n"));
    }

    #[test]
    fn activation_bakes_in_binary_path() {
        for shell in Shell::ALL {
            let script = shell.activation_script(Path::new("/usr/local/bin/cmdshim"));
            assert!(
                script.contains("'/usr/local/bin/cmdshim'"),
                "{shell}: missing exe path"
            );
            assert!(script.contains("hook sync --shell"), "{shell}");
        }
    }

    #[test]
    fn activation_quotes_awkward_paths() {
        let script = Shell::Bash.activation_script(Path::new("/opt/my tools/cmdshim"));
        assert!(script.contains("'/opt/my tools/cmdshim'"));
    }

    #[test]
    fn activation_is_guarded_against_resourcing() {
        for shell in Shell::ALL {
            let script = shell.activation_script(Path::new("/bin/cmdshim"));
            assert!(
                script.contains("__CMDSHIM_ACTIVE"),
                "{shell}: missing re-source guard"
            );
        }
    }

    #[test]
    fn bash_activation_composes_prompt_command() {
        let script = Shell::Bash.activation_script(Path::new("/bin/cmdshim"));
        assert!(script.contains("PROMPT_COMMAND"));
        // Pre-existing prompt behavior is preserved, not replaced
        assert!(script.contains("${PROMPT_COMMAND:+;$PROMPT_COMMAND}"));
    }

    #[test]
    fn zsh_activation_checks_existing_hook() {
        let script = Shell::Zsh.activation_script(Path::new("/bin/cmdshim"));
        assert!(script.contains("add-zsh-hook chpwd"));
        assert!(script.contains("chpwd_functions[(I)__cmdshim_chpwd]"));
    }

    #[test]
    fn fish_activation_watches_pwd() {
        let script = Shell::Fish.activation_script(Path::new("/bin/cmdshim"));
        assert!(script.contains("--on-variable PWD"));
        assert!(script.contains("| source"));
    }

    #[test]
    fn quoting_helpers_escape_single_quotes() {
        assert_eq!(quote_posix("a'b"), r"'a'\''b'");
        assert_eq!(quote_fish("a'b"), r"'a\'b'");
    }
}
