//! Fish activation.
//!
//! Fish fires an event whenever PWD changes, and redefining a named
//! function replaces it, so registration is naturally idempotent. Sync
//! output is piped to `source` because fish cannot eval multi-line
//! command substitutions the way POSIX shells do.

pub(super) const ACTIVATION: &str = r#"# cmdshim shell integration for fish.
# Install with:  cmdshim activate fish | source
if not set -q __CMDSHIM_ACTIVE
    set -g __CMDSHIM_ACTIVE 1
    set -g __CMDSHIM_BIN __EXE__
    set -g __CMDSHIM_BOUND ""

    function __cmdshim_sync
        "$__CMDSHIM_BIN" hook sync --shell fish --bound "$__CMDSHIM_BOUND" | source
    end

    function __cmdshim_pwd --on-variable PWD
        __cmdshim_sync
    end

    function cmdshim-refresh
        __cmdshim_sync
    end

    __cmdshim_sync
end
"#;
