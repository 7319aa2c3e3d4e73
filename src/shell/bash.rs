//! Bash activation.
//!
//! Bash has no directory-change event, so this is the polling adapter:
//! a hook composed onto PROMPT_COMMAND diffs $PWD on every prompt render
//! and syncs only when it changed. The membership check on PROMPT_COMMAND
//! keeps a re-sourced activation from appending the hook twice.

pub(super) const ACTIVATION: &str = r#"# cmdshim shell integration for bash.
# Install with:  eval "$(cmdshim activate bash)"
if [ -z "${__CMDSHIM_ACTIVE:-}" ]; then
    __CMDSHIM_ACTIVE=1
    __CMDSHIM_BIN=__EXE__
    __CMDSHIM_BOUND=""
    __CMDSHIM_LAST_PWD=""

    __cmdshim_sync() {
        eval "$("$__CMDSHIM_BIN" hook sync --shell bash --bound "$__CMDSHIM_BOUND")"
    }

    __cmdshim_prompt() {
        if [ "$__CMDSHIM_LAST_PWD" != "$PWD" ]; then
            __CMDSHIM_LAST_PWD="$PWD"
            __cmdshim_sync
        fi
    }

    case ";${PROMPT_COMMAND:-};" in
        *";__cmdshim_prompt;"*) ;;
        *) PROMPT_COMMAND="__cmdshim_prompt${PROMPT_COMMAND:+;$PROMPT_COMMAND}" ;;
    esac

    cmdshim-refresh() {
        __CMDSHIM_LAST_PWD="$PWD"
        __cmdshim_sync
    }

    __CMDSHIM_LAST_PWD="$PWD"
    __cmdshim_sync
fi
"#;
