//! Zsh activation.
//!
//! Zsh has a native directory-change event (chpwd), so the hook registers
//! once through add-zsh-hook. The chpwd_functions membership check keeps a
//! re-sourced activation from registering a second callback.

pub(super) const ACTIVATION: &str = r#"# cmdshim shell integration for zsh.
# Install with:  eval "$(cmdshim activate zsh)"
if [ -z "${__CMDSHIM_ACTIVE:-}" ]; then
    __CMDSHIM_ACTIVE=1
    __CMDSHIM_BIN=__EXE__
    __CMDSHIM_BOUND=""

    __cmdshim_sync() {
        eval "$("$__CMDSHIM_BIN" hook sync --shell zsh --bound "$__CMDSHIM_BOUND")"
    }

    __cmdshim_chpwd() {
        __cmdshim_sync
    }

    autoload -Uz add-zsh-hook
    if (( ! ${chpwd_functions[(I)__cmdshim_chpwd]} )); then
        add-zsh-hook chpwd __cmdshim_chpwd
    fi

    cmdshim-refresh() {
        __cmdshim_sync
    }

    __cmdshim_sync
fi
"#;
