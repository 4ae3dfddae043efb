//! Output helpers shared by the CLI commands.
//!
//! Global flags are propagated through environment variables set in `main`
//! so every module can check them without threading a config value around.

/// True when `--json` was passed.
pub fn is_json() -> bool {
    std::env::var("FWMIRROR_JSON").is_ok()
}

/// True when `--quiet` was passed.
pub fn is_quiet() -> bool {
    std::env::var("FWMIRROR_QUIET").is_ok()
}

/// Print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

/// Minimal status-symbol styling, honoring NO_COLOR.
pub struct Styled {
    color: bool,
}

impl Styled {
    pub fn new() -> Self {
        let color = std::env::var("NO_COLOR").is_err()
            && std::env::var("FWMIRROR_NO_COLOR").is_err();
        Self { color }
    }

    pub fn ok_sym(&self) -> &'static str {
        if self.color {
            "\u{1b}[32m✓\u{1b}[0m"
        } else {
            "[OK]"
        }
    }

    pub fn warn_sym(&self) -> &'static str {
        if self.color {
            "\u{1b}[33m!\u{1b}[0m"
        } else {
            "[!!]"
        }
    }

    pub fn fail_sym(&self) -> &'static str {
        if self.color {
            "\u{1b}[31m✗\u{1b}[0m"
        } else {
            "[XX]"
        }
    }
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}
