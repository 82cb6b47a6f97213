//! Editor and environment configuration.

use std::env;

pub const DEFAULT_PROMPT: &str = ">>";
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Settings for one [`crate::editor::TerminalEditor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Prompt as rendered; may carry SGR colors.
    pub prompt: String,
    /// Tab stop distance, measured from the end of the prompt.
    pub tab_width: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }
}

impl EditorConfig {
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width.max(1);
        self
    }
}

#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Mirror every terminal write to this file.
    pub write_log: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            write_log: env_string_opt("REPLTERM_WRITE_LOG"),
        }
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
