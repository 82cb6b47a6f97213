use std::env;
use std::path::PathBuf;

pub const HISTORY_FILE_NAME: &str = ".rpcsh_history";

/// `$HOME`, when set and non-empty.
#[must_use]
pub fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

#[must_use]
pub fn default_history_path() -> Option<PathBuf> {
    home_dir().map(|home| home.join(HISTORY_FILE_NAME))
}
