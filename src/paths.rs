//! Platform-specific filesystem path helpers.

use std::ffi::OsString;
use std::path::PathBuf;

/// Directory name used under the platform data directory.
pub const APP_DIR_NAME: &str = "agents101";

/// Environment variable that overrides the data directory.
///
/// Used by tests and by anyone running several isolated course profiles.
pub const DATA_DIR_ENV: &str = "AGENTS101_DATA_DIR";

/// Path to the debug log file.
///
/// This is located in the OS temp directory.
#[must_use]
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("agents101.log")
}

#[must_use]
#[cfg(not(windows))]
fn home_dir_from(var_os: &mut impl FnMut(&'static str) -> Option<OsString>) -> Option<PathBuf> {
    var_os("HOME").map(PathBuf::from)
}

#[must_use]
#[cfg(windows)]
fn data_local_dir_from(
    var_os: &mut impl FnMut(&'static str) -> Option<OsString>,
) -> Option<PathBuf> {
    var_os("LOCALAPPDATA")
        .or_else(|| var_os("APPDATA"))
        .map(PathBuf::from)
}

#[must_use]
#[cfg(not(windows))]
fn data_local_dir_from(
    var_os: &mut impl FnMut(&'static str) -> Option<OsString>,
) -> Option<PathBuf> {
    var_os("XDG_DATA_HOME").map(PathBuf::from).or_else(|| {
        home_dir_from(var_os).map(|home| {
            #[cfg(target_os = "macos")]
            {
                home.join("Library").join("Application Support")
            }

            #[cfg(not(target_os = "macos"))]
            {
                home.join(".local").join("share")
            }
        })
    })
}

fn app_data_dir_from(var_os: &mut impl FnMut(&'static str) -> Option<OsString>) -> PathBuf {
    if let Some(dir) = var_os(DATA_DIR_ENV).filter(|value| !value.is_empty()) {
        return PathBuf::from(dir);
    }

    data_local_dir_from(var_os)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Resolve the directory holding the course's persisted files.
///
/// `AGENTS101_DATA_DIR` wins when set; otherwise this is
/// `<local data dir>/agents101`, falling back to `./agents101`.
#[must_use]
pub fn app_data_dir() -> PathBuf {
    let mut var_os = |key: &'static str| std::env::var_os(key);
    app_data_dir_from(&mut var_os)
}
