//! Well-known locations
//!
//! The override file lives in the operator's home directory as
//! `~/.velcro.yml`. The home directory is located with the `dirs` crate, so
//! `$HOME` takes precedence on Unix.

use std::env;
use std::path::PathBuf;

/// File name of the per-operator override file
pub const OVERRIDE_FILE_NAME: &str = ".velcro.yml";

/// Get the default override file path
///
/// Returns `$HOME/.velcro.yml`, or `None` when no home directory is known.
#[must_use]
pub fn default_override_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(OVERRIDE_FILE_NAME))
}

/// Name of the local login user
///
/// Used as the fallback for `client` and `sudo_user` when no `user`
/// override is present.
#[must_use]
pub fn login_name() -> String {
    env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_override_file_under_home() {
        temp_env::with_var("HOME", Some("/home/deployer"), || {
            let path = default_override_file().unwrap();
            assert_eq!(path, PathBuf::from("/home/deployer/.velcro.yml"));
        });
    }

    #[test]
    #[serial]
    fn test_default_override_file_name() {
        if let Some(path) = default_override_file() {
            assert_eq!(
                path.file_name().and_then(|n| n.to_str()),
                Some(OVERRIDE_FILE_NAME)
            );
        }
    }

    #[test]
    #[serial]
    fn test_login_name_prefers_user() {
        temp_env::with_vars([("USER", Some("jamie")), ("USERNAME", Some("other"))], || {
            assert_eq!(login_name(), "jamie");
        });
    }

    #[test]
    #[serial]
    fn test_login_name_falls_back_to_username() {
        temp_env::with_vars([("USER", None::<&str>), ("USERNAME", Some("winuser"))], || {
            assert_eq!(login_name(), "winuser");
        });
    }

    #[test]
    #[serial]
    fn test_login_name_unknown() {
        temp_env::with_vars([("USER", None::<&str>), ("USERNAME", None::<&str>)], || {
            assert_eq!(login_name(), "unknown");
        });
    }
}
