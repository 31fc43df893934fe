//! Target selection
//!
//! Selecting a target stamps the run with the current time, records the
//! target name and derives the deployment directory from it. Everything
//! target dependent (`config_path`, `py_venv_name`, the database names)
//! is computed from these overrides on demand.

use chrono::{DateTime, Local};
use std::path::PathBuf;
use velcro_config::{Settings, keys};
use velcro_core::Result;

/// Targets that get a task of their own
pub const KNOWN_TARGETS: [&str; 4] = ["live", "stage", "test", "dev"];

/// Format of `now_str`
pub const NOW_STR_FORMAT: &str = "%d-%m-%Y at %H:%M";

/// Select `name` as the deployment target
///
/// Sets `now`, `now_str` and `target`, then `base_path` as
/// `root_path/client/project/{project}_{target}`. The timestamps and the
/// target are stored even when `base_path` cannot be derived.
pub fn select_target(settings: &Settings, name: &str, now: DateTime<Local>) -> Result<PathBuf> {
    tracing::info!(selected = %name, "Selecting target");

    settings.set(keys::NOW, now.timestamp().to_string());
    settings.set(keys::NOW_STR, now.format(NOW_STR_FORMAT).to_string());
    settings.set(keys::TARGET, name);

    let project = settings.string(keys::PROJECT)?;
    let base_path = settings
        .path(keys::ROOT_PATH)?
        .join(settings.string(keys::CLIENT)?)
        .join(&project)
        .join(format!("{project}_{}", settings.string(keys::TARGET)?));

    tracing::debug!(base_path = %base_path.display(), "Derived base path");
    settings.set(keys::BASE_PATH, base_path.to_string_lossy().into_owned());
    Ok(base_path)
}

/// Capitalise the first letter of every word: `"live"` → `"Live"`
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use velcro_config::OverrideStore;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap()
    }

    fn project_settings() -> Settings {
        let settings = Settings::new(OverrideStore::new());
        settings.set(keys::ROOT_PATH, "/srv/www");
        settings.set(keys::CLIENT, "acme");
        settings.set(keys::PROJECT, "shop");
        settings
    }

    #[test]
    fn test_select_target_sets_everything() {
        let settings = project_settings();
        let now = fixed_now();

        let base = select_target(&settings, "live", now).unwrap();

        assert_eq!(base, PathBuf::from("/srv/www/acme/shop/shop_live"));
        assert_eq!(settings.string(keys::TARGET).unwrap(), "live");
        assert_eq!(
            settings.resolve(keys::NOW).unwrap(),
            json!(now.timestamp().to_string())
        );
        assert_eq!(settings.string(keys::NOW_STR).unwrap(), "09-03-2024 at 14:05");
        assert_eq!(
            settings.string(keys::BASE_PATH).unwrap(),
            "/srv/www/acme/shop/shop_live"
        );
    }

    #[test]
    fn test_reselecting_updates_dependents() {
        let settings = project_settings();
        select_target(&settings, "stage", fixed_now()).unwrap();
        assert_eq!(settings.string(keys::PY_VENV_NAME).unwrap(), "stage_acme_shop");

        select_target(&settings, "dev", fixed_now()).unwrap();
        assert_eq!(settings.string(keys::PY_VENV_NAME).unwrap(), "dev_acme_shop");
        assert_eq!(
            settings.config_path().unwrap(),
            PathBuf::from("/srv/www/acme/shop/shop_dev/src/shop/config/dev")
        );
    }

    #[test]
    fn test_missing_root_path_keeps_target() {
        let settings = Settings::new(OverrideStore::new());
        settings.set(keys::PROJECT, "shop");

        let err = select_target(&settings, "test", fixed_now()).unwrap_err();

        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "env.root_path required");
        assert_eq!(settings.string(keys::TARGET).unwrap(), "test");
        assert!(settings.resolve(keys::NOW_STR).is_ok());
        assert!(settings.resolve(keys::BASE_PATH).is_err());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("live"), "Live");
        assert_eq!(title_case("STAGE"), "Stage");
        assert_eq!(title_case("blue-green deploy"), "Blue-Green Deploy");
        assert_eq!(title_case(""), "");
    }
}
