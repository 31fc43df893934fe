//! Settings catalog
//!
//! [`Settings`] is the configuration context handed to tasks and hooks. It
//! owns the override store and the set of known setting accessors, which are
//! built once when the context is created and never change afterwards.
//!
//! Typical use:
//!
//! ```ignore
//! let settings = Settings::load(&path)?;
//! settings.set(keys::TARGET, "stage");
//! let config_path = settings.config_path()?;
//! ```

use crate::dirs::login_name;
use crate::pipeline;
use crate::setting::{Setting, SettingDefault};
use crate::store::{OverrideStore, producer};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Value as JsonValue, json};
use std::cell::{Ref, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use velcro_core::value::{is_truthy, kind, render};
use velcro_core::{Error, Result};

/// Names of the settings in the default catalog
pub mod keys {
    /// Unix timestamp of the current run, set by target selection
    pub const NOW: &str = "now";
    /// Human readable timestamp of the current run
    pub const NOW_STR: &str = "now_str";
    /// Directory name holding per-target config files
    pub const CONFIG_DIR: &str = "config_dir";
    /// Root of all deployments on the remote host
    pub const ROOT_PATH: &str = "root_path";
    /// Deployment directory of the selected target
    pub const BASE_PATH: &str = "base_path";
    /// Local checkout path
    pub const LOCAL_PATH: &str = "local_path";
    /// Log directory
    pub const LOG_PATH: &str = "log_path";
    /// Ordered config path template fragments
    pub const CONFIG_PATH_PIPELINE: &str = "config_path_pipeline";
    /// Remote config directory
    pub const CONFIG_PATH: &str = "config_path";
    /// HTTP server configuration root
    pub const HTTP_SERVER_CONF_PATH: &str = "http_server_conf_path";
    /// Client owning the project
    pub const CLIENT: &str = "client";
    /// Project name
    pub const PROJECT: &str = "project";
    /// Package name, defaults to the project
    pub const PACKAGE_NAME: &str = "package_name";
    /// Selected target
    pub const TARGET: &str = "target";
    /// Directory layout created on bootstrap
    pub const DIRECTORIES: &str = "directories";
    /// Source control system
    pub const SCM: &str = "scm";
    /// Base directory of python virtualenvs
    pub const PY_VENV_BASE: &str = "py_venv_base";
    /// Virtualenv name
    pub const PY_VENV_NAME: &str = "py_venv_name";
    /// pip requirements file
    pub const PY_PIP_REQS_FILE: &str = "py_pip_reqs_file";
    /// Directory holding setup.py
    pub const PY_SRC_DIRNAME: &str = "py_src_dirname";
    /// Django settings module
    pub const DJANGO_SETTINGS_MODULE: &str = "django_settings_module";
    /// MySQL administrative user
    pub const MYSQL_ROOT_USER: &str = "mysql_root_user";
    /// MySQL administrative password
    pub const MYSQL_ROOT_PASS: &str = "mysql_root_pass";
    /// Project database host
    pub const PROJECT_DB_HOST: &str = "project_db_host";
    /// Project database user
    pub const PROJECT_DB_USER: &str = "project_db_user";
    /// Project database name
    pub const PROJECT_DB_NAME: &str = "project_db_name";
    /// Project database password(s), optionally keyed by target
    pub const PROJECT_DB_PASS: &str = "project_db_pass";
    /// Upstart service scripts
    pub const UPSTART_SCRIPTS: &str = "upstart_scripts";
    /// Supervisord include directory
    pub const SUPERVISORD_CONFIG_DIR: &str = "supervisord_config_dir";
    /// Supervisord program configs
    pub const SUPERVISORD_CONFIGS: &str = "supervisord_configs";
    /// Symlink supervisord configs with sudo
    pub const SUPERVISORD_SYMLINK_SUDO: &str = "supervisord_symlink_sudo";
    /// Nginx site config file
    pub const NGINX_CONF: &str = "nginx_conf";
    /// Symlink nginx configs with sudo
    pub const NGINX_SYMLINK_SUDO: &str = "nginx_symlink_sudo";
    /// User for privileged commands
    pub const SUDO_USER: &str = "sudo_user";
    /// Remote login user
    pub const USER: &str = "user";
    /// Remote host
    pub const HOST: &str = "host";
}

/// Source control systems the bootstrap step knows how to initialise
pub const SUPPORTED_SCM: [&str; 1] = ["git"];

/// Shown in listings for settings that would ask the operator
pub const PROMPTED_ON_USE: &str = "<prompted on use>";

/// Shown in listings instead of password values
pub const MASKED: &str = "********";

/// Asks the operator for a value that has no override
///
/// Installed by front-ends that can talk to a terminal. Without one, the
/// settings that would prompt report themselves as missing instead.
pub trait Prompter {
    /// Ask a question; `secret` hides the input
    fn ask(&self, question: &str, secret: bool) -> Result<String>;
}

/// Resolved value of one setting, for display
#[derive(Debug, Clone, Serialize)]
pub struct SettingSnapshot {
    /// Setting name
    pub name: String,
    /// Resolved value, if resolution succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,
    /// Error message, if resolution failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Configuration context: override store plus setting accessors
pub struct Settings {
    overrides: RefCell<OverrideStore>,
    catalog: IndexMap<String, Setting>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("overrides", &self.overrides.borrow().len())
            .field("catalog", &self.catalog.len())
            .finish()
    }
}

impl Settings {
    /// Create settings with the default catalog and no prompter
    pub fn new(store: OverrideStore) -> Self {
        Self::builder(store).build()
    }

    /// Create settings seeded from an override file
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(OverrideStore::from_file(path)?))
    }

    /// Start building settings with a custom prompter or extra settings
    pub fn builder(store: OverrideStore) -> SettingsBuilder {
        SettingsBuilder {
            store,
            prompter: None,
            extra: Vec::new(),
        }
    }

    /// Borrow the override store
    pub fn overrides(&self) -> Ref<'_, OverrideStore> {
        self.overrides.borrow()
    }

    /// Assign an override
    pub fn set(&self, name: impl Into<String>, value: impl Into<JsonValue>) {
        let name = name.into();
        tracing::debug!(setting = %name, "override set");
        self.overrides.borrow_mut().set(name, value);
    }

    /// Assign a computed override
    pub fn set_computed<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&Settings) -> Result<JsonValue> + 'static,
    {
        self.overrides.borrow_mut().set_computed(name, producer(f));
    }

    /// Remove an override so the default applies again
    pub fn unset(&self, name: &str) {
        self.overrides.borrow_mut().remove(name);
    }

    /// Accessor for a known setting
    pub fn setting(&self, name: &str) -> Option<&Setting> {
        self.catalog.get(name)
    }

    /// Names of all known settings, in catalog order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.catalog.keys().map(String::as_str)
    }

    /// Resolve a setting by name
    ///
    /// Names outside the catalog are looked up in the override store only
    /// and resolve to `Null` when absent.
    pub fn resolve(&self, name: &str) -> Result<JsonValue> {
        if let Some(setting) = self.catalog.get(name) {
            return setting.resolve(self);
        }
        Setting::new(name, SettingDefault::absent()).resolve(self)
    }

    /// Resolve a setting that must render as text
    pub fn string(&self, name: &str) -> Result<String> {
        match self.resolve(name)? {
            value @ (JsonValue::String(_) | JsonValue::Number(_) | JsonValue::Bool(_)) => {
                Ok(render(&value))
            }
            other => Err(invalid(name, "a string", &other)),
        }
    }

    /// Resolve an optional text setting; `Null` becomes `None`
    pub fn optional_string(&self, name: &str) -> Result<Option<String>> {
        match self.resolve(name)? {
            JsonValue::Null => Ok(None),
            value @ (JsonValue::String(_) | JsonValue::Number(_) | JsonValue::Bool(_)) => {
                Ok(Some(render(&value)))
            }
            other => Err(invalid(name, "a string", &other)),
        }
    }

    /// Resolve a flag using truthiness
    pub fn boolean(&self, name: &str) -> Result<bool> {
        Ok(is_truthy(&self.resolve(name)?))
    }

    /// Resolve a list of strings; a single string is a one-element list
    pub fn string_list(&self, name: &str) -> Result<Vec<String>> {
        match self.resolve(name)? {
            JsonValue::String(s) => Ok(vec![s]),
            JsonValue::Array(items) => items
                .iter()
                .map(|item| match item {
                    JsonValue::String(_) | JsonValue::Number(_) | JsonValue::Bool(_) => {
                        Ok(render(item))
                    }
                    other => Err(invalid(name, "a list of strings", other)),
                })
                .collect(),
            other => Err(invalid(name, "a list of strings", &other)),
        }
    }

    /// Resolve `scm`, which must name a supported system
    pub fn scm(&self) -> Result<String> {
        let scm = self.string(keys::SCM)?;
        if SUPPORTED_SCM.contains(&scm.as_str()) {
            Ok(scm)
        } else {
            Err(Error::InvalidSetting {
                name: keys::SCM.to_string(),
                expected: "a supported scm (git)",
                found: "an unsupported scm",
            })
        }
    }

    /// Resolve a path setting
    pub fn path(&self, name: &str) -> Result<PathBuf> {
        self.string(name).map(PathBuf::from)
    }

    /// `base_path/src`
    pub fn src_path(&self) -> Result<PathBuf> {
        Ok(self.path(keys::BASE_PATH)?.join("src"))
    }

    /// Resolved `log_path`
    pub fn log_path(&self) -> Result<PathBuf> {
        self.path(keys::LOG_PATH)
    }

    /// Resolved `config_path`
    pub fn config_path(&self) -> Result<PathBuf> {
        self.path(keys::CONFIG_PATH)
    }

    /// Config path built on `local_path` (not overridable)
    pub fn local_config_path(&self) -> Result<PathBuf> {
        Ok(pipeline::join(&self.build_config_path(true)?))
    }

    /// `log_path/deploy.log`
    pub fn deploy_log(&self) -> Result<PathBuf> {
        Ok(self.log_path()?.join("deploy.log"))
    }

    /// `log_path/rollback.log`
    pub fn rollback_log(&self) -> Result<PathBuf> {
        Ok(self.log_path()?.join("rollback.log"))
    }

    /// Substitutions available to the config path pipeline
    pub fn pipeline_substitutions(&self) -> Result<IndexMap<String, String>> {
        Ok(IndexMap::from([
            (
                keys::PACKAGE_NAME.to_string(),
                self.string(keys::PACKAGE_NAME)?,
            ),
            (keys::CONFIG_DIR.to_string(), self.string(keys::CONFIG_DIR)?),
            (keys::TARGET.to_string(), self.string(keys::TARGET)?),
        ]))
    }

    /// Build config path segments on `src_path`, or on `local_path` when `local`
    pub fn build_config_path(&self, local: bool) -> Result<Vec<String>> {
        let substitutions = self.pipeline_substitutions()?;
        let base = if local {
            self.string(keys::LOCAL_PATH)?
        } else {
            self.src_path()?.to_string_lossy().into_owned()
        };
        let fragments = self.string_list(keys::CONFIG_PATH_PIPELINE)?;
        pipeline::build(&[base], &fragments, &substitutions)
    }

    /// Resolve every known setting for display
    pub fn snapshot(&self) -> Vec<SettingSnapshot> {
        self.names()
            .map(|name| self.snapshot_one(name))
            .collect()
    }

    /// Resolve one setting for display
    ///
    /// Interactive defaults are not resolved, so listing never prompts.
    /// Password values are masked.
    pub fn snapshot_one(&self, name: &str) -> SettingSnapshot {
        let interactive = self.catalog.get(name).is_some_and(Setting::is_interactive);
        if interactive && !self.overrides().contains(name) {
            return SettingSnapshot {
                name: name.to_string(),
                value: Some(JsonValue::String(PROMPTED_ON_USE.to_string())),
                error: None,
            };
        }

        match self.resolve(name) {
            Ok(value) => SettingSnapshot {
                name: name.to_string(),
                value: Some(mask(name, value)),
                error: None,
            },
            Err(e) => SettingSnapshot {
                name: name.to_string(),
                value: None,
                error: Some(e.to_string()),
            },
        }
    }
}

fn mask(name: &str, value: JsonValue) -> JsonValue {
    if name.ends_with("_pass") && !value.is_null() {
        JsonValue::String(MASKED.to_string())
    } else {
        value
    }
}

fn invalid(name: &str, expected: &'static str, found: &JsonValue) -> Error {
    Error::InvalidSetting {
        name: name.to_string(),
        expected,
        found: kind(found),
    }
}

/// Builder for [`Settings`]
pub struct SettingsBuilder {
    store: OverrideStore,
    prompter: Option<Rc<dyn Prompter>>,
    extra: Vec<Setting>,
}

impl SettingsBuilder {
    /// Install an interactive prompter for the MySQL credentials
    #[must_use]
    pub fn prompter(mut self, prompter: Rc<dyn Prompter>) -> Self {
        self.prompter = Some(prompter);
        self
    }

    /// Add a setting, replacing a catalog entry with the same name
    #[must_use]
    pub fn setting(mut self, setting: Setting) -> Self {
        self.extra.push(setting);
        self
    }

    /// Build the settings context
    pub fn build(self) -> Settings {
        let mut catalog: IndexMap<String, Setting> = default_catalog(self.prompter.as_ref())
            .into_iter()
            .map(|s| (s.name().to_string(), s))
            .collect();
        for setting in self.extra {
            catalog.insert(setting.name().to_string(), setting);
        }

        Settings {
            overrides: RefCell::new(self.store),
            catalog,
        }
    }
}

fn required(name: &'static str, message: &str) -> Setting {
    Setting::new(name, SettingDefault::required(name, message))
}

fn env_required(name: &'static str) -> Setting {
    required(name, &format!("env.{name} is required."))
}

/// Fall back to the `user` override, then to the local login name
fn user_or_login(settings: &Settings) -> Result<JsonValue> {
    Ok(settings
        .overrides()
        .value(keys::USER)
        .unwrap_or_else(|| JsonValue::String(login_name())))
}

/// `{project[..10]}_{target}`, or nothing when either is unset
fn project_target_name(settings: &Settings) -> Result<JsonValue> {
    let project = match settings.string(keys::PROJECT) {
        Ok(project) => project,
        Err(e) if e.is_configuration() => return Ok(JsonValue::Null),
        Err(e) => return Err(e),
    };
    let target = match settings.string(keys::TARGET) {
        Ok(target) => target,
        Err(e) if e.is_configuration() => return Ok(JsonValue::Null),
        Err(e) => return Err(e),
    };
    let short: String = project.chars().take(10).collect();
    Ok(JsonValue::String(format!("{short}_{target}")))
}

/// Ask once and remember the answer as an override
fn prompted(
    name: &'static str,
    question: &'static str,
    secret: bool,
    prompter: Option<&Rc<dyn Prompter>>,
) -> Setting {
    let Some(prompter) = prompter.cloned() else {
        return required(name, &format!("env.{name} is required."));
    };
    Setting::new(
        name,
        SettingDefault::computed(move |settings| {
            let answer = prompter.ask(question, secret)?;
            settings.set(name, answer.clone());
            Ok(JsonValue::String(answer))
        }),
    )
    .interactive()
}

fn default_catalog(prompter: Option<&Rc<dyn Prompter>>) -> Vec<Setting> {
    vec![
        // Timestamps, set on target selection
        required(keys::NOW, "Missing timestamp, have you set target?"),
        required(keys::NOW_STR, "Missing timestamp, have you set target?"),
        // Directories
        Setting::new(keys::CONFIG_DIR, "config"),
        // Paths
        required(keys::ROOT_PATH, "env.root_path required"),
        required(keys::BASE_PATH, "Missing Base Path, have you set a target?"),
        required(keys::LOCAL_PATH, "env.local_path is required."),
        Setting::new(
            keys::LOG_PATH,
            SettingDefault::computed(|s| {
                let base = s.path(keys::BASE_PATH)?;
                Ok(JsonValue::String(base.join("logs").to_string_lossy().into_owned()))
            }),
        ),
        Setting::new(
            keys::CONFIG_PATH_PIPELINE,
            json!(["{package_name}", "{config_dir}", "{target}"]),
        ),
        Setting::new(
            keys::CONFIG_PATH,
            SettingDefault::computed(|s| {
                let segments = s.build_config_path(false)?;
                Ok(JsonValue::String(
                    pipeline::join(&segments).to_string_lossy().into_owned(),
                ))
            }),
        ),
        env_required(keys::HTTP_SERVER_CONF_PATH),
        // Project details
        Setting::new(keys::CLIENT, SettingDefault::computed(user_or_login)),
        required(keys::PROJECT, "Missing Project Name"),
        Setting::new(
            keys::PACKAGE_NAME,
            SettingDefault::computed(|s| s.resolve(keys::PROJECT)),
        ),
        required(keys::TARGET, "Missing Target"),
        Setting::new(keys::DIRECTORIES, json!(["src"])),
        // SCM
        required(keys::SCM, "env.scm is required"),
        // Python
        env_required(keys::PY_VENV_BASE),
        Setting::new(
            keys::PY_VENV_NAME,
            SettingDefault::computed(|s| {
                Ok(JsonValue::String(format!(
                    "{}_{}_{}",
                    s.string(keys::TARGET)?,
                    s.string(keys::CLIENT)?,
                    s.string(keys::PROJECT)?
                )))
            }),
        ),
        Setting::new(keys::PY_PIP_REQS_FILE, "requirements.txt"),
        Setting::new(keys::PY_SRC_DIRNAME, SettingDefault::absent()),
        // Django
        env_required(keys::DJANGO_SETTINGS_MODULE),
        // MySQL
        prompted(
            keys::MYSQL_ROOT_USER,
            "> [MySQL]: Please enter root user name:",
            false,
            prompter,
        ),
        prompted(
            keys::MYSQL_ROOT_PASS,
            "> [MySQL]: Please enter root user password (leave blank if none):",
            true,
            prompter,
        ),
        Setting::new(keys::PROJECT_DB_HOST, SettingDefault::absent()),
        Setting::new(
            keys::PROJECT_DB_USER,
            SettingDefault::computed(project_target_name),
        ),
        Setting::new(
            keys::PROJECT_DB_NAME,
            SettingDefault::computed(project_target_name),
        ),
        Setting::new(keys::PROJECT_DB_PASS, SettingDefault::absent()),
        // Upstart
        env_required(keys::UPSTART_SCRIPTS),
        // Supervisord
        required(
            keys::SUPERVISORD_CONFIG_DIR,
            "env.supervisord_config_dir is required",
        ),
        required(
            keys::SUPERVISORD_CONFIGS,
            "env.supervisord_configs is required",
        ),
        Setting::new(keys::SUPERVISORD_SYMLINK_SUDO, false),
        // Nginx
        env_required(keys::NGINX_CONF),
        Setting::new(keys::NGINX_SYMLINK_SUDO, false),
        // Users
        Setting::new(keys::SUDO_USER, SettingDefault::computed(user_or_login)),
        env_required(keys::USER),
        env_required(keys::HOST),
    ]
}
