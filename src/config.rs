//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treemount/treemount.toml`
//! 3. Local config: file given with `--config`
//! 4. Environment variables: `TREEMOUNT_*` prefix (`__` separates sections)
//!
//! A replay fixture may carry its own `[flags]` table, applied last.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::PropagationOptions;

/// Feature flags consumed by mount propagation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FeatureFlags {
    /// Rebind runtime references to the newest node instance on commits
    /// from the primary pipeline.
    pub update_runtime_references_on_commit: bool,
}

/// Raw flags for intermediate parsing (`None` means "not specified").
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RawFeatureFlags {
    pub update_runtime_references_on_commit: Option<bool>,
}

impl FeatureFlags {
    /// Overlay wins where it specifies a value.
    pub fn merge(&self, overlay: &RawFeatureFlags) -> Self {
        Self {
            update_runtime_references_on_commit: overlay
                .update_runtime_references_on_commit
                .unwrap_or(self.update_runtime_references_on_commit),
        }
    }

    /// One-line rendering, e.g. `update_runtime_references_on_commit ✅`.
    pub fn summary(&self) -> String {
        format_flag(
            "update_runtime_references_on_commit",
            self.update_runtime_references_on_commit,
        )
    }
}

fn format_flag(name: &str, value: bool) -> String {
    format!("{} {}", name, if value { "✅" } else { "🛑" })
}

impl From<&FeatureFlags> for PropagationOptions {
    fn from(flags: &FeatureFlags) -> Self {
        Self {
            update_runtime_references_on_commit: flags.update_runtime_references_on_commit,
        }
    }
}

/// Output options of the `replay` command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReplayConfig {
    /// Show node props next to each node
    pub show_props: bool,
    /// Also list nodes of the previous revision that got unmounted
    pub show_retired: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            show_props: true,
            show_retired: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawReplayConfig {
    pub show_props: Option<bool>,
    pub show_retired: Option<bool>,
}

impl ReplayConfig {
    pub fn merge(&self, overlay: &RawReplayConfig) -> Self {
        Self {
            show_props: overlay.show_props.unwrap_or(self.show_props),
            show_retired: overlay.show_retired.unwrap_or(self.show_retired),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSettings {
    pub flags: RawFeatureFlags,
    pub replay: RawReplayConfig,
}

/// Unified configuration for treemount.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub flags: FeatureFlags,
    pub replay: ReplayConfig,
}

/// Get the XDG config directory for treemount.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treemount").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treemount.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

/// `TREEMOUNT_FLAGS__UPDATE_RUNTIME_REFERENCES_ON_COMMIT=true` style variables.
fn env_source() -> Environment {
    Environment::with_prefix("TREEMOUNT")
        .prefix_separator("_")
        .separator("__")
}

impl Settings {
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            flags: self.flags.merge(&overlay.flags),
            replay: self.replay.merge(&overlay.replay),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_config` - Optional explicit config file; it must exist
    pub fn load(local_config: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(local_path) = local_config {
            let raw = load_raw_settings(local_path)?;
            current = current.merge_with(&raw);
        }

        Self::apply_env_overrides(current, env_source())
    }

    /// Apply environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self, source: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(source)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("flags.update_runtime_references_on_commit") {
            settings.flags.update_runtime_references_on_commit = val;
        }
        if let Ok(val) = config.get_bool("replay.show_props") {
            settings.replay.show_props = val;
        }
        if let Ok(val) = config.get_bool("replay.show_retired") {
            settings.replay.show_retired = val;
        }

        Ok(settings)
    }

    /// Render as TOML, for `config show`.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}
