//! User settings for locating BitBake and the build environment.

use super::error::ConfigError;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

const WORKSPACE_FOLDER: &str = "${workspaceFolder}";

/// Settings as sent by the client, before path resolution
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSettings {
    pub path_to_bitbake_folder: String,
    pub path_to_build_folder: String,
    pub path_to_env_script: String,
    pub working_directory: String,
    pub storage_path: String,
    pub source_search_root: String,
    pub should_deep_examine: bool,
    pub docs_path: String,
}

/// Resolved settings, every path absolute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub path_to_bitbake_folder: Option<PathBuf>,
    pub path_to_build_folder: Option<PathBuf>,
    pub path_to_env_script: Option<PathBuf>,
    pub working_directory: PathBuf,
    pub storage_path: Option<PathBuf>,
    pub source_search_root: Option<PathBuf>,
    pub should_deep_examine: bool,
    pub docs_path: Option<PathBuf>,
}

impl Settings {
    /// Parse a settings payload and resolve its paths against `workspace_folder`.
    ///
    /// Accepts either the bare settings object or one nested under `bitbake`.
    pub fn from_json(value: &serde_json::Value, workspace_folder: &Path) -> Result<Self, ConfigError> {
        let value = value.get("bitbake").unwrap_or(value);
        let raw: RawSettings = serde_json::from_value(value.clone())?;
        Ok(Self::resolve(&raw, workspace_folder))
    }

    pub fn resolve(raw: &RawSettings, workspace_folder: &Path) -> Self {
        let resolve = |value: &str| resolve_path(value, workspace_folder);
        Self {
            path_to_bitbake_folder: resolve(&raw.path_to_bitbake_folder),
            path_to_build_folder: resolve(&raw.path_to_build_folder),
            path_to_env_script: resolve(&raw.path_to_env_script),
            working_directory: resolve(&raw.working_directory)
                .unwrap_or_else(|| workspace_folder.to_path_buf()),
            storage_path: resolve(&raw.storage_path),
            source_search_root: resolve(&raw.source_search_root),
            should_deep_examine: raw.should_deep_examine,
            docs_path: resolve(&raw.docs_path),
        }
    }

    /// A driver can only run commands once BitBake itself has been located.
    pub fn is_driver_configured(&self) -> bool {
        self.path_to_bitbake_folder.is_some()
    }
}

/// Expand `${workspaceFolder}` and make the path absolute. Empty means unset.
fn resolve_path(value: &str, workspace_folder: &Path) -> Option<PathBuf> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let expanded = value.replace(WORKSPACE_FOLDER, &workspace_folder.to_string_lossy());
    let path = Path::new(&expanded);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        workspace_folder.join(path)
    };
    Some(normalize(&absolute))
}

/// Lexically fold `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
