//! Project snapshot: layers, recipes, classes, includes and overrides.
//!
//! A snapshot is built once per scan and then shared read-only behind an
//! `Arc`. It is never edited after publication, a new scan replaces it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A layer as listed by `bitbake-layers show-layers`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub name: String,
    pub path: String,
    pub priority: i64,
}

/// Decomposed file path, `root`/`dir`/`base`/`ext`/`name`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathInfo {
    pub root: String,
    pub dir: String,
    pub base: String,
    pub ext: String,
    pub name: String,
}

impl PathInfo {
    /// Split `path` into its parts. `ext` keeps the leading dot.
    pub fn parse(path: &Path) -> Self {
        let root = if path.has_root() { "/" } else { "" };
        let dir = path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let base = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (name, ext) = match base.rfind('.') {
            Some(idx) if idx > 0 => (base[..idx].to_string(), base[idx..].to_string()),
            _ => (base.clone(), String::new()),
        };
        Self {
            root: root.to_string(),
            dir,
            base,
            ext,
            name,
        }
    }

    pub fn to_path_buf(&self) -> PathBuf {
        Path::new(&self.dir).join(&self.base)
    }
}

/// A recipe, class or include file known to the project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_info: Option<LayerInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appends: Option<Vec<PathInfo>>,
}

impl ElementInfo {
    /// Element found on disk inside `layer`
    pub fn from_file(path: &Path, layer: &LayerInfo) -> Self {
        let path = PathInfo::parse(path);
        Self {
            name: path.name.clone(),
            path: Some(path),
            extra_info: Some(format!("layer: {}", layer.name)),
            layer_info: Some(layer.clone()),
            ..Self::default()
        }
    }

    pub fn file_path(&self) -> Option<PathBuf> {
        self.path.as_ref().map(PathInfo::to_path_buf)
    }

    /// Path of the element relative to its layer, falling back to the file name.
    pub fn layer_relative_path(&self) -> Option<String> {
        let file = self.file_path()?;
        let relative = self
            .layer_info
            .as_ref()
            .and_then(|layer| file.strip_prefix(&layer.path).ok())
            .map(|p| p.to_string_lossy().into_owned());
        relative.or_else(|| self.path.as_ref().map(|p| p.base.clone()))
    }
}

/// Immutable result of a project scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    #[serde(rename = "_layers", default)]
    pub layers: Vec<LayerInfo>,
    #[serde(rename = "_recipes", default)]
    pub recipes: Vec<ElementInfo>,
    #[serde(rename = "_classes", default)]
    pub classes: Vec<ElementInfo>,
    #[serde(rename = "_includes", default)]
    pub includes: Vec<ElementInfo>,
    #[serde(rename = "_overrides", default)]
    pub overrides: Vec<String>,
}

impl ProjectSnapshot {
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
            && self.recipes.is_empty()
            && self.classes.is_empty()
            && self.includes.is_empty()
            && self.overrides.is_empty()
    }

    pub fn layer(&self, name: &str) -> Option<&LayerInfo> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn recipe(&self, name: &str) -> Option<&ElementInfo> {
        self.recipes.iter().find(|r| r.name == name)
    }

    pub fn class(&self, name: &str) -> Option<&ElementInfo> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Includes and recipes whose file path ends with `relative`
    pub fn files_ending_with<'a>(&'a self, relative: &'a str) -> impl Iterator<Item = &'a ElementInfo> + 'a {
        self.includes
            .iter()
            .chain(self.recipes.iter())
            .filter(move |e| e.file_path().is_some_and(|p| p.ends_with(relative)))
    }
}
