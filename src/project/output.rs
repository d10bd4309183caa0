//! Parsers for the text output of BitBake introspection commands.
//!
//! One function per command shape. Each takes raw command output and returns
//! structured records; none of them fail, unrecognised text is skipped.

use super::snapshot::{ElementInfo, LayerInfo};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

static LAYERS_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^layer *path *priority$").expect("valid regex"));

static RECIPE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(.+):\n((?:\s+\S+\s+\S+(?:\s+\(skipped\))?\n)+)").expect("valid regex")
});

static RECIPE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(\S+)\s+(\S+(?:\s+\(skipped\))?)\n").expect("valid regex"));

static APPEND_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(.*\.bb):(?:\n\s*/.*\.bbappend)+").expect("valid regex"));

static APPEND_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\S*\.bbappend)").expect("valid regex"));

static OVERRIDES_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^OVERRIDES="(.*)"\r?$"#).expect("valid regex"));

static RECIPE_FILE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\s.*\.bb)").expect("valid regex"));

/// Rows of `bitbake-layers show-layers`: a `layer path priority` header, a
/// separator line, then one `name path priority` row per layer.
pub fn parse_layers(output: &str) -> Vec<LayerInfo> {
    let lines: Vec<&str> = output.lines().collect();
    let Some(header) = lines.iter().position(|l| LAYERS_HEADER.is_match(l)) else {
        return Vec::new();
    };

    lines
        .iter()
        .skip(header + 2)
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let name = columns.next()?;
            let path = columns.next()?;
            let priority = columns.next()?.parse().ok()?;
            Some(LayerInfo {
                name: name.to_string(),
                path: path.to_string(),
                priority,
            })
        })
        .collect()
}

/// Blocks of `bitbake-layers show-recipes`:
///
/// ```text
/// busybox:
///   meta                 1.36.1
///   meta-custom          1.35.0 (skipped)
/// ```
///
/// The first row provides the recipe's layer and version; every row ends up
/// in `extra_info`.
pub fn parse_recipes(output: &str, layers: &[LayerInfo]) -> Vec<ElementInfo> {
    RECIPE_BLOCK
        .captures_iter(output)
        .map(|block| {
            let mut extra_info = Vec::new();
            let mut layer_name = None;
            let mut version = String::new();

            for row in RECIPE_LINE.captures_iter(&block[2]) {
                if extra_info.is_empty() {
                    layer_name = Some(row[1].to_string());
                    version = row[2].to_string();
                }
                extra_info.push(format!("layer: {}", &row[1]));
                extra_info.push(format!("version: {} ", &row[2]));
            }

            ElementInfo {
                name: block[1].to_string(),
                extra_info: Some(extra_info.join("\n")),
                layer_info: layer_name.and_then(|n| layers.iter().find(|l| l.name == n).cloned()),
                version: Some(version),
                ..ElementInfo::default()
            }
        })
        .collect()
}

/// One recipe file and the overlays `bitbake-layers show-appends` lists for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendGroup {
    pub recipe_file: String,
    pub appends: Vec<String>,
}

/// Blocks of `bitbake-layers show-appends`:
///
/// ```text
/// busybox_1.36.1.bb:
///   /layers/meta-poky/recipes-core/busybox/busybox_%.bbappend
/// ```
pub fn parse_appends(output: &str) -> Vec<AppendGroup> {
    APPEND_BLOCK
        .captures_iter(output)
        .filter_map(|block| {
            let whole = block.get(0)?.as_str();
            let appends = APPEND_FILE
                .captures_iter(whole)
                .map(|m| m[1].to_string())
                .collect();
            Some(AppendGroup {
                recipe_file: block[1].to_string(),
                appends,
            })
        })
        .collect()
}

/// The `OVERRIDES="a:b:c"` line of `bitbake-getvar OVERRIDES`
pub fn parse_overrides(output: &str) -> Vec<String> {
    OVERRIDES_LINE
        .captures(output)
        .map(|c| c[1].split(':').map(str::to_string).collect())
        .unwrap_or_default()
}

/// `.bb` paths printed by `bitbake-layers show-recipes -f <recipe>`
pub fn parse_recipe_file_paths(output: &str) -> Vec<PathBuf> {
    RECIPE_FILE
        .captures_iter(output)
        .map(|c| PathBuf::from(c[1].trim()))
        .collect()
}

/// Split a recipe file name into its identity and version:
/// `busybox_1.36.1.bb` gives `("busybox", Some("1.36.1"))`.
pub fn recipe_identity(file_name: &str) -> (String, Option<String>) {
    let mut parts = file_name.splitn(2, '_');
    let head = parts.next().unwrap_or_default();
    let name = head.split('.').next().unwrap_or(head).to_string();
    let version = parts.next().map(|rest| {
        rest.split(".bbappend")
            .next()
            .and_then(|v| v.split(".bb").next())
            .unwrap_or(rest)
            .to_string()
    });
    (name, version)
}

/// Whether an overlay whose file name carries `overlay_version` applies to a
/// recipe at `recipe_version`.
///
/// A missing token or a sole `%` matches anything. Otherwise the recipe
/// version has to start with the token; `1.%` is compared literally.
pub fn append_version_matches(overlay_version: Option<&str>, recipe_version: Option<&str>) -> bool {
    match (overlay_version, recipe_version) {
        (None, _) | (Some("%"), _) => true,
        (Some(_), None) => false,
        (Some(overlay), Some(recipe)) => recipe.starts_with(overlay),
    }
}
