//! Documentation tables for completion and hover.
//!
//! Static fallback lists are always available. [`DocScanner`] adds the
//! glossaries shipped with BitBake and the Yocto Project documentation when a
//! docs folder is configured.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, warn};

/// Words with a meaning of their own in recipes
pub const RESERVED_KEYWORDS: &[&str] = &[
    "python",
    "def",
    "include",
    "from",
    "import",
    "require",
    "inherit",
    "inherit_defer",
    "addtask",
    "deltask",
    "addhandler",
    "after",
    "before",
    "export",
    "unset",
    "fakeroot",
    "EXPORT_FUNCTIONS",
    "INHERIT",
];

/// Override-style operators
pub const BITBAKE_OPERATOR: &[&str] = &["append", "prepend", "remove"];

/// Flags used when the documentation has no flag glossary
pub const VARIABLE_FLAGS: &[&str] = &[
    "cleandirs",
    "depends",
    "deptask",
    "dirs",
    "doc",
    "export",
    "fakeroot",
    "func",
    "lockfiles",
    "network",
    "noexec",
    "nostamp",
    "number_threads",
    "postfuncs",
    "prefuncs",
    "python",
    "rdepends",
    "rdeptask",
    "recideptask",
    "recrdeptask",
    "stamp-extra-info",
    "task",
    "umask",
    "unexport",
    "vardeps",
    "vardepsexclude",
    "vardepvalue",
    "vardepvalueexclude",
];

/// Variables used when the documentation has no variable glossary
pub const BITBAKE_VARIABLES: &[&str] = &[
    "ASSUME_PROVIDED",
    "B",
    "BB_ALLOWED_NETWORKS",
    "BB_DANGLINGAPPENDS_WARNONLY",
    "BB_ENV_PASSTHROUGH",
    "BB_ENV_PASSTHROUGH_ADDITIONS",
    "BB_GENERATE_MIRROR_TARBALLS",
    "BB_NUMBER_THREADS",
    "BB_SRCREV_POLICY",
    "BBCLASSEXTEND",
    "BBFILE_COLLECTIONS",
    "BBFILE_PATTERN",
    "BBFILE_PRIORITY",
    "BBFILES",
    "BBLAYERS",
    "BBPATH",
    "BBVERSIONS",
    "BUILDNAME",
    "CACHE",
    "D",
    "DEFAULT_PREFERENCE",
    "DEPENDS",
    "DESCRIPTION",
    "DL_DIR",
    "EXCLUDE_FROM_WORLD",
    "FAKEROOT",
    "FILE",
    "FILESPATH",
    "HOMEPAGE",
    "INHERIT",
    "LAYERDEPENDS",
    "LAYERDIR",
    "LAYERSERIES_COMPAT",
    "LAYERVERSION",
    "LICENSE",
    "LIC_FILES_CHKSUM",
    "MIRRORS",
    "OVERRIDES",
    "PACKAGES",
    "PE",
    "PF",
    "PN",
    "PR",
    "PREFERRED_PROVIDER",
    "PREFERRED_VERSION",
    "PREMIRRORS",
    "PROVIDES",
    "PV",
    "RDEPENDS",
    "REPODIR",
    "RPROVIDES",
    "RRECOMMENDS",
    "S",
    "SECTION",
    "SRC_URI",
    "SRCDATE",
    "SRCREV",
    "SRCREV_FORMAT",
    "STAMP",
    "STAMPCLEAN",
    "SUMMARY",
    "T",
    "TOPDIR",
    "WORKDIR",
];

/// Glossary files below the docs folder
const BITBAKE_VARIABLES_DOC: &str = "bitbake/doc/bitbake-user-manual/bitbake-user-manual-ref-variables.rst";
const VARIABLE_FLAGS_DOC: &str = "bitbake/doc/bitbake-user-manual/bitbake-user-manual-metadata.rst";
const YOCTO_VARIABLES_DOC: &str = "documentation/ref-manual/variables.rst";
const YOCTO_TASKS_DOC: &str = "documentation/ref-manual/tasks.rst";

const BITBAKE_REFERENCE: &str =
    "https://docs.yoctoproject.org/bitbake/bitbake-user-manual/bitbake-user-manual-ref-variables.html#term-";
const YOCTO_REFERENCE: &str = "https://docs.yoctoproject.org/ref-manual/variables.html#term-";
const TASKS_REFERENCE: &str = "https://docs.yoctoproject.org/ref-manual/tasks.html#";

static GLOSSARY_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {3}:term:`([A-Za-z0-9_\-:]+)`\s*$").expect("valid regex"));

static FLAG_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\s+``\[([A-Za-z0-9_\-]+)\]``:\s*(.*)$").expect("valid regex"));

static TASK_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^``(do_[A-Za-z0-9_]+)``\s*$").expect("valid regex"));

/// Which manual an entry comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocSource {
    Bitbake,
    Yocto,
}

impl fmt::Display for DocSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocSource::Bitbake => f.write_str("BitBake"),
            DocSource::Yocto => f.write_str("Yocto"),
        }
    }
}

/// One documented variable, flag or task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocInfo {
    pub name: String,
    pub definition: String,
    pub source: DocSource,
    pub reference_url: Option<String>,
    pub insert_text: Option<String>,
}

/// Documentation parsed from reStructuredText glossaries
#[derive(Debug, Clone, Default)]
pub struct DocScanner {
    pub bitbake_variables: Vec<DocInfo>,
    pub yocto_variables: Vec<DocInfo>,
    pub variable_flags: Vec<DocInfo>,
    pub yocto_tasks: Vec<DocInfo>,
    variables: IndexMap<String, DocInfo>,
}

impl DocScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every glossary found below `docs_root`. Missing files leave their
    /// table empty.
    pub fn scan(docs_root: &Path) -> Self {
        let read = |relative: &str| match std::fs::read_to_string(docs_root.join(relative)) {
            Ok(text) => Some(text),
            Err(error) => {
                warn!(file = relative, %error, "documentation glossary not loaded");
                None
            }
        };

        let mut scanner = Self::new();
        if let Some(text) = read(BITBAKE_VARIABLES_DOC) {
            scanner.bitbake_variables = parse_variable_glossary(&text, DocSource::Bitbake);
        }
        if let Some(text) = read(YOCTO_VARIABLES_DOC) {
            scanner.yocto_variables = parse_variable_glossary(&text, DocSource::Yocto);
        }
        if let Some(text) = read(VARIABLE_FLAGS_DOC) {
            scanner.variable_flags = parse_variable_flags(&text);
        }
        if let Some(text) = read(YOCTO_TASKS_DOC) {
            scanner.yocto_tasks = parse_tasks(&text);
        }
        scanner.index_variables();
        debug!(
            bitbake = scanner.bitbake_variables.len(),
            yocto = scanner.yocto_variables.len(),
            flags = scanner.variable_flags.len(),
            tasks = scanner.yocto_tasks.len(),
            "documentation scanned"
        );
        scanner
    }

    /// Build from already parsed tables.
    pub fn from_tables(
        bitbake_variables: Vec<DocInfo>,
        yocto_variables: Vec<DocInfo>,
        variable_flags: Vec<DocInfo>,
        yocto_tasks: Vec<DocInfo>,
    ) -> Self {
        let mut scanner = Self {
            bitbake_variables,
            yocto_variables,
            variable_flags,
            yocto_tasks,
            variables: IndexMap::new(),
        };
        scanner.index_variables();
        scanner
    }

    fn index_variables(&mut self) {
        self.variables = self
            .bitbake_variables
            .iter()
            .chain(&self.yocto_variables)
            .map(|info| (info.name.clone(), info.clone()))
            .collect();
    }

    /// BitBake entries shadowed by a Yocto entry of the same name are dropped.
    pub fn variables(&self) -> impl Iterator<Item = &DocInfo> {
        self.variables.values()
    }

    pub fn variable_info(&self, name: &str) -> Option<&DocInfo> {
        self.variables.get(name)
    }
}

/// Entries of a `.. glossary::` block: a `:term:` line indented by three
/// spaces, then its definition indented by six.
pub fn parse_variable_glossary(text: &str, source: DocSource) -> Vec<DocInfo> {
    let reference = match source {
        DocSource::Bitbake => BITBAKE_REFERENCE,
        DocSource::Yocto => YOCTO_REFERENCE,
    };

    let mut entries = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;
    for line in text.lines() {
        if let Some(captures) = GLOSSARY_TERM.captures(line) {
            entries.extend(current.take());
            current = Some((captures[1].to_string(), Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            if line.trim().is_empty() || line.starts_with("      ") {
                body.push(line.trim());
            } else {
                entries.extend(current.take());
            }
        }
    }
    entries.extend(current);

    entries
        .into_iter()
        .map(|(name, body)| DocInfo {
            reference_url: Some(format!("{reference}{name}")),
            definition: join_paragraphs(&body),
            name,
            source,
            insert_text: None,
        })
        .collect()
}

/// `-  ``[flag]``: text` items, continued by indented lines.
pub fn parse_variable_flags(text: &str) -> Vec<DocInfo> {
    let mut entries: Vec<(String, Vec<&str>)> = Vec::new();
    let mut open = false;
    for line in text.lines() {
        if let Some(captures) = FLAG_ITEM.captures(line) {
            let first = captures.get(2).map_or("", |m| m.as_str());
            entries.push((captures[1].to_string(), vec![first]));
            open = true;
        } else if open && line.starts_with("   ") && !line.trim().is_empty() {
            if let Some((_, body)) = entries.last_mut() {
                body.push(line.trim());
            }
        } else {
            open = false;
        }
    }

    entries
        .into_iter()
        .map(|(name, body)| DocInfo {
            name,
            definition: join_paragraphs(&body),
            source: DocSource::Bitbake,
            reference_url: None,
            insert_text: None,
        })
        .collect()
}

/// Task sections: a ``` ``do_task`` ``` heading underlined with dashes.
pub fn parse_tasks(text: &str) -> Vec<DocInfo> {
    let lines: Vec<&str> = text.lines().collect();
    let mut headings = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        let underlined = lines
            .get(idx + 1)
            .is_some_and(|next| !next.is_empty() && next.chars().all(|c| c == '-'));
        if underlined {
            if let Some(captures) = TASK_HEADING.captures(line) {
                headings.push((idx, captures[1].to_string()));
            }
        }
    }

    headings
        .iter()
        .enumerate()
        .map(|(n, (idx, name))| {
            let end = headings.get(n + 1).map_or(lines.len(), |(next, _)| *next);
            let body: Vec<&str> = lines[idx + 2..end]
                .iter()
                .map(|l| l.trim())
                .take_while(|l| !l.starts_with(".. _ref-tasks"))
                .collect();
            DocInfo {
                name: name.clone(),
                definition: join_paragraphs(&body),
                source: DocSource::Yocto,
                reference_url: Some(format!(
                    "{}ref-tasks-{}",
                    TASKS_REFERENCE,
                    name.trim_start_matches("do_")
                )),
                insert_text: Some(format!("{name}() {{\n\t${{1:# Your code here}}\n}}")),
            }
        })
        .collect()
}

/// Lines of one paragraph joined by spaces, paragraphs by a blank line
fn join_paragraphs(lines: &[&str]) -> String {
    lines
        .split(|l| l.is_empty())
        .filter(|p| !p.is_empty())
        .map(|p| p.join(" "))
        .collect::<Vec<_>>()
        .join("\n\n")
}
