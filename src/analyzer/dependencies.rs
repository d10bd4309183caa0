//! Resolution of directive targets to documents.

use indexmap::IndexSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

use crate::parser::{DirectiveKind, Recipe};
use crate::project::ProjectSnapshot;

/// Documents referenced by the `inherit`, `include` and `require`
/// statements of `recipe`, in statement order and without duplicates.
///
/// `inherit X` names the class `X`. `include P` and `require P` name the
/// include or recipe whose path ends with `P`, or `P` next to the document
/// when that file exists. Arguments built from `${…}` cannot be resolved
/// without evaluation and are skipped.
pub fn resolve_dependencies(recipe: &Recipe, uri: &Url, snapshot: &ProjectSnapshot) -> Vec<Url> {
    let document_dir = uri
        .to_file_path()
        .ok()
        .and_then(|path| path.parent().map(Path::to_path_buf));

    let mut resolved = IndexSet::new();
    for directive in recipe.directives() {
        let kind = directive.kind();
        for argument in directive.arguments() {
            let target = argument.text();
            if target.contains("${") {
                continue;
            }
            let path = match kind {
                DirectiveKind::Inherit => snapshot.class(&target).and_then(|class| class.file_path()),
                DirectiveKind::Include | DirectiveKind::Require => {
                    resolve_file(&target, snapshot, document_dir.as_deref())
                }
            };
            match path.and_then(|p| Url::from_file_path(p).ok()) {
                Some(dependency) if &dependency != uri => {
                    resolved.insert(dependency);
                }
                Some(_) => {}
                None => debug!(keyword = kind.keyword(), %target, "unresolved directive target"),
            }
        }
    }
    resolved.into_iter().collect()
}

fn resolve_file(target: &str, snapshot: &ProjectSnapshot, document_dir: Option<&Path>) -> Option<PathBuf> {
    snapshot
        .files_ending_with(target)
        .find_map(|element| element.file_path())
        .or_else(|| {
            let candidate = document_dir?.join(target);
            candidate.is_file().then_some(candidate)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{AstNode, parse};
    use crate::project::{ElementInfo, LayerInfo};
    use std::fs;
    use tempfile::TempDir;

    fn recipe(text: &str) -> Recipe {
        Recipe::cast(parse(text).syntax()).expect("recipe root")
    }

    fn snapshot() -> ProjectSnapshot {
        let layer = LayerInfo {
            name: "core".to_string(),
            path: "/poky/meta".to_string(),
            priority: 5,
        };
        ProjectSnapshot {
            layers: vec![layer.clone()],
            classes: vec![ElementInfo::from_file(Path::new("/poky/meta/classes/autotools.bbclass"), &layer)],
            includes: vec![ElementInfo::from_file(
                Path::new("/poky/meta/recipes-core/busybox/busybox.inc"),
                &layer,
            )],
            ..ProjectSnapshot::default()
        }
    }

    #[test]
    fn test_classes_and_includes_from_snapshot() {
        let uri = Url::parse("file:///work/foo.bb").expect("valid uri");
        let deps = resolve_dependencies(
            &recipe("inherit autotools\nrequire recipes-core/busybox/busybox.inc\ninherit autotools missing\n"),
            &uri,
            &snapshot(),
        );
        assert_eq!(
            deps,
            vec![
                Url::parse("file:///poky/meta/classes/autotools.bbclass").expect("valid uri"),
                Url::parse("file:///poky/meta/recipes-core/busybox/busybox.inc").expect("valid uri"),
            ]
        );
    }

    #[test]
    fn test_include_next_to_document() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("common.inc"), "A = \"1\"\n").expect("write");
        let uri = Url::from_file_path(dir.path().join("foo.bb")).expect("file uri");

        let deps = resolve_dependencies(
            &recipe("include common.inc\ninclude absent.inc\ninclude ${BPN}.inc\n"),
            &uri,
            &ProjectSnapshot::default(),
        );
        assert_eq!(deps, vec![Url::from_file_path(dir.path().join("common.inc")).expect("file uri")]);
    }
}
