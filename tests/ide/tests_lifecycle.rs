//! Open, edit and close sequences as the client drives them.

use std::path::Path;
use std::sync::Arc;

use bitbake_ls::ide::AnalysisHost;
use bitbake_ls::project::{ElementInfo, LayerInfo, ProjectSnapshot};
use rstest::rstest;
use url::Url;

use crate::helpers::host_helpers::file_uri;

fn names(host: &AnalysisHost, uri: &Url) -> Vec<String> {
    host.analyzer()
        .global_declaration_symbols(uri)
        .iter()
        .map(|symbol| symbol.name.to_string())
        .collect()
}

fn host_with_class() -> AnalysisHost {
    let layer = LayerInfo {
        name: "meta".to_string(),
        path: "/poky/meta".to_string(),
        priority: 5,
    };
    let mut host = AnalysisHost::new();
    host.set_snapshot(Arc::new(ProjectSnapshot {
        layers: vec![layer.clone()],
        classes: vec![ElementInfo::from_file(Path::new("/poky/meta/classes/autotools.bbclass"), &layer)],
        ..ProjectSnapshot::default()
    }));
    host
}

#[test]
fn test_reopen_after_close_starts_a_new_version_history() {
    let mut host = AnalysisHost::new();
    let uri = file_uri("/work/demo.bb");
    host.analyze(&uri, "OLD = \"1\"\n", 5, true);
    host.close(&uri);

    assert!(host.analyze(&uri, "NEW = \"1\"\n", 1, true).is_some());
    assert_eq!(names(&host, &uri), vec!["NEW"]);
}

#[rstest]
#[case::same_version(3)]
#[case::newer_version(4)]
fn test_edit_to_empty_text_clears_symbols(#[case] version: i32) {
    let mut host = AnalysisHost::new();
    let uri = file_uri("/work/demo.bb");
    host.analyze(&uri, "FOO = \"1\"\n", 3, true);

    assert!(host.analyze(&uri, "", version, true).is_some());
    assert!(names(&host, &uri).is_empty());
}

#[test]
fn test_opened_document_replaces_dependency_from_disk() {
    let mut host = host_with_class();
    let recipe = file_uri("/work/demo.bb");
    host.analyze(&recipe, "inherit autotools\n", 1, true);

    let class = host.pop_pending_dependency().expect("class queued");
    assert!(host.analyze(&class, "ON_DISK = \"1\"\n", 0, false).is_some());
    assert!(host.analyze(&class, "ON_DISK = \"1\"\n", 0, false).is_none());

    assert!(host.analyze(&class, "IN_EDITOR = \"1\"\n", 0, true).is_some());
    assert_eq!(names(&host, &class), vec!["IN_EDITOR"]);
}

#[test]
fn test_closed_dependency_is_queued_again() {
    let mut host = host_with_class();
    let recipe = file_uri("/work/demo.bb");
    host.analyze(&recipe, "inherit autotools\n", 1, true);
    let class = host.pop_pending_dependency().expect("class queued");
    host.analyze(&class, "A = \"1\"\n", 0, false);

    host.analyze(&recipe, "inherit autotools\n", 2, true);
    assert!(host.pop_pending_dependency().is_none());

    host.close(&class);
    host.analyze(&recipe, "inherit autotools\n", 3, true);
    assert_eq!(host.pop_pending_dependency(), Some(class));
}

#[test]
fn test_stale_change_after_newer_one_is_dropped() {
    let mut host = AnalysisHost::new();
    let uri = file_uri("/work/demo.bb");
    host.analyze(&uri, "A = \"1\"\n", 4, true);

    assert!(host.analyze(&uri, "B = \"1\"\n", 3, true).is_none());
    assert_eq!(names(&host, &uri), vec!["A"]);
}
