//! Completion through the analysis host.

use std::path::Path;
use std::sync::Arc;

use bitbake_ls::Position;
use bitbake_ls::ide::docs::VARIABLE_FLAGS;
use bitbake_ls::ide::{AnalysisHost, CompletionKind};
use bitbake_ls::project::{ElementInfo, LayerInfo, ProjectSnapshot};

use crate::helpers::fixtures::RECIPE;
use crate::helpers::host_helpers::{file_uri, host_with, labels};

fn snapshot() -> ProjectSnapshot {
    let layer = LayerInfo {
        name: "meta".to_string(),
        path: "/work/meta".to_string(),
        priority: 5,
    };
    ProjectSnapshot {
        classes: vec![ElementInfo::from_file(Path::new("/work/meta/classes/autotools.bbclass"), &layer)],
        overrides: vec!["linux".to_string(), "pn-defaultpkgname".to_string()],
        ..ProjectSnapshot::default()
    }
}

#[test]
fn test_nothing_on_empty_line() {
    let (host, uri) = host_with("/work/demo_1.0.bb", RECIPE);
    assert!(host.analysis().completions(&uri, Position::new(4, 0)).is_empty());
}

#[test]
fn test_nothing_inside_plain_strings() {
    let (host, uri) = host_with("/work/demo_1.0.bb", RECIPE);
    assert!(host.analysis().completions(&uri, Position::new(0, 13)).is_empty());
}

#[test]
fn test_overrides_after_colon() {
    let (mut host, uri) = host_with("/work/demo_1.0.bb", "DEPENDS:\n");
    host.set_snapshot(Arc::new(snapshot()));
    let items = host.analysis().completions(&uri, Position::new(0, 8));
    assert_eq!(labels(&items), vec!["append", "prepend", "remove", "linux", "${PN}"]);
    assert_eq!(items[0].kind, CompletionKind::Operator);
}

#[test]
fn test_flags_after_bracket() {
    let (host, uri) = host_with("/work/demo_1.0.bb", "PACKAGECONFIG[\n");
    let items = host.analysis().completions(&uri, Position::new(0, 14));
    assert_eq!(items.len(), VARIABLE_FLAGS.len());
    assert!(labels(&items).contains(&"nostamp"));
}

#[test]
fn test_inherit_lists_classes() {
    let (mut host, uri) = host_with("/work/demo_1.0.bb", "inherit \n");
    host.set_snapshot(Arc::new(snapshot()));
    let items = host.analysis().completions(&uri, Position::new(0, 8));
    assert_eq!(labels(&items), vec!["autotools"]);
    assert_eq!(items[0].kind, CompletionKind::Class);
}

#[test]
fn test_declarations_of_inherited_class() {
    let mut host = AnalysisHost::new();
    host.set_snapshot(Arc::new(snapshot()));
    let recipe = file_uri("/work/meta/recipes-demo/demo/demo_1.0.bb");
    let class = file_uri("/work/meta/classes/autotools.bbclass");
    host.analyze(&recipe, "inherit autotools\nMY_OPTS = \"1\"\nA\n", 1, true);
    assert_eq!(host.pop_pending_dependency(), Some(class.clone()));
    host.analyze(&class, "AUTOTOOLS_SCRIPT_PATH ?= \"${S}\"\n", 0, false);

    let items = host.analysis().completions(&recipe, Position::new(2, 1));
    let labels = labels(&items);
    assert!(labels.contains(&"inherit"));
    assert!(labels.contains(&"MY_OPTS"));

    let inherited = items
        .iter()
        .find(|item| item.label.as_ref() == "AUTOTOOLS_SCRIPT_PATH")
        .expect("class declaration offered");
    assert_eq!(inherited.kind, CompletionKind::Variable);
    assert_eq!(inherited.detail.as_deref(), Some("../../../classes/autotools.bbclass"));
}
