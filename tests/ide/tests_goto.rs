//! Go-to-definition through the analysis host.

use std::fs;

use bitbake_ls::ide::AnalysisHost;
use bitbake_ls::{Position, Span};
use url::Url;

use crate::helpers::fixtures::{RECIPE, demo_layer};
use crate::helpers::host_helpers::host_with;

#[test]
fn test_task_override_goes_to_task() {
    let (host, uri) = host_with("/work/demo_1.0.bb", RECIPE);
    let targets = host.analysis().goto_definition(&uri, Position::new(11, 3));
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].uri, uri);
    assert_eq!(targets[0].span.start, Position::new(11, 0));
}

#[test]
fn test_columns_after_astral_characters() {
    let text = "BAR = \"1\"\nBAZ = \"2\"\nFOO = \"\u{1F600}${BAR}${BAZ}\"\n";
    let (host, uri) = host_with("/work/demo_1.0.bb", text);

    // The emoji is two UTF-16 units, so column 14 sits right after `BAR`.
    let targets = host.analysis().goto_definition(&uri, Position::new(2, 14));
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].span.start, Position::new(0, 0));
}

#[test]
fn test_require_next_to_recipe() {
    let dir = demo_layer();
    let recipe = dir.path().join("meta-demo/recipes-demo/demo/demo_1.0.bb");
    let uri = Url::from_file_path(&recipe).expect("absolute path");
    let mut host = AnalysisHost::new();
    host.analyze(&uri, "require demo.inc\n", 1, true);

    let targets = host.analysis().goto_definition(&uri, Position::new(0, 10));
    assert_eq!(targets.len(), 1);
    assert!(targets[0].uri.path().ends_with("/recipes-demo/demo/demo.inc"));
    assert_eq!(targets[0].span, Span::file_start());
}

#[test]
fn test_local_source_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let recipe_dir = dir.path().join("demo");
    fs::create_dir_all(recipe_dir.join("files")).expect("mkdir");
    fs::write(recipe_dir.join("files/fix-build.patch"), "--- a\n+++ b\n").expect("write");
    let recipe = recipe_dir.join("demo_1.0.bb");
    fs::write(&recipe, RECIPE).expect("write");

    let uri = Url::from_file_path(&recipe).expect("absolute path");
    let mut host = AnalysisHost::new();
    host.analyze(&uri, RECIPE, 1, true);

    let targets = host.analysis().goto_definition(&uri, Position::new(3, 20));
    assert_eq!(targets.len(), 1);
    assert!(targets[0].uri.path().ends_with("/demo/files/fix-build.patch"));

    // A search root without the file finds nothing.
    let empty = tempfile::tempdir().expect("tempdir");
    host.set_source_search_root(Some(empty.path().to_path_buf()));
    assert!(host.analysis().goto_definition(&uri, Position::new(3, 20)).is_empty());
}

#[test]
fn test_unknown_names_have_no_definition() {
    let (host, uri) = host_with("/work/demo_1.0.bb", RECIPE);
    assert!(host.analysis().goto_definition(&uri, Position::new(7, 13)).is_empty());
}
