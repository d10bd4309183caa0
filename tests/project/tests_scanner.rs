//! Scanner tests driven by a scripted BitBake.

use std::sync::Arc;

use bitbake_ls::base::Position;
use bitbake_ls::ide::AnalysisHost;
use bitbake_ls::project::{ProjectScanner, ScanEvent};
use url::Url;

use crate::helpers::fixtures::{RECIPE, demo_layer, layers_output};
use crate::helpers::host_helpers::labels;
use crate::helpers::runner::ScriptedRunner;

fn demo_runner(layer: &std::path::Path) -> ScriptedRunner {
    ScriptedRunner::default()
        .respond("bitbake-layers show-layers", layers_output(layer))
        .respond(
            "bitbake-layers show-recipes",
            "=== Available recipes: ===\ndemo:\n  meta-demo            1.0\n",
        )
        .respond(
            "bitbake-layers show-appends",
            "=== Matched appended recipes ===\n\ndemo_1.0.bb:\n  /other/demo_%.bbappend\n  /other/demo_1.0.bbappend\n  /other/demo_2.0.bbappend\n",
        )
        .respond(
            "bitbake-getvar OVERRIDES",
            "OVERRIDES=\"linux:class-target:pn-defaultpkgname\"\n",
        )
}

// =============================================================================
// PIPELINE
// =============================================================================

#[tokio::test]
async fn test_scanned_project_feeds_analysis() {
    let dir = demo_layer();
    let layer = dir.path().join("meta-demo");
    let scanner = ProjectScanner::new(Some(demo_runner(&layer)));

    scanner.rescan().await;

    let snapshot = scanner.snapshot();
    assert_eq!(snapshot.layers.len(), 1);
    assert_eq!(snapshot.classes.len(), 1);
    assert_eq!(snapshot.includes.len(), 1);
    let demo = snapshot.recipe("demo").expect("demo recipe");
    let appends: Vec<&str> = demo.appends.iter().flatten().map(|a| a.base.as_str()).collect();
    assert_eq!(appends, vec!["demo_%.bbappend", "demo_1.0.bbappend"]);

    let mut host = AnalysisHost::new();
    host.set_snapshot(Arc::clone(&snapshot));
    let recipe_path = layer.join("recipes-demo/demo/demo_1.0.bb");
    let uri = Url::from_file_path(&recipe_path).expect("file uri");
    host.analyze(&uri, RECIPE, 1, true);

    // `inherit autotools` is the only directive, so the class is queued once.
    let class_uri = Url::from_file_path(layer.join("classes/autotools.bbclass")).expect("file uri");
    assert_eq!(host.pop_pending_dependency(), Some(class_uri.clone()));
    assert_eq!(host.pop_pending_dependency(), None);

    let analysis = host.analysis();
    let targets = analysis.goto_definition(&uri, Position::new(5, 10));
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].uri, class_uri);
}

#[tokio::test]
async fn test_override_completion_uses_scanned_overrides() {
    let dir = demo_layer();
    let layer = dir.path().join("meta-demo");
    let scanner = ProjectScanner::new(Some(demo_runner(&layer)));
    scanner.rescan().await;

    let mut host = AnalysisHost::new();
    host.set_snapshot(scanner.snapshot());
    let uri = Url::parse("file:///work/foo.bb").expect("valid uri");
    host.analyze(&uri, "FOO:\n", 1, true);

    let items = host.analysis().completions(&uri, Position::new(0, 4));
    assert_eq!(
        labels(&items),
        vec!["append", "prepend", "remove", "linux", "class-target", "${PN}"]
    );
}

// =============================================================================
// RUN COALESCING
// =============================================================================

#[tokio::test]
async fn test_requests_during_a_run_cause_exactly_one_more_run() {
    let dir = demo_layer();
    let runner = demo_runner(&dir.path().join("meta-demo")).suspending();
    let scanner = ProjectScanner::new(Some(runner));
    let mut events = scanner.subscribe();

    tokio::join!(scanner.rescan(), async {
        scanner.rescan().await;
        scanner.rescan().await;
        scanner.rescan().await;
    });

    let runner = scanner.runner().expect("runner");
    assert_eq!(runner.calls("bitbake-layers show-layers"), 2);
    assert_eq!(runner.calls("bitbake-getvar OVERRIDES"), 2);
    assert!(!scanner.is_running());

    let ready = std::iter::from_fn(|| events.try_recv().ok())
        .filter(|event| matches!(event, ScanEvent::Ready(_)))
        .count();
    assert_eq!(ready, 2);
}

// =============================================================================
// FAILURES
// =============================================================================

#[tokio::test]
async fn test_broken_appends_phase_publishes_empty_snapshot() {
    let dir = demo_layer();
    let runner = demo_runner(&dir.path().join("meta-demo")).broken("bitbake-layers show-appends");
    let scanner = ProjectScanner::new(Some(runner));
    let mut watch = scanner.watch();

    scanner.rescan().await;

    assert!(watch.has_changed().expect("scanner alive"));
    assert!(watch.borrow_and_update().is_empty());
    let runner = scanner.runner().expect("runner");
    assert_eq!(runner.calls("bitbake-getvar OVERRIDES"), 0);
}

#[tokio::test]
async fn test_failed_command_only_empties_its_category() {
    let dir = demo_layer();
    let layer = dir.path().join("meta-demo");
    let runner = ScriptedRunner::default()
        .respond("bitbake-layers show-layers", layers_output(&layer))
        .respond(
            "bitbake-layers show-recipes",
            "=== Available recipes: ===\ndemo:\n  meta-demo            1.0\n",
        );
    let scanner = ProjectScanner::new(Some(runner));

    scanner.rescan().await;

    let snapshot = scanner.snapshot();
    assert_eq!(snapshot.recipes.len(), 1);
    assert!(snapshot.overrides.is_empty());
    assert!(snapshot.recipe("demo").is_some_and(|r| r.appends.is_none()));
}
