//! Directive dependencies are queued once and drained oldest first.

use std::path::Path;
use std::sync::Arc;

use bitbake_ls::ide::AnalysisHost;
use bitbake_ls::project::{ElementInfo, LayerInfo, ProjectSnapshot};
use url::Url;

use crate::helpers::host_helpers::file_uri;

fn snapshot() -> ProjectSnapshot {
    let layer = LayerInfo {
        name: "meta".to_string(),
        path: "/poky/meta".to_string(),
        priority: 5,
    };
    ProjectSnapshot {
        layers: vec![layer.clone()],
        classes: vec![ElementInfo::from_file(Path::new("/poky/meta/classes/autotools.bbclass"), &layer)],
        includes: vec![ElementInfo::from_file(
            Path::new("/poky/meta/recipes-core/demo/demo.inc"),
            &layer,
        )],
        ..ProjectSnapshot::default()
    }
}

fn host() -> AnalysisHost {
    let mut host = AnalysisHost::new();
    host.set_snapshot(Arc::new(snapshot()));
    host
}

fn drain(host: &mut AnalysisHost) -> Vec<Url> {
    std::iter::from_fn(|| host.pop_pending_dependency()).collect()
}

#[test]
fn test_shared_dependency_is_queued_once() {
    let mut host = host();
    host.analyze(&file_uri("/work/a.bb"), "inherit autotools\n", 1, true);
    host.analyze(&file_uri("/work/b.bb"), "inherit autotools\nrequire demo.inc\n", 1, true);

    assert_eq!(
        drain(&mut host),
        vec![
            file_uri("/poky/meta/classes/autotools.bbclass"),
            file_uri("/poky/meta/recipes-core/demo/demo.inc"),
        ]
    );
    assert!(host.pop_pending_dependency().is_none());
}

#[test]
fn test_repeated_directives_queue_once() {
    let mut host = host();
    host.analyze(
        &file_uri("/work/a.bb"),
        "inherit autotools\nrequire demo.inc\ninherit autotools\ninclude demo.inc\n",
        1,
        true,
    );
    assert_eq!(drain(&mut host).len(), 2);
}

#[test]
fn test_analyzed_dependency_is_not_queued_again() {
    let mut host = host();
    let class = file_uri("/poky/meta/classes/autotools.bbclass");
    host.analyze(&file_uri("/work/a.bb"), "inherit autotools\n", 1, true);
    assert_eq!(drain(&mut host), vec![class.clone()]);

    // Loaded from disk, never forced.
    assert!(host.analyze(&class, "DEPENDS += \"autoconf\"\n", 0, false).is_some());
    assert!(host.analyze(&class, "DEPENDS += \"autoconf\"\n", 0, false).is_none());

    host.analyze(&file_uri("/work/c.bb"), "inherit autotools\n", 1, true);
    assert!(drain(&mut host).is_empty());
}

#[test]
fn test_unknown_targets_are_not_queued() {
    let mut host = host();
    host.analyze(&file_uri("/work/a.bb"), "inherit unknown\ninclude missing.inc\n", 1, true);
    assert!(drain(&mut host).is_empty());
}

#[test]
fn test_dependency_declarations_are_visible() {
    let mut host = host();
    let recipe = file_uri("/work/a.bb");
    let class = file_uri("/poky/meta/classes/autotools.bbclass");
    host.analyze(&recipe, "inherit autotools\n", 1, true);
    host.analyze(&class, "AUTOTOOLS_SCRIPT_PATH ?= \"${S}\"\n", 0, false);

    let analysis = host.analysis();
    let extra: Vec<&str> = analysis
        .analyzer()
        .extra_symbols_for_uri(&recipe)
        .into_iter()
        .map(|symbol| symbol.name.as_str())
        .collect();
    assert_eq!(extra, vec!["AUTOTOOLS_SCRIPT_PATH"]);
}
