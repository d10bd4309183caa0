//! Recipe environment dumps recorded per recipe.

use bitbake_ls::analyzer::Analyzer;

use crate::helpers::host_helpers::file_uri;

const DUMP: &str = "#\n# $DEPENDS [2 operations]\n#   set demo_1.0.bb:8\nDEPENDS=\"zlib\"\nexport PKG_CONFIG=\"pkg-config\"\nS=\"/build/work/demo-1.0\"\nDEPENDS=\"zlib virtual/libc\"\n";

#[test]
fn test_latest_assignment_wins() {
    let mut analyzer = Analyzer::new();
    analyzer.process_recipe_scan_results(&file_uri("/work/demo_1.0.bb"), "demo", DUMP);

    let result = analyzer.last_scan_result("demo").expect("recorded");
    assert_eq!(result.value("DEPENDS"), Some("zlib virtual/libc"));
    assert_eq!(result.value("PKG_CONFIG"), Some("pkg-config"));
    assert_eq!(result.value("CFLAGS"), None);
    assert!(analyzer.last_scan_result("other").is_none());
}

#[test]
fn test_results_are_replaced_and_removed() {
    let mut analyzer = Analyzer::new();
    let uri = file_uri("/work/demo_1.0.bb");
    analyzer.process_recipe_scan_results(&uri, "demo", DUMP);
    analyzer.process_recipe_scan_results(&uri, "demo", "S=\"/elsewhere\"\n");

    let result = analyzer.last_scan_result("demo").expect("recorded");
    assert_eq!(result.value("S"), Some("/elsewhere"));
    assert_eq!(result.value("DEPENDS"), None);

    analyzer.remove_last_scan_result("demo");
    assert!(analyzer.last_scan_result("demo").is_none());
    // Removing twice is harmless.
    analyzer.remove_last_scan_result("demo");
}
