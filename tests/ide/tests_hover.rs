//! Hover with documentation scanned from a docs checkout.

use std::fs;
use std::path::Path;

use bitbake_ls::Position;
use bitbake_ls::ide::{DocScanner, DocSource};

use crate::helpers::fixtures::RECIPE;
use crate::helpers::host_helpers::host_with;

const BITBAKE_GLOSSARY: &str = "\
.. glossary::

   :term:`SUMMARY`
      BitBake summary text.

   :term:`LICENSE`
      BitBake license text.
";

const YOCTO_GLOSSARY: &str = "\
.. glossary::

   :term:`SUMMARY`
      A short summary for the recipe,
      which is 72 characters or less.
";

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, text).expect("write");
}

fn docs() -> DocScanner {
    let dir = tempfile::tempdir().expect("tempdir");
    write(
        dir.path(),
        "bitbake/doc/bitbake-user-manual/bitbake-user-manual-ref-variables.rst",
        BITBAKE_GLOSSARY,
    );
    write(dir.path(), "documentation/ref-manual/variables.rst", YOCTO_GLOSSARY);
    DocScanner::scan(dir.path())
}

#[test]
fn test_yocto_entry_shadows_bitbake_entry() {
    let (mut host, uri) = host_with("/work/demo_1.0.bb", RECIPE);
    host.set_docs(docs());

    let result = host.analysis().hover(&uri, Position::new(0, 3)).expect("documented");
    assert_eq!(
        result.contents,
        "**SUMMARY**\n___\nA short summary for the recipe, which is 72 characters or less."
    );
    assert_eq!(result.span.start, Position::new(0, 0));
    assert_eq!(result.span.end, Position::new(0, 7));
    assert_eq!(
        host.docs().variable_info("SUMMARY").map(|info| info.source),
        Some(DocSource::Yocto)
    );
}

#[test]
fn test_bitbake_entry_without_yocto_entry() {
    let (mut host, uri) = host_with("/work/demo_1.0.bb", RECIPE);
    host.set_docs(docs());
    let result = host.analysis().hover(&uri, Position::new(1, 2)).expect("documented");
    assert_eq!(result.contents, "**LICENSE**\n___\nBitBake license text.");
}

#[test]
fn test_no_hover_without_documentation() {
    let (mut host, uri) = host_with("/work/demo_1.0.bb", RECIPE);
    assert!(host.analysis().hover(&uri, Position::new(0, 3)).is_none());

    host.set_docs(docs());
    // Declared but undocumented, then a value rather than a name.
    assert!(host.analysis().hover(&uri, Position::new(7, 2)).is_none());
    assert!(host.analysis().hover(&uri, Position::new(8, 28)).is_none());
}

#[test]
fn test_missing_docs_folder_leaves_tables_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let scanner = DocScanner::scan(&dir.path().join("absent"));
    assert_eq!(scanner.variables().count(), 0);
    assert!(scanner.yocto_tasks.is_empty());
}
