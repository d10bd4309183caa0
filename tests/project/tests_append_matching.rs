//! Append overlay version matching.

use bitbake_ls::project::output::{append_version_matches, recipe_identity};
use rstest::rstest;

#[rstest]
#[case("busybox_%.bbappend", "1.36.1", true)]
#[case("busybox_1.%.bbappend", "1.36.1", false)]
#[case("busybox_1.36.bbappend", "1.36.1", true)]
#[case("busybox_1.36.1.bbappend", "1.36.1", true)]
#[case("busybox_2.0.bbappend", "1.36.1", false)]
#[case("busybox.bbappend", "1.36.1", true)]
fn test_overlay_applies_to_recipe(#[case] file_name: &str, #[case] recipe_version: &str, #[case] expected: bool) {
    let (name, overlay_version) = recipe_identity(file_name);
    assert_eq!(name, "busybox");
    assert_eq!(
        append_version_matches(overlay_version.as_deref(), Some(recipe_version)),
        expected
    );
}

#[test]
fn test_versioned_overlay_needs_a_recipe_version() {
    assert!(!append_version_matches(Some("1.0"), None));
    assert!(append_version_matches(None, None));
}
