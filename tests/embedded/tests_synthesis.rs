//! Views of a realistic recipe keep the recipe layout.

use bitbake_ls::embedded::EmbeddedLanguage;
use bitbake_ls::Position;
use rstest::rstest;

use crate::helpers::fixtures::RECIPE;
use crate::helpers::host_helpers::host_with;

fn view(language: EmbeddedLanguage) -> String {
    let (host, uri) = host_with("/work/demo_1.0.bb", RECIPE);
    host.analysis().embedded_text(&uri, language).expect("analyzed")
}

fn lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

#[test]
fn test_bash_view() {
    let text = view(EmbeddedLanguage::Bash);
    let lines = lines(&text);
    assert_eq!(lines.len(), RECIPE.lines().count());
    assert_eq!(lines[11], "do_install       () {");
    assert_eq!(lines[12], "\tinstall -d ${D}${bindir}");
    assert_eq!(lines[13], "}");
    for blank in [0, 2, 3, 5, 9, 15, 16] {
        assert!(lines[blank].trim().is_empty(), "line {blank} is {:?}", lines[blank]);
    }
}

#[test]
fn test_python_view() {
    let text = view(EmbeddedLanguage::Python);
    let lines = lines(&text);
    assert_eq!(lines.len(), RECIPE.lines().count() + 1);
    assert_eq!(lines[0], "import bb");
    assert_eq!(
        lines[10],
        "PACKAGECONFIG = f\"\"\"{  bb.utils.filter('DISTRO_FEATURES', 'x11', d)}\"\"\""
    );
    assert_eq!(lines[16], "def    do_check() :");
    assert_eq!(lines[17], "    bb.note(\"checking\")");
    for blank in [1, 3, 9, 12, 13] {
        assert!(lines[blank].trim().is_empty(), "line {blank} is {:?}", lines[blank]);
    }
}

#[test]
fn test_views_are_stable_across_hosts() {
    for language in EmbeddedLanguage::ALL {
        assert_eq!(view(language), view(language));
    }
}

#[rstest]
#[case::summary(0, 3, None)]
#[case::inline_python(9, 20, Some(EmbeddedLanguage::Python))]
#[case::expansion(8, 25, None)]
#[case::shell_header(11, 3, None)]
#[case::shell_body(12, 3, Some(EmbeddedLanguage::Bash))]
#[case::python_header(15, 8, None)]
#[case::python_body(16, 6, Some(EmbeddedLanguage::Python))]
fn test_language_at(#[case] line: u32, #[case] column: u32, #[case] expected: Option<EmbeddedLanguage>) {
    let (host, uri) = host_with("/work/demo_1.0.bb", RECIPE);
    assert_eq!(host.analysis().embedded_language_at(&uri, Position::new(line, column)), expected);
}
