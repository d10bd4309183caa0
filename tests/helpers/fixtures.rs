//! Recipe sources and on-disk layers used across tests.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

pub const RECIPE: &str = r#"SUMMARY = "Demo recipe"
LICENSE = "MIT"
SRC_URI = "git://example.com/demo.git;branch=main \
           file://fix-build.patch"

inherit autotools

DEPENDS += "zlib"
EXTRA_OECONF = "--with-pn=${PN}"
PACKAGECONFIG = "${@bb.utils.filter('DISTRO_FEATURES', 'x11', d)}"

do_install:append() {
	install -d ${D}${bindir}
}

python do_check() {
    bb.note("checking")
}
"#;

/// Output of `bitbake-layers show-layers` for a single layer at `path`
pub fn layers_output(path: &Path) -> String {
    format!(
        "layer                 path                                      priority\n\
         ==========================================================================\n\
         meta-demo             {}                                        6\n",
        path.display()
    )
}

/// A layer with one class, one include and one recipe.
pub fn demo_layer() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let layer = dir.path().join("meta-demo");
    fs::create_dir_all(layer.join("classes")).expect("mkdir");
    fs::create_dir_all(layer.join("recipes-demo/demo")).expect("mkdir");
    fs::write(layer.join("classes/autotools.bbclass"), "AUTOTOOLS_SCRIPT_PATH ?= \"${S}\"\n").expect("write");
    fs::write(layer.join("recipes-demo/demo/demo.inc"), "DEMO_COMMON = \"1\"\n").expect("write");
    fs::write(layer.join("recipes-demo/demo/demo_1.0.bb"), RECIPE).expect("write");
    dir
}
