//! Project scanner: runs the BitBake introspection pipeline and publishes
//! the resulting [`ProjectSnapshot`].
//!
//! ## Run coalescing
//!
//! ```text
//! Idle ──rescan──▶ Running ──done──▶ Idle
//!                    │  ▲
//!              rescan│  │done, pending cleared, run again
//!                    ▼  │
//!               Running-Pending
//! ```
//!
//! Requests arriving while a run is in progress set a single pending flag.
//! When the run finishes with the flag set, exactly one more run starts.

use super::driver::CommandRunner;
use super::error::ScanError;
use super::output::{
    append_version_matches, parse_appends, parse_layers, parse_overrides, parse_recipe_file_paths,
    parse_recipes, recipe_identity,
};
use super::search::find_files_with_extension;
use super::snapshot::{ElementInfo, LayerInfo, PathInfo, ProjectSnapshot};
use parking_lot::{Mutex, RwLock};
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{broadcast, watch};
use tracing::{error, info, warn};

const CLASS_EXTENSION: &str = "bbclass";
const INCLUDE_EXTENSION: &str = "inc";
const RECIPE_EXTENSION: &str = "bb";

/// Notifications emitted by the scanner
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// A pipeline run started
    Started,
    /// A run finished, successfully or not; the snapshot may be empty
    Ready(Arc<ProjectSnapshot>),
    /// Scanning was requested without a configured driver
    ToolNotConfigured,
}

#[derive(Debug, Default)]
struct ScanStatus {
    running: bool,
    pending: bool,
}

/// Owns the scan state machine and the published snapshot
pub struct ProjectScanner<R> {
    runner: RwLock<Option<Arc<R>>>,
    status: Mutex<ScanStatus>,
    should_deep_examine: AtomicBool,
    not_configured_reported: AtomicBool,
    snapshot: watch::Sender<Arc<ProjectSnapshot>>,
    events: broadcast::Sender<ScanEvent>,
}

impl<R: CommandRunner> ProjectScanner<R> {
    pub fn new(runner: Option<R>) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(ProjectSnapshot::default()));
        let (events, _) = broadcast::channel(16);
        Self {
            runner: RwLock::new(runner.map(Arc::new)),
            status: Mutex::new(ScanStatus::default()),
            should_deep_examine: AtomicBool::new(false),
            not_configured_reported: AtomicBool::new(false),
            snapshot,
            events,
        }
    }

    /// Replace the driver, e.g. after a settings change
    pub fn set_runner(&self, runner: Option<R>) {
        *self.runner.write() = runner.map(Arc::new);
    }

    pub fn runner(&self) -> Option<Arc<R>> {
        self.runner.read().clone()
    }

    pub fn set_should_deep_examine(&self, value: bool) {
        self.should_deep_examine.store(value, Ordering::Relaxed);
    }

    /// The latest published snapshot
    pub fn snapshot(&self) -> Arc<ProjectSnapshot> {
        self.snapshot.borrow().clone()
    }

    /// Receiver that observes every published snapshot
    pub fn watch(&self) -> watch::Receiver<Arc<ProjectSnapshot>> {
        self.snapshot.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.events.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.status.lock().running
    }

    /// Allow the "not configured" event to be surfaced again
    pub fn reset_notifications(&self) {
        self.not_configured_reported.store(false, Ordering::Relaxed);
    }

    /// Replace the snapshot wholesale and notify subscribers.
    pub fn publish(&self, snapshot: ProjectSnapshot) -> Arc<ProjectSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.snapshot.send_replace(snapshot.clone());
        // No subscribers is fine.
        let _ = self.events.send(ScanEvent::Ready(snapshot.clone()));
        snapshot
    }

    /// Request a scan. Returns once every run this request caused is done;
    /// a request made while a run is in progress only marks it pending.
    pub async fn rescan(&self) {
        if !self.try_start() {
            info!("scan is already running, set the pending flag");
            return;
        }
        loop {
            self.run_pipeline().await;
            if !self.take_pending() {
                break;
            }
        }
    }

    /// Idle to Running; otherwise remember one pending request.
    fn try_start(&self) -> bool {
        let mut status = self.status.lock();
        if status.running {
            status.pending = true;
            return false;
        }
        status.running = true;
        true
    }

    /// Clear the pending flag if set, or go back to Idle.
    fn take_pending(&self) -> bool {
        let mut status = self.status.lock();
        if status.pending {
            status.pending = false;
            true
        } else {
            status.running = false;
            false
        }
    }

    async fn run_pipeline(&self) {
        info!("start project scan");
        let _ = self.events.send(ScanEvent::Started);

        let Some(runner) = self.runner() else {
            warn!(error = %ScanError::ToolNotConfigured, "project scan aborted");
            self.publish(ProjectSnapshot::default());
            if !self.not_configured_reported.swap(true, Ordering::Relaxed) {
                let _ = self.events.send(ScanEvent::ToolNotConfigured);
            }
            return;
        };

        let snapshot = match self.collect(runner.as_ref()).await {
            Ok(snapshot) => {
                info!(
                    layers = snapshot.layers.len(),
                    recipes = snapshot.recipes.len(),
                    includes = snapshot.includes.len(),
                    classes = snapshot.classes.len(),
                    overrides = snapshot.overrides.len(),
                    "scan ready"
                );
                snapshot
            }
            Err(err) => {
                error!(error = %err, "scanning of project is aborted");
                ProjectSnapshot::default()
            }
        };
        self.publish(snapshot);
    }

    /// The phases, in dependency order. Later phases read earlier results.
    async fn collect(&self, runner: &R) -> Result<ProjectSnapshot, ScanError> {
        let layers = scan_layers(runner).await?;
        let classes = search_elements(&layers, CLASS_EXTENSION, "classes").await?;
        let includes = search_elements(&layers, INCLUDE_EXTENSION, "includes").await?;
        let mut recipes = scan_recipes(runner, &layers).await?;
        self.scan_recipe_paths(runner, &layers, &mut recipes).await?;
        scan_appends(runner, &mut recipes).await?;
        let overrides = scan_overrides(runner).await?;

        Ok(ProjectSnapshot {
            layers,
            recipes,
            classes,
            includes,
            overrides,
        })
    }

    async fn scan_recipe_paths(
        &self,
        runner: &R,
        layers: &[LayerInfo],
        recipes: &mut [ElementInfo],
    ) -> Result<(), ScanError> {
        for file in search_elements(layers, RECIPE_EXTENSION, "recipe paths").await? {
            let (name, _) = recipe_identity(&file.name);
            if let Some(recipe) = recipes.iter_mut().find(|r| r.name == name) {
                recipe.path = file.path;
            }
        }

        if !self.should_deep_examine.load(Ordering::Relaxed) {
            return Ok(());
        }

        let missing: Vec<usize> = (0..recipes.len()).filter(|&i| recipes[i].path.is_none()).collect();
        info!("{} recipes must be examined more deeply", missing.len());
        for idx in missing {
            let command = format!("bitbake-layers show-recipes -f {}", recipes[idx].name);
            let Some(output) = command_output(runner, "recipe paths", &command).await? else {
                continue;
            };
            if let Some(path) = parse_recipe_file_paths(&output).last() {
                recipes[idx].path = Some(PathInfo::parse(path));
            }
        }
        Ok(())
    }
}

/// Run `command`. A non-zero exit is logged and reported as `None`; a
/// command that cannot run at all fails the pipeline.
async fn command_output<R: CommandRunner>(
    runner: &R,
    phase: &'static str,
    command: &str,
) -> Result<Option<String>, ScanError> {
    let output = runner
        .run(command)
        .await
        .map_err(|err| ScanError::pipeline(phase, err))?;
    if output.is_success() {
        return Ok(Some(output.stdout));
    }

    let failure = ScanError::PhaseFailure {
        phase,
        command: command.to_string(),
        status: output.status,
        stderr: output.stderr,
    };
    error!(error = %failure, "scan phase failed");
    Ok(None)
}

async fn scan_layers<R: CommandRunner>(runner: &R) -> Result<Vec<LayerInfo>, ScanError> {
    let output = command_output(runner, "layers", "bitbake-layers show-layers").await?;
    Ok(output.map(|o| parse_layers(&o)).unwrap_or_default())
}

async fn scan_recipes<R: CommandRunner>(
    runner: &R,
    layers: &[LayerInfo],
) -> Result<Vec<ElementInfo>, ScanError> {
    let output = command_output(runner, "recipes", "bitbake-layers show-recipes").await?;
    Ok(output.map(|o| parse_recipes(&o, layers)).unwrap_or_default())
}

async fn scan_appends<R: CommandRunner>(runner: &R, recipes: &mut [ElementInfo]) -> Result<(), ScanError> {
    let Some(output) = command_output(runner, "appends", "bitbake-layers show-appends").await? else {
        return Ok(());
    };

    for group in parse_appends(&output) {
        let (name, _) = recipe_identity(&group.recipe_file);
        let Some(recipe) = recipes.iter_mut().find(|r| r.name == name) else {
            continue;
        };
        let appends = recipe.appends.get_or_insert_with(Vec::new);
        for append in &group.appends {
            let path = Path::new(append);
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let (_, overlay_version) = recipe_identity(&file_name);
            if append_version_matches(overlay_version.as_deref(), recipe.version.as_deref()) {
                appends.push(PathInfo::parse(path));
            }
        }
    }
    Ok(())
}

async fn scan_overrides<R: CommandRunner>(runner: &R) -> Result<Vec<String>, ScanError> {
    let output = command_output(runner, "overrides", "bitbake-getvar OVERRIDES").await?;
    Ok(output.map(|o| parse_overrides(&o)).unwrap_or_default())
}

/// Files with `extension` in every layer, searched off the async thread.
async fn search_elements(
    layers: &[LayerInfo],
    extension: &'static str,
    phase: &'static str,
) -> Result<Vec<ElementInfo>, ScanError> {
    let layers = layers.to_vec();
    let found = tokio::task::spawn_blocking(move || -> io::Result<Vec<ElementInfo>> {
        let mut elements = Vec::new();
        for layer in &layers {
            let files = find_files_with_extension(Path::new(&layer.path), extension).inspect_err(|err| {
                error!(pattern = extension, layer = %layer.path, error = %err, "find error");
            })?;
            elements.extend(files.iter().map(|file| ElementInfo::from_file(file, layer)));
        }
        Ok(elements)
    })
    .await
    .map_err(|err| ScanError::pipeline(phase, io::Error::other(err)))?;

    found.map_err(|err| ScanError::pipeline(phase, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::driver::CommandOutput;
    use rustc_hash::FxHashMap;
    use std::fs;
    use tempfile::TempDir;

    /// Canned command results, recorded calls
    #[derive(Default)]
    struct FakeRunner {
        responses: FxHashMap<String, Result<CommandOutput, io::ErrorKind>>,
        calls: Mutex<Vec<String>>,
        yield_once: bool,
    }

    impl FakeRunner {
        fn respond(mut self, command: &str, output: CommandOutput) -> Self {
            self.responses.insert(command.to_string(), Ok(output));
            self
        }

        fn fail(mut self, command: &str) -> Self {
            self.responses.insert(command.to_string(), Err(io::ErrorKind::BrokenPipe));
            self
        }

        fn count(&self, command: &str) -> usize {
            self.calls.lock().iter().filter(|c| c.as_str() == command).count()
        }
    }

    impl CommandRunner for FakeRunner {
        async fn run(&self, command: &str) -> io::Result<CommandOutput> {
            self.calls.lock().push(command.to_string());
            if self.yield_once {
                tokio::task::yield_now().await;
            }
            match self.responses.get(command) {
                Some(Ok(output)) => Ok(output.clone()),
                Some(Err(kind)) => Err(io::Error::from(*kind)),
                None => Ok(CommandOutput::failure(1, "unknown command")),
            }
        }
    }

    fn project() -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        let layer = dir.path().join("meta-custom");
        fs::create_dir_all(layer.join("classes")).expect("mkdir");
        fs::create_dir_all(layer.join("recipes-core/busybox")).expect("mkdir");
        fs::write(layer.join("classes/custom.bbclass"), "").expect("write");
        fs::write(layer.join("recipes-core/busybox/busybox.inc"), "").expect("write");
        fs::write(layer.join("recipes-core/busybox/busybox_1.36.1.bb"), "").expect("write");
        dir
    }

    fn layers_output(dir: &TempDir) -> CommandOutput {
        CommandOutput::success(format!(
            "layer                 path                                      priority\n\
             ==========================================================================\n\
             meta-custom           {}                                        6\n",
            dir.path().join("meta-custom").display()
        ))
    }

    fn full_runner(dir: &TempDir) -> FakeRunner {
        FakeRunner::default()
            .respond("bitbake-layers show-layers", layers_output(dir))
            .respond(
                "bitbake-layers show-recipes",
                CommandOutput::success("=== Available recipes: ===\nbusybox:\n  meta-custom          1.36.1\n"),
            )
            .respond(
                "bitbake-layers show-appends",
                CommandOutput::success(
                    "=== Matched appended recipes ===\n\nbusybox_1.36.1.bb:\n  /l/busybox_%.bbappend\n  /l/busybox_2.0.bbappend\n",
                ),
            )
            .respond(
                "bitbake-getvar OVERRIDES",
                CommandOutput::success("OVERRIDES=\"linux:class-target\"\n"),
            )
    }

    #[tokio::test]
    async fn test_full_scan() {
        let dir = project();
        let scanner = ProjectScanner::new(Some(full_runner(&dir)));
        let mut events = scanner.subscribe();

        scanner.rescan().await;

        let snapshot = scanner.snapshot();
        assert_eq!(snapshot.layers.len(), 1);
        assert_eq!(snapshot.classes.len(), 1);
        assert_eq!(snapshot.classes[0].name, "custom");
        assert_eq!(snapshot.includes.len(), 1);
        assert_eq!(snapshot.overrides, vec!["linux", "class-target"]);

        let busybox = snapshot.recipe("busybox").expect("recipe");
        assert!(busybox.path.as_ref().is_some_and(|p| p.base == "busybox_1.36.1.bb"));
        let appends: Vec<_> = busybox
            .appends
            .iter()
            .flatten()
            .map(|a| a.base.as_str())
            .collect();
        assert_eq!(appends, vec!["busybox_%.bbappend"]);

        assert!(matches!(events.recv().await, Ok(ScanEvent::Started)));
        assert!(matches!(events.recv().await, Ok(ScanEvent::Ready(_))));
    }

    #[tokio::test]
    async fn test_failed_phase_leaves_category_empty() {
        let dir = project();
        let runner = full_runner(&dir).respond("bitbake-getvar OVERRIDES", CommandOutput::failure(1, "boom"));
        let scanner = ProjectScanner::new(Some(runner));

        scanner.rescan().await;

        let snapshot = scanner.snapshot();
        assert!(snapshot.overrides.is_empty());
        assert_eq!(snapshot.layers.len(), 1);
        assert_eq!(snapshot.recipes.len(), 1);
    }

    #[tokio::test]
    async fn test_pipeline_failure_resets_snapshot() {
        let dir = project();
        let scanner = ProjectScanner::new(Some(full_runner(&dir).fail("bitbake-layers show-appends")));
        let mut events = scanner.subscribe();

        scanner.rescan().await;

        assert!(scanner.snapshot().is_empty());
        assert!(matches!(events.recv().await, Ok(ScanEvent::Started)));
        match events.recv().await {
            Ok(ScanEvent::Ready(snapshot)) => assert!(snapshot.is_empty()),
            other => panic!("expected ready event, got {other:?}"),
        }
        let runner = scanner.runner().expect("runner");
        assert_eq!(runner.count("bitbake-getvar OVERRIDES"), 0);
    }

    #[tokio::test]
    async fn test_missing_driver_is_reported_once() {
        let scanner: ProjectScanner<FakeRunner> = ProjectScanner::new(None);
        let mut events = scanner.subscribe();

        scanner.rescan().await;
        scanner.rescan().await;

        let mut not_configured = 0;
        let mut ready = 0;
        while let Ok(event) = events.try_recv() {
            match event {
                ScanEvent::ToolNotConfigured => not_configured += 1,
                ScanEvent::Ready(snapshot) => {
                    assert!(snapshot.is_empty());
                    ready += 1;
                }
                ScanEvent::Started => {}
            }
        }
        assert_eq!(not_configured, 1);
        assert_eq!(ready, 2);

        scanner.reset_notifications();
        scanner.rescan().await;
        assert!(
            std::iter::from_fn(|| events.try_recv().ok())
                .any(|e| matches!(e, ScanEvent::ToolNotConfigured))
        );
    }

    #[tokio::test]
    async fn test_overlapping_requests_coalesce() {
        let dir = project();
        let runner = FakeRunner {
            yield_once: true,
            ..full_runner(&dir)
        };
        let scanner = ProjectScanner::new(Some(runner));

        tokio::join!(scanner.rescan(), async {
            // Both arrive while the first run is suspended in its first command.
            scanner.rescan().await;
            scanner.rescan().await;
        });

        let runner = scanner.runner().expect("runner");
        assert_eq!(runner.count("bitbake-layers show-layers"), 2);
        assert_eq!(runner.count("bitbake-getvar OVERRIDES"), 2);
        assert!(!scanner.is_running());
    }

    #[tokio::test]
    async fn test_deep_examine_fills_missing_paths() {
        let dir = project();
        let runner = full_runner(&dir)
            .respond(
                "bitbake-layers show-recipes",
                CommandOutput::success("zlib:\n  meta-custom          1.3\n"),
            )
            .respond(
                "bitbake-layers show-recipes -f zlib",
                CommandOutput::success("=== Available recipes: ===\n/poky/meta/recipes-core/zlib/zlib_1.3.bb\n"),
            );
        let scanner = ProjectScanner::new(Some(runner));
        scanner.set_should_deep_examine(true);

        scanner.rescan().await;

        let snapshot = scanner.snapshot();
        let zlib = snapshot.recipe("zlib").expect("recipe");
        assert_eq!(
            zlib.file_path(),
            Some(std::path::PathBuf::from("/poky/meta/recipes-core/zlib/zlib_1.3.bb"))
        );
    }
}
