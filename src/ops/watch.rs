//! `watch`: rebuild the affected assets when sources change.

use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};

use crate::core::error::AssetError;
use crate::core::manifest::Manifest;

/// Vendor library declaration next to the manifest; editing it rebuilds
/// everything.
pub const BOWER_JSON: &str = "bower.json";

/// Maps changed paths to the tasks that rebuild them.
#[derive(Debug, Clone)]
pub struct WatchRules {
    sources: Vec<PathBuf>,
    manifests: Vec<PathBuf>,
    bower: Vec<PathBuf>,
}

/// Work triggered by one debounced batch of changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchBatch {
    /// The manifest itself changed
    pub reload_manifest: bool,

    /// Tasks to run, in rule order
    pub tasks: Vec<&'static str>,
}

impl WatchBatch {
    pub fn is_empty(&self) -> bool {
        !self.reload_manifest && self.tasks.is_empty()
    }
}

impl WatchRules {
    pub fn new(manifest: &Manifest) -> Self {
        WatchRules {
            sources: with_canonical(manifest.source_dir()),
            manifests: with_canonical(manifest.path().to_path_buf()),
            bower: with_canonical(manifest.root().join(BOWER_JSON)),
        }
    }

    /// Tasks that rebuild `path`, if any.
    pub fn tasks_for(&self, path: &Path) -> &'static [&'static str] {
        let Some(rel) = self.sources.iter().find_map(|s| path.strip_prefix(s).ok()) else {
            return &[];
        };
        let first = rel
            .components()
            .next()
            .and_then(|c| c.as_os_str().to_str());

        match first {
            Some("styles") => &["sasslint", "styles"],
            Some("scripts") => &["jslint", "scripts"],
            Some("fonts") => &["fonts"],
            Some("images") => &["images"],
            Some("videos") => &["videos"],
            Some("favicons") => &["favicons"],
            Some("icons") => &["icons"],
            _ => &[],
        }
    }

    pub fn is_manifest(&self, path: &Path) -> bool {
        self.manifests.iter().any(|m| m == path)
    }

    pub fn is_bower(&self, path: &Path) -> bool {
        self.bower.iter().any(|b| b == path)
    }

    /// Combine the changes of one batch. A manifest or `bower.json`
    /// change rebuilds everything.
    pub fn batch<'p, I>(&self, paths: I) -> WatchBatch
    where
        I: IntoIterator<Item = &'p Path>,
    {
        let mut batch = WatchBatch::default();
        let mut rebuild_all = false;
        for path in paths {
            if self.is_manifest(path) {
                batch.reload_manifest = true;
                continue;
            }
            if self.is_bower(path) {
                rebuild_all = true;
                continue;
            }
            for &task in self.tasks_for(path) {
                if !batch.tasks.contains(&task) {
                    batch.tasks.push(task);
                }
            }
        }
        if batch.reload_manifest || rebuild_all {
            batch.tasks = vec!["build"];
        }
        batch
    }
}

/// Paths the watcher subscribes to for `manifest`: the source tree, plus
/// the manifest and `bower.json` when they live outside it.
pub fn watch_targets(manifest: &Manifest) -> Vec<(PathBuf, RecursiveMode)> {
    let source = manifest.source_dir();
    let mut targets = vec![(source.clone(), RecursiveMode::Recursive)];
    for file in [manifest.path().to_path_buf(), manifest.root().join(BOWER_JSON)] {
        if file.is_file() && !file.starts_with(&source) {
            targets.push((file, RecursiveMode::NonRecursive));
        }
    }
    targets
}

/// Move `watcher` from the `old` targets to the `new` ones. Targets present
/// in both are left alone.
pub fn rewatch<W>(
    watcher: &mut W,
    old: &[(PathBuf, RecursiveMode)],
    new: &[(PathBuf, RecursiveMode)],
) -> Result<(), AssetError>
where
    W: Watcher + ?Sized,
{
    for (path, _) in old.iter().filter(|t| !new.contains(t)) {
        if let Err(err) = watcher.unwatch(path) {
            tracing::debug!("failed to unwatch {}: {}", path.display(), err);
        }
    }
    for (path, mode) in new.iter().filter(|t| !old.contains(t)) {
        watcher.watch(path, *mode).map_err(|e| AssetError::io(path, e))?;
        tracing::debug!("watching {}", path.display());
    }
    Ok(())
}

fn with_canonical(path: PathBuf) -> Vec<PathBuf> {
    match path.canonicalize() {
        Ok(canonical) if canonical != path => vec![path, canonical],
        _ => vec![path],
    }
}

/// Watch the source tree until the channel closes.
///
/// `rebuild` receives the current manifest and the tasks to run. Its
/// errors are reported and watching continues. Builds never overlap:
/// changes made during a build are handled after it.
pub fn watch<F>(mut manifest: Manifest, debounce: Duration, mut rebuild: F) -> Result<(), AssetError>
where
    F: FnMut(&Manifest, &[&str]) -> Result<(), AssetError>,
{
    let source = manifest.source_dir();
    if !source.is_dir() {
        return Err(AssetError::config_at(
            manifest.path(),
            format!("source directory not found: {}", source.display()),
        ));
    }

    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(debounce, tx)
        .map_err(|e| AssetError::io(&source, format!("failed to start watcher: {}", e)))?;
    let mut targets = watch_targets(&manifest);
    rewatch(debouncer.watcher(), &[], &targets)?;

    match manifest.dev_url() {
        Some(url) => tracing::info!("proxying {}", url),
        None => tracing::warn!("`config.devUrl` is not set; live reload has no origin to proxy"),
    }
    tracing::info!("watching {} for changes", source.display());

    let mut rules = WatchRules::new(&manifest);

    for result in rx {
        let events = match result {
            Ok(events) => events,
            Err(err) => {
                tracing::warn!("watch error: {:?}", err);
                continue;
            }
        };

        let batch = rules.batch(
            events
                .iter()
                .filter(|e| matches!(e.kind, DebouncedEventKind::Any))
                .map(|e| e.path.as_path()),
        );
        if batch.is_empty() {
            continue;
        }

        if batch.reload_manifest {
            match Manifest::load(manifest.path(), manifest.root()) {
                Ok(reloaded) => {
                    tracing::info!("manifest changed, reloaded");
                    let next = watch_targets(&reloaded);
                    if let Err(err) = rewatch(debouncer.watcher(), &targets, &next) {
                        tracing::error!("{}", err);
                    }
                    if reloaded.source_dir() != manifest.source_dir() {
                        tracing::info!("watching {} for changes", reloaded.source_dir().display());
                    }
                    targets = next;
                    manifest = reloaded;
                    rules = WatchRules::new(&manifest);
                }
                Err(err) => {
                    tracing::error!("{}", err);
                    continue;
                }
            }
        }

        let start = Instant::now();
        tracing::info!("change detected, running {}", batch.tasks.join(", "));
        match rebuild(&manifest, &batch.tasks) {
            Ok(()) => tracing::info!(
                "rebuilt in {:.2}s, waiting for changes",
                start.elapsed().as_secs_f64()
            ),
            Err(err) => tracing::error!("{}", err),
        }
    }

    Ok(())
}
