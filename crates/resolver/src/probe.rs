//! Probe-path builder.
//!
//! Merges the dependency catalog, the servicing redirection index, the
//! app-local binaries and the well-known installation directories into the
//! three ordered path lists handed to the runtime binding: trusted managed
//! assemblies, native library search directories, and culture/resource
//! roots. The builder itself never fails; a source that cannot contribute
//! simply contributes nothing.

use crate::catalog::DependencyCatalog;
use crate::record::{AssetRecord, AssetType, LibraryType};
use crate::scanner::LocalAssemblies;
use crate::servicing::ServicingIndex;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the runtime's own core library; it always heads the
/// managed list.
pub const RUNTIME_CORE_ASSEMBLY: &str = "mscorlib";
pub const RUNTIME_CORE_FILE: &str = "mscorlib.dll";

#[cfg(windows)]
const LIST_SEPARATOR: char = ';';
#[cfg(not(windows))]
const LIST_SEPARATOR: char = ':';

/// Directory layout the resolution runs against. Built once by the
/// orchestrator; no process-wide state.
#[derive(Debug, Clone)]
pub struct HostPaths {
    /// Directory the application is deployed in.
    pub app_dir: PathBuf,
    /// Versioned package cache root; `None` disables cache lookups.
    pub package_cache_root: Option<PathBuf>,
    /// Directory the runtime engine is installed in.
    pub runtime_dir: PathBuf,
}

/// The three final outputs, ordered and deduplicated. Immutable once built.
#[derive(Debug, Default, Serialize)]
pub struct ProbePaths {
    /// Full file paths of trusted managed assemblies, unique by asset name.
    pub managed: Vec<PathBuf>,
    /// Native library search directories, unique by path.
    pub native: Vec<PathBuf>,
    /// Culture/resource root directories, unique by path.
    pub culture: Vec<PathBuf>,
}

impl ProbePaths {
    pub fn managed_joined(&self) -> String {
        join_paths(&self.managed)
    }

    pub fn native_joined(&self) -> String {
        join_paths(&self.native)
    }

    pub fn culture_joined(&self) -> String {
        join_paths(&self.culture)
    }
}

/// Joins entries with the platform path-list separator.
fn join_paths(paths: &[PathBuf]) -> String {
    let entries: Vec<_> = paths.iter().map(|p| p.to_string_lossy()).collect();
    entries.join(&LIST_SEPARATOR.to_string())
}

/// Runs all three list builders. The catalog and index are borrowed
/// read-only; only the transient dedup sets and output buffers are owned
/// here.
pub fn resolve_probe_paths(
    catalog: &DependencyCatalog,
    servicing: &ServicingIndex,
    paths: &HostPaths,
) -> ProbePaths {
    ProbePaths {
        managed: managed_list(catalog, servicing, paths),
        native: native_dirs(catalog, servicing, paths),
        culture: culture_dirs(catalog, servicing, paths),
    }
}

/// Trusted managed assembly list, deduplicated by asset name.
///
/// Source precedence per catalog entry: servicing redirection, then the
/// app-local deployment, then the package cache. An asset found nowhere is
/// silently dropped. Local binaries with no catalog entry are appended at
/// the end in scan order.
fn managed_list(
    catalog: &DependencyCatalog,
    servicing: &ServicingIndex,
    paths: &HostPaths,
) -> Vec<PathBuf> {
    let locals = LocalAssemblies::scan(&paths.app_dir);

    let mut seen = HashSet::new();
    let mut list = Vec::new();

    add_managed(
        RUNTIME_CORE_ASSEMBLY,
        paths.runtime_dir.join(RUNTIME_CORE_FILE),
        &mut seen,
        &mut list,
    );

    for record in catalog.records() {
        if record.asset_type != AssetType::Runtime || seen.contains(&record.asset_name) {
            continue;
        }

        if record.library_type == LibraryType::Package {
            if let Some(target) = servicing.find_redirection(
                &record.library_name,
                &record.library_version,
                &record.relative_path,
            ) {
                add_managed(&record.asset_name, target, &mut seen, &mut list);
                continue;
            }
        }

        if let Some(local) = locals.get(&record.asset_name) {
            add_managed(&record.asset_name, local.to_path_buf(), &mut seen, &mut list);
        } else if let Some(candidate) = cache_candidate(record, paths) {
            add_managed(&record.asset_name, candidate, &mut seen, &mut list);
        } else {
            debug!(asset = %record.asset_name, "asset not found in any source, dropped");
        }
    }

    for (name, path) in locals.iter() {
        add_managed(name, path.to_path_buf(), &mut seen, &mut list);
    }

    list
}

/// Native library search directories.
///
/// Serviced native assets come first, then the app directory, then the
/// package-cache directories of cataloged native assets, and the runtime
/// directory last.
fn native_dirs(
    catalog: &DependencyCatalog,
    servicing: &ServicingIndex,
    paths: &HostPaths,
) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut dirs = Vec::new();

    for record in catalog.records() {
        if record.asset_type != AssetType::Native || record.library_type != LibraryType::Package {
            continue;
        }
        if let Some(target) = servicing.find_redirection(
            &record.library_name,
            &record.library_version,
            &record.relative_path,
        ) {
            if let Some(dir) = target.parent() {
                add_dir("native", dir.to_path_buf(), &mut seen, &mut dirs);
            }
        }
    }

    add_dir("native", paths.app_dir.clone(), &mut seen, &mut dirs);

    for record in catalog.records() {
        if record.asset_type != AssetType::Native {
            continue;
        }
        if let Some(candidate) = cache_candidate(record, paths) {
            if let Some(dir) = candidate.parent() {
                add_dir("native", dir.to_path_buf(), &mut seen, &mut dirs);
            }
        }
    }

    add_dir("native", paths.runtime_dir.clone(), &mut seen, &mut dirs);

    dirs
}

/// Culture/resource root directories. Satellite assemblies live two levels
/// under the asset path (`<culture-dir>/<satellite>`), hence the
/// grandparent of a redirected file.
fn culture_dirs(
    catalog: &DependencyCatalog,
    servicing: &ServicingIndex,
    paths: &HostPaths,
) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut dirs = Vec::new();

    for record in catalog.records() {
        if record.asset_type != AssetType::Culture || record.library_type != LibraryType::Package {
            continue;
        }
        if let Some(target) = servicing.find_redirection(
            &record.library_name,
            &record.library_version,
            &record.relative_path,
        ) {
            if let Some(root) = target.parent().and_then(Path::parent) {
                add_dir("culture", root.to_path_buf(), &mut seen, &mut dirs);
            }
        }
    }

    add_dir("culture", paths.app_dir.clone(), &mut seen, &mut dirs);

    dirs
}

fn cache_candidate(record: &AssetRecord, paths: &HostPaths) -> Option<PathBuf> {
    let root = paths.package_cache_root.as_deref()?;
    let candidate = record.cache_path(root);
    candidate.exists().then_some(candidate)
}

fn add_managed(name: &str, path: PathBuf, seen: &mut HashSet<String>, list: &mut Vec<PathBuf>) {
    if seen.contains(name) {
        return;
    }
    debug!(name, path = %path.display(), "adding managed assembly");
    seen.insert(name.to_string());
    list.push(path);
}

fn add_dir(kind: &str, dir: PathBuf, seen: &mut HashSet<PathBuf>, dirs: &mut Vec<PathBuf>) {
    if seen.contains(&dir) {
        return;
    }
    debug!(kind, dir = %dir.display(), "adding search directory");
    seen.insert(dir.clone());
    dirs.push(dir);
}
