//! End-to-end resolution over a realistic on-disk layout, plus the
//! intentional asymmetry between the deps file (one bad line invalidates
//! everything) and the servicing index (a bad line is merely skipped).

use probehost_resolver::{
    DependencyCatalog, HostPaths, ResolverError, ServicingIndex, resolve_probe_paths,
    servicing::INDEX_FILE_NAME,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const NEWTONSOFT_LINE: &str = r#""Package","Newtonsoft.Json","9.0.1","abc123","runtime","Newtonsoft.Json","lib/netstandard1.3/Newtonsoft.Json.dll""#;

struct Layout {
    root: TempDir,
    app_dir: PathBuf,
    cache_root: PathBuf,
    runtime_dir: PathBuf,
}

impl Layout {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let app_dir = root.path().join("app");
        let cache_root = root.path().join("packages");
        let runtime_dir = root.path().join("runtime");
        for dir in [&app_dir, &cache_root, &runtime_dir] {
            fs::create_dir_all(dir).unwrap();
        }
        Self {
            root,
            app_dir,
            cache_root,
            runtime_dir,
        }
    }

    fn write(&self, relative: &str) -> PathBuf {
        let path = self.root.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"").unwrap();
        path
    }

    fn host_paths(&self) -> HostPaths {
        HostPaths {
            app_dir: self.app_dir.clone(),
            package_cache_root: Some(self.cache_root.clone()),
            runtime_dir: self.runtime_dir.clone(),
        }
    }

    fn deps_path(&self) -> PathBuf {
        self.app_dir.join("app.deps")
    }
}

#[test]
fn newtonsoft_scenario_resolves_from_package_cache() {
    let layout = Layout::new();
    let cached =
        layout.write("packages/Newtonsoft.Json/9.0.1/lib/netstandard1.3/Newtonsoft.Json.dll");
    fs::write(layout.deps_path(), format!("{NEWTONSOFT_LINE}\n")).unwrap();

    let catalog = DependencyCatalog::load(&layout.deps_path()).unwrap();
    let servicing = ServicingIndex::new(None);
    let probe = resolve_probe_paths(&catalog, &servicing, &layout.host_paths());

    assert_eq!(
        probe.managed,
        vec![layout.runtime_dir.join("mscorlib.dll"), cached]
    );
    assert_eq!(
        probe.native,
        vec![layout.app_dir.clone(), layout.runtime_dir.clone()]
    );
    assert_eq!(probe.culture, vec![layout.app_dir.clone()]);
}

#[test]
fn app_local_binaries_without_catalog_entries_are_trusted() {
    let layout = Layout::new();
    let local = layout.write("app/Helper.dll");

    let catalog = DependencyCatalog::load(&layout.deps_path()).unwrap();
    let servicing = ServicingIndex::new(None);
    let probe = resolve_probe_paths(&catalog, &servicing, &layout.host_paths());

    assert_eq!(
        probe.managed,
        vec![layout.runtime_dir.join("mscorlib.dll"), local]
    );
}

#[test]
fn full_precedence_chain_over_one_asset() {
    let layout = Layout::new();
    let patch_root = layout.root.path().join("servicing");
    fs::create_dir_all(&patch_root).unwrap();

    let local = layout.write("app/Newtonsoft.Json.dll");
    let cached =
        layout.write("packages/Newtonsoft.Json/9.0.1/lib/netstandard1.3/Newtonsoft.Json.dll");
    let patched = layout.write("servicing/patches/Newtonsoft.Json.dll");
    fs::write(layout.deps_path(), format!("{NEWTONSOFT_LINE}\n")).unwrap();

    let catalog = DependencyCatalog::load(&layout.deps_path()).unwrap();
    let host_paths = layout.host_paths();

    // All three sources present: servicing wins.
    fs::write(
        patch_root.join(INDEX_FILE_NAME),
        "package|Newtonsoft.Json|9.0.1|lib/netstandard1.3/Newtonsoft.Json.dll=patches/Newtonsoft.Json.dll\n",
    )
    .unwrap();
    let servicing = ServicingIndex::new(Some(patch_root.clone()));
    let probe = resolve_probe_paths(&catalog, &servicing, &host_paths);
    assert_eq!(probe.managed[1], patched);

    // No servicing: the local deployment wins over the cache.
    let servicing = ServicingIndex::new(None);
    let probe = resolve_probe_paths(&catalog, &servicing, &host_paths);
    assert_eq!(probe.managed[1], local);

    // No local file either: the cache is used.
    fs::remove_file(&local).unwrap();
    let probe = resolve_probe_paths(&catalog, &servicing, &host_paths);
    assert_eq!(probe.managed[1], cached);

    // Nowhere at all: the asset is dropped without an error.
    fs::remove_file(&cached).unwrap();
    let probe = resolve_probe_paths(&catalog, &servicing, &host_paths);
    assert_eq!(probe.managed, vec![layout.runtime_dir.join("mscorlib.dll")]);
}

// The deps file and the servicing index deliberately do NOT share a
// malformed-line policy: a corrupt application manifest is unsafe to trust,
// a corrupt serviceability hint is safe to ignore.
#[test]
fn malformed_deps_line_fails_the_whole_catalog() {
    let layout = Layout::new();
    fs::write(
        layout.deps_path(),
        format!("{NEWTONSOFT_LINE}\nthis is not a record\n"),
    )
    .unwrap();

    let err = DependencyCatalog::load(&layout.deps_path()).unwrap_err();
    assert!(matches!(err, ResolverError::MalformedRecord { line: 2, .. }));
}

#[test]
fn malformed_servicing_line_only_loses_that_line() {
    let layout = Layout::new();
    let patch_root = layout.root.path().join("servicing");
    fs::create_dir_all(&patch_root).unwrap();
    layout.write("servicing/patches/Newtonsoft.Json.dll");

    fs::write(
        patch_root.join(INDEX_FILE_NAME),
        "package|broken\npackage|Newtonsoft.Json|9.0.1|lib/netstandard1.3/Newtonsoft.Json.dll=patches/Newtonsoft.Json.dll\n",
    )
    .unwrap();

    let servicing = ServicingIndex::new(Some(patch_root));
    let target = servicing
        .find_redirection(
            "Newtonsoft.Json",
            "9.0.1",
            "lib/netstandard1.3/Newtonsoft.Json.dll",
        )
        .unwrap();
    assert!(target.ends_with(Path::new("patches/Newtonsoft.Json.dll")));
}

#[test]
fn missing_inputs_degrade_to_empty_contributions() {
    let layout = Layout::new();

    // No deps file at all.
    let catalog = DependencyCatalog::load(&layout.deps_path()).unwrap();
    assert!(catalog.is_empty());

    // No servicing root, no package cache.
    let servicing = ServicingIndex::new(None);
    let paths = HostPaths {
        package_cache_root: None,
        ..layout.host_paths()
    };

    let probe = resolve_probe_paths(&catalog, &servicing, &paths);
    assert_eq!(probe.managed.len(), 1);
    assert_eq!(probe.native, vec![layout.app_dir.clone(), layout.runtime_dir.clone()]);
    assert_eq!(probe.culture, vec![layout.app_dir.clone()]);
}
