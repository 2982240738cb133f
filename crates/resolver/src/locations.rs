//! Well-known host locations: the deps file next to the application, the
//! default package cache, and the runtime installation directory.

use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment override for the package cache root.
pub const PACKAGES_ENV: &str = "DOTNET_PACKAGES";

/// Platform file name of the runtime engine's native library.
#[cfg(windows)]
pub const RUNTIME_LIBRARY: &str = "coreclr.dll";
#[cfg(target_os = "macos")]
pub const RUNTIME_LIBRARY: &str = "libcoreclr.dylib";
#[cfg(all(unix, not(target_os = "macos")))]
pub const RUNTIME_LIBRARY: &str = "libcoreclr.so";

const RUNTIME_SUBDIR: [&str; 2] = ["runtime", "coreclr"];

/// The deps file sits next to the managed application, named after it:
/// `<app>.deps`.
pub fn deps_file_path(app_path: &Path) -> PathBuf {
    app_path.with_extension("deps")
}

/// `DOTNET_PACKAGES` if set and non-empty, else `~/.nuget/packages`.
pub fn default_package_cache() -> Option<PathBuf> {
    if let Ok(dir) = env::var(PACKAGES_ENV) {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    dirs::home_dir().map(|home| home.join(".nuget").join("packages"))
}

pub fn runtime_exists_in(dir: &Path) -> bool {
    dir.join(RUNTIME_LIBRARY).exists()
}

/// Probes for the runtime engine in priority order: the servicing root,
/// the application directory, then the home installation. Non-app
/// candidates are expected to keep the runtime under `runtime/coreclr`.
pub fn resolve_runtime_dir(
    servicing_root: Option<&Path>,
    app_dir: &Path,
    home_dir: Option<&Path>,
) -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(root) = servicing_root {
        candidates.push(root.join(RUNTIME_SUBDIR[0]).join(RUNTIME_SUBDIR[1]));
    }
    candidates.push(app_dir.to_path_buf());
    if let Some(home) = home_dir {
        candidates.push(home.join(RUNTIME_SUBDIR[0]).join(RUNTIME_SUBDIR[1]));
    }

    for dir in candidates {
        if runtime_exists_in(&dir) {
            debug!(dir = %dir.display(), "runtime located");
            return Some(dir);
        }
    }
    None
}
