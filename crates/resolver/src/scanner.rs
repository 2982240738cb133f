//! Local assembly scanner.
//!
//! Maps the logical names of binaries deployed next to the application to
//! their absolute paths. Native-image binaries shadow their IL
//! counterparts, which is why the suffix passes run in precedence order.

use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Recognized managed binary suffixes, highest precedence first.
const MANAGED_SUFFIXES: [&str; 4] = [".ni.dll", ".dll", ".ni.exe", ".exe"];

/// Name -> absolute path map of app-local binaries, first-seen-wins.
#[derive(Debug, Default)]
pub struct LocalAssemblies {
    entries: IndexMap<String, PathBuf>,
}

impl LocalAssemblies {
    /// Lists `app_dir` (no recursion) and builds the map. File names are
    /// sorted first so scan order is deterministic. An unreadable
    /// directory degrades to an empty map.
    pub fn scan(app_dir: &Path) -> Self {
        let mut names: Vec<String> = match fs::read_dir(app_dir) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
                .filter_map(|entry| entry.file_name().into_string().ok())
                .collect(),
            Err(err) => {
                debug!(dir = %app_dir.display(), %err, "cannot list application directory");
                return Self::default();
            }
        };
        names.sort();

        let mut entries = IndexMap::new();
        for suffix in MANAGED_SUFFIXES {
            for file in &names {
                let Some(name) = strip_suffix_ignore_case(file, suffix) else {
                    continue;
                };
                if name.is_empty() || entries.contains_key(name) {
                    continue;
                }
                let path = app_dir.join(file);
                debug!(name, path = %path.display(), "local assembly");
                entries.insert(name.to_string(), path);
            }
        }

        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.entries.get(name).map(PathBuf::as_path)
    }

    /// Entries in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Case-insensitive literal suffix match; the file name must be strictly
/// longer than the suffix.
fn strip_suffix_ignore_case<'a>(file: &'a str, suffix: &str) -> Option<&'a str> {
    if file.len() <= suffix.len() || !file.is_char_boundary(file.len() - suffix.len()) {
        return None;
    }
    let (name, tail) = file.split_at(file.len() - suffix.len());
    tail.eq_ignore_ascii_case(suffix).then_some(name)
}
