//! Servicing redirection index.
//!
//! A patch root directory may carry `dotnet_servicing_index.txt` mapping a
//! cataloged package asset to a replacement file under the patch root:
//!
//! `package|<name>|<version>|<relative_path>=<replacement_relative_path>`
//!
//! A corrupt serviceability hint is safe to ignore, so unlike the deps file
//! the index is parsed best-effort: bad lines are skipped, not fatal.

use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const INDEX_FILE_NAME: &str = "dotnet_servicing_index.txt";

const PACKAGE_PREFIX: &str = "package|";

#[derive(Debug)]
pub struct ServicingIndex {
    patch_root: Option<PathBuf>,
    index_file: Option<PathBuf>,
    redirections: OnceCell<HashMap<String, String>>,
}

impl ServicingIndex {
    /// An unset patch root or a missing index file yields an index that is
    /// "parsed, empty" from the start and never redirects.
    pub fn new(patch_root: Option<PathBuf>) -> Self {
        let index_file = patch_root
            .as_ref()
            .map(|root| root.join(INDEX_FILE_NAME))
            .filter(|file| file.exists());

        let redirections = OnceCell::new();
        if index_file.is_none() {
            let _ = redirections.set(HashMap::new());
        }

        Self {
            patch_root,
            index_file,
            redirections,
        }
    }

    /// Looks up a replacement for `(name, version, relative_path)`. The
    /// index file is parsed on the first call only.
    ///
    /// A hit only counts if the replacement file actually exists under the
    /// patch root; a stale entry pointing at a missing file is treated as
    /// no redirection at all.
    pub fn find_redirection(
        &self,
        name: &str,
        version: &str,
        relative_path: &str,
    ) -> Option<PathBuf> {
        let redirections = self.redirections.get_or_init(|| self.parse_index());
        if redirections.is_empty() {
            return None;
        }

        let key = format!("{name}|{version}|{relative_path}");
        let replacement = redirections.get(&key)?;
        let full_path = self.patch_root.as_ref()?.join(replacement);
        if full_path.exists() {
            debug!(asset = %key, target = %full_path.display(), "servicing redirection");
            Some(full_path)
        } else {
            debug!(asset = %key, target = %full_path.display(), "stale servicing entry, target missing");
            None
        }
    }

    fn parse_index(&self) -> HashMap<String, String> {
        let mut redirections = HashMap::new();
        let Some(index_file) = &self.index_file else {
            return redirections;
        };
        let Ok(content) = fs::read_to_string(index_file) else {
            warn!(path = %index_file.display(), "cannot read servicing index");
            return redirections;
        };

        for line in content.lines() {
            let Some(rest) = line.strip_prefix(PACKAGE_PREFIX) else {
                continue;
            };
            match parse_entry(rest) {
                Some((key, replacement)) => {
                    redirections.insert(key, replacement);
                }
                None => warn!(line, "bad line in servicing index, skipping"),
            }
        }

        debug!(
            path = %index_file.display(),
            count = redirections.len(),
            "parsed servicing index"
        );
        redirections
    }
}

/// Tokenizes `<name>|<version>|<relative_path>=<replacement>`.
fn parse_entry(rest: &str) -> Option<(String, String)> {
    let (name, rest) = rest.split_once('|')?;
    let (version, rest) = rest.split_once('|')?;
    let (relative_path, replacement) = rest.split_once('=')?;
    Some((
        format!("{name}|{version}|{relative_path}"),
        replacement.to_string(),
    ))
}
