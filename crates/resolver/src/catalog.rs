use crate::error::{ResolverError, Result};
use crate::record::{AssetRecord, parse_record};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// The canonical, ordered list of assets the application declares.
///
/// Later builders depend on catalog order for tie-breaking: the first
/// eligible candidate for an asset name wins.
#[derive(Debug, Default)]
pub struct DependencyCatalog {
    records: Vec<AssetRecord>,
}

impl DependencyCatalog {
    /// Loads a deps file. A missing file is normal (an app with no
    /// dependencies) and yields an empty catalog; anything else that goes
    /// wrong invalidates the whole load. A malformed manifest is never
    /// partially trusted.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no deps file, using an empty catalog");
            return Ok(Self::default());
        }

        let file = File::open(path).map_err(|source| ResolverError::CatalogOpen {
            path: path.to_path_buf(),
            source,
        })?;

        let mut records = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let Some(record) = parse_record(&line) else {
                return Err(ResolverError::MalformedRecord {
                    path: path.to_path_buf(),
                    line: idx + 1,
                });
            };
            records.push(record);
        }

        debug!(path = %path.display(), count = records.len(), "loaded dependency catalog");
        Ok(Self { records })
    }

    pub fn records(&self) -> &[AssetRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
