pub mod catalog;
pub mod error;
pub mod locations;
pub mod probe;
pub mod record;
pub mod scanner;
pub mod servicing;

pub use catalog::DependencyCatalog;
pub use error::{ResolverError, Result};
pub use probe::{HostPaths, ProbePaths, resolve_probe_paths};
pub use record::{AssetRecord, AssetType, LibraryType};
pub use scanner::LocalAssemblies;
pub use servicing::ServicingIndex;
