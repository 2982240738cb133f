use clap::{Parser, ValueEnum};
use probehost_resolver::{
    DependencyCatalog, HostPaths, ProbePaths, ServicingIndex, locations, resolve_probe_paths,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "probehost",
    version,
    about = "Resolve the probe paths a managed application would start with",
    long_about = "Computes the three path lists the runtime engine is handed at startup: \
                  the trusted managed assembly list, the native library search directories \
                  and the culture/resource roots. Assets are merged from the app directory, \
                  the versioned package cache and the servicing patch index, in that order \
                  of precedence (servicing first)."
)]
pub struct Cli {
    /// Path to the managed application assembly
    #[arg(value_name = "APP")]
    pub app: PathBuf,

    /// Application base directory (defaults to the directory containing APP)
    #[arg(short = 'a', long = "app-base", value_name = "PATH")]
    pub app_base: Option<PathBuf>,

    /// Directory containing the runtime engine (skips the default search)
    #[arg(
        short = 'c',
        long = "clr-path",
        value_name = "PATH",
        env = "PROBEHOST_CLR_PATH"
    )]
    pub clr_path: Option<PathBuf>,

    /// Package cache root (defaults to DOTNET_PACKAGES or ~/.nuget/packages)
    #[arg(long, value_name = "PATH")]
    pub packages: Option<PathBuf>,

    /// Servicing patch root directory
    #[arg(
        long = "servicing-root",
        value_name = "PATH",
        env = "DOTNET_RUNTIME_SERVICING"
    )]
    pub servicing_root: Option<PathBuf>,

    /// Deps file to load (defaults to the .deps file next to APP)
    #[arg(long, value_name = "PATH")]
    pub deps: Option<PathBuf>,

    /// Trace level (0 = errors only, 1 = warnings, 2 = info, 3 = verbose)
    #[arg(short = 't', long = "trace", value_name = "LEVEL", env = "PROBEHOST_TRACE")]
    pub trace: Option<u8>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: Format,
}

#[derive(Copy, Clone, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.trace);

    let app_dir = match &cli.app_base {
        Some(dir) => dir.clone(),
        None => cli
            .app
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf(),
    };

    let deps_path = cli
        .deps
        .clone()
        .unwrap_or_else(|| locations::deps_file_path(&cli.app));
    let catalog = DependencyCatalog::load(&deps_path)?;

    let servicing = ServicingIndex::new(cli.servicing_root.clone());

    let runtime_dir = match cli.clr_path {
        Some(dir) => dir,
        None => {
            let home_dir = std::env::var_os("DOTNET_HOME")
                .map(PathBuf::from)
                .or_else(dirs::home_dir);
            locations::resolve_runtime_dir(
                cli.servicing_root.as_deref(),
                &app_dir,
                home_dir.as_deref(),
            )
            .ok_or("could not resolve the runtime engine directory")?
        }
    };
    info!(runtime_dir = %runtime_dir.display(), "resolved runtime directory");

    let package_cache_root = cli.packages.or_else(locations::default_package_cache);
    let paths = HostPaths {
        app_dir,
        package_cache_root,
        runtime_dir,
    };

    let probe = resolve_probe_paths(&catalog, &servicing, &paths);

    match cli.format {
        Format::Text => print_text(&probe),
        Format::Json => println!("{}", serde_json::to_string_pretty(&probe)?),
    }

    Ok(())
}

/// Property names mirror what the runtime binding expects.
fn print_text(probe: &ProbePaths) {
    println!("TRUSTED_PLATFORM_ASSEMBLIES={}", probe.managed_joined());
    println!("NATIVE_DLL_SEARCH_DIRECTORIES={}", probe.native_joined());
    println!("PLATFORM_RESOURCE_ROOTS={}", probe.culture_joined());
}

fn init_tracing(level: Option<u8>) {
    let filter = match level {
        Some(0) => EnvFilter::new("error"),
        Some(1) => EnvFilter::new("warn"),
        Some(2) => EnvFilter::new("info"),
        Some(_) => EnvFilter::new("debug"),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
