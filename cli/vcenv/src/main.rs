//! vcenv: reconstruct Microsoft Visual C++ build environments without
//! `vcvarsall.bat`.

mod commands;
mod config;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use vcenv_core::{HostEnv, VcVersion};

use commands::Session;
use config::VcenvConfig;

#[derive(Parser)]
#[command(name = "vcenv", version, about = "Standalone Visual C++ build environments")]
struct Cli {
    /// Read the registry from a TOML snapshot instead of the host
    #[arg(long, global = true)]
    registry_snapshot: Option<PathBuf>,
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print INCLUDE, LIB, LIBPATH and PATH for a toolchain
    Env {
        /// Architecture spec (e.g., x86, amd64, x86_amd64)
        #[arg(long)]
        arch: Option<String>,
        /// Visual C++ version (newest installed if omitted)
        #[arg(long)]
        vc_version: Option<VcVersion>,
        /// Reject toolchains older than this version
        #[arg(long)]
        min_version: Option<VcVersion>,
        /// Output format (shell, json)
        #[arg(long, default_value = "shell")]
        format: String,
    },
    /// List registered Visual C++ versions
    Versions,
    /// Show every component directory considered for a toolchain
    Describe {
        /// Architecture spec (e.g., x86, amd64, x86_amd64)
        #[arg(long)]
        arch: Option<String>,
        /// Visual C++ version (newest installed if omitted)
        #[arg(long)]
        vc_version: Option<VcVersion>,
    },
    /// Locate vcvarsall.bat of the Visual C++ Compiler for Python
    Vcvarsall {
        /// Visual C++ version
        #[arg(long)]
        vc_version: VcVersion,
    },
    /// Manage registry snapshots
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },
}

#[derive(Subcommand)]
enum SnapshotAction {
    /// Validate a snapshot file
    Validate {
        /// Snapshot path
        file: PathBuf,
    },
    /// Print a template snapshot
    Template,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Env {
            arch,
            vc_version,
            min_version,
            format,
        } => {
            let session = load_session(&cwd, cli.registry_snapshot)?;
            commands::env::run(&session, arch.as_deref(), vc_version, min_version, &format)
        }

        Commands::Versions => {
            let session = load_session(&cwd, cli.registry_snapshot)?;
            commands::versions::run(&session)
        }

        Commands::Describe { arch, vc_version } => {
            let session = load_session(&cwd, cli.registry_snapshot)?;
            commands::describe::run(&session, arch.as_deref(), vc_version)
        }

        Commands::Vcvarsall { vc_version } => {
            let session = load_session(&cwd, cli.registry_snapshot)?;
            commands::vcvarsall::run(&session, vc_version)
        }

        Commands::Snapshot { action } => match action {
            SnapshotAction::Validate { file } => commands::snapshot::validate(&file),
            SnapshotAction::Template => commands::snapshot::template(),
        },
    }
}

/// Combine `vcenv.toml` (if any), the process environment and the
/// `--registry-snapshot` flag.
fn load_session(cwd: &Path, registry_snapshot: Option<PathBuf>) -> anyhow::Result<Session> {
    let (config, config_dir) = match VcenvConfig::find_and_load(cwd)? {
        Some((config, dir)) => {
            debug!(dir = %dir.display(), "loaded vcenv.toml");
            (config, dir)
        }
        None => (VcenvConfig::default(), cwd.to_path_buf()),
    };

    let host = config.apply_host(HostEnv::from_process());
    let snapshot = registry_snapshot
        .map(|p| cwd.join(p))
        .or_else(|| config.snapshot_path(&config_dir));
    Ok(Session {
        host,
        snapshot,
        defaults: config.toolchain,
    })
}
