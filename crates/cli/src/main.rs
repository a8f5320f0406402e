//! CLI entrypoint and subcommand orchestration.

mod config;
#[cfg(test)]
mod test_support;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use skills::SkillSelector;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use walkdir::WalkDir;

use crate::config::Settings;

/// Top-level command-line arguments for skillscope.
#[derive(Parser)]
#[command(name = "skillscope")]
#[command(about = "Resolve which skills a project imports", version)]
struct Cli {
    /// Path to settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable debug logging to ~/.skillscope/logs/debug.log
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Root config file (overrides the settings file)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Additional skill file or directory; repeat for several
    #[arg(short, long = "skill")]
    skills: Vec<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Print the resolved imports (default when no subcommand is given)
    Resolve {
        /// Emit the selection as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Report whether each path is imported; exits non-zero if any is not
    Check {
        /// Paths to test
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// List every file under a directory that is imported
    Scan {
        /// Directory to walk (defaults to the root config's directory)
        dir: Option<PathBuf>,
    },
}

/// Program entrypoint.
fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or(Commands::Resolve { json: false });

    // WorkerGuard must outlive main() so buffered file writes are flushed on exit.
    let _file_guard = init_tracing(&cli.log_level, cli.debug);

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(root) = cli.root {
        settings.resolver.root = root.to_string_lossy().to_string();
    }
    if !cli.skills.is_empty() {
        settings.resolver.skills = cli
            .skills
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect();
    }

    let reader = settings.resolver.config_reader();
    let selector = SkillSelector::load_with(
        &reader,
        settings.resolver.root_path(),
        settings.resolver.skill_paths(),
    )?;
    info!(
        root = %settings.resolver.root,
        imports = selector.imports().count(),
        "Skills resolved"
    );

    let mut out = std::io::stdout().lock();
    match command {
        Commands::Resolve { json } => {
            cmd_resolve(&selector, json, &mut out)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { paths } => {
            if cmd_check(&selector, &paths, &mut out)? {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Scan { dir } => {
            let dir = dir
                .or_else(|| selector.base_directory().map(Path::to_path_buf))
                .unwrap_or_else(|| PathBuf::from("."));
            cmd_scan(&selector, &dir, &mut out)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Installs console logging and, with `--debug`, a daily rolling log file.
fn init_tracing(
    log_level: &str,
    debug: bool,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    // Console logs go to stderr so stdout stays machine-readable.
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    if !debug {
        tracing_subscriber::registry().with(console).init();
        return None;
    }

    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let log_dir = PathBuf::from(home).join(".skillscope").join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let appender = tracing_appender::rolling::daily(&log_dir, "debug.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("debug"));
    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        log_dir = %log_dir.display(),
        "========== skillscope run start =========="
    );
    Some(guard)
}

/// Prints the selection as text or JSON.
fn cmd_resolve(selector: &SkillSelector, json: bool, out: &mut impl Write) -> anyhow::Result<()> {
    let selection = selector.selection();
    if json {
        serde_json::to_writer_pretty(&mut *out, &selection)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", selection.to_text())?;
    }
    Ok(())
}

/// Prints `imported` or `skipped` per path. Returns `true` when all are imported.
fn cmd_check(
    selector: &SkillSelector,
    paths: &[PathBuf],
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    let mut all_imported = true;
    for path in paths {
        let imported = selector.is_imported(path);
        all_imported &= imported;
        let verdict = if imported { "imported" } else { "skipped" };
        writeln!(out, "{verdict}\t{}", path.display())?;
    }
    Ok(all_imported)
}

/// Prints every regular file under `dir` that the selector imports, sorted.
fn cmd_scan(selector: &SkillSelector, dir: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let files = WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(error = %e, "Skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file());

    for entry in files {
        if selector.is_imported(entry.path()) {
            writeln!(out, "{}", entry.path().display())?;
        }
    }
    Ok(())
}
