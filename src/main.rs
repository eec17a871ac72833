//! tutorlint - Structural consistency checker for Markdown tutorials
//!
//! Reports examples without output, repeated titles, skipped heading levels
//! and unclosed code fences across a collection of tutorial documents.

use anyhow::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use tutorlint::cli::{self, Cli, Commands, OutputFormat};
use tutorlint::{CheckCache, Checker, LintConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Exit code for runs aborted by I/O, decoding or configuration errors
const EXIT_FATAL: u8 = 2;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Setup logging; stdout is reserved for the report
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Check(args) => {
            let config = cli::apply_overrides(cli::load_config(config_path)?, args.strict, args.jobs);
            let report = cli::check(config, &args.paths)?;
            cli::print_report(&report, cli.format)?;
            Ok(report.exit_code())
        }

        Commands::Toc(args) => {
            cli::toc(&args.path, cli.format)?;
            Ok(0)
        }

        Commands::Blocks(args) => {
            cli::blocks(&args.path, args.language.as_deref(), cli.format)?;
            Ok(0)
        }

        Commands::Config(args) => {
            cli::config(config_path, &args)?;
            Ok(0)
        }

        Commands::Watch(args) => {
            let config = cli::apply_overrides(cli::load_config(config_path)?, args.strict, None);
            run_watch(config, &args.paths, args.debounce, cli.format)?;
            Ok(0)
        }
    }
}

/// Run in watch mode
fn run_watch(
    config: LintConfig,
    paths: &[PathBuf],
    debounce_ms: u64,
    format: OutputFormat,
) -> Result<()> {
    use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
    use std::sync::mpsc::channel;
    use std::time::Duration;

    let checker = Checker::new(config);
    let filter = cli::WatchFilter::new(paths);
    let mut cache = CheckCache::new();

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(tx, Config::default())?;
    for path in paths {
        watcher.watch(path, RecursiveMode::Recursive)?;
    }

    eprintln!("Watching {} path(s) for changes. Press Ctrl+C to stop.", paths.len());
    check_once(&checker, paths, &mut cache, format);

    let debounce = Duration::from_millis(debounce_ms);

    while let Ok(event) = rx.recv() {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Watch error: {}", e);
                continue;
            }
        };

        if !event.paths.iter().any(|p| filter.is_relevant(checker.config(), p)) {
            continue;
        }

        // Debounce: wait until the burst of events settles
        while rx.recv_timeout(debounce).is_ok() {}

        tracing::info!("Changes detected, checking...");
        check_once(&checker, paths, &mut cache, format);
    }

    Ok(())
}

fn check_once(checker: &Checker, paths: &[PathBuf], cache: &mut CheckCache, format: OutputFormat) {
    match checker.check_cached(paths, cache) {
        Ok(report) => {
            if let Err(e) = cli::print_report(&report, format) {
                tracing::warn!("Failed to print report: {}", e);
            }
        }
        Err(e) => tracing::warn!("Check failed: {:#}", anyhow::Error::from(e)),
    }
}
