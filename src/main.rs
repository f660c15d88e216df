//! modsurvey - main entry point
//!
//! Runs the survey wizard in the terminal, or one of the admin commands
//! (validate, submit, list, show, stats, export, catalog).

use std::fs;
use std::io::stdout;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use modsurvey::app::App;
use modsurvey::catalog::Catalog;
use modsurvey::cli::{Cli, Commands};
use modsurvey::config_file::{AppConfig, StoreConfig};
use modsurvey::dashboard::{self, OptionStats, ResponseQuery};
use modsurvey::export;
use modsurvey::response::parse_submission;
use modsurvey::rules::is_major;
use modsurvey::submission;
use modsurvey::types::{ExportFormat, OptionFilter, YearOfStudy};

/// Log filter used when `RUST_LOG` is not set
const DEFAULT_LOG_FILTER: &str = "modsurvey=info";

/// Log file written during the interactive wizard
const WIZARD_LOG_FILE: &str = "modsurvey.log";

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogTarget {
    Off,
    File,
    Stderr,
}

/// Admin commands log to stderr. The interactive wizard owns the terminal,
/// so it logs only when `RUST_LOG` is set, and then into a file.
fn log_target(interactive: bool, filter_from_env: bool) -> LogTarget {
    match (interactive, filter_from_env) {
        (true, false) => LogTarget::Off,
        (true, true) => LogTarget::File,
        (false, _) => LogTarget::Stderr,
    }
}

/// Initialize logging. The returned guard flushes [`WIZARD_LOG_FILE`] on drop.
fn init_logging(interactive: bool) -> Option<WorkerGuard> {
    let from_env = EnvFilter::try_from_default_env().ok();

    match log_target(interactive, from_env.is_some()) {
        LogTarget::Off => None,
        LogTarget::File => {
            let filter = from_env?;
            let appender = tracing_appender::rolling::never(".", WIZARD_LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        LogTarget::Stderr => {
            let filter = from_env.unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact()
                .init();
            None
        }
    }
}

/// Load the config file (or defaults) and apply the store flags
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from: {:?}", path);
            AppConfig::load_from_file(path)?
        }
        None => AppConfig::default(),
    };

    if let Some(path) = &cli.store_file {
        config.store = StoreConfig::File { path: path.clone() };
    }
    if let Some(url) = &cli.api_url {
        let timeout_secs = match config.store {
            StoreConfig::Api { timeout_secs, .. } => timeout_secs,
            StoreConfig::File { .. } => 10,
        };
        config.store = StoreConfig::Api {
            base_url: url.clone(),
            timeout_secs,
        };
    }

    config.validate().context("Invalid configuration")?;
    debug!(store = %config.store.describe(), "Configuration ready");
    Ok(config)
}

/// Main application entry point
fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let interactive = matches!(cli.command, None | Some(Commands::Survey));
    let _log_guard = init_logging(interactive);

    let config = load_config(&cli)?;
    let catalog = config.load_catalog()?;

    match cli.command {
        None | Some(Commands::Survey) => run_survey(&config, catalog)?,
        Some(Commands::Validate { form }) => run_validate(&form, &config, &catalog)?,
        Some(Commands::Submit { form }) => run_submit(&form, &config, &catalog)?,
        Some(Commands::List {
            option,
            year,
            search,
        }) => run_list(&config, option, year, search)?,
        Some(Commands::Show { id }) => run_show(&config, id)?,
        Some(Commands::Stats) => run_stats(&config)?,
        Some(Commands::Export {
            format,
            option,
            out_dir,
            base_name,
        }) => {
            let dir = out_dir.unwrap_or_else(|| config.export.dir.clone());
            let base = base_name.unwrap_or_else(|| config.export.base_name.clone());
            run_export(&config, format, option, &dir, &base)?
        }
        Some(Commands::Catalog) => print_catalog(&catalog),
    }

    Ok(())
}

/// Run the survey wizard in the terminal
fn run_survey(config: &AppConfig, catalog: Catalog) -> Result<()> {
    let store = config.store.open()?;
    let mut app = App::new(
        store,
        catalog,
        config.admission_policy(),
        config.store.describe(),
    );

    enable_raw_mode().context("Failed to enable raw mode")?;
    crossterm::execute!(stdout(), crossterm::terminal::EnterAlternateScreen)
        .context("Failed to enter alternate screen")?;

    let result = Terminal::new(CrosstermBackend::new(stdout()))
        .context("Failed to create terminal")
        .and_then(|mut terminal| app.run(&mut terminal));

    // Cleanup terminal (always attempt cleanup, even if app failed)
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(stdout(), crossterm::terminal::LeaveAlternateScreen);

    let submitted = app.state().submitted_count;
    if submitted > 0 {
        println!("✓ {} response(s) submitted", submitted);
    }
    result
}

fn read_form(path: &Path) -> Result<modsurvey::response::NewResponse> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read submission from {:?}", path))?;
    parse_submission(&content).with_context(|| format!("Failed to parse submission {:?}", path))
}

fn run_validate(path: &Path, config: &AppConfig, catalog: &Catalog) -> Result<()> {
    let payload = read_form(path)?;
    match submission::admit(&payload, catalog, config.admission_policy()) {
        Ok(valid) => {
            println!(
                "✓ Submission is valid: {} ({})",
                valid.selected_option(),
                valid.counts()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Submission rejected: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_submit(path: &Path, config: &AppConfig, catalog: &Catalog) -> Result<()> {
    let payload = read_form(path)?;
    let mut store = config.store.open()?;

    match submission::submit(store.as_mut(), &payload, catalog, config.admission_policy()) {
        Ok(stored) => {
            println!(
                "✓ Survey submitted successfully! Response #{} ({})",
                stored.id, stored.selected_option
            );
            Ok(())
        }
        Err(e) if e.is_recoverable() => {
            eprintln!("✗ Submission rejected: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            error!(error = %e, "Submission failed");
            Err(e.into())
        }
    }
}

fn print_stats(stats: &OptionStats) {
    println!(
        "Total: {}   Option 1: {}   Option 2: {}   Option 3: {}",
        stats.total, stats.option1, stats.option2, stats.option3
    );
}

fn run_list(
    config: &AppConfig,
    option: OptionFilter,
    year: Option<YearOfStudy>,
    search: Option<String>,
) -> Result<()> {
    let store = config.store.open()?;
    let all = store.list()?;

    let query = ResponseQuery {
        option,
        year,
        search,
    };
    let shown = query.apply(&all);

    if shown.is_empty() {
        println!("No responses found.");
    }
    for response in &shown {
        println!("{}", dashboard::summary_line(response));
    }
    println!();
    println!("Showing {} of {} response(s)", shown.len(), all.len());
    print_stats(&OptionStats::from_responses(&all));
    Ok(())
}

fn run_show(config: &AppConfig, id: u64) -> Result<()> {
    let store = config.store.open()?;
    let response = store.get(id)?;
    for line in dashboard::detail_lines(&response) {
        println!("{}", line);
    }
    Ok(())
}

fn run_stats(config: &AppConfig) -> Result<()> {
    let store = config.store.open()?;
    print_stats(&OptionStats::from_responses(&store.list()?));
    Ok(())
}

fn run_export(
    config: &AppConfig,
    format: ExportFormat,
    option: OptionFilter,
    dir: &Path,
    base: &str,
) -> Result<()> {
    let store = config.store.open()?;
    let responses = dashboard::filter(&store.list()?, option);
    let base_name = dashboard::export_base_name(base, option);

    info!(%format, filter = %option, rows = responses.len(), "Exporting responses");
    let file = export::export(format, &responses, &base_name, Utc::now().date_naive())?;
    let path = file.write_to(dir)?;

    println!(
        "✓ Exported {} response(s) to {}",
        responses.len(),
        path.display()
    );
    Ok(())
}

fn print_catalog(catalog: &Catalog) {
    for category in &catalog.categories {
        println!("Category {}: {}", category.number, category.title);
        for module in &category.modules {
            let kind = if is_major(module) { "major" } else { "sub" };
            println!("  [{:<5}] {}", kind, module);
        }
        println!();
    }
    println!("Software:");
    for name in &catalog.software {
        println!("  {}", name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wizard_never_logs_to_the_terminal() {
        assert_eq!(log_target(true, false), LogTarget::Off);
        assert_eq!(log_target(true, true), LogTarget::File);
    }

    #[test]
    fn test_admin_commands_log_to_stderr() {
        assert_eq!(log_target(false, false), LogTarget::Stderr);
        assert_eq!(log_target(false, true), LogTarget::Stderr);
    }
}
