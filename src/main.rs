use anyhow::Context;
use clap::{Parser, ValueEnum};
use colored::*;
use i18n_sync::config::{parse_bool_flag, parse_override_map};
use i18n_sync::{
    run_sync, FallbackPolicy, MarkdownFormatter, OverrideMode, PromptResolver, SyncRequest,
    SyncSummary,
};
use std::io;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// i18n Sync - Merge spreadsheet translations into locale catalogs
#[derive(Parser, Debug)]
#[command(name = "i18n-sync")]
#[command(author, version, about, long_about = None)]
#[command(help_template = "{name} {version}\n{about}\n\nUSAGE:\n    {usage}\n\n{all-args}")]
struct Cli {
    /// Spreadsheet with a `key` column, an `en` column and one column per language
    #[arg(value_name = "EXCEL_PATH")]
    excel_path: PathBuf,

    /// Directory holding the locale catalogs (searched recursively for the base file)
    #[arg(value_name = "LOCALE_DIR")]
    locale_dir: PathBuf,

    /// Write changes to disk (default is a dry run)
    #[arg(long)]
    write: bool,

    /// What new entries get in languages the spreadsheet left blank
    #[arg(long, default_value = "empty", value_parser = parse_fallback)]
    fallback: FallbackPolicy,

    /// Override handling: a (accept all), n (skip all), y (confirm each), s:1,3 (select)
    #[arg(long, value_name = "MODE")]
    override_mode: Option<String>,

    /// JSON object mapping locale codes to spreadsheet columns, e.g. '{"zh-hk":"zhtw"}'
    #[arg(long, value_name = "JSON")]
    override_map: Option<String>,

    /// Directory for backups taken before writing (default: next to each catalog)
    #[arg(long, value_name = "PATH")]
    backup_dir: Option<PathBuf>,

    /// Keep backups after a successful write
    #[arg(long)]
    keep_backups: bool,

    /// Delete the spreadsheet afterwards when it is a temporary export
    #[arg(long, default_value = "true", value_parser = parse_bool_flag, action = clap::ArgAction::Set)]
    cleanup_temp_excel: bool,

    /// Base locale to use when the directory has no English catalog
    #[arg(long, value_name = "LOCALE")]
    base_locale: Option<String>,

    /// Report format
    #[arg(long, value_enum, default_value = "markdown")]
    format: ReportFormat,

    /// Verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Markdown,
    Json,
}

fn parse_fallback(s: &str) -> Result<FallbackPolicy, String> {
    s.parse::<FallbackPolicy>().map_err(|e| e.to_string())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut request = SyncRequest::new(cli.excel_path, cli.locale_dir)
        .with_write(cli.write)
        .with_fallback(cli.fallback)
        .with_keep_backups(cli.keep_backups)
        .with_cleanup_temp_excel(cli.cleanup_temp_excel);

    if let Some(json) = &cli.override_map {
        let map = parse_override_map(json).context("invalid --override-map")?;
        request = request.with_override_map(map);
    }
    if let Some(mode) = &cli.override_mode {
        request = request.with_override_mode(OverrideMode::parse(mode));
    }
    if let Some(dir) = cli.backup_dir {
        request = request.with_backup_dir(dir);
    }
    if let Some(locale) = cli.base_locale {
        request = request.with_base_fallback(locale);
    }

    // Prompts go to stderr so the report on stdout stays parseable
    let mut prompt = PromptResolver::new(io::stdin().lock(), io::stderr());
    let summary = run_sync(request, &mut prompt)?;

    match cli.format {
        ReportFormat::Markdown => println!("{}", MarkdownFormatter::new().format(&summary.report)),
        ReportFormat::Json => println!("{}", summary.report.to_json()?),
    }
    print_notices(&summary, cli.write);
    Ok(())
}

fn print_notices(summary: &SyncSummary, write: bool) {
    if summary.resolution.used_fallback {
        eprintln!(
            "{} no English catalog found, using {} as base",
            "Note:".yellow().bold(),
            summary.resolution.selected.relative_path.cyan()
        );
    }
    if write && summary.report.write_blocked {
        eprintln!(
            "{} mapping conflicts detected, nothing was written. Fix the mapping with --override-map and re-run.",
            "Warning:".yellow().bold()
        );
    }
    for file in &summary.written {
        eprintln!("{} {}", "Updated".green(), file.display());
    }
    for backup in &summary.backups {
        eprintln!("{} {}", "Backup kept:".dimmed(), backup.display());
    }
}
