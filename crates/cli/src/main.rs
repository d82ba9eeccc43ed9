//! # sheetpress-cli
//!
//! Command-line interface for converting Excel workbooks into PDF reports.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indexmap::IndexMap;
use sheetpress_pdf::{
    AssembledReport, ConvertOptions, Converter, LayoutConfig, Orientation, PageSize, PdfError,
    ReportConfig, SheetResult, SheetSelection, SheetStatus,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// sheetpress - Excel workbooks to printable PDF reports
#[derive(Parser, Debug)]
#[command(name = "sheetpress")]
#[command(author, version, about = "Convert Excel workbooks to PDF reports", long_about = None)]
struct Cli {
    /// Excel workbook to convert (.xlsx, .xlsm, .xls, .xlsb, .ods)
    #[arg(value_name = "EXCEL_FILE")]
    file: PathBuf,

    /// Output PDF file name
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Directory the PDF is written to
    #[arg(short = 'd', long = "output-dir", default_value = "output")]
    output_dir: PathBuf,

    /// Convert only these sheets
    #[arg(
        short = 's',
        long = "sheets",
        value_name = "NAME",
        num_args = 1..,
        conflicts_with = "proforma_only"
    )]
    sheets: Vec<String>,

    /// Convert only the proforma sheets
    #[arg(long = "proforma-only")]
    proforma_only: bool,

    /// With --proforma-only, convert every sheet when no proforma sheet exists
    #[arg(long = "fallback-all", requires = "proforma_only")]
    fallback_all: bool,

    /// Maximum rows per sheet (default 30, or 1000 with --proforma-only)
    #[arg(long = "max-rows")]
    max_rows: Option<usize>,

    /// Maximum columns per sheet (default 10, or 50 with --proforma-only)
    #[arg(long = "max-cols")]
    max_cols: Option<usize>,

    /// Leave out the per-sheet summaries
    #[arg(long = "no-summaries")]
    no_summaries: bool,

    /// Paper size
    #[arg(long = "page-size", value_enum)]
    page_size: Option<PageSizeArg>,

    /// Portrait pages instead of landscape
    #[arg(long = "portrait")]
    portrait: bool,

    /// JSON file with layout and render settings
    #[arg(long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// List the sheets in the workbook and exit
    #[arg(long = "list-sheets")]
    list_sheets: bool,

    /// Check that sheets exist and contain data, then exit
    #[arg(long = "validate")]
    validate: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Paper size choices on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum PageSizeArg {
    Letter,
    A4,
}

impl From<PageSizeArg> for PageSize {
    fn from(arg: PageSizeArg) -> Self {
        match arg {
            PageSizeArg::Letter => PageSize::Letter,
            PageSizeArg::A4 => PageSize::A4,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    if !cli.file.exists() {
        anyhow::bail!("Input file not found: {}", cli.file.display());
    }

    let mut converter = Converter::open(&cli.file, &cli.output_dir)
        .with_context(|| format!("Failed to open {}", cli.file.display()))?;

    if cli.list_sheets {
        list_sheets(&mut converter);
        return Ok(());
    }

    if cli.validate {
        let names = validation_targets(cli, &converter)?;
        return validate(&mut converter, &names);
    }

    let options = build_options(cli)?;
    tracing::info!(
        file = %cli.file.display(),
        max_rows = options.layout.max_rows_per_sheet,
        max_cols = options.layout.max_cols_per_sheet,
        "converting workbook"
    );
    let loaded = load_sheets(cli, &mut converter)?;
    let report = converter
        .convert(&loaded, &options)
        .context("Failed to create PDF")?;
    print_report(&report);
    Ok(())
}

/// Resolve layout and render settings: mode defaults, then the fields set
/// in the config file, then individual flags.
fn build_options(cli: &Cli) -> Result<ConvertOptions> {
    let mut config = if cli.proforma_only {
        ReportConfig {
            layout: LayoutConfig::proforma(),
            ..ReportConfig::default()
        }
    } else {
        ReportConfig::default()
    };

    if let Some(path) = &cli.config {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        config = config
            .merge_json(&json)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
    }

    if let Some(max_rows) = cli.max_rows {
        config.layout.max_rows_per_sheet = max_rows;
    }
    if let Some(max_cols) = cli.max_cols {
        config.layout.max_cols_per_sheet = max_cols;
    }
    if cli.no_summaries {
        config.layout.include_summaries = false;
    }
    if let Some(page_size) = cli.page_size {
        config.render.page_size = page_size.into();
    }
    if cli.portrait {
        config.render.orientation = Orientation::Portrait;
    }

    Ok(ConvertOptions {
        filename: cli.output.clone(),
        layout: config.layout,
        render: config.render,
    })
}

fn load_sheets(cli: &Cli, converter: &mut Converter) -> Result<IndexMap<String, SheetResult>> {
    if cli.proforma_only {
        return match converter.load(&SheetSelection::Proforma) {
            Err(PdfError::NoProformaSheetsFound { .. }) if cli.fallback_all => {
                println!(
                    "{}",
                    "No proforma sheets found, converting all sheets instead".yellow()
                );
                Ok(converter.load(&SheetSelection::All)?)
            }
            other => Ok(other?),
        };
    }

    let selection = if cli.sheets.is_empty() {
        SheetSelection::All
    } else {
        SheetSelection::Named(cli.sheets.clone())
    };
    Ok(converter.load(&selection)?)
}

fn list_sheets(converter: &mut Converter) {
    let names = converter.available_sheets().to_vec();
    println!("{} ({})", "Available sheets".bold(), names.len());
    for name in names {
        match converter.sheet_info(&name) {
            Ok(info) => println!(
                "  {} {} rows x {} columns",
                format!("{name}:").cyan(),
                info.rows,
                info.columns
            ),
            Err(e) => println!("  {} {}", format!("{name}:").cyan(), e.to_string().red()),
        }
    }
}

/// Sheets `--validate` checks: the named sheets, the proforma sheets in
/// proforma mode, otherwise every sheet.
fn validation_targets(cli: &Cli, converter: &Converter) -> Result<Vec<String>> {
    if !cli.sheets.is_empty() {
        return Ok(cli.sheets.clone());
    }
    if !cli.proforma_only {
        return Ok(converter.available_sheets().to_vec());
    }
    match converter.proforma_sheets() {
        Err(PdfError::NoProformaSheetsFound { available }) if cli.fallback_all => Ok(available),
        other => Ok(other?),
    }
}

fn validate(converter: &mut Converter, names: &[String]) -> Result<()> {
    let results = converter.validate_sheets(names);
    for (name, valid) in &results {
        if *valid {
            println!("  {} {name}", "✓".green());
        } else {
            println!("  {} {name}", "✗".red());
        }
    }

    let invalid = results.values().filter(|valid| !**valid).count();
    if invalid > 0 {
        anyhow::bail!("{invalid} sheet(s) missing or empty");
    }
    println!("{}", "All sheets valid".green());
    Ok(())
}

fn print_report(report: &AssembledReport) {
    println!(
        "{} {}",
        "PDF created:".green().bold(),
        report.path.display()
    );
    println!("  Size: {:.1} KB", report.size as f64 / 1024.0);
    println!(
        "  Sheets: {} of {} rendered",
        report.rendered_count(),
        report.outcomes.len()
    );

    for outcome in &report.outcomes {
        match &outcome.status {
            SheetStatus::Failed(message) => {
                println!("  {} {}: {message}", "!".yellow(), outcome.name);
            }
            SheetStatus::Rendered(truncation) if truncation.is_truncated() => {
                println!(
                    "  {} {}: showing {} of {} rows, {} of {} columns",
                    "~".yellow(),
                    outcome.name,
                    truncation.rows_kept,
                    truncation.rows_total,
                    truncation.cols_kept,
                    truncation.cols_total
                );
            }
            SheetStatus::Rendered(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("sheetpress").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["book.xlsx"]);
        assert_eq!(cli.file, PathBuf::from("book.xlsx"));
        assert_eq!(cli.output_dir, PathBuf::from("output"));
        assert!(cli.sheets.is_empty());
        assert!(!cli.proforma_only);

        let options = build_options(&cli).unwrap();
        assert_eq!(options.layout, LayoutConfig::default());
        assert_eq!(options.render.page_size, PageSize::Letter);
        assert_eq!(options.render.orientation, Orientation::Landscape);
        assert!(options.filename.is_none());
    }

    #[test]
    fn test_proforma_defaults() {
        let cli = parse(&["book.xlsx", "--proforma-only"]);
        let options = build_options(&cli).unwrap();
        assert_eq!(options.layout.max_rows_per_sheet, 1000);
        assert_eq!(options.layout.max_cols_per_sheet, 50);
    }

    #[test]
    fn test_flags_override_mode_defaults() {
        let cli = parse(&[
            "book.xlsx",
            "--proforma-only",
            "--max-rows",
            "12",
            "--no-summaries",
            "--page-size",
            "a4",
            "--portrait",
            "-o",
            "report.pdf",
        ]);
        let options = build_options(&cli).unwrap();
        assert_eq!(options.layout.max_rows_per_sheet, 12);
        assert_eq!(options.layout.max_cols_per_sheet, 50);
        assert!(!options.layout.include_summaries);
        assert_eq!(options.render.page_size, PageSize::A4);
        assert_eq!(options.render.orientation, Orientation::Portrait);
        assert_eq!(options.filename.as_deref(), Some("report.pdf"));
    }

    #[test]
    fn test_multiple_sheets() {
        let cli = parse(&["book.xlsx", "-s", "Assumptions", "Proforma", "-d", "out"]);
        assert_eq!(cli.sheets, vec!["Assumptions", "Proforma"]);
        assert_eq!(cli.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_sheets_conflict_with_proforma_mode() {
        let args = ["sheetpress", "book.xlsx", "--proforma-only", "-s", "Assumptions"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_fallback_requires_proforma_mode() {
        assert!(Cli::try_parse_from(["sheetpress", "book.xlsx", "--fallback-all"]).is_err());
        let cli = parse(&["book.xlsx", "--proforma-only", "--fallback-all"]);
        assert!(cli.fallback_all);
    }

    #[test]
    fn test_config_file_then_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{
                "layout": {"max_rows_per_sheet": 7, "include_summaries": false},
                "render": {"page_size": "a4"}
            }"#,
        )
        .unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let cli = parse(&["book.xlsx", "--config", &path, "--max-cols", "3"]);
        let options = build_options(&cli).unwrap();
        assert_eq!(options.layout.max_rows_per_sheet, 7);
        assert_eq!(options.layout.max_cols_per_sheet, 3);
        assert!(!options.layout.include_summaries);
        assert_eq!(options.render.page_size, PageSize::A4);
    }

    #[test]
    fn test_config_file_keeps_proforma_limits() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"render": {"orientation": "portrait"}}"#).unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let cli = parse(&["book.xlsx", "--proforma-only", "--config", &path]);
        let options = build_options(&cli).unwrap();
        assert_eq!(options.layout.max_rows_per_sheet, 1000);
        assert_eq!(options.layout.max_cols_per_sheet, 50);
        assert_eq!(options.render.orientation, Orientation::Portrait);
    }

    #[test]
    fn test_bad_config_file() {
        let cli = parse(&["book.xlsx", "--config", "/non/existent/config.json"]);
        assert!(build_options(&cli).is_err());
    }

    fn workbook(dir: &std::path::Path, sheets: &[&str]) -> PathBuf {
        let path = dir.join("book.xlsx");
        let mut book = rust_xlsxwriter::Workbook::new();
        for name in sheets {
            let sheet = book.add_worksheet();
            sheet.set_name(*name).unwrap();
            sheet.write_string(0, 0, "Item").unwrap();
            sheet.write_number(1, 0, 1.0).unwrap();
        }
        book.save(&path).unwrap();
        path
    }

    #[test]
    fn test_validation_targets_follow_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = workbook(dir.path(), &["Notes", "Proforma", "Assumptions"]);
        let file = path.to_string_lossy().into_owned();
        let converter = Converter::open(&path, dir.path().join("out")).unwrap();

        let cli = parse(&[&file, "--validate"]);
        let names = validation_targets(&cli, &converter).unwrap();
        assert_eq!(names, vec!["Notes", "Proforma", "Assumptions"]);

        let cli = parse(&[&file, "--validate", "--proforma-only"]);
        let names = validation_targets(&cli, &converter).unwrap();
        assert_eq!(names, vec!["Assumptions", "Proforma"]);

        let cli = parse(&[&file, "--validate", "-s", "Notes"]);
        assert_eq!(validation_targets(&cli, &converter).unwrap(), vec!["Notes"]);
    }

    #[test]
    fn test_validation_targets_without_proforma_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let path = workbook(dir.path(), &["Notes"]);
        let file = path.to_string_lossy().into_owned();
        let converter = Converter::open(&path, dir.path().join("out")).unwrap();

        let cli = parse(&[&file, "--validate", "--proforma-only"]);
        assert!(validation_targets(&cli, &converter).is_err());

        let cli = parse(&[&file, "--validate", "--proforma-only", "--fallback-all"]);
        assert_eq!(validation_targets(&cli, &converter).unwrap(), vec!["Notes"]);
    }
}
