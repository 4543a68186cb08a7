use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use competitor_report_core::{ReportConfig, validate_urls};
use competitor_report_crew::{Crew, CrewInput, LlmConfig, OpenAiClient};
use competitor_report_export::{
    ChartSpec, PdfReport, TableBlock, build_charts, default_output_path, save_pdf_report,
};
use competitor_report_extract::analyze_report_text;
use competitor_report_extract::fetch::{FetchConfig, Fetcher, render_corpus_preview};
use competitor_report_extract::output::{
    OutputFormat, format_analysis, format_corpus, format_sections, format_signals, format_table,
};
use competitor_report_extract::parser::{build_comparison_table, clean_markdown, make_sections};
use competitor_report_extract::report::ReportAnalysis;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "competitor-report")]
#[command(about = "Competitor page analysis with an LLM crew, charts and a PDF report")]
#[command(version)]
struct Cli {
    /// Log at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch pages, run the crew and write charts and a PDF.
    Analyze(AnalyzeArgs),
    /// Fetch pages and print the normalized corpus.
    Fetch(FetchArgs),
    /// Parse captured report text from a file.
    ParseFile(ParseFileArgs),
    /// Parse captured report text from stdin.
    ParseStdin(ParseStdinArgs),
    /// Split report text into titled sections.
    Sections(SectionsArgs),
    /// Build the strengths / weaknesses / opportunities table.
    Table(TableArgs),
    /// Write charts and a PDF from captured report text.
    Export(ExportArgs),
    /// Write a default YAML configuration file.
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    /// Comma-separated competitor URLs.
    #[arg(long)]
    urls: String,
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory for the PDF and report text (charts go to <dir>/charts).
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Chat model, overriding config and environment.
    #[arg(long)]
    model: Option<String>,
    /// Skip PDF generation.
    #[arg(long)]
    no_pdf: bool,
    /// Print a machine-readable run summary instead of text.
    #[arg(long)]
    format: Option<OutputFormat>,
}

#[derive(Debug, Args)]
struct FetchArgs {
    /// Comma-separated competitor URLs.
    #[arg(long)]
    urls: String,
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct ParseFileArgs {
    /// Path to the report text.
    #[arg(long)]
    input: PathBuf,
    #[command(flatten)]
    parse: ParseOptions,
}

#[derive(Debug, Args)]
struct ParseStdinArgs {
    #[command(flatten)]
    parse: ParseOptions,
}

#[derive(Debug, Args)]
struct ParseOptions {
    /// Comma-separated URLs that were analyzed.
    #[arg(long)]
    urls: Option<String>,
    /// Print only the signal map.
    #[arg(long)]
    signals_only: bool,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct SectionsArgs {
    /// Path to the report text.
    #[arg(long)]
    input: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct TableArgs {
    /// Path to the report text.
    #[arg(long)]
    input: PathBuf,
    /// Comma-separated URLs that were analyzed.
    #[arg(long)]
    urls: String,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Path to the report text.
    #[arg(long)]
    input: PathBuf,
    /// Comma-separated URLs that were analyzed.
    #[arg(long)]
    urls: Option<String>,
    /// PDF path (default: <reports_dir>/<prefix>_<timestamp>.pdf).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Directory for the SVG charts.
    #[arg(long)]
    charts_dir: Option<PathBuf>,
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct InitConfigArgs {
    /// Output YAML path.
    #[arg(long)]
    output: PathBuf,
    /// Overwrite an existing file.
    #[arg(long)]
    force: bool,
}

/// Files produced by one run.
#[derive(Debug, serde::Serialize)]
struct RunSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pdf: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report_text: Option<PathBuf>,
    charts: Vec<PathBuf>,
    analysis: ReportAnalysis,
}

fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Fetch(args) => run_fetch(args),
        Command::ParseFile(args) => run_parse_file(args),
        Command::ParseStdin(args) => run_parse_stdin(args),
        Command::Sections(args) => run_sections(args),
        Command::Table(args) => run_table(args),
        Command::Export(args) => run_export(args),
        Command::InitConfig(args) => run_init_config(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_analyze(args: AnalyzeArgs) -> Result<(), String> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(model) = args.model {
        config.llm.model = model;
    }
    if let Some(dir) = args.output_dir {
        config.output.charts_dir = dir.join("charts");
        config.output.reports_dir = dir;
    }

    let urls = parse_csv_list(Some(args.urls));
    check_urls(&urls)?;
    let api_key = config.api_key().ok_or_else(|| {
        format!(
            "{} is not set; export it or add it to .env",
            config.llm.api_key_env
        )
    })?;

    let fetcher = Fetcher::new(FetchConfig::from(&config.fetch)).map_err(|e| e.to_string())?;
    let corpus = fetcher.build_corpus(&urls);
    let failed = corpus.iter().filter(|entry| !entry.is_ok()).count();
    if failed > 0 {
        warn!(failed, total = corpus.len(), "Some pages could not be fetched");
    }
    let preview = render_corpus_preview(&corpus, config.fetch.corpus_preview_chars);

    let client = OpenAiClient::new(LlmConfig::from_settings(&config.llm, api_key))
        .map_err(|e| e.to_string())?;
    info!(model = client.model(), urls = urls.len(), "Starting crew");
    let output = Crew::competitor_analysis()
        .kickoff(&client, &CrewInput::new(urls.clone(), preview))
        .map_err(|e| e.to_string())?;

    let analysis = analyze_report_text(&output.final_output, &urls);
    let stem_path = default_output_path(&config.output.reports_dir, &config.output.file_prefix)
        .map_err(|e| e.to_string())?;
    let report_text = stem_path.with_extension("md");
    fs::write(&report_text, &output.final_output)
        .map_err(|err| format!("Failed to write '{}': {err}", report_text.display()))?;

    let pdf_path = (!args.no_pdf).then_some(stem_path);
    let mut summary = write_outputs(&config, analysis, &output.final_output, pdf_path)?;
    summary.report_text = Some(report_text);
    print_summary(&summary, args.format)
}

fn run_fetch(args: FetchArgs) -> Result<(), String> {
    let config = load_config(args.config.as_deref())?;
    let urls = parse_csv_list(Some(args.urls));
    check_urls(&urls)?;

    let fetcher = Fetcher::new(FetchConfig::from(&config.fetch)).map_err(|e| e.to_string())?;
    let corpus = fetcher.build_corpus(&urls);
    println!("{}", format_corpus(&corpus, args.format)?);
    Ok(())
}

fn run_parse_file(args: ParseFileArgs) -> Result<(), String> {
    let text = read_input(&args.input)?;
    run_parse_report_text(&text, args.parse)
}

fn run_parse_stdin(args: ParseStdinArgs) -> Result<(), String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .map_err(|err| format!("Failed to read stdin: {err}"))?;
    run_parse_report_text(&text, args.parse)
}

fn run_parse_report_text(text: &str, options: ParseOptions) -> Result<(), String> {
    let urls = parse_csv_list(options.urls);
    let analysis = analyze_report_text(text, &urls);
    for warning in &analysis.warnings {
        warn!("{warning}");
    }
    let output = if options.signals_only {
        format_signals(&analysis.signals, options.format)?
    } else {
        format_analysis(&analysis, options.format)?
    };
    println!("{output}");
    Ok(())
}

fn run_sections(args: SectionsArgs) -> Result<(), String> {
    let text = read_input(&args.input)?;
    let sections = make_sections(&text);
    println!("{}", format_sections(&sections, args.format)?);
    Ok(())
}

fn run_table(args: TableArgs) -> Result<(), String> {
    let text = read_input(&args.input)?;
    let urls = parse_csv_list(Some(args.urls));
    let table = build_comparison_table(&clean_markdown(&text), &urls)
        .ok_or_else(|| "A comparison table needs at least two distinct domains".to_string())?;
    println!("{}", format_table(&table, args.format)?);
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<(), String> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(dir) = args.charts_dir {
        config.output.charts_dir = dir;
    }
    let text = read_input(&args.input)?;
    let urls = parse_csv_list(args.urls);

    let analysis = analyze_report_text(&text, &urls);
    let pdf_path = match args.output {
        Some(path) => path,
        None => default_output_path(&config.output.reports_dir, &config.output.file_prefix)
            .map_err(|e| e.to_string())?,
    };
    let summary = write_outputs(&config, analysis, &text, Some(pdf_path))?;
    print_summary(&summary, None)
}

fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "'{}' already exists; pass --force to overwrite",
            args.output.display()
        ));
    }
    ensure_parent_dir(&args.output)?;
    ReportConfig::default()
        .save(&args.output)
        .map_err(|err| format!("Failed to write '{}': {err}", args.output.display()))?;
    println!("Wrote default configuration to '{}'.", args.output.display());
    Ok(())
}

/// Writes charts and, when `pdf_path` is set, the PDF for one analysis.
fn write_outputs(
    config: &ReportConfig,
    analysis: ReportAnalysis,
    report_text: &str,
    pdf_path: Option<PathBuf>,
) -> Result<RunSummary, String> {
    for warning in &analysis.warnings {
        warn!("{warning}");
    }
    let charts = build_charts(&analysis.signals, &config.output.charts_dir)
        .map_err(|e| format!("Failed to write charts: {e}"))?;

    let pdf = match pdf_path {
        Some(path) => {
            let report = pdf_report(config, &analysis, report_text);
            let written =
                save_pdf_report(&report, &path).map_err(|e| format!("Failed to write PDF: {e}"))?;
            Some(written)
        }
        None => None,
    };

    Ok(RunSummary {
        pdf,
        report_text: None,
        charts,
        analysis,
    })
}

fn pdf_report(config: &ReportConfig, analysis: &ReportAnalysis, report_text: &str) -> PdfReport {
    let mut report = PdfReport::new(config.output.title.clone());
    report.sections = if report_text.trim().is_empty() {
        Vec::new()
    } else {
        analysis.sections.clone()
    };
    if !analysis.signals.is_empty() {
        report.tables.push(TableBlock::signals(&analysis.signals));
    }
    if let Some(table) = &analysis.table {
        report.tables.push(TableBlock::comparison(table));
    }
    report.charts = ChartSpec::from_signals(&analysis.signals);
    report.footer = config.output.footer.clone();
    report
}

fn print_summary(summary: &RunSummary, format: Option<OutputFormat>) -> Result<(), String> {
    match format {
        Some(OutputFormat::Json) => {
            let json = serde_json::to_string_pretty(summary)
                .map_err(|e| format!("Failed to serialize output: {e}"))?;
            println!("{json}");
        }
        Some(OutputFormat::Yaml) => {
            let yaml = serde_yaml::to_string(summary)
                .map_err(|e| format!("Failed to serialize output: {e}"))?;
            print!("{yaml}");
        }
        _ => {
            println!("{}", summary.analysis.summary);
            println!();
            if let Some(path) = &summary.report_text {
                println!("Report text: {}", path.display());
            }
            if let Some(path) = &summary.pdf {
                println!("PDF: {}", path.display());
            }
            for path in &summary.charts {
                println!("Chart: {}", path.display());
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ReportConfig, String> {
    let mut config = match path {
        Some(path) => ReportConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => ReportConfig::default(),
    };
    config.apply_env();
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn check_urls(urls: &[String]) -> Result<(), String> {
    let errors = validate_urls(urls);
    if errors.is_empty() {
        return Ok(());
    }
    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    Err(messages.join("; "))
}

fn read_input(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|err| format!("Failed to read '{}': {err}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create output directory '{}': {err}",
                parent.display()
            )
        })?;
    }
    Ok(())
}

fn parse_csv_list(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_list_trims_and_drops_empty() {
        let parsed = parse_csv_list(Some(" https://a.example/, ,https://b.example/ ".to_string()));
        assert_eq!(parsed, vec!["https://a.example/", "https://b.example/"]);
    }

    #[test]
    fn test_parse_csv_list_none_is_empty() {
        assert!(parse_csv_list(None).is_empty());
    }

    #[test]
    fn test_check_urls_joins_errors() {
        let err = check_urls(&["ftp://a.example/".to_string(), "nope".to_string()]).unwrap_err();
        assert!(err.contains("; "), "{err}");
        assert!(check_urls(&["https://a.example/".to_string()]).is_ok());
        assert!(check_urls(&[]).is_err());
    }

    #[test]
    fn test_pdf_report_includes_tables_and_charts() {
        let text = "https://alpha.example/ has 3 CTA buttons. Strength: fast.\n\
                    https://beta.example/ has 2 reviews. Weakness: slow.\n";
        let analysis = analyze_report_text(text, &["https://alpha.example/", "https://beta.example/"]);
        let report = pdf_report(&ReportConfig::default(), &analysis, text);
        assert_eq!(report.tables.len(), 2);
        assert_eq!(report.tables[0].title, "Signals by domain");
        assert_eq!(report.charts.len(), 3);
        assert_eq!(report.footer, ReportConfig::default().output.footer);
    }
}
