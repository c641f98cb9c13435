//! Process command - extract marks from a single certificate PDF.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use marks_core::{
    ExtractedRecord, FieldName, LayoutChoice, MarksConfig, Pipeline, PureOcrEngine, SqliteSink,
    persist_record,
};

use super::config::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Certificate PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Skip OCR and use only the PDF text layer
    #[arg(long)]
    text_only: bool,

    /// Subject-row layout
    #[arg(short, long, value_enum)]
    layout: Option<LayoutArg>,

    /// SQLite database (overrides config)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Do not store the record
    #[arg(long)]
    no_persist: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one line per subject
    Csv,
    /// Plain text summary
    Text,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LayoutArg {
    /// Detect per document
    Auto,
    /// Summary certificate with a known subject list
    Fixed,
    /// Detailed mark-sheet rows
    Tabular,
}

impl From<LayoutArg> for LayoutChoice {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Auto => LayoutChoice::Auto,
            LayoutArg::Fixed => LayoutChoice::FixedSubjectList,
            LayoutArg::Tabular => LayoutChoice::TabularRows,
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    if let Some(dir) = &args.model_dir {
        config.models.model_dir = dir.clone();
    }
    if let Some(layout) = args.layout {
        config.extraction.layout = layout.into();
    }
    if args.text_only {
        config.pdf.ocr_fallback = false;
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message("Extracting marks...");

    let input = args.input.clone();
    let extract_config = config.clone();
    let record = tokio::task::spawn_blocking(move || extract(&input, &extract_config))
        .await??;

    pb.finish_and_clear();
    eprintln!(
        "{} Extracted {} subject(s) from {} ({})",
        style("✓").green(),
        record.subjects.len(),
        args.input.display(),
        record.source.as_str()
    );
    for warning in &record.warnings {
        debug!("{}", warning);
    }

    let output = format_record(&record, args.format)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if !args.no_persist && config.database.enabled {
        let db_path = args.db.clone().unwrap_or_else(|| config.database.path.clone());
        store(&record, &db_path)?;
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Build the pipeline and run it. Blocking.
fn extract(input: &Path, config: &MarksConfig) -> anyhow::Result<ExtractedRecord> {
    let mut pipeline = Pipeline::from_config(config)?;

    if config.pdf.ocr_fallback {
        match PureOcrEngine::from_models(&config.models, config.ocr.clone()) {
            Ok(engine) => pipeline = pipeline.with_ocr(Box::new(engine)),
            Err(e) => warn!("OCR fallback unavailable: {}", e),
        }
    }

    Ok(pipeline.run_file(input)?)
}

fn store(record: &ExtractedRecord, db_path: &Path) -> anyhow::Result<()> {
    if !record.has_subjects() {
        eprintln!(
            "{} No subject marks found, nothing stored",
            style("!").yellow()
        );
        return Ok(());
    }

    eprintln!("{} Connecting to {}", style("→").cyan(), db_path.display());
    let mut sink = SqliteSink::open(db_path)?;

    eprintln!("{} Inserting record", style("→").cyan());
    match persist_record(&mut sink, record)? {
        Some(persisted) if persisted.subjects.failed > 0 => eprintln!(
            "{} Stored student {}: {} subject(s), {} failed",
            style("!").yellow(),
            persisted.student_id,
            persisted.subjects.inserted,
            persisted.subjects.failed
        ),
        Some(persisted) => eprintln!(
            "{} Stored student {} with {} subject(s)",
            style("✓").green(),
            persisted.student_id,
            persisted.subjects.inserted
        ),
        None => {}
    }

    Ok(())
}

fn format_record(record: &ExtractedRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn format_csv(record: &ExtractedRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "name",
        "register_number",
        "subject_code",
        "subject_name",
        "theory",
        "practical",
        "total",
        "total_in_words",
        "grade",
    ])?;

    let name = record.scalars.get(FieldName::StudentName);
    let register = record.scalars.get(FieldName::RegisterNumber);
    let number = |v: Option<u32>| v.map(|n| n.to_string()).unwrap_or_default();

    for subject in &record.subjects {
        wtr.write_record([
            name,
            register,
            subject.code.as_deref().unwrap_or(""),
            subject.name.as_str(),
            number(subject.theory).as_str(),
            number(subject.practical).as_str(),
            subject.total.to_string().as_str(),
            subject.total_in_words.as_deref().unwrap_or(""),
            subject.grade.as_deref().unwrap_or(""),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &ExtractedRecord) -> String {
    let mut output = String::new();

    for (field, value) in record.scalars.iter() {
        output.push_str(&format!("{:<16} {}\n", field.as_str(), value));
    }
    output.push_str(&format!("{:<16} {}\n\n", "layout", record.layout));

    for subject in &record.subjects {
        output.push_str(&format!(
            "  {:<6} {:<24} {:>4}",
            subject.code.as_deref().unwrap_or("-"),
            subject.name,
            subject.total
        ));
        if let Some(grade) = &subject.grade {
            output.push_str(&format!("  {}", grade));
        }
        output.push('\n');
    }

    output.push_str(&format!("\n  Total: {}\n", record.grand_total()));
    output
}
