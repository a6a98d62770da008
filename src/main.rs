use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use ocrtable::grid::MorphologyGridDetector;
use ocrtable::ocr::{DetectionFile, DetectionSource, SourceImage};
use ocrtable::pipeline::{
    export_table, extract_columns, extract_paragraph, extract_table, finalize, paragraph_table,
    ColumnInput, ExportFormat,
};
use ocrtable::{ReferenceSet, TableConfig};

#[derive(Parser, Debug)]
#[command(name = "ocrtable")]
#[command(version, about = "Rebuild tables from OCR detections and link identifiers to a reference list", long_about = None)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file with column schema, grid and matching settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rebuild a table column by column from per-column OCR output
    Columns {
        /// NAME=DETECTIONS[:IMAGE], once per column
        #[arg(short, long = "input", required = true, value_parser = parse_column_arg)]
        inputs: Vec<ColumnArg>,

        #[command(flatten)]
        references: ReferenceArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Rebuild a ruled table from one full-table image
    Table {
        /// OCR detections JSON for the image
        #[arg(short, long)]
        detections: PathBuf,

        /// The table image
        #[arg(long)]
        image: PathBuf,

        #[command(flatten)]
        references: ReferenceArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print detections as text lines, top to bottom
    Paragraph {
        /// OCR detections JSON
        detections: PathBuf,

        /// Also write table.txt into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rank one identifier against a reference list
    Match {
        query: String,

        #[command(flatten)]
        references: ReferenceArgs,
    },
}

#[derive(Args, Debug)]
struct ReferenceArgs {
    /// Reference identifiers, one per line
    #[arg(long, conflicts_with = "references_json")]
    references: Option<PathBuf>,

    /// Reference identifiers as lookup-service JSON
    #[arg(long)]
    references_json: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output directory
    #[arg(short, long, default_value = "ocrtable_output")]
    output: PathBuf,

    /// Output format(s) to generate
    #[arg(short, long, value_enum, default_values_t = vec![Format::Json, Format::Csv])]
    format: Vec<Format>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Format {
    Json,
    Csv,
    Text,
    Payload,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => ExportFormat::Json,
            Format::Csv => ExportFormat::Csv,
            Format::Text => ExportFormat::Text,
            Format::Payload => ExportFormat::Payload,
        }
    }
}

#[derive(Debug, Clone)]
struct ColumnArg {
    name: String,
    detections: PathBuf,
    image: Option<PathBuf>,
}

/// Last `:` that is not part of a drive prefix such as `C:`.
fn image_separator(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    rest.rmatch_indices(':').map(|(idx, _)| idx).find(|&idx| {
        let drive = idx >= 1
            && bytes[idx - 1].is_ascii_alphabetic()
            && (idx == 1 || bytes[idx - 2] == b':');
        !drive
    })
}

fn parse_column_arg(raw: &str) -> Result<ColumnArg, String> {
    let (name, rest) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=DETECTIONS[:IMAGE], got `{raw}`"))?;
    if name.trim().is_empty() || rest.is_empty() {
        return Err(format!("expected NAME=DETECTIONS[:IMAGE], got `{raw}`"));
    }
    let (detections, image) = match image_separator(rest) {
        Some(idx) if idx > 0 && idx + 1 < rest.len() => {
            (&rest[..idx], Some(PathBuf::from(&rest[idx + 1..])))
        }
        _ => (rest, None),
    };
    Ok(ColumnArg {
        name: name.trim().to_string(),
        detections: PathBuf::from(detections),
        image,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    ocrtable::init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => TableConfig::load(path)?,
        None => TableConfig::default(),
    };

    match cli.command {
        Commands::Columns {
            inputs,
            references,
            output,
        } => run_columns(&config, inputs, &references, &output),
        Commands::Table {
            detections,
            image,
            references,
            output,
        } => run_table(&config, &detections, &image, &references, &output),
        Commands::Paragraph { detections, output } => run_paragraph(&detections, output),
        Commands::Match { query, references } => run_match(&config, &query, &references),
    }
}

fn load_references(args: &ReferenceArgs) -> Result<ReferenceSet> {
    let set = match (&args.references, &args.references_json) {
        (Some(path), _) => ReferenceSet::load_lines(path)?,
        (None, Some(path)) => ReferenceSet::load_lookup_json(path)?,
        (None, None) => {
            tracing::warn!("no reference list given; every row will be unlinked");
            ReferenceSet::default()
        }
    };
    tracing::info!("loaded {} reference identifiers", set.len());
    Ok(set)
}

fn run_columns(
    config: &TableConfig,
    inputs: Vec<ColumnArg>,
    references: &ReferenceArgs,
    output: &OutputArgs,
) -> Result<()> {
    let references = load_references(references)?;

    let mut columns = Vec::with_capacity(inputs.len());
    for arg in inputs {
        let detections = DetectionFile::new(&arg.detections).detections()?;
        let image = arg
            .image
            .as_deref()
            .map(|path| SourceImage::open(path, config.grid.max_dimension))
            .transpose()?;
        columns.push(ColumnInput {
            name: arg.name,
            detections,
            image,
        });
    }

    let detector = MorphologyGridDetector::new(config.grid.clone());
    let mut session = extract_columns(&columns, &detector, config)?;
    let table = finalize(&mut session, &references)?;
    write_outputs(&table, config, output)
}

fn run_table(
    config: &TableConfig,
    detections: &Path,
    image: &Path,
    references: &ReferenceArgs,
    output: &OutputArgs,
) -> Result<()> {
    let references = load_references(references)?;
    let detections = DetectionFile::new(detections).detections()?;
    let image = SourceImage::open(image, config.grid.max_dimension)?;

    let detector = MorphologyGridDetector::new(config.grid.clone());
    let mut session = extract_table(&detections, &image, &detector, config);
    let table = finalize(&mut session, &references)?;
    write_outputs(&table, config, output)
}

fn write_outputs(
    table: &ocrtable::Table,
    config: &TableConfig,
    output: &OutputArgs,
) -> Result<()> {
    let formats: Vec<ExportFormat> = output.format.iter().copied().map(Into::into).collect();
    export_table(table, &output.output, &formats, config)
        .with_context(|| format!("Failed to export to: {}", output.output.display()))?;

    let review = table
        .rows
        .iter()
        .filter(|r| r.classification.as_ref().is_some_and(|c| c.needs_review))
        .count();
    println!("[+] {} rows, {} flagged for review", table.rows.len(), review);
    println!("[✓] Results saved to: {}", output.output.display());
    Ok(())
}

fn run_paragraph(detections: &Path, output: Option<PathBuf>) -> Result<()> {
    let detections = DetectionFile::new(detections).detections()?;
    let cells = extract_paragraph(&detections);
    for cell in &cells {
        println!("{}", cell.text);
    }
    if let Some(dir) = output {
        let table = paragraph_table(cells);
        export_table(&table, &dir, &[ExportFormat::Text], &TableConfig::default())?;
    }
    Ok(())
}

fn run_match(config: &TableConfig, query: &str, references: &ReferenceArgs) -> Result<()> {
    let references = load_references(references)?;
    let report = references.rank(query, config.matching.scorer);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
