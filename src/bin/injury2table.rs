//! CLI binary for injury2table.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and prints the resulting table as JSON or CSV.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use injury2table::{extract, layout, ExtractionConfig, InjuryTable};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

/// Extract a league injury-report PDF into a clean table.
#[derive(Parser, Debug)]
#[command(name = "injury2table", version, about)]
struct Cli {
    /// Report source: an HTTP(S) URL or a local PDF path.
    source: String,

    /// Layout preset describing the report's table geometry.
    ///
    /// Currently only "official" (the published league layout) ships;
    /// diverging layouts use the library API directly.
    #[arg(long, default_value = "official")]
    layout: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Extra HTTP header for remote retrieval, as NAME:VALUE. Repeatable.
    #[arg(long = "header", value_name = "NAME:VALUE")]
    headers: Vec<String>,

    /// Print the page count and exit without extracting.
    #[arg(long)]
    inspect: bool,

    /// Print run statistics to stderr after extraction.
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    if cli.inspect {
        let meta = extract::inspect(&cli.source, &config).await?;
        println!("{}: {} page(s)", meta.source, meta.page_count);
        return Ok(());
    }

    let table = if extract::is_url(&cli.source) {
        extract::extract_from_url(&cli.source, &config).await?
    } else {
        extract::extract_from_path(&cli.source, &config).await?
    };

    if cli.stats {
        eprintln!(
            "{} record(s) from {} page(s) in {}ms ({} carried forward, {} flagged)",
            table.len(),
            table.stats.page_count,
            table.stats.total_duration_ms,
            table.stats.cells_carried_forward,
            table.stats.cells_flagged,
        );
    }

    let rendered = match cli.format {
        OutputFormat::Json => serde_json::to_string_pretty(&table)? + "\n",
        OutputFormat::Csv => to_csv(&table),
    };

    match cli.output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            std::io::stdout().write_all(rendered.as_bytes())?;
        }
    }

    Ok(())
}

fn build_config(cli: &Cli) -> Result<ExtractionConfig> {
    let mut config = match cli.layout.as_str() {
        "official" => layout::official(),
        other => bail!("unknown layout preset '{other}' (available: official)"),
    };
    for pair in &cli.headers {
        let Some((name, value)) = pair.split_once(':') else {
            bail!("--header expects NAME:VALUE, got '{pair}'");
        };
        config
            .extra_headers
            .push((name.trim().to_string(), value.trim().to_string()));
    }
    Ok(config)
}

/// Minimal CSV writer: quote every field, double embedded quotes.
fn to_csv(table: &InjuryTable) -> String {
    let mut out = String::new();
    write_csv_row(&mut out, table.columns.iter().map(String::as_str));
    for record in &table.records {
        write_csv_row(&mut out, record.values.iter().map(String::as_str));
    }
    out
}

fn write_csv_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    }
    out.push('\n');
}
