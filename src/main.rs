use anyhow::{Context, Result};
use clap::Parser;
use plotdoc::data::Dataset;
use plotdoc::{csv_reader, plan, util, ScriptSource};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "plotdoc")]
#[command(about = "Render chart documents from CSV data", long_about = None)]
struct Args {
    /// CSV input file, or "-" to read from stdin
    #[arg(long)]
    csv: String,

    /// Plan file: a JSON array of chart requests
    #[arg(long)]
    plan: PathBuf,

    /// Base output directory; documents land in a YYYYMMDD subdirectory
    #[arg(long, default_value = "plots")]
    out_dir: PathBuf,

    /// Reference a local plotly.min.js instead of the CDN build
    #[arg(long)]
    local_js: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let data = load_dataset(&args.csv)
        .with_context(|| format!("Failed to load CSV input '{}'", args.csv))?;

    let plan_text = fs::read_to_string(&args.plan)
        .with_context(|| format!("Failed to read plan file '{}'", args.plan.display()))?;
    let entries = plan::parse(&plan_text).context("Failed to parse plan")?;

    let out_dir = util::dated_dir(&args.out_dir)
        .with_context(|| format!("Failed to create output directory under '{}'", args.out_dir.display()))?;

    let script = if args.local_js {
        ScriptSource::Local
    } else {
        ScriptSource::Cdn
    };

    let written = plan::execute(&data, entries, &out_dir, script)
        .context("Failed to render plan")?;
    println!("Wrote {} document(s) to {}", written, out_dir.display());

    Ok(())
}

fn load_dataset(source: &str) -> plotdoc::Result<Dataset> {
    if source == "-" {
        csv_reader::read_csv_from_stdin()
    } else {
        csv_reader::read_csv_path(source.as_ref())
    }
}
