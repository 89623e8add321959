use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use glob::{glob, Pattern};
use plateflux::{
    collect_data,
    config::{RenameInstructions, RunConfig},
    rename::apply_renames,
    table::{write_table, OutputFormat},
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Assemble kinetic fluorescence reads from a multi-plate reader export into one tidy table.
#[derive(Parser)]
#[command(name = "plateflux", author, version, about, long_about = None)]
struct Args {
    /// Directory holding the plate export (the first .txt file is used)
    directory: PathBuf,

    /// Where to save the table. Default: plates.csv in the target directory
    #[arg(short, long, value_name = "FILE")]
    outfile: Option<PathBuf>,

    /// Seconds between reads [default: 5]
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Reagents in plate order, separated by spaces [default: ACMA CCCP Na_Iono]
    #[arg(short, long, num_args = 1..)]
    plates: Option<Vec<String>>,

    /// Wells and sample names, alternating: a01 wt a02 ko. `_` becomes `-`.
    /// Wells sharing a name stay separate columns; nothing is averaged.
    #[arg(short, long, num_args = 1.., conflicts_with = "rangerename")]
    samples: Option<Vec<String>>,

    /// Rename a block of wells: upper-left well, lower-right well, then sample names
    /// (left to right, top to bottom)
    #[arg(short, long, num_args = 2..)]
    rangerename: Option<Vec<String>>,

    /// Load plate labels, interval and renames from a YAML file; flags win over it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format. Default: from the outfile extension, CSV otherwise
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Only report warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Csv,
    Parquet,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Parquet => OutputFormat::Parquet,
        }
    }
}

impl Args {
    /// Config file (if any) with command-line flags layered on top.
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };
        if let Some(plates) = &self.plates {
            config.plate_labels = plates.clone();
        }
        if let Some(interval) = self.interval {
            config.interval = interval;
        }
        if let Some(samples) = &self.samples {
            config.rename = Some(RenameInstructions::Pairs(samples.clone()));
        }
        if let Some(tokens) = &self.rangerename {
            config.rename = Some(RenameInstructions::range_from_tokens(tokens)?);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Plate exports in `dir`, sorted by name.
fn find_exports(dir: &Path) -> Result<Vec<PathBuf>> {
    let dir_str = dir
        .to_str()
        .with_context(|| format!("directory {} is not valid UTF-8", dir.display()))?;
    // `[`, `]`, `*`, `?` in the directory name are literal
    let pattern = Path::new(&Pattern::escape(dir_str)).join("*.txt");
    let pattern = pattern
        .to_str()
        .with_context(|| format!("directory {} is not valid UTF-8", dir.display()))?;
    let mut files: Vec<PathBuf> = glob(pattern)?.filter_map(Result::ok).collect();
    files.sort();
    Ok(files)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // ─── 1) init logging ─────────────────────────────────────────────
    let default_filter = if args.quiet { "warn" } else { "info" };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt::Subscriber::builder().with_env_filter(env).init();

    // ─── 2) resolve config and paths ─────────────────────────────────
    let config = args.run_config()?;
    let dir = args.directory.as_path();
    let outfile = args
        .outfile
        .clone()
        .unwrap_or_else(|| dir.join("plates.csv"));
    let format = args
        .format
        .map(OutputFormat::from)
        .unwrap_or_else(|| OutputFormat::from_path(&outfile));

    if outfile.exists() {
        bail!(
            "refusing to overwrite {}; move or delete it first",
            outfile.display()
        );
    }

    // ─── 3) find the export ──────────────────────────────────────────
    let files = find_exports(dir)?;
    info!("found {} files", files.len());
    let Some(export) = files.first() else {
        bail!("no .txt plate export in {}", dir.display());
    };
    if files.len() > 1 {
        warn!(using = %export.display(), "more than one export in directory; using the first");
    }

    // ─── 4) scan + assemble ──────────────────────────────────────────
    let mut table = collect_data(export, &config)
        .with_context(|| format!("processing {}", export.display()))?;

    // ─── 5) optional renaming; problems here never stop the run ──────
    if let Err(warning) = apply_renames(&mut table, config.rename.as_ref()) {
        warn!("{}", warning);
    }

    // ─── 6) save ─────────────────────────────────────────────────────
    write_table(&table, &outfile, format)?;
    info!("done");
    Ok(())
}
