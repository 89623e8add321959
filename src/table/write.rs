// src/table/write.rs

use anyhow::{Context, Result};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::Path,
};
use tracing::{debug, info};

use super::arrow::{build_arrow_schema, to_record_batch};
use super::PlateTable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    /// `.parquet` → Parquet, anything else → CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("parquet") => OutputFormat::Parquet,
            _ => OutputFormat::Csv,
        }
    }
}

/// A reading as a CSV field. Whole numbers keep a trailing `.0` so the well columns
/// read back as floats (`1500.0`, not `1500`).
fn format_reading(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{:.1}", v)
    } else {
        v.to_string()
    }
}

/// Write the table as CSV: header row, then one record per read.
/// Missing wells become empty fields.
pub fn write_csv<W: Write>(table: &PlateTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.headers())
        .context("writing CSV header")?;

    let mut record: Vec<String> = Vec::with_capacity(table.well_labels().len() + 2);
    for row in table.rows() {
        record.clear();
        record.push(row.sample.clone());
        record.extend(
            row.wells
                .iter()
                .map(|w| w.map(format_reading).unwrap_or_default()),
        );
        record.push(row.elapsed_seconds.to_string());
        wtr.write_record(&record).context("writing CSV record")?;
    }

    wtr.flush().context("flushing CSV writer")?;
    Ok(())
}

pub fn write_parquet<W: Write + Send>(table: &PlateTable, writer: W) -> Result<()> {
    let schema = build_arrow_schema(table);
    let batch = to_record_batch(table)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer =
        ArrowWriter::try_new(writer, schema, Some(props)).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch to parquet")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

/// Write `table` to a new file at `path` in `format`. An existing file is never replaced.
///
/// `path` is claimed up front with an exclusive create, the table is written to a hidden
/// temporary sibling, and the sibling is renamed over the claimed file once complete.
/// On failure both are removed, so a half-written table is never left behind.
pub fn write_table(table: &PlateTable, path: &Path, format: OutputFormat) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("output path {} has no file name", path.display()))?;
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            anyhow::bail!("refusing to overwrite {}", path.display());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("creating {}", path.display()));
        }
    }

    let result = write_via_tmp(table, path, &tmp_path, format);
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
        let _ = fs::remove_file(path);
    }
    result?;
    info!(path = %path.display(), rows = table.len(), format = ?format, "saved table");
    Ok(())
}

fn write_via_tmp(
    table: &PlateTable,
    path: &Path,
    tmp_path: &Path,
    format: OutputFormat,
) -> Result<()> {
    let file = File::create(tmp_path)
        .with_context(|| format!("creating {}", tmp_path.display()))?;
    match format {
        OutputFormat::Csv => write_csv(table, BufWriter::new(file))?,
        OutputFormat::Parquet => write_parquet(table, file)?,
    }
    debug!(tmp = %tmp_path.display(), "wrote temporary output");

    fs::rename(tmp_path, path)
        .with_context(|| format!("renaming {} -> {}", tmp_path.display(), path.display()))
}
