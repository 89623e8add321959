// src/process/mod.rs

pub mod assemble;
pub mod classify;
pub mod scan;

#[cfg(test)]
pub(crate) mod fixtures;

use csv::ReaderBuilder;
use std::{fs, io::Read, path::Path};
use tracing::{debug, info, instrument, trace};

use crate::config::RunConfig;
use crate::error::ScanError;
use crate::table::{PlateTable, PLATE_COLUMNS};

pub use assemble::assemble;
pub use classify::{classify_row, RowKind, TIME_COLUMN_TITLE};
pub use scan::{scan_plates, Snapshot};

/// Lines of instrument banner preceding the column-title line.
pub const BANNER_LINES: usize = 2;

/// One line of the export: its time field and the fields under column titles `1`..`12`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub time: String,
    pub wells: [Option<String>; PLATE_COLUMNS],
}

/// Where the time field and the twelve well fields sit in each record.
#[derive(Debug, Clone, Copy)]
struct ColumnLayout {
    time: usize,
    wells: [usize; PLATE_COLUMNS],
}

impl ColumnLayout {
    /// Resolve positions by title from the column-title record.
    fn from_titles(titles: &csv::StringRecord) -> Result<Self, ScanError> {
        let find = |title: &str| titles.iter().position(|t| t.trim() == title);

        let time = find(TIME_COLUMN_TITLE).ok_or_else(|| {
            ScanError::MalformedInput(format!("no {:?} column in the title line", TIME_COLUMN_TITLE))
        })?;

        let mut wells = [0usize; PLATE_COLUMNS];
        for (i, slot) in wells.iter_mut().enumerate() {
            let title = (i + 1).to_string();
            *slot = find(title.as_str()).ok_or_else(|| {
                ScanError::MalformedInput(format!("no well column titled {:?}", title))
            })?;
        }

        Ok(Self { time, wells })
    }

    fn extract(&self, record: &csv::StringRecord) -> RawRow {
        RawRow {
            time: record.get(self.time).unwrap_or_default().trim().to_string(),
            wells: self
                .wells
                .map(|idx| record.get(idx).map(|s| s.trim().to_string())),
        }
    }
}

/// Byte offset just past the first `n` lines of `text` (or the end of `text`).
fn skip_lines(text: &str, n: usize) -> usize {
    text.split_inclusive('\n').take(n).map(str::len).sum()
}

/// Parse a tab-delimited plate export into rows, in file order.
///
/// - skips the two banner lines,
/// - takes the next non-blank line as the column titles,
/// - blank lines are dropped; short lines leave trailing well fields as `None`.
pub fn parse_plate_export<R: Read>(mut reader: R) -> Result<Vec<RawRow>, ScanError> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    // exports are not reliably UTF-8 (the temperature column title carries a degree sign)
    let text = String::from_utf8_lossy(&buf);
    let body = &text[skip_lines(&text, BANNER_LINES)..];

    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut records = rdr.records();
    let titles = match records.next() {
        Some(rec) => rec?,
        None => {
            return Err(ScanError::MalformedInput(
                "no column-title line after the banner".into(),
            ))
        }
    };
    let layout = ColumnLayout::from_titles(&titles)?;
    trace!(?layout, "resolved column layout");

    let mut rows = Vec::new();
    for record in records {
        rows.push(layout.extract(&record?));
    }
    debug!(rows = rows.len(), "parsed plate export");
    Ok(rows)
}

#[instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_plate_file<P: AsRef<Path>>(path: P) -> Result<Vec<RawRow>, ScanError> {
    let file = fs::File::open(path.as_ref())?;
    parse_plate_export(file)
}

/// Read one export end to end: load → scan → assemble.
///
/// Any scan failure aborts before a table exists, so callers never see partial output.
#[instrument(level = "info", skip(path, config), fields(path = %path.as_ref().display()))]
pub fn collect_data<P: AsRef<Path>>(path: P, config: &RunConfig) -> Result<PlateTable, ScanError> {
    config.validate()?;

    info!("reading plate file");
    let rows = load_plate_file(&path)?;

    info!("assembling plate reads");
    let snapshots = scan_plates(&rows, &config.plate_labels)?;
    let table = assemble(snapshots, config.interval)?;

    info!(reads = table.len(), "done reading file");
    Ok(table)
}
