// src/table/mod.rs

pub mod arrow;
pub mod write;

use std::fmt;
use std::str::FromStr;

use crate::error::RenameWarning;

pub use write::{write_csv, write_parquet, write_table, OutputFormat};

/// Grid rows on a plate, A..H.
pub const PLATE_ROWS: usize = 8;
/// Grid columns on a plate, 1..12.
pub const PLATE_COLUMNS: usize = 12;
pub const WELL_COUNT: usize = PLATE_ROWS * PLATE_COLUMNS;

pub const SAMPLE_COLUMN: &str = "Sample";
pub const TIME_COLUMN: &str = "Time (s)";

/// One position on the 8×12 grid. Row is 0-based (A = 0), column is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WellId {
    row: u8,
    column: u8,
}

impl WellId {
    pub fn new(row: usize, column: usize) -> Option<Self> {
        if row < PLATE_ROWS && (1..=PLATE_COLUMNS).contains(&column) {
            Some(Self {
                row: row as u8,
                column: column as u8,
            })
        } else {
            None
        }
    }

    pub fn row(&self) -> usize {
        self.row as usize
    }

    pub fn column(&self) -> usize {
        self.column as usize
    }

    pub fn row_letter(&self) -> char {
        (b'A' + self.row) as char
    }

    /// Position in row-major order (A01 = 0, A12 = 11, B01 = 12, ... H12 = 95).
    pub fn index(&self) -> usize {
        self.row() * PLATE_COLUMNS + self.column() - 1
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::new(index / PLATE_COLUMNS, index % PLATE_COLUMNS + 1)
    }

    /// All 96 wells, A01 through H12.
    pub fn all() -> impl Iterator<Item = WellId> {
        (0..WELL_COUNT).filter_map(WellId::from_index)
    }
}

impl fmt::Display for WellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}", self.row_letter(), self.column)
    }
}

impl FromStr for WellId {
    type Err = RenameWarning;

    /// Accepts `A1`, `a01`, `H12`; the row letter is case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RenameWarning::InvalidWell(s.to_string());
        let s = s.trim();
        let mut chars = s.chars();
        let letter = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
        if !('A'..='H').contains(&letter) {
            return Err(invalid());
        }
        let digits = chars.as_str();
        if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let column: usize = digits.parse().map_err(|_| invalid())?;
        WellId::new(letter as usize - 'A' as usize, column).ok_or_else(invalid)
    }
}

/// One surviving read: which plate it came from, its 96 wells, and its reconstructed time.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledRow {
    pub sample: String,
    pub wells: [Option<f64>; WELL_COUNT],
    pub elapsed_seconds: u64,
}

/// The tidy per-timepoint table.
///
/// Well columns start out labeled `A01`..`H12` in row-major order; the renamer may
/// relabel them, and nothing stops two columns from ending up with the same label.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateTable {
    well_labels: Vec<String>,
    rows: Vec<AssembledRow>,
}

impl PlateTable {
    pub fn new(rows: Vec<AssembledRow>) -> Self {
        Self {
            well_labels: WellId::all().map(|w| w.to_string()).collect(),
            rows,
        }
    }

    pub fn rows(&self) -> &[AssembledRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn well_labels(&self) -> &[String] {
        &self.well_labels
    }

    /// Full header: `Sample`, the 96 well labels, `Time (s)`.
    pub fn headers(&self) -> Vec<&str> {
        std::iter::once(SAMPLE_COLUMN)
            .chain(self.well_labels.iter().map(String::as_str))
            .chain(std::iter::once(TIME_COLUMN))
            .collect()
    }

    /// Relabel every well column for which `lookup` yields a new label.
    /// Returns how many columns changed.
    pub fn rename_columns<F>(&mut self, mut lookup: F) -> usize
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut renamed = 0;
        for label in self.well_labels.iter_mut() {
            if let Some(new_label) = lookup(label) {
                *label = new_label;
                renamed += 1;
            }
        }
        renamed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_ids_cover_the_plate_in_row_major_order() {
        let labels: Vec<String> = WellId::all().map(|w| w.to_string()).collect();
        assert_eq!(labels.len(), 96);
        assert_eq!(labels[0], "A01");
        assert_eq!(labels[11], "A12");
        assert_eq!(labels[12], "B01");
        assert_eq!(labels[95], "H12");
    }

    #[test]
    fn parse_well_ids() {
        assert_eq!("a1".parse::<WellId>().unwrap().to_string(), "A01");
        assert_eq!("B07".parse::<WellId>().unwrap().index(), 18);
        assert_eq!("h12".parse::<WellId>().unwrap().index(), 95);
        for bad in ["", "I01", "A13", "A00", "A001", "1A", "A-1"] {
            assert!(bad.parse::<WellId>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn headers_frame_the_well_columns() {
        let table = PlateTable::new(Vec::new());
        let headers = table.headers();
        assert_eq!(headers.len(), 98);
        assert_eq!(headers[0], "Sample");
        assert_eq!(headers[1], "A01");
        assert_eq!(headers[96], "H12");
        assert_eq!(headers[97], "Time (s)");
    }
}
