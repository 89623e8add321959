// src/process/classify.rs

use once_cell::sync::Lazy;
use regex::Regex;

use super::RawRow;

/// Title of the time column. The instrument re-emits it as a data row at every plate change.
pub const TIME_COLUMN_TITLE: &str = "Time(hh:mm:ss)";

/// A read row starts with `m:ss` or `mm:ss`; anything after that (`0:04:05`) is ignored.
static TIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,2}:[0-9]{2}").expect("time pattern should compile"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// The column titles again: a new plate is starting.
    Header,
    /// First row (grid row A) of one read of the plate.
    TimedRead,
    /// Grid rows B..H, blank spacer rows, plate banners.
    Other,
}

pub fn classify_row(row: &RawRow) -> RowKind {
    let time = row.time.trim();
    if time == TIME_COLUMN_TITLE {
        RowKind::Header
    } else if TIME_PATTERN.is_match(time) {
        RowKind::TimedRead
    } else {
        RowKind::Other
    }
}
