// src/process/scan.rs

use tracing::{debug, trace};

use super::classify::{classify_row, RowKind};
use super::RawRow;
use crate::error::ScanError;
use crate::table::{PLATE_COLUMNS, PLATE_ROWS, WELL_COUNT};

/// One full 8×12 grid read, tagged with the label of the plate it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub plate_label: String,
    /// Row-major: A01..A12, B01..B12, ... H12.
    pub wells: [Option<f64>; WELL_COUNT],
}

impl Snapshot {
    /// True when the instrument logged the read but no well holds a value.
    pub fn is_ghost(&self) -> bool {
        self.wells.iter().all(Option::is_none)
    }
}

/// Empty, non-numeric and `NaN` fields are all missing.
fn parse_well(field: Option<&str>) -> Option<f64> {
    let s = field?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Read `block` (exactly 8 rows) as grid rows A..H.
fn read_grid(plate_label: &str, block: &[RawRow]) -> Snapshot {
    let mut wells = [None; WELL_COUNT];
    for (k, row) in block.iter().enumerate() {
        for (c, field) in row.wells.iter().enumerate() {
            wells[k * PLATE_COLUMNS + c] = parse_well(field.as_deref());
        }
    }
    Snapshot {
        plate_label: plate_label.to_string(),
        wells,
    }
}

/// Walk the rows once and cut one snapshot per timed-read row.
///
/// `plate_labels[i]` names the i-th plate of the run. The column-title line the loader
/// consumed opens plate 0; every later title line opens the next plate, except that a
/// title line directly following another one counts once. A plate with no reads still
/// takes its label, so later plates keep theirs.
///
/// Ghost reads are emitted like any other; dropping them is the assembler's call.
pub fn scan_plates(rows: &[RawRow], plate_labels: &[String]) -> Result<Vec<Snapshot>, ScanError> {
    let mut plate = 0usize;
    // the loader's column-title line is the header before rows[0]
    let mut previous_was_header = true;
    let mut snapshots = Vec::new();

    for (r, row) in rows.iter().enumerate() {
        let kind = classify_row(row);
        match kind {
            RowKind::Header if !previous_was_header => {
                plate += 1;
                debug!(plate, row = r, "plate boundary");
            }
            RowKind::Header => {
                trace!(row = r, "repeated title line, plate unchanged");
            }
            RowKind::TimedRead => {
                let label = plate_labels.get(plate).ok_or(ScanError::Configuration {
                    plates: plate + 1,
                    labels: plate_labels.len(),
                })?;
                let block = rows.get(r..r + PLATE_ROWS).ok_or_else(|| {
                    ScanError::MalformedInput(format!(
                        "read at {:?} (row {}) needs {} grid rows, only {} remain",
                        row.time,
                        r,
                        PLATE_ROWS,
                        rows.len() - r
                    ))
                })?;
                trace!(row = r, time = %row.time, plate = %label, "read");
                snapshots.push(read_grid(label, block));
            }
            RowKind::Other => {}
        }
        previous_was_header = kind == RowKind::Header;
    }

    debug!(snapshots = snapshots.len(), plates = plate + 1, "scan finished");
    Ok(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::fixtures::{export_text, Read};
    use crate::process::parse_plate_export;
    use anyhow::Result;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn timed(time: &str, value: &str) -> RawRow {
        RawRow {
            time: time.into(),
            wells: std::array::from_fn(|_| Some(value.to_string())),
        }
    }

    fn blank() -> RawRow {
        RawRow::default()
    }

    fn header() -> RawRow {
        RawRow {
            time: "Time(hh:mm:ss)".into(),
            wells: std::array::from_fn(|c| Some((c + 1).to_string())),
        }
    }

    fn grid(time: &str, value: &str) -> Vec<RawRow> {
        let mut rows = vec![timed(time, value)];
        rows.extend((1..PLATE_ROWS).map(|_| timed("", value)));
        rows
    }

    #[test]
    fn grid_rows_map_to_letters() -> Result<()> {
        let text = export_text(&[vec![Read::filled(0.0)]]);
        let rows = parse_plate_export(text.as_bytes())?;
        let snaps = scan_plates(&rows, &labels(&["ACMA"]))?;

        assert_eq!(snaps.len(), 1);
        let wells = &snaps[0].wells;
        for (i, w) in wells.iter().enumerate() {
            assert_eq!(*w, Some(i as f64), "well index {i}");
        }
        assert_eq!(snaps[0].plate_label, "ACMA");
        Ok(())
    }

    #[test]
    fn ghost_reads_are_emitted() -> Result<()> {
        let text = export_text(&[vec![Read::filled(1.0), Read::Ghost, Read::filled(2.0)]]);
        let rows = parse_plate_export(text.as_bytes())?;
        let snaps = scan_plates(&rows, &labels(&["ACMA"]))?;

        assert_eq!(snaps.len(), 3);
        assert!(!snaps[0].is_ghost());
        assert!(snaps[1].is_ghost());
        assert!(!snaps[2].is_ghost());
        Ok(())
    }

    #[test]
    fn header_advances_plate() -> Result<()> {
        let mut rows = grid("0:05", "1");
        rows.push(header());
        rows.extend(grid("0:10", "2"));
        rows.push(header());
        rows.extend(grid("0:15", "3"));

        let snaps = scan_plates(&rows, &labels(&["ACMA", "CCCP", "Na_Iono"]))?;
        let plates: Vec<&str> = snaps.iter().map(|s| s.plate_label.as_str()).collect();
        assert_eq!(plates, vec!["ACMA", "CCCP", "Na_Iono"]);
        Ok(())
    }

    #[test]
    fn consecutive_headers_count_once() -> Result<()> {
        let mut rows = grid("0:05", "1");
        rows.push(header());
        rows.push(header());
        rows.push(header());
        rows.extend(grid("0:10", "2"));

        let snaps = scan_plates(&rows, &labels(&["ACMA", "CCCP"]))?;
        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps[1].plate_label, "CCCP");
        Ok(())
    }

    #[test]
    fn headers_split_by_plate_trailer_count_twice() -> Result<()> {
        let mut rows = grid("0:05", "1");
        rows.push(header());
        rows.push(timed("~End", ""));
        rows.push(timed("Plate:", ""));
        rows.push(header());
        rows.extend(grid("0:10", "2"));

        let snaps = scan_plates(&rows, &labels(&["ACMA", "CCCP", "Na_Iono"]))?;
        assert_eq!(snaps[1].plate_label, "Na_Iono");
        Ok(())
    }

    #[test]
    fn plate_without_reads_keeps_its_label() -> Result<()> {
        let text = export_text(&[
            vec![Read::filled(1.0)],
            vec![],
            vec![Read::filled(2.0)],
        ]);
        let rows = parse_plate_export(text.as_bytes())?;
        let snaps = scan_plates(&rows, &labels(&["ACMA", "CCCP", "Na_Iono"]))?;

        let plates: Vec<&str> = snaps.iter().map(|s| s.plate_label.as_str()).collect();
        assert_eq!(plates, vec!["ACMA", "Na_Iono"]);
        Ok(())
    }

    #[test]
    fn plate_without_reads_still_needs_a_label() -> Result<()> {
        let text = export_text(&[vec![Read::filled(1.0)], vec![], vec![Read::filled(2.0)]]);
        let rows = parse_plate_export(text.as_bytes())?;
        let err = scan_plates(&rows, &labels(&["ACMA", "CCCP"])).unwrap_err();
        assert!(matches!(
            err,
            ScanError::Configuration {
                plates: 3,
                labels: 2
            }
        ));
        Ok(())
    }

    #[test]
    fn leading_header_does_not_skip_a_plate() -> Result<()> {
        let mut rows = vec![header()];
        rows.extend(grid("0:05", "1"));

        let snaps = scan_plates(&rows, &labels(&["ACMA"]))?;
        assert_eq!(snaps[0].plate_label, "ACMA");
        Ok(())
    }

    #[test]
    fn more_plates_than_labels_is_a_configuration_error() {
        let mut rows = grid("0:05", "1");
        rows.push(header());
        rows.extend(grid("0:10", "2"));

        let err = scan_plates(&rows, &labels(&["ACMA"])).unwrap_err();
        assert!(matches!(
            err,
            ScanError::Configuration {
                plates: 2,
                labels: 1
            }
        ));
        assert!(err.to_string().contains("more plates than labels"));
    }

    #[test]
    fn truncated_grid_is_malformed() {
        let mut rows = grid("0:05", "1");
        rows.truncate(5);
        let err = scan_plates(&rows, &labels(&["ACMA"])).unwrap_err();
        assert!(matches!(err, ScanError::MalformedInput(_)));
    }

    #[test]
    fn non_numeric_wells_are_missing() -> Result<()> {
        let mut rows = grid("0:05", "OVRFLW");
        rows[3].wells[4] = Some("17.5".into());
        rows[7].wells[11] = Some("NaN".into());

        let snaps = scan_plates(&rows, &labels(&["ACMA"]))?;
        let present: Vec<(usize, f64)> = snaps[0]
            .wells
            .iter()
            .enumerate()
            .filter_map(|(i, w)| w.map(|v| (i, v)))
            .collect();
        assert_eq!(present, vec![(3 * 12 + 4, 17.5)]);
        Ok(())
    }

    #[test]
    fn no_reads_no_snapshots() -> Result<()> {
        let rows = vec![blank(), header(), blank()];
        assert!(scan_plates(&rows, &[])?.is_empty());
        Ok(())
    }
}
