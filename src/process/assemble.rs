// src/process/assemble.rs

use tracing::debug;

use super::scan::Snapshot;
use crate::error::ScanError;
use crate::table::{AssembledRow, PlateTable};

/// Turn scanned snapshots into the tidy table.
///
/// The instrument logs a timestamp even for reads it never performed, so its clock is
/// not trusted: ghost reads are dropped, survivors are renumbered from 0, and each
/// row's time is its new position times `interval` seconds.
///
/// Fails with [`ScanError::ElapsedOverflow`] if a row's time does not fit in `u64`.
pub fn assemble(snapshots: Vec<Snapshot>, interval: u64) -> Result<PlateTable, ScanError> {
    let scanned = snapshots.len();

    let rows = snapshots
        .into_iter()
        .filter(|s| !s.is_ghost())
        .enumerate()
        .map(|(i, s)| {
            let elapsed_seconds = (i as u64)
                .checked_mul(interval)
                .ok_or(ScanError::ElapsedOverflow { read: i, interval })?;
            Ok(AssembledRow {
                sample: s.plate_label,
                wells: s.wells,
                elapsed_seconds,
            })
        })
        .collect::<Result<Vec<_>, ScanError>>()?;

    debug!(
        scanned,
        kept = rows.len(),
        ghosts = scanned - rows.len(),
        "dropped ghost reads"
    );
    Ok(PlateTable::new(rows))
}
