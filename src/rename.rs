// src/rename.rs

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::config::RenameInstructions;
use crate::error::RenameWarning;
use crate::table::{PlateTable, WellId};

/// Well column label → sample name.
pub type RenameMap = BTreeMap<String, String>;

/// Underscores are not allowed in sample names downstream; they become hyphens.
fn canonical_sample(name: &str) -> String {
    name.replace('_', "-")
}

fn apply_map(table: &mut PlateTable, map: &RenameMap) -> usize {
    table.rename_columns(|label| map.get(label).cloned())
}

/// Rename wells from alternating `(well id, sample name)` tokens.
///
/// Well ids are upper-cased and must match a column label as written (`A01`, not `A1`).
/// A well named twice keeps the last name. Columns that end up sharing a name are
/// left as separate columns.
pub fn rename_wells(table: &mut PlateTable, tokens: &[String]) -> Result<RenameMap, RenameWarning> {
    if tokens.len() % 2 != 0 {
        // odd length, so there is a last token
        let last = tokens.last().cloned().unwrap_or_default();
        return Err(RenameWarning::UnpairedToken(last));
    }

    let mut map = RenameMap::new();
    for pair in tokens.chunks_exact(2) {
        let well = pair[0].to_uppercase();
        let sample = canonical_sample(&pair[1]);
        if let Some(previous) = map.insert(well.clone(), sample) {
            debug!(well = %well, previous = %previous, "well named twice, keeping the later name");
        }
    }

    for well in map.keys() {
        if !table.well_labels().iter().any(|l| l == well) {
            warn!(well = %well, "no column with this label; ignoring");
        }
    }

    let renamed = apply_map(table, &map);
    info!(renamed, "renamed wells from pairs");
    Ok(map)
}

/// Rename the rectangle `top_left..=bottom_right` row by row (A before B, 01 before 02)
/// with `samples`, in order.
///
/// The number of names must equal the number of wells in the rectangle; otherwise
/// nothing is renamed.
pub fn wells_by_range(
    table: &mut PlateTable,
    top_left: &str,
    bottom_right: &str,
    samples: &[String],
) -> Result<RenameMap, RenameWarning> {
    let start: WellId = top_left.parse()?;
    let end: WellId = bottom_right.parse()?;
    if end.row() < start.row() || end.column() < start.column() {
        return Err(RenameWarning::ReversedRange {
            top_left: start.to_string(),
            bottom_right: end.to_string(),
        });
    }

    let rows = start.row()..=end.row();
    let columns = start.column()..=end.column();
    let expected = rows.clone().count() * columns.clone().count();
    if expected != samples.len() {
        return Err(RenameWarning::CountMismatch {
            expected,
            got: samples.len(),
        });
    }

    let wells = rows.flat_map(|r| columns.clone().filter_map(move |c| WellId::new(r, c)));
    let map: RenameMap = wells
        .zip(samples)
        .map(|(well, sample)| (well.to_string(), canonical_sample(sample)))
        .collect();

    let renamed = apply_map(table, &map);
    info!(renamed, ?map, "renamed wells by range");
    Ok(map)
}

/// Apply whichever rename strategy was requested. `None` leaves the table as is.
pub fn apply_renames(
    table: &mut PlateTable,
    instructions: Option<&RenameInstructions>,
) -> Result<RenameMap, RenameWarning> {
    match instructions {
        None => Ok(RenameMap::new()),
        Some(RenameInstructions::Pairs(tokens)) => rename_wells(table, tokens),
        Some(RenameInstructions::Range {
            top_left,
            bottom_right,
            samples,
        }) => wells_by_range(table, top_left, bottom_right, samples),
    }
}
