// src/config.rs
//
// Run configuration. Either built from CLI flags or loaded from a YAML file:
//
// ```yaml
// plate_labels: [ACMA, CCCP, Na_Iono]
// interval: 5
// range_rename:
//   top_left: B02
//   bottom_right: C04
//   samples: [wt_1, wt_2, wt_3, ko_1, ko_2, ko_3]
// ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::error::ScanError;

/// Reagent order of the sodium flux assay this tool was first written for.
pub const DEFAULT_PLATE_LABELS: &[&str] = &["ACMA", "CCCP", "Na_Iono"];
pub const DEFAULT_INTERVAL_SECS: u64 = 5;

/// How to relabel well columns after assembly. The two strategies are exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameInstructions {
    /// Alternating well id / sample name tokens: `a01 wt b01 ko`.
    Pairs(Vec<String>),
    /// Fill a rectangle of wells row by row with `samples`.
    Range {
        top_left: String,
        bottom_right: String,
        samples: Vec<String>,
    },
}

impl RenameInstructions {
    /// Split CLI range tokens: upper-left well, lower-right well, then sample names.
    pub fn range_from_tokens(tokens: &[String]) -> Result<Self> {
        match tokens {
            [top_left, bottom_right, samples @ ..] => Ok(RenameInstructions::Range {
                top_left: top_left.clone(),
                bottom_right: bottom_right.clone(),
                samples: samples.to_vec(),
            }),
            _ => bail!("range rename needs an upper-left and a lower-right well"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RangeRename {
    pub top_left: String,
    pub bottom_right: String,
    #[serde(default)]
    pub samples: Vec<String>,
}

/// Shape of the YAML file; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    plate_labels: Option<Vec<String>>,
    interval: Option<u64>,
    rename_pairs: Option<Vec<String>>,
    range_rename: Option<RangeRename>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// `plate_labels[i]` names the i-th plate of the run; must cover every plate scanned.
    pub plate_labels: Vec<String>,
    /// Seconds between successive reads.
    pub interval: u64,
    pub rename: Option<RenameInstructions>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            plate_labels: DEFAULT_PLATE_LABELS.iter().map(|s| s.to_string()).collect(),
            interval: DEFAULT_INTERVAL_SECS,
            rename: None,
        }
    }
}

impl RunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("in config file {}", path.display()))
    }

    /// Parse a YAML config; keys left out keep their defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content).context("parsing YAML configuration")?;
        let mut config = RunConfig::default();

        if let Some(labels) = file.plate_labels {
            config.plate_labels = labels;
        }
        if let Some(interval) = file.interval {
            config.interval = interval;
        }
        config.rename = match (file.rename_pairs, file.range_rename) {
            (Some(_), Some(_)) => bail!("rename_pairs and range_rename are mutually exclusive"),
            (Some(pairs), None) => Some(RenameInstructions::Pairs(pairs)),
            (None, Some(r)) => Some(RenameInstructions::Range {
                top_left: r.top_left,
                bottom_right: r.bottom_right,
                samples: r.samples,
            }),
            (None, None) => None,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.interval == 0 {
            return Err(ScanError::InvalidInterval(self.interval));
        }
        Ok(())
    }
}
