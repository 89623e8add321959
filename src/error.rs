// src/error.rs

/// Fatal errors raised while turning a plate export into a table.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The scan walked into more plates than there are labels for.
    #[error("observed more plates than labels provided ({plates} plates, {labels} labels)")]
    Configuration { plates: usize, labels: usize },

    /// The export is truncated or lacks the columns we read from.
    #[error("malformed plate export: {0}")]
    MalformedInput(String),

    /// Reads must be spaced by at least one second.
    #[error("interval must be a positive number of seconds, got {0}")]
    InvalidInterval(u64),

    /// `read * interval` does not fit in the elapsed-seconds column.
    #[error("elapsed time of read {read} at {interval} s spacing overflows")]
    ElapsedOverflow { read: usize, interval: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tab-delimited parse error: {0}")]
    Csv(#[from] csv::Error),
}

/// Non-fatal problems with a rename request. The table is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenameWarning {
    #[error("expected {expected} sample names and got {got}; not renaming")]
    CountMismatch { expected: usize, got: usize },

    #[error("{0:?} is not a well id (A01..H12)")]
    InvalidWell(String),

    #[error("range {top_left}..{bottom_right} runs backwards; give the upper-left well first")]
    ReversedRange {
        top_left: String,
        bottom_right: String,
    },

    #[error("well {0:?} has no sample name paired with it; not renaming")]
    UnpairedToken(String),
}
