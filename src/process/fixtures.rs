// src/process/fixtures.rs
//
// Synthetic plate exports shaped like the reader's tab-delimited output.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::table::{PLATE_COLUMNS, PLATE_ROWS};

pub fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,plateflux=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// One instrument read of a plate.
#[derive(Debug, Clone, Copy)]
pub enum Read {
    /// Every well holds `base + well index` (A01 = base, H12 = base + 95).
    Filled(f64),
    /// The instrument wrote a time but measured nothing.
    Ghost,
}

impl Read {
    pub fn filled(base: f64) -> Self {
        Read::Filled(base)
    }
}

pub fn title_line() -> String {
    let wells: Vec<String> = (1..=PLATE_COLUMNS).map(|c| c.to_string()).collect();
    format!("Time(hh:mm:ss)\tTemperature(°C)\t{}\n", wells.join("\t"))
}

fn grid_lines(out: &mut String, time: &str, read: Read) {
    for row in 0..PLATE_ROWS {
        let (time, temp) = if row == 0 { (time, "25.0") } else { ("", "") };
        let wells: Vec<String> = (0..PLATE_COLUMNS)
            .map(|col| match read {
                Read::Filled(base) => (base + (row * PLATE_COLUMNS + col) as f64).to_string(),
                Read::Ghost => String::new(),
            })
            .collect();
        out.push_str(&format!("{}\t{}\t{}\n", time, temp, wells.join("\t")));
    }
}

/// Build an export with one block per plate. Each plate re-emits the title line,
/// reads are 5 s apart, and every block ends with `~End`.
pub fn export_text(plates: &[Vec<Read>]) -> String {
    let mut out = format!("##BLOCKS= {}\nPlate:\tPlate1\tKinetic\n", plates.len());
    let mut seconds = 0;
    for (i, reads) in plates.iter().enumerate() {
        if i > 0 {
            out.push_str(&format!("Plate:\tPlate{}\tKinetic\n", i + 1));
        }
        out.push_str(&title_line());
        for read in reads {
            let time = format!("{}:{:02}:{:02}", seconds / 3600, seconds / 60 % 60, seconds % 60);
            grid_lines(&mut out, &time, *read);
            seconds += 5;
        }
        out.push_str("~End\n");
    }
    out
}
