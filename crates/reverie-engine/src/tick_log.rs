//! Append-only tick log.
//!
//! One line per tick in the format `tick,scup,zone` (plain CSV, no
//! repeated header), consumed by external analysis and plotting
//! collaborators. Write failures are logged and swallowed: the log is an
//! observability surface, never a reason to stop the tick loop.

use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::Path;

use reverie_core::runner::TickCallback;
use reverie_core::scheduler::Engine;
use reverie_types::TickSummary;
use tracing::warn;

/// Tick callback that appends `tick,scup,zone` lines to a file.
#[derive(Debug)]
pub struct TickLogWriter {
    /// The open append-mode log file.
    file: File,
    /// Whether a write failure has already been reported.
    write_failed: bool,
}

impl TickLogWriter {
    /// Open (or create) the log file in append mode, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, std::io::Error> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file,
            write_failed: false,
        })
    }
}

impl TickCallback for TickLogWriter {
    fn on_tick(&mut self, summary: &TickSummary, _engine: &Engine) {
        let line = format!("{},{:.4},{}\n", summary.tick, summary.scup, summary.zone);
        if let Err(err) = self.file.write_all(line.as_bytes()) {
            // Report the first failure, then stay quiet: a full disk
            // would otherwise flood the log every tick.
            if !self.write_failed {
                warn!(error = %err, "tick log write failed, continuing without log");
                self.write_failed = true;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reverie_core::config::EngineConfig;
    use reverie_types::{Mood, Zone};

    use super::*;

    fn make_summary(tick: u64, scup: f64, zone: Zone) -> TickSummary {
        TickSummary {
            tick,
            scup,
            zone,
            mood: Mood::Calm,
            pulse_heat: 0.5,
            active_sigils: Vec::new(),
            reports: Vec::new(),
        }
    }

    #[test]
    fn writes_one_line_per_tick() {
        let dir = std::env::temp_dir().join("reverie-tick-log-test");
        let path = dir.join("ticks.csv");
        let _ = std::fs::remove_file(&path);

        let engine = Engine::with_default_subsystems(EngineConfig::default());
        let mut writer = TickLogWriter::open(&path).unwrap();

        for tick in 1..=3 {
            writer.on_tick(&make_summary(tick, 0.5, Zone::Active), &engine);
        }
        drop(writer);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.first().copied(), Some("1,0.5000,active"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn appends_across_reopens() {
        let dir = std::env::temp_dir().join("reverie-tick-log-test");
        let path = dir.join("reopen.csv");
        let _ = std::fs::remove_file(&path);

        let engine = Engine::with_default_subsystems(EngineConfig::default());

        let mut writer = TickLogWriter::open(&path).unwrap();
        writer.on_tick(&make_summary(1, 0.9, Zone::Calm), &engine);
        drop(writer);

        let mut writer = TickLogWriter::open(&path).unwrap();
        writer.on_tick(&make_summary(2, 0.2, Zone::Surge), &engine);
        drop(writer);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["1,0.9000,calm", "2,0.2000,surge"]);

        let _ = std::fs::remove_file(&path);
    }
}
