//! File replay: feeds recorded sensor lines through the reading channel.
//!
//! A reader thread decodes one line at a time and blocks on the bounded
//! channel, so the tick loop consumes the recording at its own pace.

use echoscan_env::{decode_line, EnvError, ReadingSender};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::thread::JoinHandle;
use tracing::{debug, info};

/// Line counts from one replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Lines read
    pub lines: u64,

    /// Lines decoded and sent
    pub sent: u64,

    /// Lines that did not decode
    pub skipped: u64,
}

/// Decodes every line of `reader` and sends it.
///
/// Stops early, without error, if the receiving side goes away.
pub fn replay_lines<R: BufRead>(reader: R, sender: &ReadingSender) -> Result<ReplayStats, EnvError> {
    let mut stats = ReplayStats::default();
    for line in reader.lines() {
        let line = line?;
        stats.lines += 1;
        match decode_line(&line) {
            Ok(reading) => {
                if sender.blocking_send(reading).is_err() {
                    debug!("Replay receiver closed after {} lines", stats.lines);
                    break;
                }
                stats.sent += 1;
            }
            Err(e) => {
                stats.skipped += 1;
                debug!("Skipping line {}: {}", stats.lines, e);
            }
        }
    }
    Ok(stats)
}

/// Spawns a thread replaying `path` into `sender`.
///
/// The channel closes when the thread finishes and drops the sender.
pub fn spawn_replay(path: PathBuf, sender: ReadingSender) -> JoinHandle<Result<ReplayStats, EnvError>> {
    std::thread::spawn(move || {
        let file = File::open(&path)?;
        let stats = replay_lines(BufReader::new(file), &sender)?;
        info!(
            "Replay of {} finished: {} lines, {} sent, {} skipped",
            path.display(),
            stats.lines,
            stats.sent,
            stats.skipped
        );
        Ok(stats)
    })
}
