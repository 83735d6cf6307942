//! Reader for ffmpeg's `-progress pipe:2` key/value stream.
//!
//! ffmpeg writes one `key=value` pair per line and closes each block with
//! `progress=continue` or `progress=end`. Human-readable diagnostics share
//! the same pipe, so the runner first asks [`is_progress_line`] and keeps
//! everything else for error reports.

use std::time::Duration;

/// Snapshot taken at the end of a progress block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodeProgress {
    pub frame: u64,
    /// Timestamp of the last encoded output frame.
    pub position: Duration,
    /// Realtime multiple; `None` until ffmpeg has a measurement.
    pub speed: Option<f64>,
    pub finished: bool,
}

impl EncodeProgress {
    /// Share of `total` already encoded, within `0.0..=1.0`.
    pub fn fraction_of(&self, total: Duration) -> f64 {
        if total.is_zero() {
            return 0.0;
        }
        (self.position.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Default)]
pub(crate) struct ProgressParser {
    current: EncodeProgress,
}

impl ProgressParser {
    /// Feed one line. Returns a snapshot when the line closes a block.
    pub(crate) fn feed(&mut self, line: &str) -> Option<EncodeProgress> {
        let (key, value) = line.trim().split_once('=')?;
        match key {
            // Both carry microseconds in current builds
            "out_time_us" | "out_time_ms" => {
                if let Ok(us) = value.parse::<u64>() {
                    self.current.position = Duration::from_micros(us);
                }
            }
            "frame" => {
                if let Ok(frame) = value.parse() {
                    self.current.frame = frame;
                }
            }
            "speed" => {
                self.current.speed = value.strip_suffix('x').and_then(|s| s.trim().parse().ok());
            }
            "progress" => {
                self.current.finished = value == "end";
                return Some(self.current.clone());
            }
            _ => {}
        }
        None
    }
}

/// `key=value` with a bare key. Diagnostics such as
/// `Error opening input: x=y` contain spaces before the `=`.
pub(crate) fn is_progress_line(line: &str) -> bool {
    line.trim()
        .split_once('=')
        .is_some_and(|(key, _)| !key.is_empty() && !key.contains(' '))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_snapshots() {
        let mut parser = ProgressParser::default();
        assert!(parser.feed("frame=48").is_none());
        assert!(parser.feed("out_time_us=2000000").is_none());
        assert!(parser.feed("speed=1.5x").is_none());

        let snapshot = parser.feed("progress=continue").unwrap();
        assert_eq!(snapshot.frame, 48);
        assert_eq!(snapshot.position, Duration::from_secs(2));
        assert_eq!(snapshot.speed, Some(1.5));
        assert!(!snapshot.finished);

        parser.feed("speed=N/A");
        let last = parser.feed("progress=end").unwrap();
        assert_eq!(last.speed, None);
        assert!(last.finished);
    }

    #[test]
    fn test_fraction_is_clamped() {
        let progress = EncodeProgress {
            position: Duration::from_secs(5),
            ..Default::default()
        };
        assert!((progress.fraction_of(Duration::from_secs(10)) - 0.5).abs() < 1e-9);
        assert_eq!(progress.fraction_of(Duration::from_secs(4)), 1.0);
        assert_eq!(progress.fraction_of(Duration::ZERO), 0.0);
    }

    #[test]
    fn test_progress_line_detection() {
        assert!(is_progress_line("frame=120"));
        assert!(is_progress_line("progress=continue"));
        assert!(!is_progress_line("Invalid data found when processing input"));
        assert!(!is_progress_line("Error opening input: x=y z"));
    }
}
