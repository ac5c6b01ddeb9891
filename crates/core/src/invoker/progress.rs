//! Log line splitting and coarse progress tracking.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use super::types::ConversionJob;

/// ffmpeg's status line carries the processed position as `time=HH:MM:SS.ms`.
static TIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"time=(\d+:\d+:\d+\.\d+)").expect("time pattern is valid"));

/// Returns the timestamp in an ffmpeg status line, if there is one.
pub fn parse_timestamp(line: &str) -> Option<&str> {
    TIME_PATTERN
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// State of one batch: the jobs, which one is running, and the progress shown so far.
#[derive(Debug)]
pub struct BatchState {
    jobs: Vec<ConversionJob>,
    current: usize,
    percent: u8,
}

impl BatchState {
    pub fn new(jobs: Vec<ConversionJob>) -> Self {
        Self {
            jobs,
            current: 0,
            percent: 0,
        }
    }

    /// Number of jobs in the batch.
    pub fn total(&self) -> usize {
        self.jobs.len()
    }

    /// 1-based index of the running job, 0 before the first one starts.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Moves to the next job and returns it.
    pub fn start_next(&mut self) -> Option<ConversionJob> {
        let job = self.jobs.get(self.current).cloned()?;
        self.current += 1;
        Some(job)
    }

    /// Records that the running job reported a timestamp and returns the
    /// batch percentage to show.
    ///
    /// The value is `100 * index / total` for the running job, never lower
    /// than anything returned before.
    pub fn record_timestamp(&mut self) -> u8 {
        let total = self.total().max(1) as u64;
        let file_percent = (100 * self.current as u64 / total).min(100) as u8;
        self.percent = self.percent.max(file_percent);
        self.percent
    }

    /// Last percentage returned by [`record_timestamp`](Self::record_timestamp).
    pub fn percent(&self) -> u8 {
        self.percent
    }
}

/// Line reader over process output.
///
/// `\n`, `\r\n` and a lone `\r` all end a line, so ffmpeg's carriage-return
/// status updates arrive one at a time instead of as one long line at exit.
pub struct LogLines<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
    skip_lf: bool,
}

impl<R: AsyncRead + Unpin> LogLines<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            buf: Vec::new(),
            skip_lf: false,
        }
    }

    /// Returns the next line without its terminator, or `None` at end of stream.
    pub async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(self.take_line()));
            }

            let mut start = 0;
            if self.skip_lf {
                self.skip_lf = false;
                if available[0] == b'\n' {
                    start = 1;
                }
            }

            match available[start..]
                .iter()
                .position(|b| *b == b'\n' || *b == b'\r')
            {
                Some(pos) => {
                    let end = start + pos;
                    self.buf.extend_from_slice(&available[start..end]);
                    self.skip_lf = available[end] == b'\r';
                    self.reader.consume(end + 1);
                    return Ok(Some(self.take_line()));
                }
                None => {
                    let len = available.len();
                    self.buf.extend_from_slice(&available[start..]);
                    self.reader.consume(len);
                }
            }
        }
    }

    fn take_line(&mut self) -> String {
        let line = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::types::ConversionOptions;
    use std::path::Path;
    use std::sync::Arc;

    fn jobs(n: usize) -> Vec<ConversionJob> {
        let options = Arc::new(ConversionOptions::default());
        (1..=n)
            .map(|i| {
                ConversionJob::new(
                    i,
                    format!("in{}.mov", i),
                    Path::new("/out"),
                    "mp4",
                    Arc::clone(&options),
                )
            })
            .collect()
    }

    async fn collect_lines(input: &[u8]) -> Vec<String> {
        let mut lines = LogLines::new(input);
        let mut out = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            out.push(line);
        }
        out
    }

    #[test]
    fn test_parse_timestamp() {
        let line = "frame=  240 fps= 60 q=28.0 size=    1024kB time=00:00:08.01 bitrate=1047.2kbits/s speed=2.01x";
        assert_eq!(parse_timestamp(line), Some("00:00:08.01"));
        assert_eq!(parse_timestamp("size=N/A time=01:02:03.456 bitrate=N/A"), Some("01:02:03.456"));
    }

    #[test]
    fn test_parse_timestamp_no_match() {
        assert_eq!(parse_timestamp("Input #0, mov,mp4,m4a, from 'a.mov':"), None);
        assert_eq!(parse_timestamp("time=N/A bitrate=N/A"), None);
        assert_eq!(parse_timestamp("Duration: 00:01:00.00, start: 0.000000"), None);
    }

    #[test]
    fn test_batch_state_progress() {
        let mut state = BatchState::new(jobs(4));
        assert_eq!(state.total(), 4);
        assert_eq!(state.current_index(), 0);

        let first = state.start_next().unwrap();
        assert_eq!(first.index, 1);
        assert_eq!(state.record_timestamp(), 25);
        assert_eq!(state.record_timestamp(), 25);

        state.start_next();
        assert_eq!(state.record_timestamp(), 50);

        state.start_next();
        state.start_next();
        assert_eq!(state.record_timestamp(), 100);
        assert!(state.start_next().is_none());
        assert_eq!(state.percent(), 100);
    }

    #[test]
    fn test_batch_state_truncates() {
        let mut state = BatchState::new(jobs(3));
        state.start_next();
        assert_eq!(state.record_timestamp(), 33);
        state.start_next();
        assert_eq!(state.record_timestamp(), 66);
        state.start_next();
        assert_eq!(state.record_timestamp(), 100);
    }

    #[test]
    fn test_batch_state_without_timestamps() {
        let mut state = BatchState::new(jobs(2));
        state.start_next();
        state.start_next();
        assert_eq!(state.percent(), 0);
    }

    #[tokio::test]
    async fn test_log_lines_newlines() {
        let lines = collect_lines(b"first\nsecond\n\nlast").await;
        assert_eq!(lines, vec!["first", "second", "", "last"]);
    }

    #[tokio::test]
    async fn test_log_lines_carriage_returns() {
        let lines = collect_lines(b"time=00:00:01.00\rtime=00:00:02.00\r\ndone\r\n").await;
        assert_eq!(lines, vec!["time=00:00:01.00", "time=00:00:02.00", "done"]);
    }

    #[tokio::test]
    async fn test_log_lines_empty_stream() {
        assert!(collect_lines(b"").await.is_empty());
    }
}
