//! Batch lifecycle integration tests.
//!
//! These tests run real child processes against a shell script standing in
//! for ffmpeg:
//! - One invocation per input, in input order
//! - Progress derived from `time=` status lines
//! - Exactly one completion event, after the last child exits
//! - Encoding flags and `PATH` reaching the child
//! - One batch at a time

#![cfg(unix)]

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use tempfile::TempDir;

use vconv_core::{
    invoker::{BatchEvent, BatchHandle, ConversionOptions, GpuMode, VideoCodec},
    provisioner::prepend_search_path,
    testing::fixtures,
    BatchController, BatchInvoker, BatchRequest, InvokerConfig, InvokerError,
};

/// One fake binary per test process, written before any test spawns a child.
static FAKE_FFMPEG: Lazy<(TempDir, PathBuf)> = Lazy::new(|| {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = fixtures::install_fake_ffmpeg(dir.path()).expect("Failed to write fake ffmpeg");
    (dir, path)
});

fn controller(config: InvokerConfig) -> BatchController {
    BatchController::new(BatchInvoker::new(FAKE_FFMPEG.1.clone(), config))
}

fn request(inputs: &[&str], output_dir: &Path, options: ConversionOptions) -> BatchRequest {
    BatchRequest::new(
        inputs.iter().map(PathBuf::from).collect(),
        output_dir,
        "mp4",
        options,
    )
}

/// Drains every event, then waits for the batch task.
async fn finish(mut batch: BatchHandle) -> (Result<(), InvokerError>, Vec<BatchEvent>) {
    let mut events = Vec::new();
    while let Some(envelope) = batch.next_event().await {
        assert_eq!(envelope.batch_id, batch.batch_id());
        events.push(envelope.event);
    }
    (batch.join().await, events)
}

fn log_lines(events: &[BatchEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|event| match event {
            BatchEvent::Log { line } => Some(line.as_str()),
            _ => None,
        })
        .collect()
}

fn percents(events: &[BatchEvent]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|event| match event {
            BatchEvent::Progress { percent } => Some(*percent),
            _ => None,
        })
        .collect()
}

/// Arguments the fake binary recorded in its output file.
fn recorded_args(output: &Path) -> Vec<String> {
    std::fs::read_to_string(output)
        .unwrap_or_else(|e| panic!("missing output {:?}: {}", output, e))
        .lines()
        .map(str::to_string)
        .collect()
}

fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
    args.windows(2).any(|pair| pair[0] == flag && pair[1] == value)
}

#[tokio::test]
async fn test_inputs_converted_in_order() {
    let out = TempDir::new().unwrap();
    let controller = controller(InvokerConfig::default());

    let batch = controller
        .start(request(&["a.mov", "b.mov"], out.path(), ConversionOptions::default()))
        .unwrap();
    let (result, events) = finish(batch).await;
    tokio_test::assert_ok!(result);

    let a_out = out.path().join("a.mp4");
    let b_out = out.path().join("b.mp4");

    let starts: Vec<&str> = log_lines(&events)
        .into_iter()
        .filter(|line| line.starts_with("Starting conversion:"))
        .collect();
    assert_eq!(starts.len(), 2);
    assert!(starts[0].starts_with(&format!("Starting conversion: a.mov -> {}", a_out.display())));
    assert!(starts[1].starts_with(&format!("Starting conversion: b.mov -> {}", b_out.display())));
    assert!(starts[0].contains("-i a.mov"));
    assert!(starts[0].contains(&format!("{}", a_out.display())));

    let a_args = recorded_args(&a_out);
    assert_eq!(a_args.first().map(String::as_str), Some("-i"));
    assert!(!a_args.contains(&"-y".to_string()));
    assert!(has_pair(&a_args, "-i", "a.mov"));
    assert_eq!(a_args.last(), Some(&a_out.display().to_string()));

    let b_args = recorded_args(&b_out);
    assert!(has_pair(&b_args, "-i", "b.mov"));
    assert_eq!(b_args.last(), Some(&b_out.display().to_string()));
}

#[tokio::test]
async fn test_progress_is_monotonic_and_completes_once() {
    let out = TempDir::new().unwrap();
    let controller = controller(InvokerConfig::default());

    let batch = controller
        .start(request(&["a.mov", "b.mov"], out.path(), ConversionOptions::default()))
        .unwrap();
    let (result, events) = finish(batch).await;
    tokio_test::assert_ok!(result);

    let values = percents(&events);
    assert!(!values.is_empty());
    assert!(values.windows(2).all(|w| w[0] <= w[1]), "{:?}", values);
    assert_eq!(values.first(), Some(&50));
    assert_eq!(values.last(), Some(&100));

    // 100 is only reached once the second file is running.
    let second_start = events
        .iter()
        .position(|e| matches!(e, BatchEvent::Log { line } if line.starts_with("Starting conversion: b.mov")))
        .unwrap();
    let first_full = events
        .iter()
        .position(|e| *e == BatchEvent::Progress { percent: 100 })
        .unwrap();
    assert!(first_full > second_start);

    let completions: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, BatchEvent::Completed { .. }))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(completions, vec![events.len() - 1]);
    assert_eq!(events.last(), Some(&BatchEvent::Completed { files: 2 }));
}

#[tokio::test]
async fn test_no_status_lines_means_no_progress() {
    let out = TempDir::new().unwrap();
    let controller = controller(InvokerConfig::default());

    let batch = controller
        .start(request(
            &["quiet_a.mov", "quiet_b.mov"],
            out.path(),
            ConversionOptions::default(),
        ))
        .unwrap();
    let (result, events) = finish(batch).await;
    tokio_test::assert_ok!(result);

    assert!(percents(&events).is_empty());
    assert!(log_lines(&events).contains(&"no status output"));
    assert_eq!(events.last(), Some(&BatchEvent::Completed { files: 2 }));
}

#[tokio::test]
async fn test_status_lines_split_on_carriage_return() {
    let out = TempDir::new().unwrap();
    let controller = controller(InvokerConfig::default());

    let batch = controller
        .start(request(&["clip.mov"], out.path(), ConversionOptions::default()))
        .unwrap();
    let (_, events) = finish(batch).await;

    let status: Vec<&str> = log_lines(&events)
        .into_iter()
        .filter(|line| line.contains("time="))
        .collect();
    assert_eq!(status.len(), 2);
    assert!(status[0].contains("time=00:00:00.40"));
    assert!(!status[0].contains('\r'));
    assert!(status[1].contains("time=00:00:02.00"));
    assert_eq!(percents(&events), vec![100, 100]);
}

#[tokio::test]
async fn test_stdout_and_stderr_keep_write_order() {
    let out = TempDir::new().unwrap();
    let controller = controller(InvokerConfig::default());

    for _ in 0..5 {
        let batch = controller
            .start(request(&["interleave.mov"], out.path(), ConversionOptions::default()))
            .unwrap();
        let (result, events) = finish(batch).await;
        tokio_test::assert_ok!(result);

        let relayed: Vec<&str> = log_lines(&events)
            .into_iter()
            .filter(|line| line.starts_with("out") || line.starts_with("err"))
            .collect();
        let expected: Vec<String> = (1..=10)
            .flat_map(|i| [format!("out{}", i), format!("err{}", i)])
            .collect();
        assert_eq!(relayed, expected);
    }
}

#[tokio::test]
async fn test_encoding_flags_reach_binary() {
    let out = TempDir::new().unwrap();
    let controller = controller(InvokerConfig::default());
    let options = ConversionOptions::default()
        .with_resolution("1920x1080")
        .with_bitrate("4M")
        .with_codec(VideoCodec::Libx264)
        .with_gpu(GpuMode::Nvenc);

    let batch = controller
        .start(request(&["movie.mkv"], out.path(), options))
        .unwrap();
    let (result, _) = finish(batch).await;
    tokio_test::assert_ok!(result);

    let args = recorded_args(&out.path().join("movie.mp4"));
    assert!(has_pair(&args, "-s", "1920x1080"));
    assert!(has_pair(&args, "-b:v", "4M"));
    assert!(has_pair(&args, "-c:v", "libx264"));
    assert!(has_pair(&args, "-c:v", "h264_nvenc"));

    let software = args.iter().position(|a| a == "libx264").unwrap();
    let hardware = args.iter().position(|a| a == "h264_nvenc").unwrap();
    assert!(hardware > software);
}

#[tokio::test]
async fn test_extra_args_and_overwrite_setting() {
    let out = TempDir::new().unwrap();
    let mut config = InvokerConfig::default().with_overwrite(true);
    config.extra_args = vec!["-preset".to_string(), "slow".to_string()];
    let controller = controller(config);

    let batch = controller
        .start(request(&["c.mov"], out.path(), ConversionOptions::default()))
        .unwrap();
    let (result, _) = finish(batch).await;
    tokio_test::assert_ok!(result);

    let args = recorded_args(&out.path().join("c.mp4"));
    assert_eq!(args.first().map(String::as_str), Some("-y"));
    assert!(has_pair(&args, "-preset", "slow"));
}

#[tokio::test]
async fn test_search_path_passed_to_child() {
    let out = TempDir::new().unwrap();
    let bin_dir = out.path().join("ffmpeg").join("bin");
    let search_path = prepend_search_path(&bin_dir, Some(OsString::from("/usr/bin:/bin"))).unwrap();
    let controller = controller(InvokerConfig::default().with_search_path(search_path));

    let batch = controller
        .start(request(&["d.mov"], out.path(), ConversionOptions::default()))
        .unwrap();
    let (result, events) = finish(batch).await;
    tokio_test::assert_ok!(result);

    let expected = format!("PATH={}:/usr/bin:/bin", bin_dir.display());
    assert!(log_lines(&events).contains(&expected.as_str()), "{:?}", events);
}

#[tokio::test]
async fn test_second_batch_rejected_while_running() {
    let out = TempDir::new().unwrap();
    let controller = controller(InvokerConfig::default());

    let batch = controller
        .start(request(&["slow.mov"], out.path(), ConversionOptions::default()))
        .unwrap();
    assert!(controller.is_running());

    let second = controller.start(request(&["e.mov"], out.path(), ConversionOptions::default()));
    match second {
        Err(e) => {
            assert!(matches!(e, InvokerError::BatchInProgress));
            assert!(e.is_warning());
        }
        Ok(_) => panic!("second batch started while the first was running"),
    }

    let (result, _) = finish(batch).await;
    tokio_test::assert_ok!(result);
    assert!(!controller.is_running());

    let third = controller
        .start(request(&["e.mov"], out.path(), ConversionOptions::default()))
        .unwrap();
    let (result, events) = finish(third).await;
    tokio_test::assert_ok!(result);
    assert_eq!(events.last(), Some(&BatchEvent::Completed { files: 1 }));
}
