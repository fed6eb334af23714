use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use streamcheck_core::{parse, CategorySummary};
use streamcheck_engine::{
    execute_run, NullProgressSink, ProbeOutcome, Prober, ProgressSink, RunConfig, RunError,
    RunEvent, RunStage,
};

/// Stub prober: a URL works when it contains "live".
struct StubProber;

#[async_trait::async_trait]
impl Prober for StubProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        let working = url.contains("live");
        ProbeOutcome {
            working,
            detail: if working { None } else { Some("http status 404".to_string()) },
            elapsed: Duration::from_millis(1),
        }
    }
}

struct StageSink {
    stages: Mutex<Vec<RunStage>>,
}

impl StageSink {
    fn new() -> Self {
        Self {
            stages: Mutex::new(Vec::new()),
        }
    }
}

impl ProgressSink for StageSink {
    fn emit(&self, event: RunEvent) {
        if let RunEvent::Stage(stage) = event {
            self.stages.lock().unwrap().push(stage);
        }
    }
}

fn config(folder: &Path, output: &Path) -> RunConfig {
    RunConfig {
        folder_path: folder.to_path_buf(),
        output_path: output.to_path_buf(),
        timeout: Duration::from_secs(1),
        max_concurrent: 4,
        dedup: false,
        split_dir: None,
    }
}

fn write_news_playlist(folder: &Path) {
    fs::write(
        folder.join("channels.m3u8"),
        concat!(
            "#EXTM3U\n",
            "#EXTINF:-1 group-title=\"News\",CNN\n",
            "http://example.test/live/cnn\n",
            "#EXTINF:-1 group-title=\"News\",DeadChan\n",
            "http://example.test/dead\n",
        ),
    )
    .unwrap();
}

#[tokio::test]
async fn end_to_end_writes_only_working_channels() {
    streamcheck_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let folder = temp.path().join("playlists");
    fs::create_dir(&folder).unwrap();
    write_news_playlist(&folder);
    let output = temp.path().join("working.m3u8");

    let sink = StageSink::new();
    let cancel = CancellationToken::new();
    let report = execute_run(&config(&folder, &output), &StubProber, &sink, &cancel)
        .await
        .unwrap();

    assert_eq!(report.stats.total, 2);
    assert_eq!(report.stats.tested, 2);
    assert_eq!(report.stats.working, 1);
    assert!(!report.cancelled());
    assert_eq!(
        report.categories,
        vec![CategorySummary {
            name: "News".to_string(),
            total: 2,
            working: 1,
            failed: 1,
        }]
    );
    assert_eq!(report.written_paths, vec![output.clone()]);

    let written = parse(&fs::read_to_string(&output).unwrap());
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].name, "CNN");

    assert_eq!(
        *sink.stages.lock().unwrap(),
        vec![
            RunStage::Discovering,
            RunStage::Parsing,
            RunStage::Probing,
            RunStage::Aggregating,
            RunStage::Writing,
            RunStage::Done,
        ]
    );
}

#[tokio::test]
async fn input_errors_are_distinguishable() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("out.m3u8");

    let missing = temp.path().join("nope");
    let err = execute_run(
        &config(&missing, &output),
        &StubProber,
        &NullProgressSink,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RunError::FolderNotFound(_)));

    let empty = temp.path().join("empty");
    fs::create_dir(&empty).unwrap();
    fs::write(empty.join("notes.txt"), "not a playlist").unwrap();
    let err = execute_run(
        &config(&empty, &output),
        &StubProber,
        &NullProgressSink,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RunError::NoPlaylists(_)));

    let headers_only = temp.path().join("headers");
    fs::create_dir(&headers_only).unwrap();
    fs::write(headers_only.join("empty.m3u"), "#EXTM3U\n").unwrap();
    let err = execute_run(
        &config(&headers_only, &output),
        &StubProber,
        &NullProgressSink,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RunError::NoChannels));
}

#[tokio::test]
async fn write_failure_preserves_probe_results() {
    let temp = TempDir::new().unwrap();
    let folder = temp.path().join("playlists");
    fs::create_dir(&folder).unwrap();
    write_news_playlist(&folder);

    // Output parent is a file, so the write step must fail.
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "x").unwrap();
    let output = blocker.join("working.m3u8");

    let err = execute_run(
        &config(&folder, &output),
        &StubProber,
        &NullProgressSink,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    match err {
        RunError::WriteFailed {
            results,
            categories,
            ..
        } => {
            assert_eq!(results.len(), 2);
            assert_eq!(categories.len(), 1);
        }
        other => panic!("expected WriteFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn cancellation_before_probing_yields_cancelled_report() {
    let temp = TempDir::new().unwrap();
    let folder = temp.path().join("playlists");
    fs::create_dir(&folder).unwrap();
    write_news_playlist(&folder);
    let output = temp.path().join("working.m3u8");

    let sink = StageSink::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = execute_run(&config(&folder, &output), &StubProber, &sink, &cancel)
        .await
        .unwrap();

    assert!(report.cancelled());
    assert_eq!(report.stats.total, 2);
    assert_eq!(report.stats.tested, 0);
    assert!(report.written_paths.is_empty());
    assert!(!output.exists());
    assert_eq!(
        *sink.stages.lock().unwrap(),
        vec![RunStage::Discovering, RunStage::Parsing, RunStage::Cancelled]
    );
}

#[tokio::test]
async fn dedup_is_opt_in_and_keyed_on_name_and_url() {
    let temp = TempDir::new().unwrap();
    let folder = temp.path().join("playlists");
    fs::create_dir(&folder).unwrap();
    let entry = "#EXTINF:-1 group-title=\"News\",CNN\nhttp://example.test/live/cnn\n";
    fs::write(folder.join("a.m3u"), format!("#EXTM3U\n{entry}")).unwrap();
    fs::write(folder.join("b.m3u"), format!("#EXTM3U\n{entry}")).unwrap();
    let output = temp.path().join("working.m3u8");

    // Without dedup the same entry from two files stays distinct.
    let report = execute_run(
        &config(&folder, &output),
        &StubProber,
        &NullProgressSink,
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(report.stats.total, 2);

    let mut deduped = config(&folder, &output);
    deduped.dedup = true;
    let report = execute_run(&deduped, &StubProber, &NullProgressSink, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.stats.total, 1);
}

#[tokio::test]
async fn split_dir_adds_per_category_playlists() {
    let temp = TempDir::new().unwrap();
    let folder = temp.path().join("playlists");
    fs::create_dir(&folder).unwrap();
    fs::write(
        folder.join("channels.m3u8"),
        concat!(
            "#EXTM3U\n",
            "#EXTINF:-1 group-title=\"News\",CNN\n",
            "http://example.test/live/cnn\n",
            "#EXTINF:-1 group-title=\"Sports\",ESPN\n",
            "http://example.test/live/espn\n",
        ),
    )
    .unwrap();
    let output = temp.path().join("working.m3u8");
    let split = temp.path().join("by-category");

    let mut cfg = config(&folder, &output);
    cfg.split_dir = Some(split.clone());
    let report = execute_run(&cfg, &StubProber, &NullProgressSink, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.written_paths.len(), 3);
    assert!(split.join("news.m3u8").is_file());
    assert!(split.join("sports.m3u8").is_file());
}
