// tests/poller_test.rs

use async_trait::async_trait;
use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use uvd::{
    cli::Platform,
    client::StatusSource,
    constants::messages,
    error::{AppError, AppResult},
    models::DownloadStatus,
    poller::{Outcome, Phase, Poller, StatusListener},
    render::StatusView,
    trigger::DownloadTrigger,
};

const INTERVAL: Duration = Duration::from_millis(1000);
const FINISH_DELAY: Duration = Duration::from_millis(1000);

/// Plays back a script of answers; the last one repeats forever.
struct ScriptedSource {
    script: Mutex<VecDeque<Option<DownloadStatus>>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(script: Vec<Option<DownloadStatus>>) -> Arc<Self> {
        Self::slow(script, Duration::ZERO)
    }

    fn slow(script: Vec<Option<DownloadStatus>>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn get_status(&self) -> AppResult<DownloadStatus> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = {
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front().flatten()
            } else {
                script.front().cloned().flatten()
            }
        };
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        next.ok_or_else(|| AppError::Backend("connection refused".into()))
    }
}

#[derive(Default)]
struct RecordingView {
    progress: Mutex<Vec<f64>>,
    messages: Mutex<Vec<String>>,
    alerts: Mutex<Vec<String>>,
}

impl RecordingView {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl StatusView for RecordingView {
    fn set_progress(&self, percent: f64) {
        self.progress.lock().unwrap().push(percent);
    }
    fn set_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
    fn show_title(&self, _platform: Platform, _title: &str, _thumbnail: Option<&str>) {}
}

#[derive(Default)]
struct RecordingTrigger {
    files: Mutex<Vec<String>>,
}

impl RecordingTrigger {
    fn files(&self) -> Vec<String> {
        self.files.lock().unwrap().clone()
    }
}

#[async_trait]
impl DownloadTrigger for RecordingTrigger {
    async fn trigger(&self, file_name: &str) -> AppResult<()> {
        self.files.lock().unwrap().push(file_name.to_string());
        Ok(())
    }
}

fn downloading(progress: f64) -> Option<DownloadStatus> {
    Some(DownloadStatus {
        is_downloading: true,
        progress,
        message: format!("Downloading {progress}%"),
        ..Default::default()
    })
}

fn stopped(progress: f64, file: Option<&str>) -> Option<DownloadStatus> {
    Some(DownloadStatus {
        is_downloading: false,
        progress,
        message: "done".into(),
        current_file: file.map(str::to_string),
        ..Default::default()
    })
}

fn poller(source: Arc<ScriptedSource>) -> (Poller, Arc<RecordingView>, Arc<RecordingTrigger>) {
    let view = Arc::new(RecordingView::default());
    let trigger = Arc::new(RecordingTrigger::default());
    let poller = Poller::new(source, view.clone(), trigger.clone(), INTERVAL, FINISH_DELAY);
    (poller, view, trigger)
}

#[tokio::test(start_paused = true)]
async fn test_starting_twice_keeps_a_single_timer() {
    let source = ScriptedSource::new(vec![downloading(10.0)]);
    let (poller, _view, _trigger) = poller(source.clone());

    poller.start();
    poller.start();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(poller.running_timers(), 1);
    assert!(poller.has_timer());

    // one request per interval, not two
    tokio::time::sleep(Duration::from_millis(3000)).await;
    assert_eq!(source.calls(), 3);

    poller.stop();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(poller.running_timers(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_complete_status_triggers_once_after_delay() {
    let source = ScriptedSource::new(vec![downloading(50.0), stopped(100.0, Some("clip.mp4"))]);
    let (poller, view, trigger) = poller(source.clone());

    poller.start();
    // second poll lands at 2000ms, the finish delay runs until 3000ms
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert!(!poller.is_downloading());
    assert!(trigger.files().is_empty());
    assert!(!view.messages().iter().any(|m| m == messages::FINISHED));

    assert_eq!(poller.wait().await, Some(Outcome::Finished));
    assert_eq!(trigger.files(), vec!["clip.mp4".to_string()]);
    assert_eq!(view.messages().last().map(String::as_str), Some(messages::FINISHED));

    // the backend keeps answering 100, but nobody is asking any more
    tokio::time::sleep(Duration::from_millis(5000)).await;
    assert_eq!(source.calls(), 2);
    assert_eq!(trigger.files().len(), 1);
    assert_eq!(poller.running_timers(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_complete_without_file_finishes_without_trigger() {
    let source = ScriptedSource::new(vec![stopped(100.0, Some(""))]);
    let (poller, view, trigger) = poller(source);

    poller.start();
    assert_eq!(poller.wait().await, Some(Outcome::Finished));
    assert!(trigger.files().is_empty());
    assert!(view.messages().iter().any(|m| m == messages::FINISHED));
}

#[tokio::test(start_paused = true)]
async fn test_stop_below_100_cancels_without_trigger() {
    let source = ScriptedSource::new(vec![downloading(20.0), stopped(50.0, Some("clip.mp4"))]);
    let (poller, view, trigger) = poller(source);

    poller.start();
    assert_eq!(poller.wait().await, Some(Outcome::Cancelled));
    assert!(trigger.files().is_empty());
    assert!(!view.messages().iter().any(|m| m == messages::FINISHED));
    assert_eq!(poller.phase(), Phase::Idle);
    assert!(!poller.has_timer());
}

#[tokio::test(start_paused = true)]
async fn test_poll_errors_are_swallowed() {
    let source = ScriptedSource::new(vec![None, None, downloading(40.0), stopped(100.0, None)]);
    let (poller, view, _trigger) = poller(source.clone());

    poller.start();
    assert_eq!(poller.wait().await, Some(Outcome::Finished));
    assert_eq!(source.calls(), 4);
    assert_eq!(*view.progress.lock().unwrap(), vec![40.0, 100.0]);
    assert!(view.alerts.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_late_response_after_stop_is_dropped() {
    let source = ScriptedSource::slow(vec![downloading(10.0)], Duration::from_millis(1500));
    let (poller, view, _trigger) = poller(source.clone());

    poller.start();
    // first request goes out at 1000ms and answers at 2500ms
    tokio::time::sleep(Duration::from_millis(1100)).await;
    poller.stop();
    tokio::time::sleep(Duration::from_millis(3000)).await;

    assert_eq!(source.calls(), 1);
    assert!(view.progress.lock().unwrap().is_empty());
    assert_eq!(poller.last_outcome(), Some(Outcome::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn test_begin_request_is_refused_while_busy() {
    let source = ScriptedSource::new(vec![downloading(10.0)]);
    let (poller, _view, _trigger) = poller(source);

    poller.begin_request().unwrap();
    assert!(matches!(poller.begin_request(), Err(AppError::Busy)));

    poller.start();
    assert_eq!(poller.phase(), Phase::Polling);
    assert!(matches!(poller.begin_request(), Err(AppError::Busy)));

    poller.stop();
    assert!(poller.begin_request().is_ok());
    poller.request_failed();
    assert_eq!(poller.phase(), Phase::Idle);
    assert_eq!(poller.wait().await, Some(Outcome::Failed));
}

#[tokio::test(start_paused = true)]
async fn test_listener_sees_titles() {
    let source = ScriptedSource::new(vec![
        Some(DownloadStatus {
            is_downloading: true,
            progress: 30.0,
            title: Some("Some video".into()),
            ..Default::default()
        }),
        stopped(100.0, None),
    ]);
    let view = Arc::new(RecordingView::default());
    let trigger = Arc::new(RecordingTrigger::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_listener = seen.clone();
    let listener: StatusListener = Arc::new(move |status: &DownloadStatus| {
        if let Some(title) = status.title() {
            seen_in_listener.lock().unwrap().push(title.to_string());
        }
    });
    let poller = Poller::with_listener(source, view, trigger, INTERVAL, FINISH_DELAY, Some(listener));

    poller.start();
    poller.wait().await;
    assert_eq!(*seen.lock().unwrap(), vec!["Some video".to_string()]);
}

/// Each call takes its own delay, so answers can overtake each other.
struct OverlappingSource {
    script: Mutex<VecDeque<(Duration, Option<DownloadStatus>)>>,
    calls: AtomicUsize,
}

impl OverlappingSource {
    fn new(script: Vec<(u64, Option<DownloadStatus>)>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(
                script
                    .into_iter()
                    .map(|(ms, status)| (Duration::from_millis(ms), status))
                    .collect(),
            ),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl StatusSource for OverlappingSource {
    async fn get_status(&self) -> AppResult<DownloadStatus> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (delay, next) = {
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            }
        }
        .unwrap_or((Duration::ZERO, None));
        tokio::time::sleep(delay).await;
        next.ok_or_else(|| AppError::Backend("connection refused".into()))
    }
}

fn overlapping_poller(source: Arc<OverlappingSource>) -> (Poller, Arc<RecordingView>, Arc<RecordingTrigger>) {
    let view = Arc::new(RecordingView::default());
    let trigger = Arc::new(RecordingTrigger::default());
    let poller = Poller::new(source, view.clone(), trigger.clone(), INTERVAL, FINISH_DELAY);
    (poller, view, trigger)
}

#[tokio::test(start_paused = true)]
async fn test_slow_tick_answering_after_the_stop_is_dropped() {
    // tick 1 leaves at 1000ms and answers at 2500ms, tick 2 leaves at 2000ms and answers at 2100ms
    let source = OverlappingSource::new(vec![
        (1500, downloading(10.0)),
        (100, stopped(100.0, Some("clip.mp4"))),
    ]);
    let (poller, view, trigger) = overlapping_poller(source.clone());

    poller.start();
    assert_eq!(poller.wait().await, Some(Outcome::Finished));
    tokio::time::sleep(Duration::from_millis(2000)).await;

    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert_eq!(trigger.files(), vec!["clip.mp4".to_string()]);
    assert_eq!(*view.progress.lock().unwrap(), vec![100.0]);
    assert_eq!(view.messages().last().map(String::as_str), Some(messages::FINISHED));
    assert_eq!(poller.last_outcome(), Some(Outcome::Finished));
}

#[tokio::test(start_paused = true)]
async fn test_two_finished_answers_trigger_once() {
    // both ticks report completion; the second answers first
    let source = OverlappingSource::new(vec![
        (1500, stopped(100.0, Some("clip.mp4"))),
        (100, stopped(100.0, Some("clip.mp4"))),
    ]);
    let (poller, _view, trigger) = overlapping_poller(source);

    poller.start();
    assert_eq!(poller.wait().await, Some(Outcome::Finished));
    tokio::time::sleep(Duration::from_millis(3000)).await;

    assert_eq!(trigger.files(), vec!["clip.mp4".to_string()]);
    assert_eq!(poller.running_timers(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_while_requesting_releases_waiters() {
    let source = ScriptedSource::new(vec![downloading(10.0)]);
    let (poller, _view, trigger) = poller(source.clone());

    poller.begin_request().unwrap();
    let waiter = {
        let poller = poller.clone();
        tokio::spawn(async move { poller.wait().await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    poller.stop();

    let outcome = tokio::time::timeout(Duration::from_secs(5), waiter)
        .await
        .expect("wait() should return once the request is cancelled")
        .unwrap();
    assert_eq!(outcome, Some(Outcome::Cancelled));
    assert_eq!(poller.phase(), Phase::Idle);
    assert_eq!(source.calls(), 0);
    assert!(trigger.files().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_wait_during_request_ignores_previous_outcome() {
    let source = ScriptedSource::new(vec![stopped(50.0, None)]);
    let (poller, _view, _trigger) = poller(source);

    poller.start();
    assert_eq!(poller.wait().await, Some(Outcome::Cancelled));

    poller.begin_request().unwrap();
    let waiter = {
        let poller = poller.clone();
        tokio::spawn(async move { poller.wait().await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!waiter.is_finished());

    poller.request_failed();
    assert_eq!(waiter.await.unwrap(), Some(Outcome::Failed));
}
