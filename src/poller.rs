// src/poller.rs

//! Start-download bookkeeping and the status polling loop.
//!
//! `Idle -> Requesting -> Polling -> {Finished | Failed | Cancelled} -> Idle`
//!
//! One `Poller` owns the only timer. Each tick fires its own status request, so
//! responses may arrive out of order; the first response of a cycle that reports
//! `is_downloading == false` stops the cycle, and anything that arrives after that
//! is dropped.

use crate::{
    client::StatusSource,
    constants::messages,
    error::{AppError, AppResult},
    models::DownloadStatus,
    render::StatusView,
    trigger::DownloadTrigger,
};
use log::{debug, error, info, warn};
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::{
    sync::watch,
    time::{Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Requesting,
    Polling,
}

/// How a request/poll cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Progress reached 100; the completed file (if any) was handed to the trigger.
    Finished,
    /// The start request was refused or could not be sent.
    Failed,
    /// Polling stopped below 100%: backend error and user cancel look the same.
    Cancelled,
}

pub type StatusListener = Arc<dyn Fn(&DownloadStatus) + Send + Sync>;

struct State {
    phase: Phase,
    is_downloading: bool,
    cycle: u64,
    timer: Option<CancellationToken>,
}

struct Inner {
    source: Arc<dyn StatusSource>,
    view: Arc<dyn StatusView>,
    trigger: Arc<dyn DownloadTrigger>,
    listener: Option<StatusListener>,
    interval: Duration,
    finish_delay: Duration,
    state: Mutex<State>,
    running_timers: AtomicUsize,
    outcome_tx: watch::Sender<Option<(u64, Outcome)>>,
}

#[derive(Clone)]
pub struct Poller {
    inner: Arc<Inner>,
}

impl Poller {
    pub fn new(
        source: Arc<dyn StatusSource>,
        view: Arc<dyn StatusView>,
        trigger: Arc<dyn DownloadTrigger>,
        interval: Duration,
        finish_delay: Duration,
    ) -> Self {
        Self::with_listener(source, view, trigger, interval, finish_delay, None)
    }

    /// `listener` sees every accepted status right after the view does.
    pub fn with_listener(
        source: Arc<dyn StatusSource>,
        view: Arc<dyn StatusView>,
        trigger: Arc<dyn DownloadTrigger>,
        interval: Duration,
        finish_delay: Duration,
        listener: Option<StatusListener>,
    ) -> Self {
        let (outcome_tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                source,
                view,
                trigger,
                listener,
                interval,
                finish_delay,
                state: Mutex::new(State {
                    phase: Phase::Idle,
                    is_downloading: false,
                    cycle: 0,
                    timer: None,
                }),
                running_timers: AtomicUsize::new(0),
                outcome_tx,
            }),
        }
    }

    pub fn phase(&self) -> Phase {
        self.inner.state.lock().unwrap().phase
    }

    pub fn is_downloading(&self) -> bool {
        self.inner.state.lock().unwrap().is_downloading
    }

    /// Whether a timer is armed right now.
    pub fn has_timer(&self) -> bool {
        self.inner.state.lock().unwrap().timer.is_some()
    }

    /// Timer loops still alive. A cleared timer leaves at its next scheduling point.
    pub fn running_timers(&self) -> usize {
        self.inner.running_timers.load(Ordering::SeqCst)
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        self.inner.outcome_tx.borrow().map(|(_, outcome)| outcome)
    }

    /// Enters `Requesting`. Refused while a request or a poll cycle is active.
    pub fn begin_request(&self) -> AppResult<()> {
        let mut state = self.inner.state.lock().unwrap();
        if state.is_downloading || state.phase != Phase::Idle {
            return Err(AppError::Busy);
        }
        state.cycle += 1;
        state.phase = Phase::Requesting;
        Ok(())
    }

    /// The start request was rejected or never reached the backend.
    pub fn request_failed(&self) {
        self.end_request(Outcome::Failed);
    }

    /// Leaves `Requesting` without polling, e.g. after a one-shot download
    /// that the backend completed within the request itself.
    pub fn end_request(&self, outcome: Outcome) {
        let cycle = {
            let mut state = self.inner.state.lock().unwrap();
            if state.phase == Phase::Requesting {
                state.phase = Phase::Idle;
            }
            state.cycle
        };
        info!("request ended without polling: {:?}", outcome);
        self.inner.outcome_tx.send_replace(Some((cycle, outcome)));
    }

    /// Arms a fresh polling timer, clearing any previous one first.
    /// Returns the id of the new cycle. Must be called inside a tokio runtime.
    pub fn start(&self) -> u64 {
        let (cycle, token) = {
            let mut state = self.inner.state.lock().unwrap();
            if let Some(previous) = state.timer.take() {
                debug!("clearing timer of poll cycle {}", state.cycle);
                previous.cancel();
            }
            // a request that just succeeded already owns a cycle id
            if state.phase != Phase::Requesting {
                state.cycle += 1;
            }
            state.is_downloading = true;
            state.phase = Phase::Polling;
            let token = CancellationToken::new();
            state.timer = Some(token.clone());
            (state.cycle, token)
        };

        info!("poll cycle {} started (every {:?})", cycle, self.inner.interval);
        self.inner.running_timers.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(Inner::run_timer(self.inner.clone(), cycle, token));
        cycle
    }

    /// Clears the timer without waiting for the backend. In-flight requests are left to finish and are ignored.
    /// Also ends a pending start request as `Cancelled`.
    pub fn stop(&self) {
        let stopped = {
            let mut state = self.inner.state.lock().unwrap();
            let had_timer = state.timer.take().map(|token| token.cancel()).is_some();
            let was_requesting = state.phase == Phase::Requesting;
            state.is_downloading = false;
            state.phase = Phase::Idle;
            (had_timer || was_requesting).then_some(state.cycle)
        };
        if let Some(cycle) = stopped {
            info!("poll cycle {} stopped by caller", cycle);
            self.inner.view.idle();
            self.inner.outcome_tx.send_replace(Some((cycle, Outcome::Cancelled)));
        }
    }

    /// Waits for the current (or most recent) cycle to reach its outcome,
    /// including the finish delay and the download trigger.
    pub async fn wait(&self) -> Option<Outcome> {
        let cycle = self.inner.state.lock().unwrap().cycle;
        let mut rx = self.inner.outcome_tx.subscribe();
        let value = rx
            .wait_for(|v| matches!(v, Some((c, _)) if *c >= cycle))
            .await
            .ok()
            .map(|v| *v)?;
        value.map(|(_, outcome)| outcome)
    }
}

/// Decrements the live-timer count however the loop exits.
struct TimerGuard<'a>(&'a AtomicUsize);

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Inner {
    async fn run_timer(self: Arc<Self>, cycle: u64, token: CancellationToken) {
        let _guard = TimerGuard(&self.running_timers);
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    // no de-duplication: a slow response may land after the next tick's
                    tokio::spawn(Inner::poll_once(self.clone(), cycle, token.clone()));
                }
            }
        }
        debug!("timer of poll cycle {} exited", cycle);
    }

    async fn poll_once(self: Arc<Self>, cycle: u64, token: CancellationToken) {
        let status = match self.source.get_status().await {
            Ok(status) => status,
            Err(e) => {
                warn!("status poll failed (cycle {}): {}", cycle, e);
                return;
            }
        };
        if token.is_cancelled() {
            debug!("dropping late status for stopped cycle {}", cycle);
            return;
        }

        self.view.set_progress(status.progress);
        self.view.set_message(&status.message);
        if let Some(listener) = &self.listener {
            listener(&status);
        }

        if status.is_downloading {
            return;
        }

        // only the first "stopped" response of the cycle gets past this block
        {
            let mut state = self.state.lock().unwrap();
            if token.is_cancelled() || state.cycle != cycle {
                return;
            }
            token.cancel();
            state.timer = None;
            state.is_downloading = false;
            state.phase = Phase::Idle;
        }
        self.view.idle();

        let outcome = if status.is_complete() {
            tokio::time::sleep(self.finish_delay).await;
            self.view.set_message(messages::FINISHED);
            if let Some(file) = status.completed_file() {
                if let Err(e) = self.trigger.trigger(file).await {
                    error!("saving '{}' failed: {}", file, e);
                    self.view.alert(&format!("Could not save '{}': {}", file, e));
                }
            }
            Outcome::Finished
        } else {
            info!(
                "poll cycle {} stopped at {:.0}%: {}",
                cycle, status.progress, status.message
            );
            Outcome::Cancelled
        };
        info!("poll cycle {} ended: {:?}", cycle, outcome);
        self.outcome_tx.send_replace(Some((cycle, outcome)));
    }
}
