//! Background watch loop.
//!
//! One tokio task per `watch()` call. Each tick runs a full fetch pass,
//! commits the new snapshot to the provider, diffs it against the loop's own
//! baseline and calls back only when something drifted. A failed tick reports
//! the error and leaves the baseline alone; the loop itself only ends on a
//! stop signal.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::config::ParamStoreConfig;
use super::detector::detect_changes;
use super::fetcher::fetch_snapshot;
use super::state::StoreState;
use super::types::{ChangeEvent, Snapshot, WatchNotification};
use crate::traits::{ParameterSource, WatchCallback};

/// Everything a tick needs, shared with the provider.
#[derive(Clone)]
pub(crate) struct PollerContext {
    pub source: Arc<dyn ParameterSource>,
    pub config: Arc<ParamStoreConfig>,
    pub state: Arc<Mutex<StoreState>>,
}

/// Handle to a running watch loop.
///
/// Dropping the handle leaves the loop running; call [`stop`](Self::stop) or
/// shut the provider down to end it.
#[derive(Debug)]
pub struct WatchHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    interval: Duration,
}

impl WatchHandle {
    /// Signal the loop to stop and wait for it to exit.
    ///
    /// A tick whose fetch is still in flight is abandoned without committing.
    /// No callback is made after this returns.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.task.await {
            if e.is_panic() {
                tracing::error!("Watch loop panicked: {}", e);
            }
        }
    }

    /// Whether the loop task is still alive.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Interval between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Start a watch loop on the current runtime.
///
/// `baseline` is what the first tick diffs against; `None` means "whatever
/// is committed once the loop gets the state lock". The first tick fires one
/// interval from now. The loop exits when either the handle's stop signal or
/// the provider-wide `shutdown` signal fires.
pub(crate) fn spawn_poller(
    runtime: &tokio::runtime::Handle,
    ctx: PollerContext,
    baseline: Option<Snapshot>,
    callback: WatchCallback,
    shutdown: watch::Receiver<bool>,
) -> WatchHandle {
    let (stop_tx, stop_rx) = watch::channel(false);
    let period = ctx.config.watch_interval;

    let task = runtime.spawn(watch_loop(ctx, baseline, callback, stop_rx, shutdown));

    WatchHandle {
        stop_tx,
        task,
        interval: period,
    }
}

async fn watch_loop(
    ctx: PollerContext,
    baseline: Option<Snapshot>,
    callback: WatchCallback,
    mut stop_rx: watch::Receiver<bool>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut baseline = match baseline {
        Some(snapshot) => snapshot,
        None => tokio::select! {
            biased;
            _ = stop_requested(&mut stop_rx) => return,
            _ = stop_requested(&mut shutdown_rx) => return,
            state = ctx.state.lock() => state.snapshot().clone(),
        },
    };

    let period = ctx.config.watch_interval;
    tracing::info!(
        "Watch started on {} (interval: {}s)",
        ctx.config.path,
        period.as_secs()
    );

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = stop_requested(&mut stop_rx) => break,
            _ = stop_requested(&mut shutdown_rx) => break,
            _ = ticker.tick() => {}
        }

        let notification = tokio::select! {
            biased;
            _ = stop_requested(&mut stop_rx) => break,
            _ = stop_requested(&mut shutdown_rx) => break,
            n = run_tick(&ctx, &mut baseline) => n,
        };

        if let Some(notification) = notification {
            deliver(&callback, notification);
        }
    }

    tracing::info!("Watch stopped on {}", ctx.config.path);
}

/// One poll cycle: fetch, commit, diff against `baseline`.
///
/// On success the new snapshot becomes both the provider's committed
/// snapshot and this loop's baseline. Returns `None` when the pass succeeded
/// and nothing drifted. The state lock is released before returning.
pub(crate) async fn run_tick(ctx: &PollerContext, baseline: &mut Snapshot) -> Option<WatchNotification> {
    let mut state = ctx.state.lock().await;

    match fetch_snapshot(ctx.source.as_ref(), &ctx.config, &mut state).await {
        Ok(current) => {
            let commit_no = state.commits() + 1;
            state.commit(current.clone());
            drop(state);

            let changed = detect_changes(baseline, &current);
            *baseline = current;

            if changed.is_empty() {
                tracing::trace!("Tick committed snapshot #{}, no drift", commit_no);
            } else {
                tracing::debug!(
                    "Tick committed snapshot #{} ({} changed)",
                    commit_no,
                    changed.len()
                );
            }
            ChangeEvent::from_changes(changed).map(Ok)
        }
        Err(e) => {
            drop(state);
            tracing::warn!("Poll tick failed [{}]: {}", e.error_code(), e);
            Some(Err(e))
        }
    }
}

fn deliver(callback: &WatchCallback, notification: WatchNotification) {
    if let Ok(ref event) = notification {
        tracing::info!("Detected {} changed parameter(s)", event.len());
    }
    if catch_unwind(AssertUnwindSafe(|| callback(notification))).is_err() {
        tracing::error!("Watch callback panicked; loop continues");
    }
}

/// Resolves once the flag is set to `true`.
///
/// A dropped sender never resolves: losing the signal source must not end
/// the loop.
async fn stop_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
