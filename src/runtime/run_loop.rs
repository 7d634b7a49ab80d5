use super::scheduler::PerKeyScheduler;
use crate::channels::{Channel, ChannelError, InboundEvent};
use crate::config::RuntimeConfig;
use crate::intake::{dispatch_key, EventOutcome, IntakeEngine};
use crate::shared::{now_secs, LogSink, UserId};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopOptions {
    pub poll_backoff: Duration,
    pub max_concurrency: usize,
}

impl LoopOptions {
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            poll_backoff: config.poll_backoff,
            max_concurrency: config.max_concurrency.max(1),
        }
    }
}

/// Tally of one dispatched batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub handled: usize,
    pub ignored: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.handled + self.ignored + self.failed
    }

    fn record(&mut self, outcome: &EventOutcome) {
        match outcome {
            EventOutcome::Handled => self.handled += 1,
            EventOutcome::Ignored => self.ignored += 1,
            EventOutcome::Failed(_) => self.failed += 1,
        }
    }
}

#[derive(Debug)]
struct EventCompletion {
    key: UserId,
    outcome: EventOutcome,
}

/// Polls once and handles the whole batch before returning. Events for the
/// same key run one after another in arrival order; different keys run on
/// up to `max_concurrency` threads.
pub fn run_once(
    engine: &Arc<IntakeEngine>,
    channel: &dyn Channel,
    max_concurrency: usize,
    log: &LogSink,
) -> Result<BatchReport, ChannelError> {
    let events = channel.poll()?;
    if events.is_empty() {
        return Ok(BatchReport::default());
    }
    log.info("poll.batch", &format!("received {} events", events.len()));
    Ok(dispatch_batch(engine, events, max_concurrency))
}

pub fn dispatch_batch(
    engine: &Arc<IntakeEngine>,
    events: Vec<InboundEvent>,
    max_concurrency: usize,
) -> BatchReport {
    let max_concurrency = max_concurrency.max(1);
    let mut scheduler = PerKeyScheduler::default();
    for event in events {
        scheduler.enqueue(dispatch_key(&event), event);
    }

    let (result_tx, result_rx) = mpsc::channel::<EventCompletion>();
    let mut in_flight = 0usize;
    let mut report = BatchReport::default();

    loop {
        let available = max_concurrency.saturating_sub(in_flight);
        for scheduled in scheduler.dequeue_runnable(available) {
            let tx = result_tx.clone();
            let engine = Arc::clone(engine);
            thread::spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    engine.handle_event(&scheduled.value)
                }))
                .unwrap_or_else(|_| EventOutcome::Failed("event handler panicked".to_string()));
                let _ = tx.send(EventCompletion {
                    key: scheduled.key,
                    outcome,
                });
            });
            in_flight += 1;
        }

        if in_flight == 0 {
            break;
        }

        let Ok(completion) = result_rx.recv() else {
            break;
        };
        in_flight -= 1;
        scheduler.complete(&completion.key);
        report.record(&completion.outcome);
    }

    report
}

/// Runs poll/dispatch iterations until `stop` is raised. A failed poll is
/// logged and retried after `poll_backoff`; it never ends the loop.
pub fn run_until_stop(
    engine: Arc<IntakeEngine>,
    channel: Arc<dyn Channel>,
    stop: &AtomicBool,
    options: LoopOptions,
    log: &LogSink,
) {
    log.info(
        "bot.started",
        &format!(
            "polling with up to {} concurrent handlers",
            options.max_concurrency
        ),
    );

    while !stop.load(Ordering::Relaxed) {
        if let Err(err) = run_once(&engine, channel.as_ref(), options.max_concurrency, log) {
            log.warn(
                "poll.failed",
                &format!(
                    "polling failed, retrying in {}s: {err}",
                    options.poll_backoff.as_secs()
                ),
            );
            if !sleep_with_stop(stop, options.poll_backoff) {
                break;
            }
        }
        engine.evict_idle_sessions(now_secs());
    }

    log.info("bot.stopped", "stop requested");
}

pub(crate) fn sleep_with_stop(stop: &AtomicBool, total: Duration) -> bool {
    let mut remaining = total;
    while remaining > Duration::from_millis(0) {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        let step = remaining.min(Duration::from_millis(200));
        thread::sleep(step);
        remaining = remaining.saturating_sub(step);
    }
    !stop.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn sleep_with_stop_returns_early_when_stopped() {
        let stop = AtomicBool::new(true);
        let started = Instant::now();
        assert!(!sleep_with_stop(&stop, Duration::from_secs(5)));
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn sleep_with_stop_completes_when_not_stopped() {
        let stop = AtomicBool::new(false);
        assert!(sleep_with_stop(&stop, Duration::from_millis(10)));
    }

    #[test]
    fn batch_report_counts_each_outcome() {
        let mut report = BatchReport::default();
        report.record(&EventOutcome::Handled);
        report.record(&EventOutcome::Ignored);
        report.record(&EventOutcome::Failed("x".to_string()));
        report.record(&EventOutcome::Handled);
        assert_eq!(report.handled, 2);
        assert_eq!(report.total(), 4);
    }
}
