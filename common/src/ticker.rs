use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TickerError {
    #[error("ticker period must be greater than zero")]
    ZeroPeriod,
    #[error("a ticker must be started from within a tokio runtime")]
    NoRuntime,
}

/// Runs a task once right away and then once every period, until stopped.
///
/// Dropping a running ticker aborts it.
#[derive(Debug)]
pub struct Ticker {
    ticks: Arc<AtomicU64>,
    stop: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn start<F>(period: Duration, mut task: F) -> Result<Self, TickerError>
    where
        F: FnMut() + Send + 'static,
    {
        if period.is_zero() {
            return Err(TickerError::ZeroPeriod);
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TickerError::NoRuntime)?;

        let ticks = Arc::new(AtomicU64::new(0));
        let (stop, mut stopped) = oneshot::channel();

        let counter = ticks.clone();
        let handle = runtime.spawn(async move {
            // The first tick of an interval completes immediately.
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stopped => break,
                    _ = interval.tick() => {
                        task();
                        counter.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        });

        log::debug!("Ticker started with a period of {period:?}");
        Ok(Self {
            ticks,
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    /// Number of completed task runs.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Stops the ticker after the current run, if any, and returns the final tick count.
    pub async fn stop(mut self) -> u64 {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                log::error!("Ticker task failed: {err}");
            }
        }

        let ticks = self.ticks();
        log::debug!("Ticker stopped after {ticks} ticks");
        ticks
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{InMemoryPage, SharedPage};
    use crate::sensor::SensorSimulator;
    use crate::updater::SensorUpdater;
    use crate::{LocalClock, ValueStore};
    use tokio::time::sleep;

    const PERIOD: Duration = Duration::from_millis(5000);

    fn counting() -> (Arc<AtomicU64>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicU64::new(0));
        let task_count = count.clone();
        (count, move || {
            task_count.fetch_add(1, Ordering::Relaxed);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn runs_once_at_start_then_every_period() {
        let (count, task) = counting();
        let ticker = Ticker::start(PERIOD, task).unwrap();

        sleep(Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::Relaxed), 1);

        sleep(Duration::from_millis(4_000)).await;
        assert_eq!(count.load(Ordering::Relaxed), 1);

        // t = 5_001 ms
        sleep(Duration::from_millis(1_000)).await;
        assert_eq!(count.load(Ordering::Relaxed), 2);

        // t = 12_000 ms
        sleep(Duration::from_millis(6_999)).await;
        assert_eq!(count.load(Ordering::Relaxed), 3);
        assert_eq!(ticker.ticks(), 3);

        // t = 60_500 ms: 1 + floor(60_500 / 5_000)
        sleep(Duration::from_millis(48_500)).await;
        assert_eq!(ticker.ticks(), 13);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_loop() {
        let (count, task) = counting();
        let ticker = Ticker::start(PERIOD, task).unwrap();

        sleep(Duration::from_millis(7_500)).await;
        assert_eq!(ticker.stop().await, 2);

        sleep(Duration::from_millis(20_000)).await;
        assert_eq!(count.load(Ordering::Relaxed), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_aborts_the_loop() {
        let (count, task) = counting();
        let ticker = Ticker::start(PERIOD, task).unwrap();

        sleep(Duration::from_millis(1)).await;
        drop(ticker);

        sleep(Duration::from_millis(20_000)).await;
        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn zero_period_is_rejected() {
        let err = Ticker::start(Duration::ZERO, || {}).unwrap_err();
        assert_eq!(err, TickerError::ZeroPeriod);
    }

    #[test]
    fn needs_a_runtime() {
        let err = Ticker::start(PERIOD, || {}).unwrap_err();
        assert_eq!(err, TickerError::NoRuntime);
    }

    #[tokio::test(start_paused = true)]
    async fn reading_is_set_once_before_the_first_period_elapses() {
        let store = ValueStore::new();
        let page = SharedPage::new(InMemoryPage::new().with_element("timestamp"));
        let mut updater = SensorUpdater::new(
            SensorSimulator::from_seed(5),
            store.clone(),
            page.clone(),
            LocalClock,
            "timestamp",
            "%H:%M:%S",
        );

        assert!(store.latest().is_none());
        let ticker = Ticker::start(PERIOD, move || {
            let _ = updater.update();
        })
        .unwrap();

        sleep(Duration::from_millis(1)).await;
        assert_eq!(ticker.ticks(), 1);
        assert!(store.latest().is_some());
        assert!(page
            .text("timestamp")
            .is_some_and(|text| text.starts_with("Last updated: ")));

        ticker.stop().await;
    }
}
