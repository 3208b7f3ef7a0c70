use std::future::Future;
use std::time::Duration;

use color_eyre::Result;
use tokio::sync::watch;

/// One "sample and render" pass.
pub trait Cycle {
    fn run_once(&mut self) -> impl Future<Output = Result<()>>;
}

/// Requests that a running [`Scheduler`] stop after its current cycle.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }
}

#[derive(Debug)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    async fn stopped(&mut self) {
        // Every handle dropped without stopping: nothing can stop us any more.
        if self.rx.wait_for(|stopped| *stopped).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, StopSignal { rx })
}

/// Runs a [`Cycle`] repeatedly with a fixed pause between the end of one
/// cycle and the start of the next.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    period: Duration,
}

impl Scheduler {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns the number of completed cycles. A stop request never interrupts
    /// a cycle already in flight; a cycle error ends the loop.
    pub async fn run<C: Cycle>(&self, cycle: &mut C, mut stop: StopSignal) -> Result<u64> {
        let mut completed = 0;
        while !stop.is_stopped() {
            cycle.run_once().await?;
            completed += 1;

            tokio::select! {
                _ = stop.stopped() => break,
                _ = tokio::time::sleep(self.period) => {}
            }
        }
        tracing::debug!(completed, "scheduler stopped");
        Ok(completed)
    }
}

#[cfg(test)]
mod tests {
    use color_eyre::eyre::eyre;
    use tokio::time::Instant;

    use super::*;

    struct Recorder {
        started: Vec<Instant>,
        stop_after: usize,
        handle: StopHandle,
        work: Duration,
    }

    impl Cycle for Recorder {
        async fn run_once(&mut self) -> Result<()> {
            self.started.push(Instant::now());
            tokio::time::sleep(self.work).await;
            if self.started.len() == self.stop_after {
                self.handle.stop();
            }
            Ok(())
        }
    }

    fn recorder(stop_after: usize, handle: StopHandle) -> Recorder {
        Recorder {
            started: Vec::new(),
            stop_after,
            handle,
            work: Duration::ZERO,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_requested_cycle() {
        let (handle, signal) = stop_channel();
        let mut cycle = recorder(3, handle);

        let completed = Scheduler::new(Duration::from_secs(1))
            .run(&mut cycle, signal)
            .await
            .unwrap();

        assert_eq!(completed, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_a_full_period_after_each_cycle() {
        let (handle, signal) = stop_channel();
        let mut cycle = recorder(3, handle);
        cycle.work = Duration::from_millis(400);

        Scheduler::new(Duration::from_secs(2))
            .run(&mut cycle, signal)
            .await
            .unwrap();

        for pair in cycle.started.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(2400));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_before_start_runs_nothing() {
        let (handle, signal) = stop_channel();
        handle.stop();
        let mut cycle = recorder(usize::MAX, handle);

        let completed = Scheduler::new(Duration::from_secs(1))
            .run(&mut cycle, signal)
            .await
            .unwrap();

        assert_eq!(completed, 0);
        assert!(cycle.started.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn external_stop_interrupts_the_pause() {
        let (handle, signal) = stop_channel();
        let external = handle.clone();
        let mut cycle = recorder(usize::MAX, handle);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            external.stop();
        });

        let start = Instant::now();
        let completed = Scheduler::new(Duration::from_secs(1))
            .run(&mut cycle, signal)
            .await
            .unwrap();

        // cycles at t=0, 1 and 2; the stop lands mid-pause
        assert_eq!(completed, 3);
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_cycle_completes_before_stopping() {
        let (handle, signal) = stop_channel();
        let external = handle.clone();
        let mut cycle = recorder(usize::MAX, handle);
        cycle.work = Duration::from_secs(5);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            external.stop();
        });

        let start = Instant::now();
        let completed = Scheduler::new(Duration::from_secs(1))
            .run(&mut cycle, signal)
            .await
            .unwrap();

        assert_eq!(completed, 1);
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    struct Failing;

    impl Cycle for Failing {
        async fn run_once(&mut self) -> Result<()> {
            Err(eyre!("render failed"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cycle_error_propagates() {
        let (_handle, signal) = stop_channel();
        let err = Scheduler::new(Duration::from_secs(1))
            .run(&mut Failing, signal)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "render failed");
    }
}
