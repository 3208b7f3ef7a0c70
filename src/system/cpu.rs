use std::time::Duration;

use serde::Serialize;

use super::platform;

pub const DEFAULT_WINDOW: Duration = Duration::from_millis(1000);

/// Cumulative tick counters for one logical core since boot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoreTicks {
    pub idle: u64,
    /// Sum of every tick category, idle included.
    pub total: u64,
}

/// Per-core counters captured at one instant, keyed by core id and sorted by it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CpuSnapshot {
    cores: Vec<(usize, CoreTicks)>,
}

impl CpuSnapshot {
    /// Cores numbered by position, for sources that always report every core.
    pub fn new(cores: Vec<CoreTicks>) -> Self {
        Self::from_indexed(cores.into_iter().enumerate().collect())
    }

    /// Cores tagged with their OS id. Offline cores may leave gaps.
    pub fn from_indexed(mut cores: Vec<(usize, CoreTicks)>) -> Self {
        cores.sort_by_key(|(id, _)| *id);
        cores.dedup_by_key(|(id, _)| *id);
        Self { cores }
    }

    pub fn cores(&self) -> &[(usize, CoreTicks)] {
        &self.cores
    }

    pub fn get(&self, id: usize) -> Option<CoreTicks> {
        self.cores
            .binary_search_by_key(&id, |(core, _)| *core)
            .ok()
            .map(|idx| self.cores[idx].1)
    }

    fn same_cores(&self, other: &CpuSnapshot) -> bool {
        self.cores.len() == other.cores.len()
            && self.cores.iter().zip(&other.cores).all(|(a, b)| a.0 == b.0)
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CpuUsage {
    /// Mean utilization across compared cores, 0..=100.
    pub percent: f64,
    pub per_core: Vec<f64>,
    /// `(start, end)` core counts when they disagreed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_count_changed: Option<(usize, usize)>,
}

pub trait TickSource {
    fn capture(&mut self) -> CpuSnapshot;
}

/// Reads counters from the running OS.
#[derive(Debug, Default)]
pub struct PlatformTicks;

impl TickSource for PlatformTicks {
    fn capture(&mut self) -> CpuSnapshot {
        match platform::cpu_ticks() {
            Some(cores) => CpuSnapshot::from_indexed(cores),
            None => {
                tracing::warn!("cpu tick counters unavailable on this platform");
                CpuSnapshot::default()
            }
        }
    }
}

pub struct CpuSampler<S = PlatformTicks> {
    source: S,
}

impl Default for CpuSampler {
    fn default() -> Self {
        Self::new(PlatformTicks)
    }
}

impl<S: TickSource> CpuSampler<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Take two snapshots `window` apart and return the utilization between them.
    ///
    /// The wait is an async sleep, so other tasks on the runtime keep running.
    pub async fn sample(&mut self, window: Duration) -> CpuUsage {
        let start = self.source.capture();
        tokio::time::sleep(window).await;
        let end = self.source.capture();
        utilization(&start, &end)
    }
}

/// Busy percentage of one core between two readings. A zero-length interval counts as idle.
pub fn core_utilization(start: CoreTicks, end: CoreTicks) -> f64 {
    let total_delta = end.total.saturating_sub(start.total);
    if total_delta == 0 {
        return 0.0;
    }
    let idle_delta = end.idle.saturating_sub(start.idle);
    let busy = 100.0 - (idle_delta as f64 / total_delta as f64) * 100.0;
    busy.clamp(0.0, 100.0)
}

/// Compare two snapshots core by core, matching cores by id.
///
/// When the set of cores changed between them only the ids present in both
/// are compared and the mismatch is recorded on the result.
pub fn utilization(start: &CpuSnapshot, end: &CpuSnapshot) -> CpuUsage {
    let core_count_changed = if !start.same_cores(end) {
        tracing::warn!(
            start = start.len(),
            end = end.len(),
            "core count changed during measurement"
        );
        Some((start.len(), end.len()))
    } else {
        None
    };

    let per_core: Vec<f64> = start
        .cores()
        .iter()
        .filter_map(|&(id, s)| end.get(id).map(|e| core_utilization(s, e)))
        .collect();

    let percent = if per_core.is_empty() {
        0.0
    } else {
        per_core.iter().sum::<f64>() / per_core.len() as f64
    };

    CpuUsage {
        percent,
        per_core,
        core_count_changed,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use proptest::prelude::*;

    use super::*;

    fn snap(cores: &[(u64, u64)]) -> CpuSnapshot {
        CpuSnapshot::new(
            cores
                .iter()
                .map(|&(idle, total)| CoreTicks { idle, total })
                .collect(),
        )
    }

    #[test]
    fn fully_idle_is_zero() {
        let start = snap(&[(100, 200), (50, 80)]);
        let end = snap(&[(300, 400), (150, 180)]);
        assert_eq!(utilization(&start, &end).percent, 0.0);
    }

    #[test]
    fn fully_busy_is_hundred() {
        let start = snap(&[(100, 200), (50, 80)]);
        let end = snap(&[(100, 400), (50, 180)]);
        assert_eq!(utilization(&start, &end).percent, 100.0);
    }

    #[test]
    fn averages_across_cores() {
        // 50% and 25% busy
        let start = snap(&[(0, 0), (0, 0)]);
        let end = snap(&[(50, 100), (75, 100)]);
        let usage = utilization(&start, &end);
        assert_eq!(usage.per_core, vec![50.0, 25.0]);
        assert!((usage.percent - 37.5).abs() < 1e-9);
        assert!(usage.core_count_changed.is_none());
    }

    #[test]
    fn zero_total_delta_contributes_zero() {
        let start = snap(&[(10, 20), (0, 0)]);
        let end = snap(&[(10, 20), (0, 100)]);
        let usage = utilization(&start, &end);
        assert_eq!(usage.per_core[0], 0.0);
        assert!(usage.percent.is_finite());
        assert_eq!(usage.percent, 50.0);
    }

    #[test]
    fn mismatched_core_counts_compare_shared_ids() {
        let start = snap(&[(0, 0), (0, 0), (0, 0)]);
        let end = snap(&[(0, 100), (100, 100)]);
        let usage = utilization(&start, &end);
        assert_eq!(usage.per_core.len(), 2);
        assert_eq!(usage.percent, 50.0);
        assert_eq!(usage.core_count_changed, Some((3, 2)));
    }

    #[test]
    fn offline_middle_core_does_not_shift_the_pairing() {
        let start = CpuSnapshot::from_indexed(vec![
            (0, CoreTicks { idle: 0, total: 0 }),
            (1, CoreTicks { idle: 500, total: 1000 }),
            (2, CoreTicks { idle: 100, total: 200 }),
        ]);
        // cpu1 went offline; cpu2 was 50% busy over the window
        let end = CpuSnapshot::from_indexed(vec![
            (0, CoreTicks { idle: 100, total: 100 }),
            (2, CoreTicks { idle: 150, total: 300 }),
        ]);
        let usage = utilization(&start, &end);
        assert_eq!(usage.per_core, vec![0.0, 50.0]);
        assert_eq!(usage.percent, 25.0);
        assert_eq!(usage.core_count_changed, Some((3, 2)));
    }

    #[test]
    fn swapped_core_ids_are_reported_as_a_change() {
        let start =
            CpuSnapshot::from_indexed(vec![(0, CoreTicks::default()), (1, CoreTicks::default())]);
        let end = CpuSnapshot::from_indexed(vec![
            (0, CoreTicks { idle: 0, total: 100 }),
            (2, CoreTicks { idle: 0, total: 100 }),
        ]);
        let usage = utilization(&start, &end);
        assert_eq!(usage.per_core, vec![100.0]);
        assert_eq!(usage.core_count_changed, Some((2, 2)));
    }

    #[test]
    fn empty_snapshots_yield_zero() {
        let usage = utilization(&CpuSnapshot::default(), &CpuSnapshot::default());
        assert_eq!(usage.percent, 0.0);
        assert!(usage.per_core.is_empty());
    }

    #[test]
    fn counter_reset_does_not_underflow() {
        let start = snap(&[(500, 1000)]);
        let end = snap(&[(10, 20)]);
        assert_eq!(utilization(&start, &end).percent, 0.0);
    }

    struct Scripted(VecDeque<CpuSnapshot>);

    impl TickSource for Scripted {
        fn capture(&mut self) -> CpuSnapshot {
            self.0.pop_front().unwrap_or_default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sample_waits_for_the_window() {
        let source = Scripted(VecDeque::from([
            snap(&[(0, 0)]),
            snap(&[(25, 100)]),
        ]));
        let mut sampler = CpuSampler::new(source);

        let before = tokio::time::Instant::now();
        let usage = sampler.sample(Duration::from_millis(1500)).await;

        assert!(before.elapsed() >= Duration::from_millis(1500));
        assert_eq!(usage.percent, 75.0);
    }

    proptest! {
        #[test]
        fn utilization_stays_in_range(
            cores in prop::collection::vec(
                (0u64..1_000_000, 0u64..1_000_000, 0u64..1_000, 1u64..1_000),
                1..64,
            )
        ) {
            // (idle_start, busy_start, idle_delta, busy_delta) so every totalDelta > 0
            let start = CpuSnapshot::new(
                cores.iter().map(|&(i, b, _, _)| CoreTicks { idle: i, total: i + b }).collect(),
            );
            let end = CpuSnapshot::new(
                cores
                    .iter()
                    .map(|&(i, b, di, db)| CoreTicks { idle: i + di, total: i + b + di + db })
                    .collect(),
            );
            let usage = utilization(&start, &end);
            prop_assert!((0.0..=100.0).contains(&usage.percent));
            prop_assert_eq!(usage.per_core.len(), cores.len());
        }
    }
}
