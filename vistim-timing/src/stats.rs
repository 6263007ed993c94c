use std::time::Duration;

/// Aggregate over the recorded tick-to-tick display intervals.
#[derive(Debug, Clone)]
pub struct IntervalReport {
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub jitter_ms: f64,
    pub effective_hz: f64,
    pub samples: usize,
}

/// Records the wall-clock interval between consecutive presented
/// frames. Skipped (coalesced) ticks are not individual errors; they
/// simply widen the intervals reported here.
#[derive(Debug, Clone, Default)]
pub struct IntervalStats {
    intervals: Vec<Duration>,
}

impl IntervalStats {
    pub fn new() -> Self {
        Self { intervals: Vec::with_capacity(1024) }
    }

    pub fn record(&mut self, interval: Duration) {
        self.intervals.push(interval);
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn report(&self) -> IntervalReport {
        let times: Vec<f64> = self
            .intervals
            .iter()
            .map(|d| d.as_secs_f64() * 1e3)
            .collect();
        if times.is_empty() {
            return IntervalReport {
                mean_ms: 0.0,
                min_ms: 0.0,
                max_ms: 0.0,
                jitter_ms: 0.0,
                effective_hz: 0.0,
                samples: 0,
            };
        }
        let sum: f64 = times.iter().sum();
        let mean = sum / times.len() as f64;
        let var = times.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / times.len() as f64;
        let min = times.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = times.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        IntervalReport {
            mean_ms: mean,
            min_ms: min,
            max_ms: max,
            jitter_ms: var.sqrt(),
            effective_hz: if mean > 0.0 { 1e3 / mean } else { 0.0 },
            samples: times.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_zeroed() {
        let stats = IntervalStats::new();
        let report = stats.report();
        assert_eq!(report.samples, 0);
        assert_eq!(report.mean_ms, 0.0);
        assert_eq!(report.effective_hz, 0.0);
    }

    #[test]
    fn mean_matches_configured_refresh_over_simulated_ticks() {
        // N ticks at a nominal 50 ms refresh with a couple of coalesced
        // skips: the mean stays within the widened-interval tolerance.
        let refresh = Duration::from_millis(50);
        let mut stats = IntervalStats::new();
        for i in 0..100 {
            if i % 25 == 24 {
                stats.record(refresh * 2); // one skipped tick
            } else {
                stats.record(refresh);
            }
        }
        let report = stats.report();
        assert_eq!(report.samples, 100);
        assert!((report.mean_ms - 50.0).abs() < 50.0 * 0.1);
        assert_eq!(report.min_ms, 50.0);
        assert_eq!(report.max_ms, 100.0);
        assert!(report.jitter_ms > 0.0);
    }

    #[test]
    fn exact_ticks_report_exact_mean() {
        let mut stats = IntervalStats::new();
        for _ in 0..10 {
            stats.record(Duration::from_millis(80));
        }
        let report = stats.report();
        assert!((report.mean_ms - 80.0).abs() < 1e-9);
        assert!((report.effective_hz - 12.5).abs() < 1e-9);
        assert_eq!(report.jitter_ms, 0.0);
    }
}
