#![forbid(unsafe_code)]

//! Compute-time budgets and analysis statistics.

use std::collections::VecDeque;
use std::time::Duration;

/// Retained compute-time samples for percentiles.
const MAX_SAMPLES: usize = 512;

/// Which analysis a compute belongs to; each has its own budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// First analysis after construction.
    Initial,
    /// Any later analysis with unchanged orientation.
    Recompute,
    /// Analysis right after an orientation flip.
    OrientationChange,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Recompute => "recompute",
            Self::OrientationChange => "orientation_change",
        }
    }
}

/// Per-stage time budgets in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct PerformanceBudgets {
    /// Default: 200.
    pub initial_ms: u64,
    /// Default: 100.
    pub recompute_ms: u64,
    /// Default: 150.
    pub orientation_ms: u64,
}

impl Default for PerformanceBudgets {
    fn default() -> Self {
        Self {
            initial_ms: 200,
            recompute_ms: 100,
            orientation_ms: 150,
        }
    }
}

impl PerformanceBudgets {
    /// Budget for one stage.
    pub fn budget_for(&self, stage: Stage) -> Duration {
        Duration::from_millis(match stage {
            Stage::Initial => self.initial_ms,
            Stage::Recompute => self.recompute_ms,
            Stage::OrientationChange => self.orientation_ms,
        })
    }
}

/// Compute-time percentiles in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputeTimePercentiles {
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub max_ms: f64,
    pub mean_ms: f64,
    pub count: usize,
}

impl ComputeTimePercentiles {
    /// Serialize to JSONL format.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        format!(
            r#"{{"event":"compute_time_percentiles","p50_ms":{:.3},"p95_ms":{:.3},"p99_ms":{:.3},"max_ms":{:.3},"mean_ms":{:.3},"count":{}}}"#,
            self.p50_ms, self.p95_ms, self.p99_ms, self.max_ms, self.mean_ms, self.count
        )
    }
}

/// Counters and timings for the analysis pipeline.
#[derive(Debug, Clone, Default)]
pub struct PerformanceStats {
    /// Completed analyses (cache hits included).
    pub analyses: u64,
    /// Optimizer invocations.
    pub computes: u64,
    /// Pending analyses dropped by the change threshold.
    pub skipped: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Analyses that fell back to the default plan.
    pub fallbacks: u64,
    pub budget_violations: u64,
    pub last_compute: Option<Duration>,
    pub last_stage: Option<Stage>,
    samples_ms: VecDeque<f64>,
}

impl PerformanceStats {
    /// Record one optimizer run. Returns `true` when it exceeded `budget`.
    pub fn record_compute(&mut self, stage: Stage, elapsed: Duration, budget: Duration) -> bool {
        self.computes += 1;
        self.last_compute = Some(elapsed);
        self.last_stage = Some(stage);
        if self.samples_ms.len() >= MAX_SAMPLES {
            self.samples_ms.pop_front();
        }
        self.samples_ms.push_back(elapsed.as_secs_f64() * 1000.0);
        let over = elapsed > budget;
        if over {
            self.budget_violations += 1;
        }
        over
    }

    /// Percentiles over retained samples, `None` before the first compute.
    #[must_use]
    pub fn percentiles(&self) -> Option<ComputeTimePercentiles> {
        if self.samples_ms.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = self.samples_ms.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let len = sorted.len();
        let p95_idx = (len * 95) / 100;
        let p99_idx = (len * 99) / 100;
        Some(ComputeTimePercentiles {
            p50_ms: sorted[len / 2],
            p95_ms: sorted[p95_idx.min(len - 1)],
            p99_ms: sorted[p99_idx.min(len - 1)],
            max_ms: sorted[len - 1],
            mean_ms: sorted.iter().sum::<f64>() / len as f64,
            count: len,
        })
    }

    /// Cache hits over lookups, 0.0 before the first lookup.
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }

    /// Serialize counters to JSONL format.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        let last_ms = match self.last_compute {
            Some(d) => format!("{:.3}", d.as_secs_f64() * 1000.0),
            None => "null".to_string(),
        };
        format!(
            r#"{{"event":"performance_stats","analyses":{},"computes":{},"skipped":{},"cache_hits":{},"cache_misses":{},"cache_hit_rate":{:.3},"fallbacks":{},"budget_violations":{},"last_compute_ms":{}}}"#,
            self.analyses,
            self.computes,
            self.skipped,
            self.cache_hits,
            self.cache_misses,
            self.cache_hit_rate(),
            self.fallbacks,
            self.budget_violations,
            last_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_budgets() {
        let budgets = PerformanceBudgets::default();
        assert_eq!(budgets.budget_for(Stage::Initial), Duration::from_millis(200));
        assert_eq!(budgets.budget_for(Stage::Recompute), Duration::from_millis(100));
        assert_eq!(budgets.budget_for(Stage::OrientationChange), Duration::from_millis(150));
    }

    #[test]
    fn flags_budget_violations() {
        let mut stats = PerformanceStats::default();
        let budget = Duration::from_millis(100);
        assert!(!stats.record_compute(Stage::Recompute, Duration::from_millis(100), budget));
        assert!(stats.record_compute(Stage::Recompute, Duration::from_millis(101), budget));
        assert_eq!(stats.budget_violations, 1);
        assert_eq!(stats.computes, 2);
        assert_eq!(stats.last_stage, Some(Stage::Recompute));
    }

    #[test]
    fn percentiles_over_samples() {
        let mut stats = PerformanceStats::default();
        assert!(stats.percentiles().is_none());
        for ms in 1..=100 {
            stats.record_compute(Stage::Recompute, Duration::from_millis(ms), Duration::from_secs(1));
        }
        let p = stats.percentiles().unwrap();
        assert_eq!(p.count, 100);
        assert!((p.p50_ms - 51.0).abs() < 1e-6);
        assert!((p.p95_ms - 96.0).abs() < 1e-6);
        assert!((p.max_ms - 100.0).abs() < 1e-6);
        assert!((p.mean_ms - 50.5).abs() < 1e-6);
    }

    #[test]
    fn samples_are_bounded() {
        let mut stats = PerformanceStats::default();
        for _ in 0..(MAX_SAMPLES + 10) {
            stats.record_compute(Stage::Recompute, Duration::from_micros(5), Duration::from_secs(1));
        }
        assert_eq!(stats.percentiles().unwrap().count, MAX_SAMPLES);
        assert_eq!(stats.computes, (MAX_SAMPLES + 10) as u64);
    }

    #[test]
    fn hit_rate_and_jsonl() {
        let mut stats = PerformanceStats::default();
        assert_eq!(stats.cache_hit_rate(), 0.0);
        stats.cache_hits = 3;
        stats.cache_misses = 1;
        assert!((stats.cache_hit_rate() - 0.75).abs() < 1e-9);
        let line = stats.to_jsonl();
        assert!(line.contains(r#""cache_hit_rate":0.750"#));
        assert!(line.contains(r#""last_compute_ms":null"#));
    }
}
