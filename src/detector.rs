//! Streaming outlier detection on top of a matrix profile stream.
//!
//! The detector consumes one profile snapshot per tick and runs a multi-stage
//! filter before confirming an anomaly:
//!
//! 1. **Warm-up**: no verdict until more than `m` ticks have been observed.
//! 2. **Cooldown**: a confirmed anomaly suppresses further detections for
//!    `ts_size * recent_mult` positions, so one underlying event does not
//!    re-trigger in a cluster.
//! 3. **Threshold crossing**: the snapshot maximum must exceed
//!    `mean + std_dev_mult * std`.
//! 4. **Epsilon guard**: crossings within 0.01 of the threshold are treated
//!    as numeric noise.
//! 5. **Range expansion**: the spread of recent peak profile values must
//!    exceed `range_mult` times the average spread recorded at the last five
//!    confirmed anomalies.
//!
//! All five gates must pass for a verdict of `true`.

use std::collections::VecDeque;

use thiserror::Error;
use tracing::{debug, info};

use crate::algorithms::stampi::Stampi;
use crate::core::matrix_profile::MatrixProfileConfig;
use crate::core::profile_stream::ProfileStream;
use crate::metrics::absolute::AbsoluteEuclidean;

/// Crossing margins at or below this are treated as numeric noise.
const CROSSING_EPSILON: f64 = 0.01;

/// Capacity of the rolling buffer of confirmed-anomaly range magnitudes.
const ROLLING_RANGE_SLOTS: usize = 5;

/// Default warm-up series length, in multiples of `m`.
const DEFAULT_WARMUP_FACTOR: usize = 4;

/// Invalid detector configuration, rejected at construction time.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("subsequence length must be >= 2, got {0}")]
    SubsequenceLength(usize),
    #[error("{name} must be positive, got {value}")]
    NonPositiveMultiplier { name: &'static str, value: f64 },
    #[error("initial series has {len} points, need at least m = {m}")]
    InitialSeriesTooShort { len: usize, m: usize },
}

/// Tuning parameters for the outlier detector. Immutable after construction.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutlierConfig {
    /// Subsequence length for the underlying matrix profile.
    pub m: usize,
    /// Multiplier on the snapshot standard deviation in the detection threshold.
    pub std_dev_mult: f64,
    /// Multiplier on the rolling range baseline in the range-expansion gate.
    pub range_mult: f64,
    /// Multiplier on the series length in the post-anomaly cooldown window.
    pub recent_mult: f64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            m: 15,
            std_dev_mult: 3.0,
            range_mult: 3.0,
            recent_mult: 2.0,
        }
    }
}

impl OutlierConfig {
    /// Validate the configuration.
    ///
    /// The engine needs `m >= 2` to form subsequences, and all multipliers
    /// must be strictly positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.m < 2 {
            return Err(ConfigError::SubsequenceLength(self.m));
        }
        for (name, value) in [
            ("std_dev_mult", self.std_dev_mult),
            ("range_mult", self.range_mult),
            ("recent_mult", self.recent_mult),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositiveMultiplier { name, value });
            }
        }
        Ok(())
    }
}

/// Stateful streaming outlier detector.
///
/// Generic over the profile engine so tests (or alternative engines) can
/// supply scripted snapshots through [`ProfileStream`]. Production use goes
/// through [`StreamingOutlierDetector`], which pairs the filter with an
/// egress-mode [`Stampi`] over the absolute Euclidean metric.
///
/// One instance owns one logical stream; calls to [`ingest_sample`] and
/// [`evaluate`] must be strictly sequential. Statistic histories grow without
/// bound by design; only the rolling range buffer is fixed-size.
///
/// [`ingest_sample`]: OutlierDetector::ingest_sample
/// [`evaluate`]: OutlierDetector::evaluate
#[derive(Debug)]
pub struct OutlierDetector<S: ProfileStream> {
    stream: S,
    config: OutlierConfig,
    /// Configured series length, scales the cooldown window.
    ts_size: usize,
    /// Number of `evaluate` calls so far.
    count: usize,
    /// Per-tick snapshot maxima, rounded to 4 decimals.
    max_history: Vec<f64>,
    /// Per-tick snapshot means, rounded to 4 decimals.
    mean_history: Vec<f64>,
    /// Per-tick snapshot population standard deviations, rounded to 4 decimals.
    std_history: Vec<f64>,
    /// Per-tick detection thresholds: `mean + std_dev_mult * std`.
    metric_history: Vec<f64>,
    /// Global indices of confirmed anomalies, strictly increasing.
    anomalies: Vec<usize>,
    /// Peak ranges recorded at the last five confirmed anomalies.
    /// Starts as five zeros, which makes the range gate pass trivially
    /// until the first anomaly is confirmed. Intentional; see range_expanded().
    rolling_range: VecDeque<f64>,
}

/// The default production detector: egress-mode STAMPI, absolute Euclidean.
pub type StreamingOutlierDetector = OutlierDetector<Stampi<AbsoluteEuclidean>>;

impl StreamingOutlierDetector {
    /// Create a detector seeded with `m * 4` zeros, mirroring the reference
    /// model's default warm-up series.
    pub fn new(config: OutlierConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let initial = vec![0.0; config.m * DEFAULT_WARMUP_FACTOR];
        Self::with_initial_series(&initial, config)
    }

    /// Create a detector seeded with a caller-supplied warm-up series.
    ///
    /// The series length becomes `ts_size`, fixing both the sliding window
    /// and the cooldown scale.
    pub fn with_initial_series(
        initial_ts: &[f64],
        config: OutlierConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if initial_ts.len() < config.m {
            return Err(ConfigError::InitialSeriesTooShort {
                len: initial_ts.len(),
                m: config.m,
            });
        }
        let stream = Stampi::new(initial_ts, MatrixProfileConfig::new(config.m), true);
        Ok(Self::build(stream, initial_ts.len(), config))
    }
}

impl<S: ProfileStream> OutlierDetector<S> {
    /// Create a detector over an externally constructed profile engine.
    ///
    /// `ts_size` is the configured series length used to scale the cooldown.
    pub fn from_stream(stream: S, ts_size: usize, config: OutlierConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(stream, ts_size, config))
    }

    fn build(stream: S, ts_size: usize, config: OutlierConfig) -> Self {
        Self {
            stream,
            config,
            ts_size,
            count: 0,
            max_history: Vec::new(),
            mean_history: Vec::new(),
            std_history: Vec::new(),
            metric_history: Vec::new(),
            anomalies: Vec::new(),
            rolling_range: VecDeque::from(vec![0.0; ROLLING_RANGE_SLOTS]),
        }
    }

    /// Forward one sample to the profile engine. No filtering happens here.
    pub fn ingest_sample(&mut self, value: f64) {
        self.stream.ingest(value);
    }

    /// Judge the most recently ingested sample.
    ///
    /// `global_index` is the sample's position in the overall series; calls
    /// must supply non-decreasing indices. Returns `true` only when all five
    /// gates pass, in which case the index is recorded and the rolling range
    /// baseline is updated.
    pub fn evaluate(&mut self, global_index: usize) -> bool {
        self.count += 1;

        let (max_mp, mean_mp, std_mp) = snapshot_stats(self.stream.current_profile());
        self.max_history.push(max_mp);
        self.mean_history.push(mean_mp);
        self.std_history.push(std_mp);

        let metric = mean_mp + self.config.std_dev_mult * std_mp;
        self.metric_history.push(metric);

        let confirmed = !self.is_warming_up()
            && !self.in_cooldown(global_index)
            && max_mp > metric
            && (metric - max_mp).abs() > CROSSING_EPSILON
            && self.range_expanded();

        if confirmed {
            let range_now = self.peak_range();
            if self.rolling_range.len() == ROLLING_RANGE_SLOTS {
                self.rolling_range.pop_front();
            }
            self.rolling_range.push_back(range_now);
            self.anomalies.push(global_index);
            info!(
                global_index,
                max_mp,
                metric,
                range = range_now,
                "anomaly confirmed"
            );
        } else if max_mp > metric && (metric - max_mp).abs() > CROSSING_EPSILON {
            debug!(
                global_index,
                max_mp,
                metric,
                warming_up = self.is_warming_up(),
                cooldown = self.in_cooldown(global_index),
                "threshold crossing suppressed"
            );
        }

        confirmed
    }

    /// Convenience wrapper: ingest one sample, then evaluate it.
    pub fn step(&mut self, global_index: usize, value: f64) -> bool {
        self.ingest_sample(value);
        self.evaluate(global_index)
    }

    /// True until more than `m` ticks have been evaluated.
    pub fn is_warming_up(&self) -> bool {
        self.count <= self.config.m
    }

    /// True while `global_index` is within `ts_size * recent_mult` of the
    /// last confirmed anomaly. Never true before the first anomaly.
    fn in_cooldown(&self, global_index: usize) -> bool {
        match self.anomalies.last() {
            Some(&last) => {
                (global_index as f64) < last as f64 + self.ts_size as f64 * self.config.recent_mult
            }
            None => false,
        }
    }

    /// Spread of the last `m` entries of the max-profile history.
    fn peak_range(&self) -> f64 {
        let start = self.max_history.len().saturating_sub(self.config.m);
        let window = &self.max_history[start..];
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &v in window {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        hi - lo
    }

    /// Range-expansion gate: current peak spread must exceed `range_mult`
    /// times the average spread at recent confirmed anomalies. The buffer
    /// starts as zeros, so any positive spread passes until the first
    /// anomaly has been recorded.
    fn range_expanded(&self) -> bool {
        let baseline: f64 =
            self.rolling_range.iter().sum::<f64>() / self.rolling_range.len() as f64;
        self.peak_range() > self.config.range_mult * baseline
    }

    /// Global indices of confirmed anomalies, in detection order.
    pub fn anomalies(&self) -> &[usize] {
        &self.anomalies
    }

    /// Number of `evaluate` calls so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Per-tick snapshot maxima.
    pub fn max_history(&self) -> &[f64] {
        &self.max_history
    }

    /// Per-tick snapshot means.
    pub fn mean_history(&self) -> &[f64] {
        &self.mean_history
    }

    /// Per-tick snapshot standard deviations.
    pub fn std_history(&self) -> &[f64] {
        &self.std_history
    }

    /// Per-tick detection thresholds.
    pub fn metric_history(&self) -> &[f64] {
        &self.metric_history
    }

    /// Recent confirmed-anomaly peak ranges (oldest first, always 5 entries).
    pub fn rolling_range(&self) -> &VecDeque<f64> {
        &self.rolling_range
    }

    /// The detector configuration.
    pub fn config(&self) -> &OutlierConfig {
        &self.config
    }

    /// The underlying profile engine.
    pub fn profile_stream(&self) -> &S {
        &self.stream
    }
}

/// Max, mean, and population standard deviation of a profile snapshot,
/// each rounded to 4 decimal places. An empty snapshot yields zeros, which
/// the warm-up gate absorbs. NaN distances are not sanitized: they poison
/// the statistics and every gate comparison evaluates false.
fn snapshot_stats(profile: &[f64]) -> (f64, f64, f64) {
    if profile.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let n = profile.len() as f64;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &v in profile {
        max = max.max(v);
        sum += v;
    }
    let mean = sum / n;
    let var = profile.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (round4(max), round4(mean), round4(var.sqrt()))
}

/// Round to 4 decimal places, matching the reference model's statistics.
fn round4(x: f64) -> f64 {
    (x * 1e4).round() / 1e4
}
