use crate::algorithms::common::{apply_exclusion_zone, sliding_dot_product};
use crate::algorithms::stomp::stomp;
use crate::core::distance_metric::DistanceMetric;
use crate::core::matrix_profile::{MatrixProfile, MatrixProfileConfig};
use crate::core::profile_stream::ProfileStream;

/// Streaming matrix profile computation using the STAMPI algorithm.
///
/// Supports two modes:
/// - **Grow mode** (`egress=false`): The time series grows unboundedly. Each new point
///   extends the profile by one entry and updates existing entries.
/// - **Egress mode** (`egress=true`): Fixed-size sliding window. The oldest point is
///   removed as each new one arrives, so the profile length stays constant.
///
/// Both modes cost one distance profile per point (O(n log n) worst case via the
/// FFT sliding dot product), never a full O(n^2) recomputation. In egress mode,
/// entries whose nearest neighbor has left the window retain their last recorded
/// distance, matching stumpy's `stumpi` behavior.
#[derive(Debug)]
pub struct Stampi<M: DistanceMetric> {
    /// The current time series window.
    ts: Vec<f64>,
    /// Current matrix profile.
    mp: MatrixProfile,
    /// Configuration.
    config: MatrixProfileConfig,
    /// Precomputed metric context.
    ctx: M::Context,
    /// Whether to use egress (sliding window) mode.
    egress: bool,
    /// Window size for egress mode.
    window_size: usize,
}

impl<M: DistanceMetric> Stampi<M> {
    /// Create a new streaming matrix profile from an initial time series.
    ///
    /// Computes the full batch matrix profile on the initial data, then allows
    /// incremental updates via `update()`.
    pub fn new(initial_ts: &[f64], config: MatrixProfileConfig, egress: bool) -> Self {
        assert!(
            initial_ts.len() >= config.m,
            "Initial time series must be at least as long as m"
        );

        let mp = stomp::<M>(initial_ts, &config);
        let ctx = M::precompute(initial_ts, config.m);
        let window_size = initial_ts.len();

        Self {
            ts: initial_ts.to_vec(),
            mp,
            config,
            ctx,
            egress,
            window_size,
        }
    }

    /// Append a new point and update the matrix profile.
    ///
    /// In grow mode: extends the time series and profile.
    /// In egress mode: slides the window, removing the oldest point.
    pub fn update(&mut self, new_val: f64) {
        if self.egress {
            self.update_egress(new_val);
        } else {
            self.update_grow(new_val);
        }
    }

    /// Grow mode: append point, extend profile, update distances both ways.
    fn update_grow(&mut self, new_val: f64) {
        let m = self.config.m;
        let exclusion_zone = self.config.exclusion_zone();

        self.ts.push(new_val);
        M::update_context(&mut self.ctx, &self.ts, m);

        let n_subs = self.ts.len() - m + 1;
        let new_idx = n_subs - 1;

        let mut dist_profile = self.distance_profile_for(new_idx);
        apply_exclusion_zone(&mut dist_profile, new_idx, exclusion_zone);

        self.mp.profile.push(f64::INFINITY);
        self.mp.profile_index.push(0);

        // New subsequence vs all existing, and vice versa
        for (j, &d) in dist_profile.iter().enumerate() {
            self.mp.update(new_idx, d, j);
            self.mp.update(j, d, new_idx);
        }
    }

    /// Egress mode: slide the window by one point.
    ///
    /// The oldest profile entry is dropped and neighbor indices shift left.
    /// Entries whose neighbor was evicted keep their stale distance; only the
    /// new subsequence can tighten them from here on.
    fn update_egress(&mut self, new_val: f64) {
        let m = self.config.m;
        let exclusion_zone = self.config.exclusion_zone();

        self.ts.push(new_val);
        self.ts.remove(0);
        debug_assert_eq!(self.ts.len(), self.window_size);

        // All subsequence offsets shifted, so the context is rebuilt (O(n))
        M::rebuild_context(&mut self.ctx, &self.ts, m);

        self.mp.profile.remove(0);
        self.mp.profile_index.remove(0);
        for idx in self.mp.profile_index.iter_mut() {
            *idx = idx.saturating_sub(1);
        }

        let n_subs = self.ts.len() - m + 1;
        let new_idx = n_subs - 1;

        let mut dist_profile = self.distance_profile_for(new_idx);
        apply_exclusion_zone(&mut dist_profile, new_idx, exclusion_zone);

        self.mp.profile.push(f64::INFINITY);
        self.mp.profile_index.push(0);

        for (j, &d) in dist_profile.iter().enumerate() {
            self.mp.update(new_idx, d, j);
            self.mp.update(j, d, new_idx);
        }
    }

    /// Distance profile for the subsequence at `idx` against the whole window.
    ///
    /// Uses the sliding dot product plus `qt_to_distance` when the metric
    /// supports it, falling back to the per-pair loop otherwise.
    fn distance_profile_for(&self, idx: usize) -> Vec<f64> {
        let m = self.config.m;
        if M::supports_qt_optimization() {
            let qt = sliding_dot_product(&self.ts[idx..idx + m], &self.ts);
            qt.into_iter()
                .enumerate()
                .map(|(j, qt)| M::qt_to_distance(qt, idx, j, m, &self.ctx))
                .collect()
        } else {
            M::distance_profile(&self.ts, idx, m, &self.ctx)
        }
    }

    /// Get a reference to the current matrix profile.
    pub fn profile(&self) -> &MatrixProfile {
        &self.mp
    }

    /// Get a reference to the current time series window.
    pub fn time_series(&self) -> &[f64] {
        &self.ts
    }
}

impl<M: DistanceMetric> ProfileStream for Stampi<M> {
    fn ingest(&mut self, value: f64) {
        self.update(value);
    }

    fn current_profile(&self) -> &[f64] {
        &self.mp.profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::absolute::AbsoluteEuclidean;
    use crate::metrics::euclidean::ZNormalizedEuclidean;

    #[test]
    fn test_stampi_grow_matches_batch() {
        // Build a time series incrementally and compare against batch STOMP
        let full_ts: Vec<f64> = (0..30).map(|i| (i as f64 * 0.5).sin()).collect();
        let m = 4;
        let config = MatrixProfileConfig::new(m);

        // Start with first 10 points
        let initial = &full_ts[..10];
        let mut stampi = Stampi::<ZNormalizedEuclidean>::new(initial, config.clone(), false);

        // Feed remaining points one at a time
        for &val in &full_ts[10..] {
            stampi.update(val);
        }

        // Compare against batch STOMP on the full series
        let batch_mp = stomp::<ZNormalizedEuclidean>(&full_ts, &config);

        assert_eq!(stampi.profile().profile.len(), batch_mp.profile.len());
        for i in 0..batch_mp.profile.len() {
            assert!(
                (stampi.profile().profile[i] - batch_mp.profile[i]).abs() < 1e-9,
                "Mismatch at index {i}: streaming={}, batch={}",
                stampi.profile().profile[i],
                batch_mp.profile[i]
            );
        }
    }

    #[test]
    fn test_stampi_grow_single_update() {
        let ts = vec![1.0, 2.0, 3.0, 2.0, 1.0, 2.0, 3.0];
        let config = MatrixProfileConfig::new(3);

        // Batch on first 6 points
        let mut stampi = Stampi::<ZNormalizedEuclidean>::new(&ts[..6], config.clone(), false);
        let old_len = stampi.profile().profile.len();

        // Add one point
        stampi.update(ts[6]);
        assert_eq!(stampi.profile().profile.len(), old_len + 1);

        // Compare against batch on full series
        let batch_mp = stomp::<ZNormalizedEuclidean>(&ts, &config);
        for i in 0..batch_mp.profile.len() {
            assert!(
                (stampi.profile().profile[i] - batch_mp.profile[i]).abs() < 1e-9,
                "Mismatch at index {i}: streaming={}, batch={}",
                stampi.profile().profile[i],
                batch_mp.profile[i]
            );
        }
    }

    #[test]
    fn test_stampi_egress_window_stays_fixed() {
        let initial = vec![0.0; 40];
        let config = MatrixProfileConfig::new(10);
        let mut stampi = Stampi::<AbsoluteEuclidean>::new(&initial, config, true);

        let profile_len = stampi.profile().profile.len();
        for i in 0..100 {
            stampi.update((i as f64 * 0.3).sin());
            assert_eq!(stampi.time_series().len(), 40);
            assert_eq!(stampi.profile().profile.len(), profile_len);
        }
    }

    #[test]
    fn test_stampi_egress_spike_raises_max() {
        // Flat series, then a large spike: the max profile distance must jump.
        let initial = vec![0.0; 60];
        let config = MatrixProfileConfig::new(15);
        let mut stampi = Stampi::<AbsoluteEuclidean>::new(&initial, config, true);

        let flat_max = stampi
            .profile()
            .profile
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(flat_max, 0.0);

        stampi.update(50.0);
        let spike_max = stampi
            .profile()
            .profile
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(
            spike_max > 1.0,
            "Spike should raise max profile distance, got {spike_max}"
        );
    }

    #[test]
    fn test_stampi_implements_profile_stream() {
        fn drive<S: ProfileStream>(stream: &mut S) -> usize {
            stream.ingest(1.0);
            stream.current_profile().len()
        }

        let initial = vec![0.0; 20];
        let config = MatrixProfileConfig::new(5);
        let mut stampi = Stampi::<AbsoluteEuclidean>::new(&initial, config, true);
        assert_eq!(drive(&mut stampi), 16);
    }
}
