/// Trait for distance metrics used in matrix profile computation.
///
/// Designed for static polymorphism: algorithms are generic over `M: DistanceMetric`,
/// enabling monomorphization and inlining in the inner loop.
///
/// The associated `Context` type holds precomputed statistics (e.g., rolling means/stds
/// for z-normalized Euclidean). This avoids recomputing per-pair statistics in O(n^2) calls.
pub trait DistanceMetric: Clone + Send + Sync {
    /// Precomputed context for the metric (e.g., rolling statistics).
    type Context: Clone + Send + Sync;

    /// Precompute context from a time series and subsequence length.
    fn precompute(ts: &[f64], m: usize) -> Self::Context;

    /// Compute distance between subsequences starting at indices `i` and `j`.
    fn distance(ts: &[f64], i: usize, j: usize, m: usize, ctx: &Self::Context) -> f64;

    /// Compute the distance profile for subsequence at `idx` against all others.
    ///
    /// Default implementation loops over `distance()`. Metrics with QT support
    /// get a batch-optimized path in the batch/streaming algorithms instead.
    fn distance_profile(ts: &[f64], idx: usize, m: usize, ctx: &Self::Context) -> Vec<f64> {
        let n_subs = ts.len() - m + 1;
        (0..n_subs)
            .map(|j| Self::distance(ts, idx, j, m, ctx))
            .collect()
    }

    /// Whether this metric supports the QT (dot product) incremental update optimization.
    ///
    /// When true, STOMP can use O(1) QT updates per element instead of recomputing
    /// full dot products. The compiler eliminates the dead branch via monomorphization.
    fn supports_qt_optimization() -> bool {
        false
    }

    /// Convert a dot product value to a distance, given precomputed context.
    ///
    /// Only meaningful when `supports_qt_optimization()` returns true.
    fn qt_to_distance(_qt: f64, _i: usize, _j: usize, _m: usize, _ctx: &Self::Context) -> f64 {
        unimplemented!("qt_to_distance not supported for this metric")
    }

    /// Update context incrementally after appending a new point to the time series.
    ///
    /// Used by the streaming engine to avoid full recomputation per point.
    fn update_context(ctx: &mut Self::Context, ts: &[f64], m: usize);

    /// Rebuild context from scratch, e.g. after the sliding window egresses a point.
    fn rebuild_context(ctx: &mut Self::Context, ts: &[f64], m: usize) {
        *ctx = Self::precompute(ts, m);
    }
}
