pub mod algorithms;
pub mod core;
pub mod detector;
pub mod metrics;

pub use crate::algorithms::discords::{find_discords, Discord};
pub use crate::algorithms::stampi::Stampi;
pub use crate::algorithms::stomp::stomp;
pub use crate::core::distance_metric::DistanceMetric;
pub use crate::core::matrix_profile::{MatrixProfile, MatrixProfileConfig, RollingStats};
pub use crate::core::profile_stream::ProfileStream;
pub use crate::detector::{ConfigError, OutlierConfig, OutlierDetector, StreamingOutlierDetector};
pub use crate::metrics::absolute::AbsoluteEuclidean;
pub use crate::metrics::euclidean::ZNormalizedEuclidean;

/// High-level facade for matrix profile computation, generic over distance metric.
///
/// # Examples
///
/// ```
/// use outlier_rs::{AampEngine, MatrixProfileConfig};
///
/// let ts = vec![1.0, 2.0, 3.0, 2.0, 1.0, 2.0, 3.0, 2.0, 1.0];
/// let engine = AampEngine::new(MatrixProfileConfig::new(4));
/// let mp = engine.compute(&ts);
/// assert_eq!(mp.profile.len(), ts.len() - 4 + 1);
/// ```
pub struct Engine<M: DistanceMetric> {
    config: MatrixProfileConfig,
    _metric: std::marker::PhantomData<M>,
}

impl<M: DistanceMetric> Engine<M> {
    /// Create a new engine with the given configuration.
    pub fn new(config: MatrixProfileConfig) -> Self {
        Self {
            config,
            _metric: std::marker::PhantomData,
        }
    }

    /// Compute the full matrix profile for a time series (batch STOMP).
    pub fn compute(&self, ts: &[f64]) -> MatrixProfile {
        stomp::<M>(ts, &self.config)
    }

    /// Create a streaming matrix profile from an initial time series.
    ///
    /// - `egress=false`: grow mode — time series extends unboundedly.
    /// - `egress=true`: egress mode — fixed-size sliding window.
    ///
    /// ```
    /// use outlier_rs::{AampEngine, MatrixProfileConfig};
    ///
    /// let mut stream = AampEngine::new(MatrixProfileConfig::new(5)).streaming(&[0.0; 20], true);
    /// stream.update(1.0);
    /// assert_eq!(stream.profile().profile.len(), 16);
    /// ```
    pub fn streaming(&self, initial_ts: &[f64], egress: bool) -> Stampi<M> {
        Stampi::<M>::new(initial_ts, self.config.clone(), egress)
    }
}

/// Convenience type alias for z-normalized Euclidean distance.
pub type EuclideanEngine = Engine<ZNormalizedEuclidean>;

/// Convenience type alias for non-normalized (absolute) Euclidean distance,
/// the metric the streaming outlier detector runs on.
pub type AampEngine = Engine<AbsoluteEuclidean>;
