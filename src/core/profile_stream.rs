/// Boundary between the outlier detector and the streaming profile engine.
///
/// The detector only needs two things from an engine: feed it one point at a
/// time, and read back the current nearest-neighbor distance profile. Keeping
/// this seam as a trait lets tests drive the detector with scripted snapshots
/// instead of a real matrix profile computation.
pub trait ProfileStream {
    /// Incorporate one new point into the streaming window.
    fn ingest(&mut self, value: f64);

    /// Current distance profile: one non-negative distance per valid
    /// subsequence position in the window. Length depends on window fill
    /// state and the subsequence length.
    fn current_profile(&self) -> &[f64];
}
