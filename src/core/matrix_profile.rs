/// Configuration for matrix profile computation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixProfileConfig {
    /// Subsequence length.
    pub m: usize,
    /// Whether to apply an exclusion zone around trivial matches.
    pub ignore_trivial: bool,
    /// Exclusion zone denominator: zone = ceil(m / exclusion_zone_denom).
    /// Default is 4 to match stumpy.
    pub exclusion_zone_denom: usize,
}

impl MatrixProfileConfig {
    pub fn new(m: usize) -> Self {
        Self {
            m,
            ignore_trivial: true,
            exclusion_zone_denom: 4,
        }
    }

    /// Compute the exclusion zone radius.
    pub fn exclusion_zone(&self) -> usize {
        if self.ignore_trivial {
            (self.m as f64 / self.exclusion_zone_denom as f64).ceil() as usize
        } else {
            0
        }
    }
}

/// The matrix profile result: for each subsequence, the distance to its
/// nearest neighbor elsewhere in the series, and that neighbor's index.
#[derive(Debug, Clone)]
pub struct MatrixProfile {
    /// Nearest-neighbor distances for each subsequence.
    pub profile: Vec<f64>,
    /// Index of the nearest neighbor for each subsequence.
    pub profile_index: Vec<usize>,
    /// Subsequence length used.
    pub m: usize,
    /// Exclusion zone radius used.
    pub exclusion_zone: usize,
}

impl MatrixProfile {
    /// Create a new matrix profile initialized to infinity distances.
    pub fn new(n_subs: usize, m: usize, exclusion_zone: usize) -> Self {
        Self {
            profile: vec![f64::INFINITY; n_subs],
            profile_index: vec![0; n_subs],
            m,
            exclusion_zone,
        }
    }

    /// Merge another matrix profile into this one, taking element-wise minimums.
    ///
    /// Used for combining thread-local results in parallel STOMP.
    pub fn merge(&mut self, other: &MatrixProfile) {
        debug_assert_eq!(self.profile.len(), other.profile.len());
        for i in 0..self.profile.len() {
            if other.profile[i] < self.profile[i] {
                self.profile[i] = other.profile[i];
                self.profile_index[i] = other.profile_index[i];
            }
        }
    }

    /// Update the profile at `idx` if `distance` is smaller than the current value.
    /// `neighbor_idx` is the index of the matching subsequence.
    #[inline]
    pub fn update(&mut self, idx: usize, distance: f64, neighbor_idx: usize) {
        if distance < self.profile[idx] {
            self.profile[idx] = distance;
            self.profile_index[idx] = neighbor_idx;
        }
    }
}

/// Rolling mean and standard deviation for all subsequences of length `m`.
///
/// Computed via a single-pass sliding window over cumulative sums and
/// sums-of-squares, matching stumpy's numerical approach.
#[derive(Debug, Clone)]
pub struct RollingStats {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
    /// Precomputed `1 / (sqrt(m) * sigma)` for each subsequence.
    /// Zero for constant subsequences (sigma == 0).
    /// Enables replacing division with multiplication in the inner loop.
    pub m_sigma_inv: Vec<f64>,
}

impl RollingStats {
    /// Compute rolling statistics for subsequences of length `m`.
    pub fn compute(ts: &[f64], m: usize) -> Self {
        assert!(m > 0, "Subsequence length must be > 0");
        assert!(ts.len() >= m, "Time series must be at least as long as m");

        let n = ts.len();
        let n_subs = n - m + 1;

        let mut cumsum = vec![0.0; n + 1];
        let mut cumsum_sq = vec![0.0; n + 1];
        for i in 0..n {
            cumsum[i + 1] = cumsum[i] + ts[i];
            cumsum_sq[i + 1] = cumsum_sq[i] + ts[i] * ts[i];
        }

        let mut mean = vec![0.0; n_subs];
        let mut std = vec![0.0; n_subs];
        let mut m_sigma_inv = vec![0.0; n_subs];

        let m_f = m as f64;
        let sqrt_m = m_f.sqrt();
        for i in 0..n_subs {
            let sum = cumsum[i + m] - cumsum[i];
            let sum_sq = cumsum_sq[i + m] - cumsum_sq[i];
            let mu = sum / m_f;
            // Variance via E[X^2] - E[X]^2, clamped to 0 for numerical stability
            let var = (sum_sq / m_f - mu * mu).max(0.0);
            let sigma = var.sqrt();
            mean[i] = mu;
            std[i] = sigma;
            if sigma < 1e-15 {
                m_sigma_inv[i] = 0.0;
            } else {
                m_sigma_inv[i] = 1.0 / (sqrt_m * sigma);
            }
        }

        Self {
            mean,
            std,
            m_sigma_inv,
        }
    }

    /// Extend rolling statistics by one new subsequence after appending a point.
    pub fn extend(&mut self, ts: &[f64], m: usize) {
        let n = ts.len();
        assert!(n >= m);
        let start = n - m;
        let m_f = m as f64;

        let sum: f64 = ts[start..n].iter().sum();
        let sum_sq: f64 = ts[start..n].iter().map(|x| x * x).sum();
        let mu = sum / m_f;
        let var = (sum_sq / m_f - mu * mu).max(0.0);
        let sigma = var.sqrt();

        self.mean.push(mu);
        self.std.push(sigma);
        if sigma < 1e-15 {
            self.m_sigma_inv.push(0.0);
        } else {
            self.m_sigma_inv.push(1.0 / (m_f.sqrt() * sigma));
        }
    }
}
