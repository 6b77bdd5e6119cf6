use crate::core::distance_metric::DistanceMetric;
use crate::core::matrix_profile::RollingStats;

/// Z-normalized Euclidean distance metric.
///
/// Distance formula: `d = sqrt(2 * m * (1 - r))` where
/// `r = (QT - m * mu_i * mu_j) / (m * sigma_i * sigma_j)`.
///
/// Edge cases:
/// - Both subsequences constant (sigma_i == 0 && sigma_j == 0) → d = 0
/// - One subsequence constant → d = sqrt(2*m)
/// - `r` is clamped to [-1, 1] for numerical stability
#[derive(Debug, Clone)]
pub struct ZNormalizedEuclidean;

impl DistanceMetric for ZNormalizedEuclidean {
    type Context = RollingStats;

    fn precompute(ts: &[f64], m: usize) -> Self::Context {
        RollingStats::compute(ts, m)
    }

    fn distance(ts: &[f64], i: usize, j: usize, m: usize, ctx: &Self::Context) -> f64 {
        let qt: f64 = ts[i..i + m]
            .iter()
            .zip(&ts[j..j + m])
            .map(|(a, b)| a * b)
            .sum();
        Self::qt_to_distance(qt, i, j, m, ctx)
    }

    fn supports_qt_optimization() -> bool {
        true
    }

    fn qt_to_distance(qt: f64, i: usize, j: usize, m: usize, ctx: &Self::Context) -> f64 {
        let msi = ctx.m_sigma_inv[i];
        let msj = ctx.m_sigma_inv[j];
        let m_f = m as f64;

        // Both constant → identical after z-normalization → distance 0
        if msi == 0.0 && msj == 0.0 {
            return 0.0;
        }
        // One constant → maximally different from any non-constant subsequence
        if msi == 0.0 || msj == 0.0 {
            return (2.0 * m_f).sqrt();
        }

        // r = (QT - m*mu_i*mu_j) * m_sigma_inv[i] * m_sigma_inv[j]
        // where m_sigma_inv = 1/(sqrt(m)*sigma), so product = 1/(m*sigma_i*sigma_j)
        let r = (qt - m_f * ctx.mean[i] * ctx.mean[j]) * msi * msj;
        let r_clamped = r.clamp(-1.0, 1.0);
        (2.0 * m_f * (1.0 - r_clamped)).max(0.0).sqrt()
    }

    fn update_context(ctx: &mut Self::Context, ts: &[f64], m: usize) {
        ctx.extend(ts, m);
    }
}
