use crate::algorithms::common::{apply_exclusion_zone, sliding_dot_product};
use crate::core::distance_metric::DistanceMetric;
use crate::core::matrix_profile::{MatrixProfile, MatrixProfileConfig};

/// Minimum number of subsequences before dispatching to parallel STOMP.
/// Below this threshold, thread-dispatch overhead exceeds parallelism gains.
#[cfg(feature = "parallel")]
const MIN_PARALLEL_SUBS: usize = 256;

/// Compute the matrix profile using the STOMP algorithm.
///
/// STOMP exploits the relationship between consecutive dot products:
/// `QT[i][j] = QT[i-1][j-1] - T[j-1]*T[i-1] + T[j+m-1]*T[i+m-1]`
///
/// This allows O(1) updates per element instead of O(m), giving O(n^2) total
/// instead of O(n^2 * m) for the naive approach.
///
/// Two paths:
/// - **Fast path**: When `M::supports_qt_optimization()` is true,
///   uses diagonal traversal with incremental QT updates and `qt_to_distance`.
/// - **Naive path**: For metrics without QT support, calls `distance_profile()` per row.
pub fn stomp<M: DistanceMetric>(ts: &[f64], config: &MatrixProfileConfig) -> MatrixProfile {
    let m = config.m;
    let n = ts.len();
    assert!(n >= m, "Time series length must be >= subsequence length");
    assert!(m >= 2, "Subsequence length must be >= 2");

    let n_subs = n - m + 1;
    let exclusion_zone = config.exclusion_zone();
    let ctx = M::precompute(ts, m);
    let mut mp = MatrixProfile::new(n_subs, m, exclusion_zone);

    if M::supports_qt_optimization() {
        #[cfg(feature = "parallel")]
        if n_subs >= MIN_PARALLEL_SUBS {
            stomp_diagonal_parallel::<M>(ts, m, n_subs, exclusion_zone, &ctx, &mut mp);
        } else {
            stomp_diagonal::<M>(ts, m, n_subs, exclusion_zone, &ctx, &mut mp);
        }
        #[cfg(not(feature = "parallel"))]
        stomp_diagonal::<M>(ts, m, n_subs, exclusion_zone, &ctx, &mut mp);
    } else {
        stomp_naive::<M>(ts, m, n_subs, exclusion_zone, &ctx, &mut mp);
    }

    mp
}

/// Diagonal-traversal STOMP: processes diagonals of the distance matrix.
///
/// Each diagonal `k` contains pairs `(i, j)` where `j = i + k`. The QT recurrence
/// is applied along the diagonal. The exclusion zone is handled by skipping
/// diagonals `k <= exclusion_zone`.
fn stomp_diagonal<M: DistanceMetric>(
    ts: &[f64],
    m: usize,
    n_subs: usize,
    exclusion_zone: usize,
    ctx: &M::Context,
    mp: &mut MatrixProfile,
) {
    let qt_first = sliding_dot_product(&ts[0..m], ts);

    for k in (exclusion_zone + 1)..n_subs {
        let diag_len = n_subs - k;
        let mut qt = qt_first[k];

        let d = M::qt_to_distance(qt, 0, k, m, ctx);
        mp.update(0, d, k);
        mp.update(k, d, 0);

        for i in 1..diag_len {
            let j = i + k;
            qt = qt - ts[i - 1] * ts[j - 1] + ts[i + m - 1] * ts[j + m - 1];
            let d = M::qt_to_distance(qt, i, j, m, ctx);
            mp.update(i, d, j);
            mp.update(j, d, i);
        }
    }
}

/// Partition diagonals into load-balanced chunks.
///
/// Returns `Vec<(start_k, end_k)>` ranges where each chunk has approximately equal
/// total work. Diagonal `k` has length `n_subs - k`, so earlier diagonals are longer.
/// Uses binary search over an analytical cumulative-work formula.
#[cfg(feature = "parallel")]
fn compute_diagonal_ranges(
    first_diag: usize,
    n_subs: usize,
    n_chunks: usize,
) -> Vec<(usize, usize)> {
    let n_diags = n_subs.saturating_sub(first_diag);
    if n_diags == 0 || n_chunks == 0 {
        return vec![];
    }
    let n_chunks = n_chunks.min(n_diags);

    // Cumulative work for the first `i` diagonals (starting from first_diag):
    //   cumwork(i) = sum_{j=0}^{i-1} (n_diags - j) = i*n_diags - i*(i-1)/2
    let cumwork = |i: usize| -> usize { i * n_diags - i * i.saturating_sub(1) / 2 };
    let total_work = cumwork(n_diags);

    let mut ranges = Vec::with_capacity(n_chunks);
    let mut prev = 0usize;

    for c in 1..=n_chunks {
        let target = if c == n_chunks {
            n_diags
        } else {
            let threshold = (c as f64 * total_work as f64 / n_chunks as f64).round() as usize;
            let mut lo = prev;
            let mut hi = n_diags;
            while lo < hi {
                let mid = lo + (hi - lo) / 2;
                if cumwork(mid) >= threshold {
                    hi = mid;
                } else {
                    lo = mid + 1;
                }
            }
            lo
        };

        if target > prev {
            ranges.push((first_diag + prev, first_diag + target));
        }
        prev = target;
    }

    ranges
}

/// Parallel diagonal-traversal STOMP with load-balanced chunking.
///
/// Each thread owns a local `MatrixProfile` over its diagonal range; results
/// are merged by element-wise minimum at the end.
#[cfg(feature = "parallel")]
fn stomp_diagonal_parallel<M: DistanceMetric>(
    ts: &[f64],
    m: usize,
    n_subs: usize,
    exclusion_zone: usize,
    ctx: &M::Context,
    mp: &mut MatrixProfile,
) {
    use rayon::prelude::*;

    let qt_first = sliding_dot_product(&ts[0..m], ts);
    let n_threads = rayon::current_num_threads();
    let ranges = compute_diagonal_ranges(exclusion_zone + 1, n_subs, n_threads);

    let results: Vec<MatrixProfile> = ranges
        .into_par_iter()
        .map(|(start_k, end_k)| {
            let mut local_mp = MatrixProfile::new(n_subs, m, exclusion_zone);
            for k in start_k..end_k {
                let mut qt = qt_first[k];

                let d = M::qt_to_distance(qt, 0, k, m, ctx);
                local_mp.update(0, d, k);
                local_mp.update(k, d, 0);

                for i in 1..(n_subs - k) {
                    let j = i + k;
                    qt = qt - ts[i - 1] * ts[j - 1] + ts[i + m - 1] * ts[j + m - 1];
                    let d = M::qt_to_distance(qt, i, j, m, ctx);
                    local_mp.update(i, d, j);
                    local_mp.update(j, d, i);
                }
            }
            local_mp
        })
        .collect();

    for result in &results {
        mp.merge(result);
    }
}

/// Naive STOMP path for metrics without QT optimization.
fn stomp_naive<M: DistanceMetric>(
    ts: &[f64],
    m: usize,
    n_subs: usize,
    exclusion_zone: usize,
    ctx: &M::Context,
    mp: &mut MatrixProfile,
) {
    for i in 0..n_subs {
        let mut dist_profile = M::distance_profile(ts, i, m, ctx);
        apply_exclusion_zone(&mut dist_profile, i, exclusion_zone);

        for (j, &d) in dist_profile.iter().enumerate() {
            mp.update(i, d, j);
        }
    }
}
