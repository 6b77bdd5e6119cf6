use crate::algorithms::common::apply_exclusion_zone;
use crate::core::matrix_profile::MatrixProfile;

/// A discovered discord (anomalous subsequence).
///
/// A discord is a subsequence whose nearest neighbor is unusually far away,
/// indicating it is unlike any other pattern in the time series. This is the
/// batch counterpart to the streaming outlier detector.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Discord {
    /// Index of the anomalous subsequence.
    pub idx: usize,
    /// Distance to its nearest neighbor (high = anomalous).
    pub distance: f64,
}

/// Find the top-k discords (most anomalous subsequences) in a matrix profile.
///
/// Uses greedy extraction with exclusion zone elimination: find the largest
/// finite distance, record it, exclude it from future consideration, and repeat.
///
/// Returns up to `k` discords, sorted by distance (descending). May return
/// fewer than `k` if the profile doesn't contain enough finite entries.
pub fn find_discords(mp: &MatrixProfile, k: usize) -> Vec<Discord> {
    let mut profile = mp.profile.clone();
    let ez = mp.exclusion_zone;
    let mut discords = Vec::with_capacity(k);

    for _ in 0..k {
        // Find the index with the largest finite distance
        let (worst_idx, &worst_dist) = match profile
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_finite())
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
        {
            Some(pair) => pair,
            None => break,
        };

        discords.push(Discord {
            idx: worst_idx,
            distance: worst_dist,
        });

        // Exclude this discord from future consideration
        apply_exclusion_zone(&mut profile, worst_idx, ez);
    }

    discords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::stomp::stomp;
    use crate::core::matrix_profile::MatrixProfileConfig;
    use crate::metrics::euclidean::ZNormalizedEuclidean;

    #[test]
    fn test_find_discords_basic() {
        // Sine wave with an anomaly injected at index 25
        let mut ts: Vec<f64> = (0..100).map(|i| (i as f64 * 0.2).sin()).collect();
        ts[25] = 10.0;
        ts[26] = -10.0;

        let config = MatrixProfileConfig::new(8);
        let mp = stomp::<ZNormalizedEuclidean>(&ts, &config);
        let discords = find_discords(&mp, 3);

        assert!(!discords.is_empty());
        // The top discord should be near the anomaly
        let top = &discords[0];
        assert!(
            (20..=30).contains(&top.idx),
            "Top discord at index {} should be near anomaly at 25",
            top.idx
        );
    }

    #[test]
    fn test_discords_decreasing_distance() {
        let ts: Vec<f64> = (0..200).map(|i| (i as f64 * 0.15).sin()).collect();
        let config = MatrixProfileConfig::new(10);
        let mp = stomp::<ZNormalizedEuclidean>(&ts, &config);
        let discords = find_discords(&mp, 5);

        for w in discords.windows(2) {
            assert!(
                w[0].distance >= w[1].distance,
                "Discords should be sorted by distance: {} < {}",
                w[0].distance,
                w[1].distance
            );
        }
    }

    #[test]
    fn test_discords_empty_profile() {
        // All-infinite profile yields no discords
        let mp = MatrixProfile::new(10, 4, 1);
        let discords = find_discords(&mp, 5);
        assert!(discords.is_empty());
    }
}
