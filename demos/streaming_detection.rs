//! Streaming outlier detection over a live signal.
//!
//! Feeds a periodic sensor-like signal with two injected faults through the
//! streaming detector and prints every confirmed anomaly. The cooldown keeps
//! the second half of each fault from re-triggering.
//!
//! Run with: cargo run --release --example streaming_detection

use outlier_rs::{OutlierConfig, StreamingOutlierDetector};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = OutlierConfig::default();
    let mut detector = StreamingOutlierDetector::new(config).expect("valid default config");

    let n = 600;
    let mut confirmed = Vec::new();

    for i in 0..n {
        let t = i as f64;
        let mut val = (t * std::f64::consts::TAU / 40.0).sin();

        // Fault 1 at ~200: amplitude burst
        if (200..215).contains(&i) {
            val *= 8.0;
        }
        // Fault 2 at ~450: level shift
        if i >= 450 {
            val += 5.0;
        }

        if detector.step(i, val) {
            confirmed.push(i);
        }
    }

    println!("Streaming Outlier Detection");
    println!("===========================");
    println!("Points processed:    {n}");
    println!("Ticks evaluated:     {}", detector.count());
    println!("Confirmed anomalies: {confirmed:?}");
    println!(
        "Rolling range baseline: {:?}",
        detector.rolling_range().iter().collect::<Vec<_>>()
    );

    for &idx in detector.anomalies() {
        let region = if (185..230).contains(&idx) {
            "amplitude burst (injected at ~200)"
        } else if idx >= 435 {
            "level shift (injected at 450)"
        } else {
            "unexpected"
        };
        println!("  index {idx}: {region}");
    }
}
