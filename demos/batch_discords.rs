//! Batch discord discovery: the offline counterpart to the streaming detector.
//!
//! Computes a full matrix profile over a recorded signal and extracts the
//! top discords (subsequences whose nearest neighbor is unusually far away).
//!
//! Run with: cargo run --release --example batch_discords

use outlier_rs::{find_discords, EuclideanEngine, MatrixProfileConfig};

fn main() {
    let n = 1000;
    let m = 50;

    let mut ts = Vec::with_capacity(n);
    for i in 0..n {
        let t = i as f64;
        let mut val = (t * std::f64::consts::TAU / 80.0).sin();

        // Anomaly 1: amplitude spike at index 200
        if (180..230).contains(&i) {
            val *= 3.0;
        }
        // Anomaly 2: frequency change at index 600
        if (580..650).contains(&i) {
            val = (t * std::f64::consts::TAU / 20.0).sin();
        }

        // Background noise
        val += ((t * 7.3).sin() * (t * 13.7).cos()) * 0.05;
        ts.push(val);
    }

    let engine = EuclideanEngine::new(MatrixProfileConfig::new(m));
    let mp = engine.compute(&ts);
    let discords = find_discords(&mp, 3);

    println!("Batch Discord Discovery");
    println!("=======================");
    println!("Time series length: {n}");
    println!("Subsequence length: {m}");
    println!("\nTop {} discords:\n", discords.len());

    for (i, discord) in discords.iter().enumerate() {
        let desc = if (150..260).contains(&discord.idx) {
            "amplitude spike (injected at ~200)"
        } else if (530..680).contains(&discord.idx) {
            "frequency change (injected at ~600)"
        } else {
            "unknown"
        };
        println!(
            "  #{}: index {}, distance = {:.4} → {desc}",
            i + 1,
            discord.idx,
            discord.distance
        );
    }
}
