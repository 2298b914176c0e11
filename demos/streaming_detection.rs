//! Streaming detection demo.
//!
//! Generates a synthetic seasonal stream with drift and injected outliers,
//! runs the sliding-window detector over it, and prints each verdict as it
//! is reconciled.
//!
//! Run with: cargo run --example streaming_detection

use anofox_anomaly::detection::{DetectorConfig, SlidingWindowDetector};
use anofox_anomaly::scorers::IsolationForest;
use anofox_anomaly::signal::{SignalConfig, SignalGenerator};

fn main() {
    let signal = SignalConfig::new()
        .with_length(Some(300))
        .with_drift(100, 0.02)
        .with_anomaly_probability(0.1);

    let config = DetectorConfig::new().with_window_size(100).with_slide_size(40);
    let scorer = IsolationForest::new().with_contamination(0.1);
    let mut detector = SlidingWindowDetector::new(config, Box::new(scorer)).unwrap();

    println!("=== anofox-anomaly streaming detection ===\n");

    let mut total = 0usize;
    let mut anomalies = 0usize;
    let mut print_batch = |verdicts: Vec<anofox_anomaly::core::Verdict>| {
        for verdict in verdicts {
            total += 1;
            if verdict.is_anomaly {
                anomalies += 1;
                println!("{:>5}  {:>8.2}  <-- anomaly", verdict.index, verdict.value);
            } else {
                println!("{:>5}  {:>8.2}", verdict.index, verdict.value);
            }
        }
    };

    for point in SignalGenerator::new(signal) {
        match detector.ingest(point.value) {
            Ok(batch) => print_batch(batch),
            Err(err) => eprintln!("window skipped: {err}"),
        }
    }
    match detector.flush() {
        Ok(batch) => print_batch(batch),
        Err(err) => eprintln!("final window failed: {err}"),
    }

    println!("\n{total} points classified, {anomalies} anomalies flagged");
}
