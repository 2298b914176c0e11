//! Sliding-window anomaly detection engine.
//!
//! The detector buffers the trailing `window_size` samples, re-fits the
//! scorer on every full window, and reconciles the overlap between
//! successive windows so each ingested sample receives exactly one verdict,
//! in arrival order.

use std::collections::VecDeque;

use crate::core::{Sample, Verdict};
use crate::error::{AnomalyError, Result};
use crate::scorers::BoxedScorer;

/// Configuration for the sliding-window detector.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Number of trailing samples used for one scoring decision.
    pub window_size: usize,
    /// Number of newest samples claimed for emission after each retrain;
    /// also the eviction count per cycle.
    pub slide_size: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_size: 100,
            slide_size: 40,
        }
    }
}

impl DetectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the window size (default 100).
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set the slide size (default 40).
    pub fn with_slide_size(mut self, slide_size: usize) -> Self {
        self.slide_size = slide_size;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(AnomalyError::InvalidParameter(
                "window_size must be positive".to_string(),
            ));
        }
        if self.slide_size == 0 {
            return Err(AnomalyError::InvalidParameter(
                "slide_size must be positive".to_string(),
            ));
        }
        if self.slide_size > self.window_size {
            return Err(AnomalyError::InvalidParameter(format!(
                "slide_size ({}) must not exceed window_size ({})",
                self.slide_size, self.window_size
            )));
        }
        Ok(())
    }
}

/// Streaming detector that owns the window buffer and drives the scorer.
///
/// Single-threaded by design: `ingest` is called once per incoming value
/// and blocks on the scorer while a full window is classified. The buffer
/// has exactly one owner; concurrent ingestion requires external mutual
/// exclusion.
///
/// # Example
///
/// ```
/// use anofox_anomaly::detection::{DetectorConfig, SlidingWindowDetector};
/// use anofox_anomaly::scorers::RobustZScore;
///
/// let config = DetectorConfig::new().with_window_size(5).with_slide_size(2);
/// let mut detector = SlidingWindowDetector::new(config, Box::new(RobustZScore::new())).unwrap();
///
/// let mut verdicts = Vec::new();
/// for value in [1.0, 1.1, 0.9, 1.0, 1.2, 50.0, 1.0] {
///     verdicts.extend(detector.ingest(value).unwrap());
/// }
/// verdicts.extend(detector.flush().unwrap());
///
/// let indices: Vec<u64> = verdicts.iter().map(|v| v.index).collect();
/// assert_eq!(indices, vec![0, 1, 2, 3, 4, 5, 6]);
/// ```
pub struct SlidingWindowDetector {
    config: DetectorConfig,
    scorer: BoxedScorer,
    buffer: VecDeque<Sample>,
    /// Sequence index assigned to the next ingested sample.
    next_index: u64,
    /// Lowest sequence index not yet emitted; every index below it has
    /// received its verdict.
    watermark: u64,
}

impl std::fmt::Debug for SlidingWindowDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlidingWindowDetector")
            .field("config", &self.config)
            .field("scorer", &self.scorer.name())
            .field("buffer", &self.buffer)
            .field("next_index", &self.next_index)
            .field("watermark", &self.watermark)
            .finish()
    }
}

impl SlidingWindowDetector {
    /// Create a detector. Fails fast on an invalid window/slide relationship.
    pub fn new(config: DetectorConfig, scorer: BoxedScorer) -> Result<Self> {
        config.validate()?;
        let capacity = config.window_size + 1;
        Ok(Self {
            config,
            scorer,
            buffer: VecDeque::with_capacity(capacity),
            next_index: 0,
            watermark: 0,
        })
    }

    /// Number of samples currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Total number of samples ingested so far.
    pub fn ingested(&self) -> u64 {
        self.next_index
    }

    /// Feed one value into the detector.
    ///
    /// Returns the verdicts this value unlocked: empty while the buffer is
    /// still filling (the quiescent startup state), the newly claimed slice
    /// after each full-window retrain. A scorer failure applies to this call
    /// only; the buffer is left intact and the next ingest retries on the
    /// advanced window.
    pub fn ingest(&mut self, value: f64) -> Result<Vec<Verdict>> {
        self.buffer.push_back(Sample::new(self.next_index, value));
        self.next_index += 1;

        if self.buffer.len() < self.config.window_size {
            return Ok(Vec::new());
        }
        // Guard against drift past the window bound; a failed retrain keeps
        // its samples buffered, so the next ingest can briefly exceed W.
        while self.buffer.len() > self.config.window_size {
            self.buffer.pop_front();
        }

        let verdicts = self.score_buffer()?;

        for _ in 0..self.config.slide_size {
            self.buffer.pop_front();
        }
        Ok(verdicts)
    }

    /// Drain the buffer after the stream ends (or on early termination).
    ///
    /// Scores whatever remains as a final, possibly undersized batch and
    /// emits every un-emitted sample in index order. Emits nothing when no
    /// sample is pending, so a second flush returns an empty batch.
    pub fn flush(&mut self) -> Result<Vec<Verdict>> {
        let pending = self
            .buffer
            .iter()
            .any(|sample| sample.index >= self.watermark);
        if !pending {
            self.buffer.clear();
            return Ok(Vec::new());
        }

        let verdicts = self.score_buffer()?;
        self.buffer.clear();
        Ok(verdicts)
    }

    /// Score the whole buffer and claim every position at or above the
    /// watermark. In steady state that is the newest `slide_size` positions;
    /// for the first full window it is all of them.
    fn score_buffer(&mut self) -> Result<Vec<Verdict>> {
        let values: Vec<f64> = self.buffer.iter().map(|sample| sample.value).collect();
        let flags = self.scorer.score(&values)?;
        debug_assert_eq!(flags.len(), self.buffer.len());

        let verdicts: Vec<Verdict> = self
            .buffer
            .iter()
            .zip(&flags)
            .filter(|(sample, _)| sample.index >= self.watermark)
            .map(|(sample, &is_anomaly)| Verdict::new(sample.index, sample.value, is_anomaly))
            .collect();

        if let Some(last) = verdicts.last() {
            self.watermark = last.index + 1;
        }
        Ok(verdicts)
    }
}

/// Run the detector over a finite slice of values and drain it.
///
/// Convenience entry point for offline use; a scoring failure aborts the
/// run, unlike the streaming API where the caller chooses to continue.
pub fn detect_series(
    values: &[f64],
    config: DetectorConfig,
    scorer: BoxedScorer,
) -> Result<Vec<Verdict>> {
    if values.is_empty() {
        return Err(AnomalyError::EmptyData);
    }
    let mut detector = SlidingWindowDetector::new(config, scorer)?;
    let mut verdicts = Vec::with_capacity(values.len());
    for &value in values {
        verdicts.extend(detector.ingest(value)?);
    }
    verdicts.extend(detector.flush()?);
    Ok(verdicts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorers::{OutlierScorer, RobustZScore};

    /// Scorer that marks values above a fixed cutoff, for predictable tests.
    struct CutoffScorer {
        cutoff: f64,
    }

    impl OutlierScorer for CutoffScorer {
        fn score(&self, samples: &[f64]) -> Result<Vec<bool>> {
            Ok(samples.iter().map(|&x| x > self.cutoff).collect())
        }
        fn name(&self) -> &str {
            "Cutoff"
        }
        fn min_batch(&self) -> usize {
            1
        }
    }

    /// Scorer that fails a configured number of times before succeeding.
    struct FlakyScorer {
        failures: std::cell::Cell<usize>,
    }

    impl OutlierScorer for FlakyScorer {
        fn score(&self, samples: &[f64]) -> Result<Vec<bool>> {
            if self.failures.get() > 0 {
                self.failures.set(self.failures.get() - 1);
                return Err(AnomalyError::DegenerateBatch("induced".to_string()));
            }
            Ok(vec![false; samples.len()])
        }
        fn name(&self) -> &str {
            "Flaky"
        }
    }

    fn small_detector() -> SlidingWindowDetector {
        let config = DetectorConfig::new().with_window_size(5).with_slide_size(2);
        SlidingWindowDetector::new(config, Box::new(CutoffScorer { cutoff: 100.0 })).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let scorer = || Box::new(CutoffScorer { cutoff: 0.0 }) as BoxedScorer;

        let err = SlidingWindowDetector::new(
            DetectorConfig::new().with_window_size(0),
            scorer(),
        )
        .unwrap_err();
        assert!(matches!(err, AnomalyError::InvalidParameter(_)));

        let err = SlidingWindowDetector::new(
            DetectorConfig::new().with_slide_size(0),
            scorer(),
        )
        .unwrap_err();
        assert!(matches!(err, AnomalyError::InvalidParameter(_)));

        let err = SlidingWindowDetector::new(
            DetectorConfig::new().with_window_size(4).with_slide_size(5),
            scorer(),
        )
        .unwrap_err();
        assert!(matches!(err, AnomalyError::InvalidParameter(_)));
    }

    #[test]
    fn quiescent_until_window_fills() {
        let mut detector = small_detector();
        for value in [1.0, 2.0, 3.0, 4.0] {
            assert!(detector.ingest(value).unwrap().is_empty());
        }
        assert_eq!(detector.buffered(), 4);
    }

    #[test]
    fn first_full_window_emits_everything() {
        let mut detector = small_detector();
        let mut verdicts = Vec::new();
        for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
            verdicts.extend(detector.ingest(value).unwrap());
        }

        let indices: Vec<u64> = verdicts.iter().map(|v| v.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        // Slide retains W - S samples as context.
        assert_eq!(detector.buffered(), 3);
    }

    #[test]
    fn steady_state_emits_slide_sized_batches() {
        let mut detector = small_detector();
        let mut batches = Vec::new();
        for value in (0..9).map(|i| i as f64) {
            let batch = detector.ingest(value).unwrap();
            if !batch.is_empty() {
                batches.push(batch);
            }
        }

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 5);
        assert_eq!(batches[1].len(), 2);
        assert_eq!(batches[2].len(), 2);
        assert!(detector.flush().unwrap().is_empty());
    }

    #[test]
    fn flush_emits_the_tail() {
        let mut detector = small_detector();
        let mut verdicts = Vec::new();
        for value in (0..8).map(|i| i as f64) {
            verdicts.extend(detector.ingest(value).unwrap());
        }
        // Index 7 is buffered but unclaimed until the stream is drained.
        assert_eq!(verdicts.last().unwrap().index, 6);

        let tail = detector.flush().unwrap();
        let indices: Vec<u64> = tail.iter().map(|v| v.index).collect();
        assert_eq!(indices, vec![7]);
    }

    #[test]
    fn flush_is_idempotent() {
        let mut detector = small_detector();
        for value in (0..8).map(|i| i as f64) {
            detector.ingest(value).unwrap();
        }
        assert!(!detector.flush().unwrap().is_empty());
        assert!(detector.flush().unwrap().is_empty());
        assert_eq!(detector.buffered(), 0);
    }

    #[test]
    fn flush_on_short_stream_covers_all_samples() {
        let mut detector = small_detector();
        for value in [1.0, 2.0, 3.0] {
            assert!(detector.ingest(value).unwrap().is_empty());
        }

        let indices: Vec<u64> = detector.flush().unwrap().iter().map(|v| v.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn flush_without_pending_samples_skips_the_scorer() {
        // A full slide (S == W) leaves nothing buffered; flush must return
        // empty without handing the scorer an empty batch.
        let config = DetectorConfig::new().with_window_size(3).with_slide_size(3);
        let mut detector =
            SlidingWindowDetector::new(config, Box::new(RobustZScore::new())).unwrap();
        detector.ingest(1.0).unwrap();
        detector.ingest(2.0).unwrap();
        let emitted = detector.ingest(3.0).unwrap();
        assert_eq!(emitted.len(), 3);

        assert!(detector.flush().unwrap().is_empty());
    }

    #[test]
    fn anomalies_are_flagged_in_place() {
        let mut detector = small_detector();
        let mut verdicts = Vec::new();
        for value in [1.0, 2.0, 500.0, 4.0, 5.0, 6.0, 7.0] {
            verdicts.extend(detector.ingest(value).unwrap());
        }
        verdicts.extend(detector.flush().unwrap());

        assert!(verdicts[2].is_anomaly);
        assert_eq!(verdicts.iter().filter(|v| v.is_anomaly).count(), 1);
    }

    #[test]
    fn scorer_failure_keeps_buffer_and_emits_nothing() {
        let config = DetectorConfig::new().with_window_size(5).with_slide_size(2);
        let scorer = FlakyScorer {
            failures: std::cell::Cell::new(1),
        };
        let mut detector = SlidingWindowDetector::new(config, Box::new(scorer)).unwrap();

        for value in (0..4).map(|i| i as f64) {
            detector.ingest(value).unwrap();
        }
        let err = detector.ingest(4.0).unwrap_err();
        assert!(matches!(err, AnomalyError::DegenerateBatch(_)));
        assert_eq!(detector.buffered(), 5);

        // The next ingest trims to W and retries; everything still unclaimed
        // in the window is emitted by the recovery retrain.
        let recovered = detector.ingest(5.0).unwrap();
        let indices: Vec<u64> = recovered.iter().map(|v| v.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn detect_series_covers_every_index() {
        let values: Vec<f64> = (0..23).map(|i| (i as f64 * 0.7).sin()).collect();
        let config = DetectorConfig::new().with_window_size(5).with_slide_size(2);
        let verdicts =
            detect_series(&values, config, Box::new(CutoffScorer { cutoff: 10.0 })).unwrap();

        let indices: Vec<u64> = verdicts.iter().map(|v| v.index).collect();
        let expected: Vec<u64> = (0..23).collect();
        assert_eq!(indices, expected);
    }

    #[test]
    fn detect_series_rejects_empty_input() {
        let err = detect_series(
            &[],
            DetectorConfig::default(),
            Box::new(CutoffScorer { cutoff: 0.0 }),
        )
        .unwrap_err();
        assert_eq!(err, AnomalyError::EmptyData);
    }
}
