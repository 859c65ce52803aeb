use serde::{Deserialize, Serialize};

/// Confidence assigned to the first forecast step (percent)
pub const MAX_CONFIDENCE: f64 = 95.0;

/// Linear confidence decay with a floor.
///
/// `score(i) = max(floor, 95 - i * decay_rate)`, never above 95.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceModel {
    pub floor: f64,
    pub decay_rate: f64,
}

impl Default for ConfidenceModel {
    fn default() -> Self {
        Self {
            floor: 60.0,
            decay_rate: 1.5,
        }
    }
}

impl ConfidenceModel {
    pub fn new(floor: f64, decay_rate: f64) -> Self {
        Self { floor, decay_rate }
    }

    /// Confidence (percent) for forecast step `step`
    pub fn score(&self, step: usize) -> f64 {
        let floor = self.floor.min(MAX_CONFIDENCE);
        let decay = self.decay_rate.max(0.0);
        (MAX_CONFIDENCE - step as f64 * decay).clamp(floor, MAX_CONFIDENCE)
    }

    /// Scores for steps `0..len`
    pub fn scores(&self, len: usize) -> Vec<f64> {
        (0..len).map(|i| self.score(i)).collect()
    }
}
