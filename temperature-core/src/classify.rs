use std::fmt::Debug;

use crate::config::AlertConfig;

/// Decides whether a temperature should raise an alert.
pub trait AlertClassifier: Send + Sync + Debug {
    fn is_alert(&self, temperature: f64) -> bool;
}

/// Alerts when a reading leaves the `[low, high]` comfort band.
///
/// Both bounds are safe: a reading equal to `low` or `high` is not an alert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdClassifier {
    pub low: f64,
    pub high: f64,
}

impl ThresholdClassifier {
    pub const DEFAULT_LOW: f64 = 10.0;
    pub const DEFAULT_HIGH: f64 = 40.0;

    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

impl Default for ThresholdClassifier {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LOW, Self::DEFAULT_HIGH)
    }
}

impl From<&AlertConfig> for ThresholdClassifier {
    fn from(config: &AlertConfig) -> Self {
        Self::new(config.low, config.high)
    }
}

impl AlertClassifier for ThresholdClassifier {
    fn is_alert(&self, temperature: f64) -> bool {
        temperature < self.low || temperature > self.high
    }
}
