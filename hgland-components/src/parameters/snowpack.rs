//! Snowpack Parameters
//!
//! Mercury stored in snow is photoreduced and re-emitted as Hg0. Decay is
//! first order, fast in melting conditions and slow in cold snow.

use serde::{Deserialize, Serialize};

/// Parameters for snowpack mercury re-emission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnowpackParameters {
    /// Temperature above which the fast decay rate applies
    /// unit: K
    /// default: 270.0
    pub temperature_threshold: f64,

    /// Decay rate in warm snow (about a one-week timescale)
    /// unit: 1/s
    /// default: 1.6e-6
    pub warm_rate: f64,

    /// Decay rate in cold snow (about a half-year timescale)
    /// unit: 1/s
    /// default: 6.0e-8
    pub cold_rate: f64,
}

impl Default for SnowpackParameters {
    fn default() -> Self {
        Self {
            temperature_threshold: 270.0,
            warm_rate: 1.6e-6,
            cold_rate: 6.0e-8,
        }
    }
}

impl SnowpackParameters {
    /// Decay rate at ground temperature `ts`
    /// unit: 1/s
    pub fn decay_rate(&self, ts: f64) -> f64 {
        if ts > self.temperature_threshold {
            self.warm_rate
        } else {
            self.cold_rate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decay_rate_threshold() {
        let params = SnowpackParameters::default();
        assert_eq!(params.decay_rate(280.0), 1.6e-6);
        assert_eq!(params.decay_rate(250.0), 6.0e-8);
        // The threshold itself is cold
        assert_eq!(params.decay_rate(270.0), 6.0e-8);
    }

    #[test]
    fn test_warm_decay_is_faster() {
        let params = SnowpackParameters::default();
        assert!(params.warm_rate > params.cold_rate);
    }
}
