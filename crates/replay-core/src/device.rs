//! Coarse client hardware classification used to size timeouts.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceTier {
    Low,
    #[default]
    Medium,
    High,
}

impl DeviceTier {
    /// Classify from CPU core count and memory (GiB), either of which may be
    /// unknown. Unknown inputs never push a device into `Low` on their own.
    pub fn from_hints(cpu_cores: Option<usize>, memory_gib: Option<f64>) -> Self {
        let low_cpu = cpu_cores.is_some_and(|c| c <= 2);
        let low_mem = memory_gib.is_some_and(|m| m <= 2.0);
        if low_cpu || low_mem {
            return DeviceTier::Low;
        }
        let high_cpu = cpu_cores.is_some_and(|c| c >= 8);
        let high_mem = memory_gib.map_or(true, |m| m >= 8.0);
        if high_cpu && high_mem {
            DeviceTier::High
        } else {
            DeviceTier::Medium
        }
    }

    /// Tier of the machine we are running on (core count only).
    pub fn detect() -> Self {
        let cores = std::thread::available_parallelism().ok().map(|n| n.get());
        Self::from_hints(cores, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_from_hints() {
        assert_eq!(DeviceTier::from_hints(Some(2), Some(16.0)), DeviceTier::Low);
        assert_eq!(DeviceTier::from_hints(Some(8), Some(1.0)), DeviceTier::Low);
        assert_eq!(DeviceTier::from_hints(Some(4), Some(8.0)), DeviceTier::Medium);
        assert_eq!(DeviceTier::from_hints(Some(12), Some(16.0)), DeviceTier::High);
        assert_eq!(DeviceTier::from_hints(Some(12), None), DeviceTier::High);
        assert_eq!(DeviceTier::from_hints(None, None), DeviceTier::Medium);
    }

    #[test]
    fn serde_lowercase() {
        #[derive(Deserialize)]
        struct W {
            tier: DeviceTier,
        }
        let w: W = toml::from_str("tier = \"low\"").unwrap();
        assert_eq!(w.tier, DeviceTier::Low);
    }
}
