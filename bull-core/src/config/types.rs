//! Configuration type definitions

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Capacity of the collision tracker (slots remembered per round)
pub const MAX_SLOTS: usize = 16;

/// Draws attempted before a slot election gives up
pub const SLOT_DRAW_ATTEMPTS: usize = MAX_SLOTS * 4;

/// Maximum version string length
pub const MAX_VERSION_LEN: usize = 32;

/// Largest encoded configuration
pub const MAX_CONFIG_SIZE: usize = 64;

/// Errors from configuration handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Could not serialize (buffer too small)
    Encode,
    /// Bytes do not hold a configuration
    Decode,
    /// A timing value is out of range
    InvalidTiming,
}

/// Unit configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UnitConfig {
    /// Inter-byte silence (ms) after which a partial frame is dropped
    pub frame_gap_ms: u32,
    /// Silence (ms) that ends quiet mode
    pub quiet_period_ms: u32,
    /// ADC samples folded into the entropy pool at boot
    pub noise_samples: u8,
    /// Stored bytes (from offset 0) folded into the entropy pool at boot
    pub seed_bytes: u8,
    /// Firmware version reported on parameter 0x06
    pub version: String<MAX_VERSION_LEN>,
}

impl Default for UnitConfig {
    fn default() -> Self {
        let mut version = String::new();
        let _ = version.push_str(env!("CARGO_PKG_VERSION"));

        Self {
            frame_gap_ms: 100,
            quiet_period_ms: 5000,
            noise_samples: 32,
            seed_bytes: 32,
            version,
        }
    }
}

impl UnitConfig {
    /// Check timing values
    ///
    /// The quiet period must be longer than the frame gap, otherwise a unit
    /// would leave quiet mode in the middle of a frame.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_gap_ms == 0 || self.quiet_period_ms <= self.frame_gap_ms {
            return Err(ConfigError::InvalidTiming);
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl UnitConfig {
    /// Serialize into `buffer`, returning the used part
    pub fn to_bytes<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buffer).map_err(|_| ConfigError::Encode)
    }

    /// Deserialize and validate
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Decode)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = UnitConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.version.as_str(), env!("CARGO_PKG_VERSION"));
        assert_eq!(SLOT_DRAW_ATTEMPTS, 64);
    }

    #[test]
    fn test_invalid_timing() {
        let config = UnitConfig {
            quiet_period_ms: 50,
            frame_gap_ms: 100,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidTiming));

        let config = UnitConfig {
            frame_gap_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidTiming));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_postcard_roundtrip() {
        let mut config = UnitConfig::default();
        config.quiet_period_ms = 8000;
        config.version.clear();
        config.version.push_str("1.4.2-pump").unwrap();

        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let bytes = config.to_bytes(&mut buffer).unwrap();
        let decoded = UnitConfig::from_bytes(bytes).unwrap();
        assert_eq!(decoded, config);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(UnitConfig::from_bytes(&[]), Err(ConfigError::Decode));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_decode_validates() {
        let config = UnitConfig {
            frame_gap_ms: 0,
            ..Default::default()
        };
        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let bytes = config.to_bytes(&mut buffer).unwrap();
        assert_eq!(
            UnitConfig::from_bytes(bytes),
            Err(ConfigError::InvalidTiming)
        );
    }
}
