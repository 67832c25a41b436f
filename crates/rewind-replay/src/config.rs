//! Decode limits.
//!
//! Every size in a replay header is attacker- or corruption-controlled.
//! [`CodecConfig`] bounds them so a bad stream fails with
//! [`ReplayError::LimitExceeded`](crate::ReplayError::LimitExceeded)
//! before anything large is allocated.

use std::error::Error;
use std::fmt;

/// Limits applied while reading a replay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecConfig {
    /// Maximum `width * height` of the map. Default: 2^24.
    pub max_map_cells: usize,
    /// Maximum declared frame count. Default: 2^24.
    pub max_frames: usize,
    /// Maximum number of unit-count entries. Default: 2^16.
    pub max_unit_entries: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_map_cells: 1 << 24,
            max_frames: 1 << 24,
            max_unit_entries: 1 << 16,
        }
    }
}

impl CodecConfig {
    /// Check that every limit is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("max_map_cells", self.max_map_cells),
            ("max_frames", self.max_frames),
            ("max_unit_entries", self.max_unit_entries),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(ConfigError::ZeroLimit { name });
            }
        }
        Ok(())
    }
}

/// Errors detected by [`CodecConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A limit is zero, which would reject every replay.
    ZeroLimit {
        /// Name of the limit.
        name: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroLimit { name } => write!(f, "{name} must be positive"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(CodecConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_limit_rejected() {
        let config = CodecConfig {
            max_frames: 0,
            ..CodecConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroLimit { name: "max_frames" })
        );
    }
}
