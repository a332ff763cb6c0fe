//! Error types for the driver.

use core::fmt;

use crate::config::{Channel, Gain};

/// Rejected configuration change. The previous value is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Gain value outside {32, 64, 128}.
    InvalidGain(u8),
    /// Channel/gain pair with no entry in the chip's pulse table.
    InvalidGainForChannel {
        /// The channel of the rejected pair.
        channel: Channel,
        /// The gain of the rejected pair.
        gain: Gain,
    },
    /// Unit conversion factor that is zero, negative or not finite.
    InvalidConversionFactor,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidGain(gain) => {
                write!(f, "invalid gain {} (expected 32, 64 or 128)", gain)
            }
            ConfigError::InvalidGainForChannel { channel, gain } => write!(
                f,
                "gain {} is not available on channel {:?}",
                gain.value(),
                channel
            ),
            ConfigError::InvalidConversionFactor => {
                write!(f, "unit conversion factor must be positive")
            }
        }
    }
}

/// Driver error: either a rejected configuration or a failure reported by
/// the underlying pins, passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Rejected configuration change.
    Config(ConfigError),
    /// Digital I/O failure from the pin provider.
    Pin(E),
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Pin(e)
    }
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "configuration error: {}", e),
            Error::Pin(e) => write!(f, "pin error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_messages() {
        assert_eq!(
            ConfigError::InvalidGain(61).to_string(),
            "invalid gain 61 (expected 32, 64 or 128)"
        );
        assert_eq!(
            ConfigError::InvalidGainForChannel {
                channel: Channel::B,
                gain: Gain::G128,
            }
            .to_string(),
            "gain 128 is not available on channel B"
        );
    }

    #[test]
    fn pin_errors_convert() {
        let err: Error<&str> = Error::from("stuck line");
        assert_eq!(err, Error::Pin("stuck line"));
    }
}
