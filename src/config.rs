//! Channel, gain and bit/byte ordering configuration.
//!
//! The HX711 has no configuration registers; the only way to program it is
//! the number of PD_SCK pulses per conversion (25, 26 or 27). Everything in
//! this module exists to keep that pulse count consistent with what the
//! caller thinks the chip is doing.

use crate::error::ConfigError;

/// Amplifier gain applied inside the chip before conversion.
///
/// Channel A supports gains of 128 and 64, channel B is fixed at 32.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    /// Gain 32 (channel B only).
    G32,
    /// Gain 64 (channel A only).
    G64,
    /// Gain 128 (channel A only). Power-on default of the chip.
    G128,
}

impl Gain {
    /// The numeric gain factor.
    pub fn value(self) -> u8 {
        match self {
            Gain::G32 => 32,
            Gain::G64 => 64,
            Gain::G128 => 128,
        }
    }
}

impl TryFrom<u8> for Gain {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, ConfigError> {
        match value {
            32 => Ok(Gain::G32),
            64 => Ok(Gain::G64),
            128 => Ok(Gain::G128),
            other => Err(ConfigError::InvalidGain(other)),
        }
    }
}

/// Input channel of the HX711.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Differential input A (gain 128 or 64).
    A,
    /// Differential input B (gain 32 only).
    B,
}

/// Order in which the 8 bits of each byte are assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// The first bit clocked out becomes the most significant bit.
    MsbFirst,
    /// The first bit clocked out becomes the least significant bit.
    LsbFirst,
}

/// Order in which the 3 bytes of each frame are packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteOrder {
    /// The first byte clocked out is the most significant byte of the frame.
    MsbFirst,
    /// The first byte clocked out is the least significant byte of the frame.
    LsbFirst,
}

/// Driver configuration supplied at construction.
///
/// The defaults match the chip's power-on state: channel A, gain 128,
/// MSB-first bits and bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Input channel for the next conversion.
    pub channel: Channel,
    /// Amplifier gain for the next conversion.
    pub gain: Gain,
    /// Bit assembly order.
    pub bit_order: BitOrder,
    /// Byte packing order.
    pub byte_order: ByteOrder,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            channel: Channel::A,
            gain: Gain::G128,
            bit_order: BitOrder::MsbFirst,
            byte_order: ByteOrder::MsbFirst,
        }
    }
}

impl Config {
    /// Checks that the channel/gain pair exists in the pulse table.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        extra_pulses(self.channel, self.gain).map(|_| ())
    }
}

/// Trailing idle pulses that commit the next conversion's channel and gain.
///
/// | Channel | Gain | Total PD_SCK pulses | Extra pulses |
/// |---------|------|---------------------|--------------|
/// | A       | 128  | 25                  | 1            |
/// | B       | 32   | 26                  | 2            |
/// | A       | 64   | 27                  | 3            |
///
/// Any other pair does not exist on the chip and is rejected.
pub(crate) fn extra_pulses(channel: Channel, gain: Gain) -> Result<u8, ConfigError> {
    match (channel, gain) {
        (Channel::A, Gain::G128) => Ok(1),
        (Channel::B, Gain::G32) => Ok(2),
        (Channel::A, Gain::G64) => Ok(3),
        (channel, gain) => Err(ConfigError::InvalidGainForChannel { channel, gain }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_from_valid_values() {
        assert_eq!(Gain::try_from(32), Ok(Gain::G32));
        assert_eq!(Gain::try_from(64), Ok(Gain::G64));
        assert_eq!(Gain::try_from(128), Ok(Gain::G128));
    }

    #[test]
    fn gain_from_invalid_value() {
        assert_eq!(Gain::try_from(61), Err(ConfigError::InvalidGain(61)));
        assert_eq!(Gain::try_from(0), Err(ConfigError::InvalidGain(0)));
    }

    #[test]
    fn gain_round_trips_through_value() {
        for gain in [Gain::G32, Gain::G64, Gain::G128] {
            assert_eq!(Gain::try_from(gain.value()), Ok(gain));
        }
    }

    #[test]
    fn pulse_table_matches_datasheet() {
        assert_eq!(extra_pulses(Channel::A, Gain::G128), Ok(1));
        assert_eq!(extra_pulses(Channel::B, Gain::G32), Ok(2));
        assert_eq!(extra_pulses(Channel::A, Gain::G64), Ok(3));
    }

    #[test]
    fn invalid_pairs_are_rejected() {
        assert!(extra_pulses(Channel::B, Gain::G128).is_err());
        assert!(extra_pulses(Channel::B, Gain::G64).is_err());
        assert!(extra_pulses(Channel::A, Gain::G32).is_err());
    }

    #[test]
    fn default_config_is_power_on_state() {
        let config = Config::default();
        assert_eq!(config.channel, Channel::A);
        assert_eq!(config.gain, Gain::G128);
        assert_eq!(config.bit_order, BitOrder::MsbFirst);
        assert_eq!(config.byte_order, ByteOrder::MsbFirst);
        assert!(config.validate().is_ok());
    }
}
