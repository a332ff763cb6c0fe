//! Bit-banged protocol engine, calibration and power sequencing for the
//! HX711.
//!
//! The chip has no command interface. Every interaction is a train of
//! PD_SCK pulses: 24 pulses shift out one conversion, the 25th to 27th
//! pulse selects the channel and gain of the *next* conversion, and a
//! clock held high puts the chip to sleep. All of that lives here.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::{extra_pulses, BitOrder, ByteOrder, Channel, Config, Gain};
use crate::error::{ConfigError, Error};
use crate::LoadCell;

/// Smallest sample the 24-bit converter can produce.
pub const HX711_MINIMUM: i32 = -(1 << 23);
/// Largest sample the 24-bit converter can produce.
pub const HX711_MAXIMUM: i32 = (1 << 23) - 1;

/// The datasheet asks for PD_SCK edges at least 200 ns apart; 1 us keeps a
/// comfortable margin without slowing the frame down noticeably.
const HX711_DELAY_TIME_US: u32 = 1;

/// Power sequencing state of the chip, as driven by this driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Clock idles low, conversions run.
    Active,
    /// Clock held high; the chip sleeps once the line has been high for
    /// 60 us (a hardware threshold, not tracked here).
    PoweredDown,
}

/// A weight rendered at fixed precision with the configured unit label.
///
/// Implements [`core::fmt::Display`], so it can be written to any
/// formatter without allocating.
#[derive(Debug, Clone, Copy)]
pub struct Weight {
    value: f32,
    decimal_places: usize,
    unit: &'static str,
}

impl Weight {
    /// The underlying weight value.
    pub fn value(&self) -> f32 {
        self.value
    }
}

impl core::fmt::Display for Weight {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.*}", self.decimal_places, self.value)?;
        if !self.unit.is_empty() {
            write!(f, " {}", self.unit)?;
        }
        Ok(())
    }
}

/// HX711 driver over two GPIO pins and a delay provider.
///
/// `sck_pin` doubles as clock and power control, `dt_pin` carries one
/// serial bit per clock pulse and signals conversion readiness (low =
/// ready). The pins are expected to be configured (output / input
/// respectively) by the HAL before they are handed over; the driver never
/// deals in pin numbers.
pub struct HX711<SckPin, DtPin, Delay> {
    sck_pin: SckPin,
    dt_pin: DtPin,
    delay: Delay,
    config: Config,
    tare_offset: i32,
    unit_conversion: f32,
    unit_label: &'static str,
    power: PowerState,
}

impl<SckPin, DtPin, Delay, E> HX711<SckPin, DtPin, Delay>
where
    SckPin: OutputPin<Error = E>,
    DtPin: InputPin<Error = E>,
    Delay: DelayNs,
{
    /// Creates a driver with the chip's power-on configuration (channel A,
    /// gain 128, MSB-first bits and bytes) and drives the clock to its idle
    /// low level.
    pub fn new(sck_pin: SckPin, dt_pin: DtPin, delay: Delay) -> Result<Self, Error<E>> {
        Self::with_config(sck_pin, dt_pin, delay, Config::default())
    }

    /// Creates a driver with an explicit configuration.
    ///
    /// Fails with [`Error::Config`] if the channel/gain pair has no entry
    /// in the pulse table, and with [`Error::Pin`] if the clock pin cannot
    /// be driven low. The pins are consumed either way.
    pub fn with_config(
        mut sck_pin: SckPin,
        dt_pin: DtPin,
        delay: Delay,
        config: Config,
    ) -> Result<Self, Error<E>> {
        config.validate().map_err(Error::Config)?;
        // clock idle low
        sck_pin.set_low()?;
        Ok(Self {
            sck_pin,
            dt_pin,
            delay,
            config,
            tare_offset: 0,
            unit_conversion: 1.0,
            unit_label: "",
            power: PowerState::Active,
        })
    }

    /// Destroys the driver and hands the pins back.
    pub fn release(self) -> (SckPin, DtPin) {
        (self.sck_pin, self.dt_pin)
    }

    /// Whether a conversion is ready to be shifted out (DT low).
    ///
    /// Callers must see `true` here before [`read_raw`](Self::read_raw)
    /// and friends; bits clocked out of a busy chip are garbage. The
    /// driver does not poll internally, so a caller that wants a deadline
    /// polls this with its own timeout.
    pub fn is_ready(&mut self) -> Result<bool, Error<E>> {
        Ok(self.dt_pin.is_low()?)
    }

    /// Whether the driver has the chip in its active state.
    pub fn is_powered(&self) -> bool {
        matches!(self.power, PowerState::Active)
    }

    /// Current power sequencing state.
    pub fn power_state(&self) -> PowerState {
        self.power
    }

    /// One clock transition: PD_SCK high then low.
    fn pulse_clock(&mut self) -> Result<(), Error<E>> {
        self.sck_pin.set_high()?;
        self.delay.delay_us(HX711_DELAY_TIME_US);
        self.sck_pin.set_low()?;
        self.delay.delay_us(HX711_DELAY_TIME_US);
        Ok(())
    }

    /// Pulses the clock once and samples DT.
    fn read_bit(&mut self) -> Result<bool, Error<E>> {
        self.pulse_clock()?;
        Ok(self.dt_pin.is_high()?)
    }

    /// Folds 8 bit reads into one byte, honoring the configured bit order.
    fn read_byte(&mut self) -> Result<u8, Error<E>> {
        let mut byte = 0u8;
        for _ in 0..8 {
            let bit = u8::from(self.read_bit()?);
            byte = match self.config.bit_order {
                BitOrder::MsbFirst => (byte << 1) | bit,
                BitOrder::LsbFirst => (byte >> 1) | (bit << 7),
            };
        }
        Ok(byte)
    }

    /// Shifts out one complete frame: 24 data bits plus the trailing idle
    /// pulses that select the next conversion's channel and gain.
    ///
    /// The whole train runs inside a critical section; an interrupt
    /// stretching the gap between two edges past the chip's 60 us
    /// power-down threshold would abort the conversion mid-frame.
    fn read_frame(&mut self) -> Result<u32, Error<E>> {
        // The pair was validated by the constructor and the setters.
        let idle_pulses =
            extra_pulses(self.config.channel, self.config.gain).map_err(Error::Config)?;

        let mut bytes = [0u8; 3];
        critical_section::with(|_| -> Result<(), Error<E>> {
            for byte in &mut bytes {
                *byte = self.read_byte()?;
            }
            // Issued even though the results are meaningless: skipping them
            // would leave the chip counting pulses for the wrong mode.
            for _ in 0..idle_pulses {
                let _ = self.read_bit()?;
            }
            Ok(())
        })?;

        if let ByteOrder::LsbFirst = self.config.byte_order {
            bytes.reverse();
        }
        Ok(pack_frame(bytes))
    }

    /// Reads one signed raw sample in [-8388608, 8388607].
    ///
    /// Precondition: [`is_ready`](Self::is_ready) returned `true` and the
    /// chip is powered. Violating either yields undefined data, not an
    /// error; the chip cannot report misuse.
    pub fn read_raw(&mut self) -> Result<i32, Error<E>> {
        let frame = self.read_frame()?;
        Ok(decode(frame))
    }

    /// Reads one sample and applies the tare offset and unit conversion.
    pub fn read_weight(&mut self) -> Result<f32, Error<E>> {
        let raw = self.read_raw()?;
        Ok((raw - self.tare_offset) as f32 / self.unit_conversion)
    }

    /// Reads one sample and returns it ready for display at the requested
    /// fixed precision, suffixed with the configured unit label.
    pub fn read_weight_display(&mut self, decimal_places: usize) -> Result<Weight, Error<E>> {
        Ok(Weight {
            value: self.read_weight()?,
            decimal_places,
            unit: self.unit_label,
        })
    }

    /// Currently configured gain.
    pub fn gain(&self) -> Gain {
        self.config.gain
    }

    /// Sets the gain for subsequent conversions.
    ///
    /// Rejects gains the current channel does not support; channel A takes
    /// 128 or 64, channel B only 32. Use [`set_mode`](Self::set_mode) to
    /// change channel and gain together. On rejection the previous gain is
    /// kept.
    pub fn set_gain(&mut self, gain: Gain) -> Result<(), ConfigError> {
        extra_pulses(self.config.channel, gain)?;
        self.config.gain = gain;
        Ok(())
    }

    /// Currently configured input channel.
    pub fn channel(&self) -> Channel {
        self.config.channel
    }

    /// Sets the input channel for subsequent conversions.
    ///
    /// Rejects channels the current gain does not support. On rejection
    /// the previous channel is kept.
    pub fn set_channel(&mut self, channel: Channel) -> Result<(), ConfigError> {
        extra_pulses(channel, self.config.gain)?;
        self.config.channel = channel;
        Ok(())
    }

    /// Sets channel and gain in one step.
    ///
    /// The per-field setters cannot move between channel A and channel B,
    /// since every intermediate pair is invalid; this is the supported way
    /// across.
    pub fn set_mode(&mut self, channel: Channel, gain: Gain) -> Result<(), ConfigError> {
        extra_pulses(channel, gain)?;
        self.config.channel = channel;
        self.config.gain = gain;
        Ok(())
    }

    /// Bit assembly order.
    pub fn bit_order(&self) -> BitOrder {
        self.config.bit_order
    }

    /// Sets the bit assembly order.
    pub fn set_bit_order(&mut self, bit_order: BitOrder) {
        self.config.bit_order = bit_order;
    }

    /// Byte packing order.
    pub fn byte_order(&self) -> ByteOrder {
        self.config.byte_order
    }

    /// Sets the byte packing order.
    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.config.byte_order = byte_order;
    }

    /// Unit label appended by [`read_weight_display`](Self::read_weight_display).
    pub fn unit_label(&self) -> &'static str {
        self.unit_label
    }

    /// Sets the unit label. An empty label renders with no suffix.
    pub fn set_unit_label(&mut self, unit_label: &'static str) {
        self.unit_label = unit_label;
    }

    /// Holds the clock high, sending the chip to sleep.
    ///
    /// The chip only powers down once PD_SCK has been high for 60 us; that
    /// wait is the caller's, the driver just leaves the line high. A no-op
    /// when already powered down.
    pub fn power_down(&mut self) -> Result<(), Error<E>> {
        if let PowerState::PoweredDown = self.power {
            return Ok(());
        }
        // Low first so the chip sees a rising edge.
        self.sck_pin.set_low()?;
        self.sck_pin.set_high()?;
        self.power = PowerState::PoweredDown;
        Ok(())
    }

    /// Wakes the chip and restores the configured channel and gain.
    ///
    /// On power-up the chip reverts to channel A / gain 128 internally, so
    /// one full frame is clocked out and discarded: the stale data is
    /// flushed and the frame's trailing pulses re-select the configured
    /// mode. A no-op when already active.
    pub fn power_up(&mut self) -> Result<(), Error<E>> {
        if let PowerState::Active = self.power {
            return Ok(());
        }
        self.sck_pin.set_low()?;
        self.power = PowerState::Active;
        let _ = self.read_frame()?;
        Ok(())
    }
}

impl<SckPin, DtPin, Delay, E> LoadCell for HX711<SckPin, DtPin, Delay>
where
    SckPin: OutputPin<Error = E>,
    DtPin: InputPin<Error = E>,
    Delay: DelayNs,
{
    type Error = Error<E>;

    fn read_raw(&mut self) -> Result<i32, Self::Error> {
        HX711::read_raw(self)
    }

    fn read_weight(&mut self) -> Result<f32, Self::Error> {
        HX711::read_weight(self)
    }

    fn tare_offset(&self) -> i32 {
        self.tare_offset
    }

    fn set_tare_offset(&mut self, offset: i32) {
        self.tare_offset = offset;
    }

    fn unit_conversion(&self) -> f32 {
        self.unit_conversion
    }

    fn set_unit_conversion(&mut self, factor: f32) -> Result<(), ConfigError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ConfigError::InvalidConversionFactor);
        }
        self.unit_conversion = factor;
        Ok(())
    }
}

/// Packs an ordered 3-byte sequence into a 24-bit frame, byte 0 most
/// significant.
fn pack_frame(bytes: [u8; 3]) -> u32 {
    (u32::from(bytes[0]) << 16) | (u32::from(bytes[1]) << 8) | u32::from(bytes[2])
}

/// Reinterprets a 24-bit frame as a two's-complement signed sample.
fn decode(frame: u32) -> i32 {
    -((frame & 0x80_0000) as i32) + (frame & 0x7F_FFFF) as i32
}
