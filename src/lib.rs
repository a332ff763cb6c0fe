//! A `no_std` [`embedded-hal`] driver for the HX711 24-bit load cell
//! amplifier and ADC.
//!
//! The HX711 is clocked by hand over two GPIO pins: `PD_SCK`, which both
//! shifts data out and (held high) powers the chip down, and `DOUT`, which
//! carries one serial bit per clock pulse and signals conversion readiness.
//! The driver assembles those bits into signed 24-bit samples, manages the
//! 25/26/27-pulse channel and gain selection, sequences power-down and
//! power-up, and converts raw samples into calibrated weights.
//!
//! The driver is fully synchronous and owns its pins exclusively; a frame
//! read is not atomic across its pulses, so multi-threaded use needs one
//! lock held for a whole frame read.
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal/1.0

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hx711;

use error::ConfigError;

/// The calibrated-scale interface of a load cell.
///
/// Application code that only cares about weights can stay generic over
/// the concrete pin and delay types through this trait.
pub trait LoadCell {
    /// Error produced by reads and rejected calibration changes.
    type Error;

    /// Read one raw signed sample from the converter.
    fn read_raw(&mut self) -> Result<i32, Self::Error>;

    /// Read one sample with the tare offset and unit conversion applied.
    fn read_weight(&mut self) -> Result<f32, Self::Error>;

    /// Get the tare offset, in raw sample units.
    fn tare_offset(&self) -> i32;

    /// Set the tare offset (the zero-load reference), in raw sample units.
    fn set_tare_offset(&mut self, offset: i32);

    /// Get the unit conversion factor.
    fn unit_conversion(&self) -> f32;

    /// Set the divisor mapping offset-corrected raw counts to weight
    /// units. Zero, negative and non-finite factors are rejected.
    fn set_unit_conversion(&mut self, factor: f32) -> Result<(), ConfigError>;
}
