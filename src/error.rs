//! Error type for the display output path.
//!
//! Variants carry no data so the enum stays `Copy` and alloc-free; the
//! underlying HAL error types differ per pin and are not worth keeping.

/// Failure while committing a frame to the panel hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A data, clock or latch pin write on the shift-register bus failed.
    ShiftBus,

    /// The output-enable PWM rejected a duty cycle.
    Dimmer,
}
