//! Shift-register LED panel driver
//!
//! Sixteen LEDs hang off two daisy-chained 74HC595s. A frame is shifted
//! out bit 0 first and only becomes visible on the latch pulse. Brightness
//! is a PWM on the active-low output-enable line, so a higher duty means
//! a darker panel.
//!
//! The driver is generic over `embedded-hal` pins so the frame logic runs
//! on the host; the embedded task pins it to RP2040 GPIO and PWM types and
//! serializes access through a mutex.

use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal::pwm::SetDutyCycle;

use crate::config::MAX_BRIGHTNESS;
use crate::error::Error;
use crate::types::DisplayUpdate;

#[cfg(feature = "embedded")]
use defmt::*;
#[cfg(feature = "embedded")]
use embassy_rp::gpio::Output;
#[cfg(feature = "embedded")]
use embassy_rp::pwm::PwmOutput;
#[cfg(feature = "embedded")]
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
#[cfg(feature = "embedded")]
use embassy_sync::mutex::Mutex;

#[cfg(feature = "embedded")]
use crate::channels::DISPLAY_CHANNEL;

/// Number of outputs on the chained registers
pub const PANEL_BITS: u32 = 16;

/// Output-enable duty for a brightness level. The line is active-low:
/// brightness 10 gives zero duty (always on), brightness 0 gives
/// `max_duty` (always off).
pub fn dimming_duty(brightness: u8, max_duty: u16) -> u16 {
    let max_level = u32::from(MAX_BRIGHTNESS);
    let level = u32::from(brightness.min(MAX_BRIGHTNESS));
    (u32::from(max_duty) * (max_level - level) / max_level) as u16
}

// ===================================================================
// Shift Register Bus
// ===================================================================

pub struct ShiftRegister<D, C, L> {
    data: D,
    clock: C,
    latch: L,
}

impl<D, C, L> ShiftRegister<D, C, L>
where
    D: OutputPin,
    C: OutputPin,
    L: OutputPin,
{
    pub fn new(data: D, clock: C, latch: L) -> Self {
        Self { data, clock, latch }
    }

    /// Shift a full frame and latch it. The storage register is only
    /// clocked after all sixteen bits are in place.
    pub fn write(&mut self, pattern: u16) -> Result<(), Error> {
        self.latch.set_low().map_err(|_| Error::ShiftBus)?;

        for bit in 0..PANEL_BITS {
            let level = PinState::from(pattern & (1 << bit) != 0);
            self.data.set_state(level).map_err(|_| Error::ShiftBus)?;
            self.clock.set_high().map_err(|_| Error::ShiftBus)?;
            self.clock.set_low().map_err(|_| Error::ShiftBus)?;
        }

        self.latch.set_high().map_err(|_| Error::ShiftBus)?;
        self.latch.set_low().map_err(|_| Error::ShiftBus)?;
        Ok(())
    }
}

// ===================================================================
// Panel Output
// ===================================================================

/// Shift register plus dimming line; one `apply` commits one frame.
pub struct PanelBus<D, C, L, P> {
    shift: ShiftRegister<D, C, L>,
    dimmer: P,
    applied_brightness: Option<u8>,
}

impl<D, C, L, P> PanelBus<D, C, L, P>
where
    D: OutputPin,
    C: OutputPin,
    L: OutputPin,
    P: SetDutyCycle,
{
    pub fn new(shift: ShiftRegister<D, C, L>, dimmer: P) -> Self {
        Self {
            shift,
            dimmer,
            applied_brightness: None,
        }
    }

    /// Brightness currently driven on the dimming line, if any
    pub fn applied_brightness(&self) -> Option<u8> {
        self.applied_brightness
    }

    /// Write the pattern, then retune the dimmer if brightness moved.
    pub fn apply(&mut self, update: DisplayUpdate) -> Result<(), Error> {
        self.shift.write(update.pattern)?;

        if self.applied_brightness != Some(update.brightness) {
            let duty = dimming_duty(update.brightness, self.dimmer.max_duty_cycle());
            self.dimmer.set_duty_cycle(duty).map_err(|_| Error::Dimmer)?;
            self.applied_brightness = Some(update.brightness);
        }

        Ok(())
    }
}

// ===================================================================
// Display Task Implementation
// ===================================================================

#[cfg(feature = "embedded")]
pub type Panel = PanelBus<Output<'static>, Output<'static>, Output<'static>, PwmOutput<'static>>;

/// The panel bus, shared by anything that writes frames
#[cfg(feature = "embedded")]
pub type SharedPanel = Mutex<CriticalSectionRawMutex, Panel>;

#[cfg(feature = "embedded")]
#[embassy_executor::task]
pub async fn display_task(panel: &'static SharedPanel) {
    info!("Display task started");

    let receiver = DISPLAY_CHANNEL.receiver();

    loop {
        let update = receiver.receive().await;

        // Pattern and brightness go out under one lock
        let mut bus = panel.lock().await;
        match bus.apply(update) {
            Ok(()) => {
                debug!(
                    "Display: pattern {:#x} brightness {}",
                    update.pattern, update.brightness
                );
            }
            Err(e) => {
                error!("Display: frame {:#x} not applied: {:?}", update.pattern, e);
            }
        }
    }
}
