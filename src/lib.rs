//! Trikey Panel - three-button menu panel firmware for RP2040
//!
//! Buttons are sampled, debounced and classified into SINGLE / DOUBLE /
//! TRIPLE / LONG presses, a menu state machine turns those presses into
//! frames, and frames are shifted out to a 16-LED panel with PWM dimming.
//!
//! ## Architecture
//! - **Input classifier** (`buttons`): 200 Hz sampling task, highest priority
//! - **Menu engine** (`menu`): owns all menu state, medium priority
//! - **Display sink** (`display`): shift-register bus behind a mutex, lowest priority
//! - **Channels**: two bounded queues carry events one way only
//!
//! The classifier, menu and bus logic are plain state machines with no
//! hardware access and are tested on the host. Enable the `embedded`
//! feature for the Embassy tasks, the RP2040 bring-up and the firmware
//! binary.

#![cfg_attr(not(test), no_std)]

pub mod buttons;
pub mod config;
pub mod display;
pub mod error;
pub mod menu;
pub mod types;

#[cfg(feature = "embedded")]
pub mod channels;
#[cfg(feature = "embedded")]
pub mod hardware;
#[cfg(feature = "embedded")]
pub mod supervisor;

pub use buttons::{ButtonTracker, InputClassifier};
pub use display::{dimming_duty, PanelBus, ShiftRegister};
pub use error::Error;
pub use menu::{MenuContext, MenuEngine, MenuInput, MenuState};
pub use types::{ButtonEvent, ButtonId, DisplayUpdate, PressType};
