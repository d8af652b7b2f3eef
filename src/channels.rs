//! Inter-task communication channels
//!
//! This module defines the Embassy channels connecting the classifier,
//! menu and display tasks. They use `CriticalSectionRawMutex` because
//! the three tasks run on executors at different interrupt priorities.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use portable_atomic::AtomicU32;

use crate::config::{BUTTON_QUEUE_DEPTH, DISPLAY_QUEUE_DEPTH};
use crate::types::{ButtonEvent, DisplayUpdate};

/// Classified presses from the button task to the menu task
/// Buffer size: 10 (producer drops the newest event when full)
pub static BUTTON_CHANNEL: Channel<CriticalSectionRawMutex, ButtonEvent, BUTTON_QUEUE_DEPTH> =
    Channel::new();

/// Frames from the menu task to the display task
/// Buffer size: 4 (producer waits when full, nothing is coalesced)
pub static DISPLAY_CHANNEL: Channel<CriticalSectionRawMutex, DisplayUpdate, DISPLAY_QUEUE_DEPTH> =
    Channel::new();

/// Button events lost to a full `BUTTON_CHANNEL`
pub static DROPPED_EVENTS: AtomicU32 = AtomicU32::new(0);
