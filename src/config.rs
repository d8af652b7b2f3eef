//! Hardware configuration for the Trikey panel
//! RP2040-based three-button menu panel with a 16-LED shift-register display

// ===================================================================
// Input Sampling and Press Classification
// ===================================================================

pub const POLL_TICK_MS: u64 = 5; // 200 Hz sampling
pub const DEBOUNCE_TICKS: u8 = 4; // Consecutive samples before a level is accepted
pub const SHORT_PRESS_MAX_MS: u64 = 300; // Longest press still counted as a click
pub const LONG_PRESS_MIN_MS: u64 = 1500; // Shortest press counted as LONG
pub const MULTI_CLICK_WINDOW_MS: u64 = 700; // Release-to-press gap joining a click sequence
pub const DOUBLE_CLICK_GAP_MS: u64 = 500; // Press-to-press gap for a DOUBLE
pub const TRIPLE_CLICK_SPAN_MS: u64 = 700; // First-to-third press span for a TRIPLE

/// Clicks a single sequence can hold before it is resolved.
pub const MAX_CLICKS: usize = 3;

// ===================================================================
// Menu
// ===================================================================

pub const MENU_ITEMS: u8 = 4; // Brightness, Mode, Info, Reset
pub const MAX_BRIGHTNESS: u8 = 10;
pub const DEFAULT_BRIGHTNESS: u8 = 5;
pub const INFO_PAGES: u8 = 2;
pub const PATTERN_COUNT: usize = 4;
pub const AUTO_ADVANCE_MS: u64 = 2000; // Pattern cycle period in AUTO_MODE

// ===================================================================
// Task Queues
// ===================================================================

pub const BUTTON_QUEUE_DEPTH: usize = 10; // Classified events, newest dropped when full
pub const DISPLAY_QUEUE_DEPTH: usize = 4; // Display updates, sender waits when full

// ===================================================================
// GPIO Pin Assignments - Raspberry Pi Pico
// ===================================================================

// Buttons (active-low, internal pull-up)
pub const BTN_PINS: [u8; 3] = [2, 3, 4]; // GPIO 2, 3, 4 -> buttons 1, 2, 3

// 74HC595 pair (16 outputs)
pub const SR_DATA_PIN: u8 = 19; // Serial data
pub const SR_CLOCK_PIN: u8 = 18; // Shift clock
pub const SR_LATCH_PIN: u8 = 17; // Storage register clock
pub const SR_OE_PIN: u8 = 16; // Output enable (active-low), PWM0 A

// Status LED
pub const LED_STATUS_PIN: u8 = 25; // Built-in LED on Pico

// ===================================================================
// Dimming
// ===================================================================

pub const PWM_TOP: u16 = 9_999; // 125 MHz / 10_000 = 12.5 kHz dimming

/// Press classification thresholds, in milliseconds.
///
/// The defaults are the firmware constants above; host tests build their
/// own to exercise edge timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputTiming {
    /// Samples a new level must hold before it becomes stable.
    pub debounce_ticks: u8,
    /// A release no later than this after the press is a click.
    pub short_press_max_ms: u64,
    /// A release at or after this is a LONG press.
    pub long_press_min_ms: u64,
    /// Maximum release-to-press gap inside a click sequence.
    pub multi_click_window_ms: u64,
    /// Press 1 to press 2 must be closer than this for a DOUBLE.
    pub double_click_gap_ms: u64,
    /// Press 1 to press 3 must be closer than this for a TRIPLE.
    pub triple_click_span_ms: u64,
}

impl Default for InputTiming {
    fn default() -> Self {
        Self {
            debounce_ticks: DEBOUNCE_TICKS,
            short_press_max_ms: SHORT_PRESS_MAX_MS,
            long_press_min_ms: LONG_PRESS_MIN_MS,
            multi_click_window_ms: MULTI_CLICK_WINDOW_MS,
            double_click_gap_ms: DOUBLE_CLICK_GAP_MS,
            triple_click_span_ms: TRIPLE_CLICK_SPAN_MS,
        }
    }
}
