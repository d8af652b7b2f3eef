//! Common types and data structures used across the Trikey panel
//!
//! Everything here is a small `Copy` value that crosses a task boundary
//! through one of the two queues.

/// One of the three physical buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonId {
    One,
    Two,
    Three,
}

impl ButtonId {
    pub const ALL: [ButtonId; 3] = [ButtonId::One, ButtonId::Two, ButtonId::Three];

    /// Button number as printed on the panel (1..=3)
    pub const fn number(self) -> u8 {
        match self {
            ButtonId::One => 1,
            ButtonId::Two => 2,
            ButtonId::Three => 3,
        }
    }

    /// Position of this button in per-button arrays
    pub const fn index(self) -> usize {
        self.number() as usize - 1
    }
}

/// How a press was classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressType {
    Single,
    Double,
    Triple,
    Long,
}

/// Classified button press, produced by the input classifier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvent {
    pub button: ButtonId,
    pub press: PressType,
    /// Milliseconds since boot at the moment of classification
    pub timestamp_ms: u64,
}

impl ButtonEvent {
    pub const fn new(button: ButtonId, press: PressType, timestamp_ms: u64) -> Self {
        Self {
            button,
            press,
            timestamp_ms,
        }
    }
}

/// What the LED panel should show next
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayUpdate {
    /// Bit n lights LED n; bit 0 is the first LED shifted out
    pub pattern: u16,
    /// 0 (off) ..= 10 (full)
    pub brightness: u8,
}

impl DisplayUpdate {
    pub const fn new(pattern: u16, brightness: u8) -> Self {
        Self {
            pattern,
            brightness,
        }
    }
}

/// Current application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_index_follows_panel_number() {
        for (i, button) in ButtonId::ALL.iter().enumerate() {
            assert_eq!(button.index(), i);
            assert_eq!(usize::from(button.number()), i + 1);
        }
    }
}
