//! Menu state machine
//!
//! The engine owns every piece of menu state. It consumes one input at a
//! time, applies the fixed transition table and, when a transition is
//! taken, renders exactly one `DisplayUpdate` for the state it landed in.
//! Inputs the table does not list leave state and context untouched.
//!
//! Sub-menus that edit provisionally (mode select, manual pattern pick)
//! carry their staged value inside the `MenuState` variant, so the value
//! is created by the transition that enters the sub-menu and disappears
//! with it.

use crate::config::{
    AUTO_ADVANCE_MS, DEFAULT_BRIGHTNESS, INFO_PAGES, MAX_BRIGHTNESS, MENU_ITEMS, PATTERN_COUNT,
};
use crate::types::{ButtonEvent, ButtonId, DisplayUpdate, PressType};

#[cfg(feature = "embedded")]
use defmt::*;
#[cfg(feature = "embedded")]
use embassy_time::{with_timeout, Duration};

#[cfg(feature = "embedded")]
use crate::channels::{BUTTON_CHANNEL, DISPLAY_CHANNEL};

// ===================================================================
// Display Patterns
// ===================================================================

/// Patterns shown by manual and auto pattern modes.
pub const PATTERN_TABLE: [u16; PATTERN_COUNT] = [0x00FF, 0xFF00, 0x0F0F, 0xF0F0];

/// Mode select bars; disjoint from each other and from any single bit.
pub const MODE_MANUAL_MASK: u16 = 0x0003;
pub const MODE_AUTO_MASK: u16 = 0x000C;

pub const INFO_PAGE_MASKS: [u16; INFO_PAGES as usize] = [0x000F, 0x00F0];
pub const RESET_MASK: u16 = 0xAAAA;
pub const POWER_OFF_MASK: u16 = 0x0000;

// ===================================================================
// State and Context
// ===================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuState {
    MainMenu,
    Brightness,
    /// Choosing between manual and auto; `staged_auto` is the pending choice
    ModeSelect { staged_auto: bool },
    /// Picking a pattern; `staged_pattern` is written back on confirm
    ManualMode { staged_pattern: u8 },
    AutoMode,
    Info,
    Reset,
    PowerOff,
}

/// Menu values that survive transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MenuContext {
    pub selected_item: u8,
    pub brightness: u8,
    pub is_auto_mode: bool,
    pub current_pattern_index: u8,
    pub info_page: u8,
}

impl MenuContext {
    /// Factory settings restored by RESET and by waking from POWER_OFF.
    /// The info page is left alone; entering INFO always rewinds it.
    fn restore_defaults(&mut self) {
        self.selected_item = 0;
        self.brightness = DEFAULT_BRIGHTNESS;
        self.is_auto_mode = false;
        self.current_pattern_index = 0;
    }

    /// Sub-menu for the highlighted main menu item.
    fn enter_selected(&mut self) -> MenuState {
        match self.selected_item {
            0 => MenuState::Brightness,
            1 => MenuState::ModeSelect {
                staged_auto: self.is_auto_mode,
            },
            2 => {
                self.info_page = 0;
                MenuState::Info
            }
            _ => MenuState::Reset,
        }
    }
}

impl Default for MenuContext {
    fn default() -> Self {
        Self {
            selected_item: 0,
            brightness: DEFAULT_BRIGHTNESS,
            is_auto_mode: false,
            current_pattern_index: 0,
            info_page: 0,
        }
    }
}

/// Everything the engine reacts to: a classified press, or the auto-mode
/// receive deadline expiring without one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuInput {
    Button(ButtonEvent),
    AutoAdvance,
}

impl From<ButtonEvent> for MenuInput {
    fn from(event: ButtonEvent) -> Self {
        MenuInput::Button(event)
    }
}

// ===================================================================
// Engine
// ===================================================================

pub struct MenuEngine {
    state: MenuState,
    context: MenuContext,
}

impl MenuEngine {
    pub fn new() -> Self {
        Self {
            state: MenuState::MainMenu,
            context: MenuContext::default(),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(state: MenuState, context: MenuContext) -> Self {
        Self { state, context }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn context(&self) -> &MenuContext {
        &self.context
    }

    /// How long the caller may wait for the next event before feeding
    /// `MenuInput::AutoAdvance`. `None` means wait forever.
    pub fn receive_timeout_ms(&self) -> Option<u64> {
        match self.state {
            MenuState::AutoMode => Some(AUTO_ADVANCE_MS),
            _ => None,
        }
    }

    /// Apply one input. Returns the frame to show when a transition was
    /// taken, `None` when the input is not handled in the current state.
    pub fn handle(&mut self, input: MenuInput) -> Option<DisplayUpdate> {
        let mut context = self.context;
        let next = step(self.state, &mut context, input)?;
        self.state = next;
        self.context = context;
        Some(self.render())
    }

    /// Frame for the current state, derived from scratch.
    pub fn render(&self) -> DisplayUpdate {
        let ctx = &self.context;
        // Indices are wrapped and brightness capped so every frame is in range.
        let level = ctx.brightness.min(MAX_BRIGHTNESS);
        let pattern_at = |index: u8| PATTERN_TABLE[usize::from(index) % PATTERN_COUNT];

        let pattern = match self.state {
            MenuState::MainMenu => 1u16 << (ctx.selected_item % MENU_ITEMS),
            MenuState::Brightness => ((1u32 << level) - 1) as u16,
            MenuState::ModeSelect { staged_auto: false } => MODE_MANUAL_MASK,
            MenuState::ModeSelect { staged_auto: true } => MODE_AUTO_MASK,
            MenuState::ManualMode { staged_pattern } => pattern_at(staged_pattern),
            MenuState::AutoMode => pattern_at(ctx.current_pattern_index),
            MenuState::Info => INFO_PAGE_MASKS[usize::from(ctx.info_page % INFO_PAGES)],
            MenuState::Reset => RESET_MASK,
            MenuState::PowerOff => POWER_OFF_MASK,
        };

        let brightness = match self.state {
            MenuState::PowerOff => 0,
            _ => level,
        };

        DisplayUpdate::new(pattern, brightness)
    }
}

impl Default for MenuEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Transition table. Returns the next state, or `None` for an unlisted
/// input; `ctx` is only meaningful to the caller when a state is returned.
fn step(state: MenuState, ctx: &mut MenuContext, input: MenuInput) -> Option<MenuState> {
    use ButtonId::{One, Three, Two};
    use MenuState::*;
    use PressType::{Double, Long, Single};

    let key = match input {
        MenuInput::Button(event) => Some((event.button, event.press)),
        MenuInput::AutoAdvance => None,
    };
    let patterns = PATTERN_COUNT as u8;

    let next = match (state, key) {
        (MainMenu, Some((One, Single))) => {
            ctx.selected_item = (ctx.selected_item + 1) % MENU_ITEMS;
            MainMenu
        }
        (MainMenu, Some((Three, Single))) => {
            ctx.selected_item = (ctx.selected_item + MENU_ITEMS - 1) % MENU_ITEMS;
            MainMenu
        }
        (MainMenu, Some((Two, Single))) => ctx.enter_selected(),
        (MainMenu, Some((Three, Long))) => PowerOff,

        (Brightness, Some((Two, Single))) => {
            ctx.brightness = (ctx.brightness + 1).min(MAX_BRIGHTNESS);
            Brightness
        }
        (Brightness, Some((Three, Single))) => {
            ctx.brightness = ctx.brightness.saturating_sub(1);
            Brightness
        }
        (Brightness, Some((One, Single))) => MainMenu,

        (ModeSelect { staged_auto }, Some((One, Single))) => ModeSelect {
            staged_auto: !staged_auto,
        },
        (ModeSelect { staged_auto }, Some((Two, Single))) => {
            ctx.is_auto_mode = staged_auto;
            if staged_auto {
                AutoMode
            } else {
                ManualMode {
                    staged_pattern: ctx.current_pattern_index,
                }
            }
        }
        (ModeSelect { .. }, Some((Three, Single))) => MainMenu,

        (ManualMode { staged_pattern }, Some((One, Single))) => ManualMode {
            staged_pattern: (staged_pattern + 1) % patterns,
        },
        (ManualMode { staged_pattern }, Some((Two, Single))) => {
            ctx.current_pattern_index = staged_pattern;
            MainMenu
        }
        (ManualMode { .. }, Some((Three, Single))) => MainMenu,

        (AutoMode, Some((One, Single))) => MainMenu,
        (AutoMode, None) => {
            ctx.current_pattern_index = (ctx.current_pattern_index + 1) % patterns;
            AutoMode
        }

        (Info, Some((One, Single))) => {
            ctx.info_page = (ctx.info_page + 1) % INFO_PAGES;
            Info
        }
        (Info, Some((Three, Single))) => MainMenu,

        (Reset, Some((Two, Double))) => {
            ctx.restore_defaults();
            MainMenu
        }
        (Reset, Some((Three, Single))) => MainMenu,

        (PowerOff, Some((One, Long))) => {
            ctx.restore_defaults();
            MainMenu
        }

        _ => return None,
    };

    Some(next)
}

// ===================================================================
// Menu Task Implementation
// ===================================================================

#[cfg(feature = "embedded")]
#[embassy_executor::task]
pub async fn menu_task() {
    info!("Menu task started");

    let mut engine = MenuEngine::new();
    let receiver = BUTTON_CHANNEL.receiver();
    let sender = DISPLAY_CHANNEL.sender();

    // Boot frame so the panel is not dark until the first press
    sender.send(engine.render()).await;

    loop {
        let input = match engine.receive_timeout_ms() {
            Some(timeout_ms) => {
                match with_timeout(Duration::from_millis(timeout_ms), receiver.receive()).await {
                    Ok(event) => MenuInput::Button(event),
                    Err(_) => MenuInput::AutoAdvance,
                }
            }
            None => MenuInput::Button(receiver.receive().await),
        };

        let before = engine.state();
        match engine.handle(input) {
            Some(update) => {
                info!("Menu: {:?} -> {:?}", before, engine.state());
                sender.send(update).await;
            }
            None => {
                debug!("Menu: {:?} ignored {:?}", before, input);
            }
        }
    }
}
