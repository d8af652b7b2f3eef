//! Button sampling, debouncing and press classification
//!
//! This module turns raw pin levels from the three panel buttons into
//! SINGLE/DOUBLE/TRIPLE/LONG events. The classifier itself is a pure
//! per-tick state machine driven by a millisecond clock; the embedded
//! task only reads the pins, feeds the classifier and forwards events.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Sender;
use heapless::Vec;

use crate::config::{InputTiming, MAX_CLICKS};
use crate::types::{ButtonEvent, ButtonId, PressType};

#[cfg(feature = "embedded")]
use defmt::*;
#[cfg(feature = "embedded")]
use embassy_rp::gpio::Input;
#[cfg(feature = "embedded")]
use embassy_time::{Duration, Instant, Ticker};
#[cfg(feature = "embedded")]
use portable_atomic::Ordering;

#[cfg(feature = "embedded")]
use crate::channels::{BUTTON_CHANNEL, DROPPED_EVENTS};
#[cfg(feature = "embedded")]
use crate::config::POLL_TICK_MS;

/// Press types resolved by one tracker in one tick.
pub type Presses = Vec<PressType, MAX_CLICKS>;

/// Events resolved by the whole classifier in one tick.
pub type Events = Vec<ButtonEvent, { MAX_CLICKS * 3 }>;

// ===================================================================
// Per-Button Tracker
// ===================================================================

/// Debounce and click-sequence state for a single button.
#[derive(Clone, Debug)]
pub struct ButtonTracker {
    timing: InputTiming,
    /// Debounced level: true while the button is held
    pressed: bool,
    /// Consecutive samples disagreeing with `pressed`
    debounce_counter: u8,
    press_start_ms: u64,
    /// Set after a short release while more clicks may follow
    last_release_ms: Option<u64>,
    click_count: u8,
    /// Press timestamps by click number; slot 0 is unused
    press_times: [u64; MAX_CLICKS + 1],
}

impl ButtonTracker {
    pub fn new(timing: InputTiming) -> Self {
        Self {
            timing,
            pressed: false,
            debounce_counter: 0,
            press_start_ms: 0,
            last_release_ms: None,
            click_count: 0,
            press_times: [0; MAX_CLICKS + 1],
        }
    }

    /// Debounced pressed state
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Clicks waiting for the multi-click window to close
    pub fn pending_clicks(&self) -> u8 {
        self.click_count
    }

    /// Feed one sample. `level_high` is the raw pin level; the button is
    /// active-low, so a low level means pressed.
    pub fn poll(&mut self, level_high: bool, now_ms: u64) -> Presses {
        let mut out = Presses::new();

        // Close an expired sequence before a new press can join it.
        self.resolve_expired(now_ms, &mut out);

        let pressed = !level_high;
        if pressed == self.pressed {
            self.debounce_counter = 0;
            return out;
        }

        self.debounce_counter += 1;
        if self.debounce_counter < self.timing.debounce_ticks {
            return out;
        }

        self.debounce_counter = 0;
        self.pressed = pressed;
        if pressed {
            self.on_press(now_ms, &mut out);
        } else {
            self.on_release(now_ms, &mut out);
        }
        out
    }

    fn on_press(&mut self, now_ms: u64, out: &mut Presses) {
        self.press_start_ms = now_ms;

        let in_window = matches!(
            self.last_release_ms,
            Some(released) if now_ms.saturating_sub(released) < self.timing.multi_click_window_ms
        );

        if in_window && usize::from(self.click_count) >= MAX_CLICKS {
            // Table is full: settle what we have and start over.
            self.finalize(out);
            self.click_count = 1;
        } else if in_window {
            self.click_count += 1;
        } else {
            self.click_count = 1;
        }

        self.press_times[usize::from(self.click_count)] = now_ms;
        self.last_release_ms = None;
    }

    fn on_release(&mut self, now_ms: u64, out: &mut Presses) {
        let duration = now_ms.saturating_sub(self.press_start_ms);

        if duration >= self.timing.long_press_min_ms {
            let _ = out.push(PressType::Long);
            self.click_count = 0;
            self.last_release_ms = None;
        } else if duration <= self.timing.short_press_max_ms {
            self.last_release_ms = Some(now_ms);
        } else {
            // Too long for a click, too short for LONG
            self.click_count = 0;
            self.last_release_ms = None;
        }
    }

    fn resolve_expired(&mut self, now_ms: u64, out: &mut Presses) {
        if self.click_count == 0 {
            return;
        }
        let Some(released) = self.last_release_ms else {
            return;
        };
        if now_ms.saturating_sub(released) >= self.timing.multi_click_window_ms {
            self.finalize(out);
        }
    }

    /// Turn the pending click sequence into events and clear it.
    fn finalize(&mut self, out: &mut Presses) {
        let t = self.press_times;
        let double_gap = self.timing.double_click_gap_ms;
        let close = |a: u64, b: u64| b.saturating_sub(a) < double_gap;

        match self.click_count {
            1 => {
                let _ = out.push(PressType::Single);
            }
            2 => {
                if close(t[1], t[2]) {
                    let _ = out.push(PressType::Double);
                } else {
                    let _ = out.push(PressType::Single);
                    let _ = out.push(PressType::Single);
                }
            }
            3 => {
                if t[3].saturating_sub(t[1]) < self.timing.triple_click_span_ms {
                    let _ = out.push(PressType::Triple);
                } else if close(t[1], t[2]) {
                    let _ = out.push(PressType::Double);
                    let _ = out.push(PressType::Single);
                } else if close(t[2], t[3]) {
                    let _ = out.push(PressType::Single);
                    let _ = out.push(PressType::Double);
                } else {
                    let _ = out.push(PressType::Single);
                    let _ = out.push(PressType::Single);
                    let _ = out.push(PressType::Single);
                }
            }
            _ => {}
        }

        self.click_count = 0;
        self.last_release_ms = None;
    }
}

// ===================================================================
// Three-Button Classifier
// ===================================================================

/// Owns one tracker per button and tags their output with the button id.
pub struct InputClassifier {
    trackers: [ButtonTracker; 3],
}

impl InputClassifier {
    pub fn new(timing: InputTiming) -> Self {
        Self {
            trackers: [
                ButtonTracker::new(timing),
                ButtonTracker::new(timing),
                ButtonTracker::new(timing),
            ],
        }
    }

    pub fn tracker(&self, button: ButtonId) -> &ButtonTracker {
        &self.trackers[button.index()]
    }

    /// Sample all three buttons at `now_ms`. Levels are raw pin levels
    /// in button order 1, 2, 3.
    pub fn poll(&mut self, levels_high: [bool; 3], now_ms: u64) -> Events {
        let mut events = Events::new();
        for button in ButtonId::ALL {
            let tracker = &mut self.trackers[button.index()];
            for press in tracker.poll(levels_high[button.index()], now_ms) {
                let _ = events.push(ButtonEvent::new(button, press, now_ms));
            }
        }
        events
    }
}

impl Default for InputClassifier {
    fn default() -> Self {
        Self::new(InputTiming::default())
    }
}

/// Queue one event without waiting. Returns false when the queue was
/// full and the event was dropped; events already queued are kept.
pub fn forward<M: RawMutex, const N: usize>(
    sender: &Sender<'_, M, ButtonEvent, N>,
    event: ButtonEvent,
) -> bool {
    sender.try_send(event).is_ok()
}

// ===================================================================
// Button Task Implementation
// ===================================================================

#[cfg(feature = "embedded")]
#[embassy_executor::task]
pub async fn button_task(inputs: [Input<'static>; 3]) {
    info!("Button task started");

    let mut classifier = InputClassifier::default();
    let mut ticker = Ticker::every(Duration::from_millis(POLL_TICK_MS));
    let sender = BUTTON_CHANNEL.sender();

    loop {
        let levels = [inputs[0].is_high(), inputs[1].is_high(), inputs[2].is_high()];
        let now = Instant::now().as_millis();

        for event in classifier.poll(levels, now) {
            debug!(
                "Button {} {:?} at {}ms",
                event.button.number(),
                event.press,
                event.timestamp_ms
            );
            // Never wait on the menu: a full queue loses the newest event.
            if !forward(&sender, event) {
                DROPPED_EVENTS.fetch_add(1, Ordering::Relaxed);
                warn!("Button queue full, dropped {:?}", event);
            }
        }

        ticker.next().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BUTTON_QUEUE_DEPTH, POLL_TICK_MS};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_sync::channel::Channel;
    use std::vec::Vec as StdVec;

    /// Drives one tracker with a simulated clock at the real tick rate.
    struct Bench {
        tracker: ButtonTracker,
        now: u64,
        seen: StdVec<(PressType, u64)>,
    }

    impl Bench {
        fn new() -> Self {
            Self {
                tracker: ButtonTracker::new(InputTiming::default()),
                now: 0,
                seen: StdVec::new(),
            }
        }

        fn hold(&mut self, pressed: bool, ms: u64) -> &mut Self {
            for _ in 0..ms / POLL_TICK_MS {
                for press in self.tracker.poll(!pressed, self.now) {
                    self.seen.push((press, self.now));
                }
                self.now += POLL_TICK_MS;
            }
            self
        }

        fn click(&mut self, held_ms: u64, then_released_ms: u64) -> &mut Self {
            self.hold(true, held_ms).hold(false, then_released_ms)
        }

        fn presses(&self) -> StdVec<PressType> {
            self.seen.iter().map(|(p, _)| *p).collect()
        }
    }

    #[test]
    fn bounce_shorter_than_threshold_is_rejected() {
        let mut bench = Bench::new();
        for _ in 0..20 {
            bench.hold(true, 15).hold(false, 5);
        }
        assert!(!bench.tracker.is_pressed());
        bench.hold(false, 1000);
        assert!(bench.seen.is_empty());
    }

    #[test]
    fn level_must_hold_for_four_ticks() {
        let mut bench = Bench::new();
        bench.hold(true, 15);
        assert!(!bench.tracker.is_pressed());
        bench.hold(true, 5);
        assert!(bench.tracker.is_pressed());
    }

    #[test]
    fn single_click_waits_for_window_to_close() {
        let mut bench = Bench::new();
        bench.click(100, 600);
        assert!(bench.seen.is_empty());
        assert_eq!(bench.tracker.pending_clicks(), 1);

        bench.hold(false, 200);
        assert_eq!(bench.presses(), [PressType::Single]);
        assert_eq!(bench.tracker.pending_clicks(), 0);
    }

    #[test]
    fn two_quick_clicks_make_a_double() {
        let mut bench = Bench::new();
        bench.click(50, 100).click(50, 1000);
        assert_eq!(bench.presses(), [PressType::Double]);
    }

    #[test]
    fn slow_second_click_yields_two_singles() {
        let mut bench = Bench::new();
        // Press 2 starts 950ms after press 1 but only 650ms after release 1.
        bench.click(300, 650).click(50, 1000);
        assert_eq!(bench.presses(), [PressType::Single, PressType::Single]);
    }

    #[test]
    fn three_clicks_100ms_apart_make_a_triple() {
        let mut bench = Bench::new();
        bench.click(50, 50).click(50, 50).click(50, 1000);
        assert_eq!(bench.presses(), [PressType::Triple]);
    }

    #[test]
    fn gaps_of_100_then_900_split_into_double_and_single() {
        let mut bench = Bench::new();
        bench.click(50, 50).click(50, 850).click(50, 1000);
        assert_eq!(bench.presses(), [PressType::Double, PressType::Single]);
    }

    #[test]
    fn wide_triple_with_close_first_pair_is_double_then_single() {
        let mut bench = Bench::new();
        // Presses at 0, 100, 800: all inside the release window.
        bench.click(50, 50).click(50, 650).click(50, 1000);
        assert_eq!(bench.presses(), [PressType::Double, PressType::Single]);
    }

    #[test]
    fn wide_triple_with_close_last_pair_is_single_then_double() {
        let mut bench = Bench::new();
        // Presses at 0, 900, 1050.
        bench.click(300, 600).click(50, 100).click(50, 1000);
        assert_eq!(bench.presses(), [PressType::Single, PressType::Double]);
    }

    #[test]
    fn three_spread_clicks_are_three_singles() {
        let mut bench = Bench::new();
        // Presses at 0, 900, 1800.
        bench.click(300, 600).click(300, 600).click(300, 1000);
        assert_eq!(
            bench.presses(),
            [PressType::Single, PressType::Single, PressType::Single]
        );
    }

    #[test]
    fn long_press_fires_on_release() {
        let mut bench = Bench::new();
        bench.hold(true, 2000);
        assert!(bench.seen.is_empty());
        bench.hold(false, 50);
        assert_eq!(bench.presses(), [PressType::Long]);
        bench.hold(false, 1000);
        assert_eq!(bench.presses(), [PressType::Long]);
    }

    #[test]
    fn long_press_discards_pending_clicks() {
        let mut bench = Bench::new();
        bench.click(50, 100).click(50, 100);
        assert_eq!(bench.tracker.pending_clicks(), 2);

        bench.click(1600, 1000);
        assert_eq!(bench.presses(), [PressType::Long]);
        assert_eq!(bench.tracker.pending_clicks(), 0);
    }

    #[test]
    fn medium_press_is_ignored() {
        let mut bench = Bench::new();
        bench.click(800, 1500);
        assert!(bench.seen.is_empty());
        assert_eq!(bench.tracker.pending_clicks(), 0);
    }

    #[test]
    fn fourth_click_starts_a_new_sequence() {
        let mut bench = Bench::new();
        bench.click(50, 50).click(50, 50).click(50, 50).click(50, 1000);
        assert_eq!(bench.presses(), [PressType::Triple, PressType::Single]);
    }

    #[test]
    fn release_bounce_during_hold_is_ignored() {
        let mut bench = Bench::new();
        bench.hold(true, 100).hold(false, 10);
        assert!(bench.tracker.is_pressed());
        assert_eq!(bench.tracker.pending_clicks(), 1);

        bench.hold(true, 100).hold(false, 1000);
        assert_eq!(bench.presses(), [PressType::Single]);
    }

    #[test]
    fn press_of_exactly_300ms_is_still_a_click() {
        let mut bench = Bench::new();
        bench.click(300, 1000);
        assert_eq!(bench.presses(), [PressType::Single]);

        let mut bench = Bench::new();
        bench.click(305, 1000);
        assert!(bench.seen.is_empty());
    }

    #[test]
    fn press_of_exactly_1500ms_is_long() {
        let mut bench = Bench::new();
        bench.hold(true, 1500).hold(false, 100);
        assert_eq!(bench.presses(), [PressType::Long]);

        let mut bench = Bench::new();
        bench.hold(true, 1495).hold(false, 1000);
        assert!(bench.seen.is_empty());
    }

    #[test]
    fn presses_500ms_apart_are_not_a_double() {
        let mut bench = Bench::new();
        // Presses accepted at 15 and 515, release gap only 450ms.
        bench.click(50, 450).click(50, 1000);
        assert_eq!(bench.presses(), [PressType::Single, PressType::Single]);
    }

    #[test]
    fn press_700ms_after_release_starts_a_new_sequence() {
        let mut bench = Bench::new();
        // Release accepted at 65, next press at 765.
        bench.click(50, 700).click(50, 1000);
        assert_eq!(bench.presses(), [PressType::Single, PressType::Single]);
        assert_eq!(bench.seen[0].1, 765);
    }

    #[test]
    fn full_queue_drops_the_newest_event() {
        let channel = Channel::<NoopRawMutex, ButtonEvent, BUTTON_QUEUE_DEPTH>::new();
        let sender = channel.sender();
        let receiver = channel.receiver();

        for t in 0..BUTTON_QUEUE_DEPTH as u64 {
            let event = ButtonEvent::new(ButtonId::One, PressType::Single, t);
            assert!(forward(&sender, event));
        }
        let overflow = ButtonEvent::new(ButtonId::Two, PressType::Long, 99);
        assert!(!forward(&sender, overflow));

        for t in 0..BUTTON_QUEUE_DEPTH as u64 {
            let event = receiver.try_receive().unwrap();
            assert_eq!(event.button, ButtonId::One);
            assert_eq!(event.timestamp_ms, t);
        }
        assert!(receiver.try_receive().is_err());
    }

    #[test]
    fn classifier_tags_events_with_their_button() {
        let mut classifier = InputClassifier::default();
        let mut seen = StdVec::new();
        let mut now = 0;

        // Button 1 clicks, button 3 is held long, button 2 stays idle.
        for tick in 0..400u64 {
            let elapsed = tick * POLL_TICK_MS;
            let b1 = elapsed >= 100;
            let b3 = elapsed >= 1600;
            seen.extend(classifier.poll([b1, true, b3], now));
            now += POLL_TICK_MS;
        }

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].button, ButtonId::One);
        assert_eq!(seen[0].press, PressType::Single);
        assert_eq!(seen[1].button, ButtonId::Three);
        assert_eq!(seen[1].press, PressType::Long);
        assert!(seen[0].timestamp_ms < seen[1].timestamp_ms);
        assert!(!classifier.tracker(ButtonId::Two).is_pressed());
    }
}
