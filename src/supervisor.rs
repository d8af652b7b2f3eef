//! Application supervisor and monitoring
//!
//! Prints the startup banner and a periodic health line. Purely
//! diagnostic: nothing here feeds back into the event pipeline.

use defmt::*;
use embassy_time::{Duration, Timer};
use portable_atomic::Ordering;

use crate::channels::DROPPED_EVENTS;
use crate::config::*;
use crate::types::APP_VERSION;

/// Application supervisor responsible for monitoring and lifecycle management
pub struct AppSupervisor {
    uptime_seconds: u32,
    last_heartbeat: u32,
    last_dropped: u32,
}

impl AppSupervisor {
    pub fn new() -> Self {
        Self {
            uptime_seconds: 0,
            last_heartbeat: 0,
            last_dropped: 0,
        }
    }

    /// Print application startup banner with timing and queue setup
    pub fn print_startup_banner(&self) {
        info!("========================================");
        info!("Trikey Panel v{}", APP_VERSION);
        info!("========================================");
        info!("Hardware: RP2040 (Raspberry Pi Pico)");
        info!(
            "Sampling: {}ms tick, debounce {} ticks",
            POLL_TICK_MS, DEBOUNCE_TICKS
        );
        info!(
            "Presses: click <= {}ms, long >= {}ms, window {}ms",
            SHORT_PRESS_MAX_MS, LONG_PRESS_MIN_MS, MULTI_CLICK_WINDOW_MS
        );
        info!(
            "Queues: events {}, frames {}",
            BUTTON_QUEUE_DEPTH, DISPLAY_QUEUE_DEPTH
        );
        info!("Auto mode advance: {}ms", AUTO_ADVANCE_MS);
        info!("========================================");
    }

    /// Run the main supervisor loop
    pub async fn run(&mut self) {
        info!("Application supervisor started");

        loop {
            Timer::after(Duration::from_secs(10)).await;
            self.uptime_seconds += 10;

            if self.uptime_seconds - self.last_heartbeat >= 60 {
                self.print_status();
                self.last_heartbeat = self.uptime_seconds;
            }
        }
    }

    /// Print current application status
    fn print_status(&mut self) {
        let minutes = self.uptime_seconds / 60;
        let hours = minutes / 60;
        let remaining_minutes = minutes % 60;

        if hours > 0 {
            info!("Status: Uptime {}h{}m", hours, remaining_minutes);
        } else {
            info!("Status: Uptime {}m", minutes);
        }

        let dropped = DROPPED_EVENTS.load(Ordering::Relaxed);
        if dropped != self.last_dropped {
            warn!(
                "Status: {} button events dropped ({} since last report)",
                dropped,
                dropped.wrapping_sub(self.last_dropped)
            );
            self.last_dropped = dropped;
        }
    }
}

impl Default for AppSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

#[embassy_executor::task]
pub async fn supervisor_task(mut supervisor: AppSupervisor) {
    supervisor.run().await;
}
