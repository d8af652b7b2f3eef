//! Hardware abstraction and initialization
//!
//! Claims the RP2040 pins listed in `config`, builds the panel bus and
//! spawns the thread-mode tasks. The pin numbers in `config` are the
//! documentation; the `PIN_n` fields used here must match them.

use defmt::*;
use embassy_executor::{SpawnError, Spawner};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::Peripherals;
use embassy_time::{Duration, Timer};

use crate::config::*;
use crate::display::{display_task, Panel, PanelBus, SharedPanel, ShiftRegister};
use crate::supervisor::{supervisor_task, AppSupervisor};

/// Everything the tasks need, already configured
pub struct PanelHardware {
    /// Buttons 1, 2, 3 (active-low, pulled up)
    pub buttons: [Input<'static>; 3],
    pub panel: Panel,
    pub status_led: Output<'static>,
}

impl PanelHardware {
    pub fn new(p: Peripherals) -> Self {
        info!(
            "Buttons on GPIO {}, {}, {}",
            BTN_PINS[0], BTN_PINS[1], BTN_PINS[2]
        );
        let buttons = [
            Input::new(p.PIN_2, Pull::Up),
            Input::new(p.PIN_3, Pull::Up),
            Input::new(p.PIN_4, Pull::Up),
        ];

        info!(
            "Shift register DATA={} CLK={} LATCH={} OE={}",
            SR_DATA_PIN, SR_CLOCK_PIN, SR_LATCH_PIN, SR_OE_PIN
        );
        let shift = ShiftRegister::new(
            Output::new(p.PIN_19, Level::Low),
            Output::new(p.PIN_18, Level::Low),
            Output::new(p.PIN_17, Level::Low),
        );

        // OE is active-low: start at full duty so the panel stays dark
        // until the first frame sets real brightness.
        let mut pwm_config = PwmConfig::default();
        pwm_config.top = PWM_TOP;
        pwm_config.compare_a = PWM_TOP;
        let (oe, _) = Pwm::new_output_a(p.PWM_SLICE0, p.PIN_16, pwm_config).split();
        let oe = unwrap!(oe, "PWM0 A output missing");

        Self {
            buttons,
            panel: PanelBus::new(shift, oe),
            status_led: Output::new(p.PIN_25, Level::Low),
        }
    }
}

/// Spawn the lowest-priority tasks: display sink, status LED, supervisor
pub fn spawn_thread_tasks(
    spawner: &Spawner,
    panel: &'static SharedPanel,
    status_led: Output<'static>,
    supervisor: AppSupervisor,
) -> Result<(), SpawnError> {
    spawner.spawn(display_task(panel))?;
    spawner.spawn(status_task(status_led))?;
    spawner.spawn(supervisor_task(supervisor))?;
    Ok(())
}

/// Status LED task implementation
#[embassy_executor::task]
pub async fn status_task(mut status_led: Output<'static>) {
    info!("Status LED task started");

    loop {
        // Heartbeat pattern - short blink every second
        status_led.set_high();
        Timer::after(Duration::from_millis(100)).await;
        status_led.set_low();
        Timer::after(Duration::from_millis(900)).await;
    }
}
