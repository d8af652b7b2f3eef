//! Trikey Panel firmware
//!
//! Three executors give the pipeline its priorities:
//! - SWI_IRQ_1 (P1): button sampling and classification
//! - SWI_IRQ_0 (P2): menu state machine
//! - thread mode: display sink, status LED, supervisor

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{Executor, InterruptExecutor};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_sync::mutex::Mutex;
use defmt_rtt as _;
use panic_halt as _;
use static_cell::StaticCell;

use trikey_panel::display::SharedPanel;
use trikey_panel::*;

static EXECUTOR_INPUT: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_MENU: InterruptExecutor = InterruptExecutor::new();
static EXECUTOR_THREAD: StaticCell<Executor> = StaticCell::new();

static PANEL: StaticCell<SharedPanel> = StaticCell::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_INPUT.on_interrupt()
}

#[interrupt]
unsafe fn SWI_IRQ_0() {
    EXECUTOR_MENU.on_interrupt()
}

#[cortex_m_rt::entry]
fn main() -> ! {
    let p = embassy_rp::init(Default::default());

    let supervisor = supervisor::AppSupervisor::new();
    supervisor.print_startup_banner();

    let hw = hardware::PanelHardware::new(p);
    let panel: &'static SharedPanel = PANEL.init(Mutex::new(hw.panel));

    // Sampling must never wait on anything below it
    interrupt::SWI_IRQ_1.set_priority(Priority::P1);
    let spawner = EXECUTOR_INPUT.start(interrupt::SWI_IRQ_1);
    unwrap!(spawner.spawn(buttons::button_task(hw.buttons)));

    interrupt::SWI_IRQ_0.set_priority(Priority::P2);
    let spawner = EXECUTOR_MENU.start(interrupt::SWI_IRQ_0);
    unwrap!(spawner.spawn(menu::menu_task()));

    info!("Trikey Panel initialized successfully");

    let executor = EXECUTOR_THREAD.init(Executor::new());
    executor.run(|spawner| {
        unwrap!(hardware::spawn_thread_tasks(
            &spawner,
            panel,
            hw.status_led,
            supervisor
        ));
    })
}
