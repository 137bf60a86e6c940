//! Expander interrupt lines
//!
//! The expanders pull their open-drain INT outputs low when an input
//! changes. Each falling edge fires the line's interrupt context.

use defmt::*;
use embassy_rp::gpio::Input;
use jogpad_hal::IrqContext;

/// One task per INT line (keypad, switch port A, switch port B)
#[embassy_executor::task(pool_size = 3)]
pub async fn irq_line_task(mut pin: Input<'static>, context: &'static dyn IrqContext) {
    debug!("IRQ line task started");

    loop {
        pin.wait_for_falling_edge().await;
        context.fire();
    }
}
