//! Jog wheel task
//!
//! Wakes on every edge of either quadrature line and folds the decoded
//! step into the shared count.

use defmt::*;
use embassy_futures::select::select;
use embassy_rp::gpio::Input;
use jogpad_drivers::encoder::QuadratureDecoder;

use crate::channels::JOG_COUNT;

#[embassy_executor::task]
pub async fn encoder_task(mut a: Input<'static>, mut b: Input<'static>) {
    info!("Encoder task started");

    let mut decoder = QuadratureDecoder::new(a.is_high(), b.is_high());
    let mut reported_invalid = 0;

    loop {
        select(a.wait_for_any_edge(), b.wait_for_any_edge()).await;

        let delta = decoder.update(a.is_high(), b.is_high());
        if delta != 0 {
            JOG_COUNT.add(i32::from(delta));
        }

        let invalid = decoder.invalid_transitions();
        if invalid != reported_invalid {
            trace!("Encoder skipped a state ({} total)", invalid);
            reported_invalid = invalid;
        }
    }
}
