//! Embassy async tasks
//!
//! Interrupt lines and the jog wheel run as independent tasks that only
//! touch the statics in [`crate::channels`].

pub mod encoder;
pub mod irq_line;

pub use encoder::encoder_task;
pub use irq_line::irq_line_task;
