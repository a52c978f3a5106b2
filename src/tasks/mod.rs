//! Background Tasks Module
//!
//! # Tasks
//! - Sweep: purges expired cache entries at a configured interval

mod sweep;

pub use sweep::spawn_sweep_task;
