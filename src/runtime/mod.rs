pub mod run_loop;
pub mod scheduler;

pub use run_loop::{dispatch_batch, run_once, run_until_stop, BatchReport, LoopOptions};
pub use scheduler::{PerKeyScheduler, Scheduled};
