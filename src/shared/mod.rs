pub mod ids;
pub mod logging;
pub mod time;

pub use ids::{ChatTarget, UserId};
pub use logging::LogSink;
pub use time::now_secs;
