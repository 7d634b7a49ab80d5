pub mod channels;
pub mod config;
pub mod intake;
pub mod runtime;
pub mod session;
pub mod shared;
