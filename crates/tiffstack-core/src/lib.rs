pub mod config;
pub mod display;
pub mod error;
pub mod frame;
pub mod io;
pub mod progress;
pub mod stats;
