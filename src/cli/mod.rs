//! CLI argument parsing and validation.

mod args;

pub use args::{Args, DeviceChoice};
