//! System-level modules
//!
//! - Logging initialization
//! - Panic reporting

pub mod logging;
pub mod panic_handler;
