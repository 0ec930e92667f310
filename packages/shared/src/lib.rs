//! Utilities shared by the presence relay binaries.

pub mod logger;
pub mod time;
