//! Utilities shared by the watchroom packages.

pub mod logger;
pub mod time;
