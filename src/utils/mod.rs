//! Utility modules shared by the addressing engine.

pub mod path;
