//! Shared utility modules used across recordseek components.

pub mod number;
