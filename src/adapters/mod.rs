//! Adapters - concrete implementations of the ports.

pub mod memory;
pub mod postgres;
pub mod telegram;
pub mod tronscan;
