//! Adapters - concrete implementations of the ports.

pub mod gigachat;
pub mod memory;
pub mod postgres;
