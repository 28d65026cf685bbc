//! Adapter implementations for the trade ports.

pub mod memory;
