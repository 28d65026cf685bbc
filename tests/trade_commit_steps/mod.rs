//! Step definitions for trade commit scenarios.

mod given;
mod then;
mod when;
pub mod world;
