//! Bilateral trades between two parties.
//!
//! Two parties negotiate an exchange of resources inside a session. Each
//! owns an offer it may edit freely; any edit clears both confirmations, and
//! once both sides confirm the same terms the goods move in one
//! all-or-nothing commit against the parties' external pools. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//! - Tunables in [`config`]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
