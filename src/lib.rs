//! Tradepost: consent-gated bilateral trading.
//!
//! This crate lets two co-located parties build offers, confirm them, and
//! swap the offered resources atomically between their pools. Hosts plug in
//! their own world, storage, and presentation through ports.
//!
//! # Architecture
//!
//! Tradepost follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports
//!
//! # Modules
//!
//! - [`trade`]: Requests, sessions, offers, and the commit protocol

pub mod trade;
