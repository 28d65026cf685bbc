//! In-memory adapters.
//!
//! The registry adapter is the production registry: sessions and pending
//! requests live for the lifetime of the process only. The world and
//! notifier adapters back tests and embedding hosts without a real world.

mod notifier;
mod registry;
mod world;

pub use notifier::{RecordingNotifier, RenderedStatus};
pub use registry::InMemorySessionRegistry;
pub use world::{InMemoryWorld, OverflowRecord};
