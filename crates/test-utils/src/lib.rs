//! Test support for the typed GraphQL client crates.
//!
//! - [`fixtures`]: an introspected sample schema and shapes that match it.
//! - [`mock`]: in-memory HTTP and subscription transports.
//! - [`tracking`]: request logs with checkpoints.
//! - [`assertions`]: stable formatting of error lists for snapshots.

pub mod assertions;
pub mod fixtures;
pub mod mock;
pub mod tracking;

pub use mock::{frames, MockHttpExecutor, MockSubscriptionTransport};
pub use tracking::RequestLog;
