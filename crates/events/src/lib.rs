//! agentmesh event bus ("the Mesh").
//!
//! This crate provides the platform-wide event system:
//!
//! - [`MeshEvent`] — the canonical domain event envelope. The payload is a
//!   closed tagged enum, so every producer and consumer is statically
//!   checked instead of agreeing on JSON keys by convention.
//! - [`MeshBus`] — scoped publish/subscribe hub with an append-only,
//!   replayable history. Observers subscribe either to a single job or to
//!   the global mesh scope.

pub mod bus;
pub mod event;

pub use bus::{MeshBus, Scope, SubscriberId, DEFAULT_HISTORY_LIMIT};
pub use event::{EventPayload, MeshEvent, SubtaskSummary};
