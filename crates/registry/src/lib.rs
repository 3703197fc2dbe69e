//! Capability registry: agent profiles, runtime instances, skill-based
//! discovery, and the handoff graph.
//!
//! State lives only for the process lifetime; there is no persistence.
//! Designed to be shared via `Arc<AgentRegistry>` across the application.

pub mod registry;

pub use registry::{AgentRegistry, HandoffEdge, MeshTopology};
