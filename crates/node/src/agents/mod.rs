//! Canned demo capability agents.
//!
//! Each one implements [`agentmesh_core::CapabilityAgent`] with a fully
//! offline generator: the deliverables are deterministic templates over
//! the subtask and its context. They stand in for the real
//! content-generation backends behind the same interface.

pub mod code;
pub mod image;
pub mod orchestrator;
pub mod voice;
pub mod writer;

pub use code::CodeAgent;
pub use image::ImageAgent;
pub use orchestrator::OrchestratorAgent;
pub use voice::VoiceAgent;
pub use writer::WriterAgent;
