//! Runnable agentmesh node.
//!
//! Plays the collaborator roles the core components treat as external:
//! env configuration, the startup seeding step, keyword-based skill
//! classification, and a set of canned demo capability agents that
//! produce deliverables without calling any generation backend.

pub mod agents;
pub mod classify;
pub mod config;
pub mod seed;
