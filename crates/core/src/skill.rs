//! The capability taxonomy.
//!
//! A [`Skill`] is both what an agent declares it can do and what a subtask
//! requires. The registry's skill index and the router's assignment logic
//! match on these values.

use serde::{Deserialize, Serialize};

/// A capability an agent can declare and a subtask can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    /// Blog posts, copy, scripts, documentation.
    Writing,
    /// Voiceovers, narration, audio content.
    Voice,
    /// Logos, banners, illustrations, visual content.
    Image,
    /// Code generation, review, debugging.
    Code,
    /// The special capability that decomposes a job into subtasks.
    Orchestration,
}

impl Skill {
    /// Stable lowercase name used in event payloads and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Skill::Writing => "writing",
            Skill::Voice => "voice",
            Skill::Image => "image",
            Skill::Code => "code",
            Skill::Orchestration => "orchestration",
        }
    }
}

impl std::fmt::Display for Skill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
