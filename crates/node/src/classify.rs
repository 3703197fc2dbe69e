//! Keyword-based skill detection.
//!
//! Fallback classification used when a job arrives without declared
//! skills, and by the demo planner to derive a decomposition from a job
//! description. A real deployment would put an LLM classifier here; the
//! contract is the same either way.

use agentmesh_core::Skill;

const WRITING_KEYWORDS: &[&str] = &[
    "blog", "write", "article", "copy", "script", "content", "post", "story", "documentation",
];
const VOICE_KEYWORDS: &[&str] = &[
    "voice", "audio", "narrat", "voiceover", "speak", "podcast", "tts",
];
const IMAGE_KEYWORDS: &[&str] = &[
    "image", "logo", "banner", "illustration", "design", "visual", "picture", "photo", "graphic",
];
const CODE_KEYWORDS: &[&str] = &[
    "code", "develop", "program", "function", "api", "app", "software", "debug", "review",
];

/// Detect the skills a free-text description calls for.
///
/// Defaults to writing when nothing matches.
pub fn detect_skills(description: &str) -> Vec<Skill> {
    let lower = description.to_lowercase();
    let mut skills = Vec::new();

    let mentions = |keywords: &[&str]| keywords.iter().any(|kw| lower.contains(kw));
    if mentions(WRITING_KEYWORDS) {
        skills.push(Skill::Writing);
    }
    if mentions(VOICE_KEYWORDS) {
        skills.push(Skill::Voice);
    }
    if mentions(IMAGE_KEYWORDS) {
        skills.push(Skill::Image);
    }
    if mentions(CODE_KEYWORDS) {
        skills.push(Skill::Code);
    }

    if skills.is_empty() {
        skills.push(Skill::Writing);
    }
    skills
}
