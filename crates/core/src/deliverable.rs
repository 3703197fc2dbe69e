//! Output artifacts produced by completing subtasks.

use serde::{Deserialize, Serialize};

use crate::types::DeliverableId;

/// Content kind of a deliverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliverableKind {
    Text,
    Audio,
    Image,
    Code,
}

impl DeliverableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliverableKind::Text => "text",
            DeliverableKind::Audio => "audio",
            DeliverableKind::Image => "image",
            DeliverableKind::Code => "code",
        }
    }
}

impl std::fmt::Display for DeliverableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The output artifact produced by completing a subtask.
///
/// Immutable once produced. Owned by the producing subtask; copied by
/// reference into the job's deliverable list on completion.
///
/// Constructed via [`Deliverable::new`] and enriched with the builder
/// methods [`with_file`](Deliverable::with_file) and
/// [`with_metadata`](Deliverable::with_metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deliverable {
    pub id: DeliverableId,

    pub kind: DeliverableKind,

    /// Inline text content, or a reference to an externally stored artifact.
    pub content: String,

    /// Suggested filename for artifact-backed deliverables, empty otherwise.
    #[serde(default)]
    pub filename: String,

    /// MIME type for artifact-backed deliverables, empty otherwise.
    #[serde(default)]
    pub mime_type: String,

    /// Originating agent plus any intermediate values worth exposing
    /// (e.g. an enhanced prompt or a polished narration script).
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Deliverable {
    /// Create a deliverable with inline content and no file/metadata.
    pub fn new(kind: DeliverableKind, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            kind,
            content: content.into(),
            filename: String::new(),
            mime_type: String::new(),
            metadata: serde_json::Value::Object(Default::default()),
        }
    }

    /// Attach filename and MIME type for an artifact-backed deliverable.
    pub fn with_file(mut self, filename: impl Into<String>, mime_type: impl Into<String>) -> Self {
        self.filename = filename.into();
        self.mime_type = mime_type.into();
        self
    }

    /// Set the free-form metadata object.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}
