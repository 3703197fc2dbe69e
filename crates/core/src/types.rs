/// All entity identities are random v4 UUIDs assigned at creation.
pub type AgentId = uuid::Uuid;
pub type JobId = uuid::Uuid;
pub type SubtaskId = uuid::Uuid;
pub type DeliverableId = uuid::Uuid;
pub type EventId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
