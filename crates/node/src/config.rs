/// Node configuration loaded from environment variables.
///
/// All fields have defaults suitable for a local demo run.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// How many historical events to replay after the demo job finishes.
    pub history_replay_limit: usize,
    /// Whether to submit the scripted demo job at startup.
    pub demo_job: bool,
}

impl NodeConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default |
    /// |------------------------|---------|
    /// | `HISTORY_REPLAY_LIMIT` | `50`    |
    /// | `SUBMIT_DEMO_JOB`      | `true`  |
    pub fn from_env() -> Self {
        let history_replay_limit: usize = std::env::var("HISTORY_REPLAY_LIMIT")
            .unwrap_or_else(|_| "50".into())
            .parse()
            .expect("HISTORY_REPLAY_LIMIT must be a valid usize");

        let demo_job: bool = std::env::var("SUBMIT_DEMO_JOB")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("SUBMIT_DEMO_JOB must be true or false");

        Self {
            history_replay_limit,
            demo_job,
        }
    }
}
