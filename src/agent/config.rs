// Agent configuration

use super::AgentConfig;
use crate::config::{parse_env_var, read_section, ConfigError};
use std::path::Path;

impl AgentConfig {
    /// Defaults, then `[agent]` from `file`, then `AGENT_*` env vars
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config: AgentConfig = read_section(file, "agent")?;

        if let Ok(model) = std::env::var("AGENT_MODEL") {
            config.model = model;
        }
        config.max_steps = parse_env_var("AGENT_MAX_STEPS", config.max_steps);
        config.max_tokens_per_step =
            parse_env_var("AGENT_MAX_TOKENS_PER_STEP", config.max_tokens_per_step);
        config.context_window = parse_env_var("AGENT_CONTEXT_WINDOW", config.context_window);
        config.history_window = parse_env_var("AGENT_HISTORY_WINDOW", config.history_window);

        Ok(config)
    }
}
