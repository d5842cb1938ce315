use std::path::Path;

use serde::{Deserialize, Serialize};

use otto_core::{OttoError, OttoResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub data_dir: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// Populate the database with demo data when it is empty.
    #[serde(default)]
    pub seed_demo_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: shellexpand("~/.otto/data"),
            server: ServerConfig::default(),
            llm: LlmConfig::default(),
            search: SearchConfig::default(),
            smtp: SmtpConfig::default(),
            assistant: AssistantConfig::default(),
            seed_demo_data: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// no path is given. Secrets are then layered in from the environment.
    pub fn load(path: Option<&Path>) -> OttoResult<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    OttoError::Config(format!("failed to read {}: {e}", path.display()))
                })?;
                toml::from_str(&raw)
                    .map_err(|e| OttoError::Config(format!("failed to parse config: {e}")))?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Environment overrides for secrets and deployment knobs.
    pub fn apply_env(&mut self) {
        if let Some(key) = env_nonempty("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(key) = env_nonempty("SERPAPI_KEY") {
            self.search.serpapi_key = Some(key);
        }
        if let Some(password) = env_nonempty("OTTO_SMTP_PASSWORD") {
            self.smtp.password = Some(password);
        }
        if let Some(dir) = env_nonempty("OTTO_DATA_DIR") {
            self.data_dir = dir;
        }
        if let Some(port) = env_nonempty("OTTO_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS. Defaults to the local desktop-shell set.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            cors_origins: vec![
                "http://localhost:1420".into(),
                "tauri://localhost".into(),
                "https://tauri.localhost".into(),
            ],
        }
    }
}

/// Configuration for the LLM provider used by the chat pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Normally sourced from `OPENAI_API_KEY` rather than the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4".into(),
            max_tokens: 1000,
            temperature: 0.3,
            timeout_secs: 30,
            api_key: None,
        }
    }
}

/// Configuration for outbound web search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Normally sourced from `SERPAPI_KEY`. Without a key the service
    /// serves illustrative demo results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serpapi_key: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://serpapi.com/search".into(),
            timeout_secs: 10,
            serpapi_key: None,
        }
    }
}

/// Outbound SMTP delivery. Disabled by default — sends are then recorded
/// in the local store only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub enabled: bool,
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub from_address: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: None,
            port: 587,
            username: None,
            password: None,
            from_address: None,
        }
    }
}

/// Tuning for the chat pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// How many persisted messages to fetch as conversational context.
    pub context_messages: usize,
    /// How many of those to quote in the general-conversation prompt.
    pub context_tail: usize,
    /// How many open tasks to show the task-management prompt.
    pub open_task_context: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            context_messages: 10,
            context_tail: 5,
            open_task_context: 5,
        }
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn shellexpand(s: &str) -> String {
    if let Some(rest) = s.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return format!("{home}/{rest}");
        }
    }
    s.to_string()
}
