use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Six-field cron expression for the detection job.
    pub trend_cron: String,
    pub trend_velocity_weight: f64,
    pub trend_cross_source_weight: f64,
    pub trend_absolute_weight: f64,
    /// Minimum composite score before a trend is handed to notifiers.
    pub trend_min_score: f64,
    /// `openai` or `anthropic`; `None` leaves the LLM pre-filter disabled.
    pub llm_provider: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_model: Option<String>,
    pub llm_base_url: Option<String>,
    /// Minimum 0-10 relevance an item needs to survive the pre-filter.
    pub llm_min_score: f64,
    pub llm_timeout_secs: u64,
    /// Bearer tokens accepted by the HTTP API. Empty disables auth, which is
    /// only allowed in development.
    pub api_keys: Vec<String>,
}

impl AppConfig {
    /// Returns `true` when a provider and key are both present.
    #[must_use]
    pub fn llm_enabled(&self) -> bool {
        self.llm_provider.is_some() && self.llm_api_key.is_some()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("trend_cron", &self.trend_cron)
            .field("trend_velocity_weight", &self.trend_velocity_weight)
            .field("trend_cross_source_weight", &self.trend_cross_source_weight)
            .field("trend_absolute_weight", &self.trend_absolute_weight)
            .field("trend_min_score", &self.trend_min_score)
            .field("llm_provider", &self.llm_provider)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_model", &self.llm_model)
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_min_score", &self.llm_min_score)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("api_keys", &format_args!("[{} redacted]", self.api_keys.len()))
            .finish()
    }
}
