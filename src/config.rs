use crate::error::{InsightError, InsightResult};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Tried in this order: fastest general model, its dated alias, the newer
/// general model, then the legacy general model.
pub const DEFAULT_CANDIDATE_MODELS: [&str; 4] = [
    "gemini-1.5-flash",
    "gemini-1.5-flash-001",
    "gemini-2.0-flash",
    "gemini-pro",
];

#[derive(Clone)]
pub struct InsightConfig {
    pub api_key: String,
    pub api_base: String,
    pub candidate_models: Vec<String>,
    /// Shared secret for the HTTP surface. `None` leaves it open.
    pub access_token: Option<String>,
}

// Keep the key out of logs.
impl std::fmt::Debug for InsightConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightConfig")
            .field("api_key", &"***")
            .field("api_base", &self.api_base)
            .field("candidate_models", &self.candidate_models)
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl InsightConfig {
    pub fn new(api_key: impl Into<String>) -> InsightResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(InsightError::Configuration(
                "GEMINI_API_KEY is not set".to_string(),
            ));
        }

        Ok(Self {
            api_key: api_key.trim().to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            candidate_models: DEFAULT_CANDIDATE_MODELS.iter().map(|m| m.to_string()).collect(),
            access_token: None,
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_candidate_models(mut self, models: Vec<String>) -> Self {
        self.candidate_models = models;
        self
    }

    /// Load configuration from the process environment (call `dotenv()` first).
    pub fn from_env() -> InsightResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> InsightResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY").unwrap_or_default();
        let mut config = Self::new(api_key)?;

        if let Some(base) = lookup("GEMINI_API_BASE").filter(|b| !b.trim().is_empty()) {
            config = config.with_api_base(base.trim());
        }

        if let Some(models) = lookup("GEMINI_MODELS") {
            let models: Vec<String> = models
                .split(',')
                .map(|m| m.trim())
                .filter(|m| !m.is_empty())
                .map(|m| m.to_string())
                .collect();
            if models.is_empty() {
                return Err(InsightError::Configuration(
                    "GEMINI_MODELS is set but lists no models".to_string(),
                ));
            }
            config = config.with_candidate_models(models);
        }

        config.access_token = lookup("INSIGHT_ACCESS_TOKEN").filter(|t| !t.trim().is_empty());

        Ok(config)
    }
}
