use thiserror::Error;

use crate::services::ai_service::{ProviderError, ProviderErrorKind};

/// Failures surfaced by `MealInsightGenerator::generate_report`.
#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Configuration Error: {0}")]
    Configuration(String),

    #[error("Model `{model}` is unavailable: {message}")]
    ModelUnavailable { model: String, message: String },

    #[error("Credential rejected by provider (model `{model}`): {message}")]
    CredentialRejected { model: String, message: String },

    #[error("Upstream Error from model `{model}`: {message}")]
    Upstream { model: String, message: String },

    #[error("No model available after {attempted} attempt(s)")]
    NoModelAvailable {
        attempted: usize,
        #[source]
        last: Option<Box<InsightError>>,
    },
}

impl InsightError {
    /// Maps a provider failure for `model` onto the caller-facing taxonomy.
    pub fn from_provider(model: &str, error: ProviderError) -> Self {
        let model = model.to_string();
        let message = error.message;
        match error.kind {
            ProviderErrorKind::NotFound | ProviderErrorKind::EmptyResponse => {
                InsightError::ModelUnavailable { model, message }
            }
            ProviderErrorKind::InvalidCredential => InsightError::CredentialRejected { model, message },
            ProviderErrorKind::RateLimited | ProviderErrorKind::Other => {
                InsightError::Upstream { model, message }
            }
        }
    }

    /// Only a vanished model is worth trying the next candidate for.
    pub fn is_retryable(&self) -> bool {
        matches!(self, InsightError::ModelUnavailable { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            InsightError::Configuration(_) => "configuration",
            InsightError::ModelUnavailable { .. } => "model_unavailable",
            InsightError::CredentialRejected { .. } => "credential_rejected",
            InsightError::Upstream { .. } => "upstream",
            InsightError::NoModelAvailable { .. } => "no_model_available",
        }
    }

    /// Text shown to the dashboard user.
    pub fn user_message(&self) -> String {
        match self {
            InsightError::Configuration(_) => {
                "AI 분석 설정이 올바르지 않습니다. API 키 설정을 확인해주세요.".to_string()
            }
            InsightError::CredentialRejected { .. } => {
                "API 키가 유효하지 않습니다 (invalid API key).".to_string()
            }
            InsightError::Upstream { message, .. } => {
                format!("AI 분석 중 오류가 발생했습니다: {}", message)
            }
            InsightError::ModelUnavailable { message, .. } => {
                format!("사용 가능한 AI 모델이 없습니다: {}", message)
            }
            InsightError::NoModelAvailable { last, .. } => match last {
                Some(last) => last.user_message(),
                None => "사용 가능한 AI 모델이 없습니다.".to_string(),
            },
        }
    }
}

pub type InsightResult<T> = Result<T, InsightError>;
