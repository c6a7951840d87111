use std::sync::Arc;

use super::ai_service::TextGenerator;
use super::gemini::GeminiClient;
use super::prompt::build_meal_prompt;
use crate::config::InsightConfig;
use crate::error::{InsightError, InsightResult};
use crate::models::{AnalysisRequest, AnalysisResult, MealEntry};

/// Turns a batch of meals into a Markdown nutrition report, walking an
/// ordered list of models until one answers.
///
/// The first non-empty answer wins. A model the provider does not know
/// is skipped; any other failure ends the walk immediately.
pub struct MealInsightGenerator {
    provider: Arc<dyn TextGenerator>,
    candidate_models: Vec<String>,
}

impl MealInsightGenerator {
    /// Builds a generator backed by the Gemini API.
    pub fn new(config: &InsightConfig) -> InsightResult<Self> {
        let client = GeminiClient::new(config)?;
        Ok(Self::with_provider(
            Arc::new(client),
            config.candidate_models.clone(),
        ))
    }

    pub fn with_provider(provider: Arc<dyn TextGenerator>, candidate_models: Vec<String>) -> Self {
        Self {
            provider,
            candidate_models,
        }
    }

    pub fn candidate_models(&self) -> &[String] {
        &self.candidate_models
    }

    pub async fn generate_report(
        &self,
        entries: &[MealEntry],
        user_guidance: Option<&str>,
    ) -> InsightResult<String> {
        let prompt = build_meal_prompt(entries, user_guidance);
        log::info!(
            "🍽️ Generating meal insight for {} entries ({} candidate models)",
            entries.len(),
            self.candidate_models.len()
        );

        let mut last_error: Option<InsightError> = None;
        let mut attempted = 0;

        for model in &self.candidate_models {
            attempted += 1;
            log::info!("🤖 Trying model: {}", model);

            match self.provider.generate(model, &prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    log::info!("✅ Report generated by {} ({} bytes)", model, text.len());
                    return Ok(text);
                }
                Ok(_) => {
                    log::warn!("⚠️ Model {} returned an empty report, falling back", model);
                    last_error = Some(InsightError::ModelUnavailable {
                        model: model.clone(),
                        message: format!("Model {} returned no text", model),
                    });
                }
                Err(provider_error) => {
                    let err = InsightError::from_provider(model, provider_error);
                    if !err.is_retryable() {
                        log::error!("❌ Model {} failed, giving up: {}", model, err);
                        return Err(err);
                    }
                    log::warn!("⚠️ Model {} unavailable, falling back: {}", model, err);
                    last_error = Some(err);
                }
            }
        }

        log::error!("❌ No model produced a report after {} attempt(s)", attempted);
        Err(InsightError::NoModelAvailable {
            attempted,
            last: last_error.map(Box::new),
        })
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult {
        self.generate_report(&request.entries, request.user_guidance.as_deref())
            .await
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealSlot;
    use crate::services::ai_service::{ProviderError, ProviderErrorKind};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Replies from a fixed per-model script and records every call.
    struct ScriptedProvider {
        replies: HashMap<String, Result<String, ProviderError>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<(&str, Result<String, ProviderError>)>) -> Arc<Self> {
            Arc::new(Self {
                replies: replies.into_iter().map(|(m, r)| (m.to_string(), r)).collect(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn called_models(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
        }

        fn prompts(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(_, p)| p.clone()).collect()
        }
    }

    #[async_trait::async_trait]
    impl TextGenerator for ScriptedProvider {
        async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
            self.calls.lock().unwrap().push((model.to_string(), prompt.to_string()));
            self.replies
                .get(model)
                .cloned()
                .unwrap_or_else(|| Err(ProviderError::new(ProviderErrorKind::Other, "unscripted model")))
        }
    }

    fn ok(text: &str) -> Result<String, ProviderError> {
        Ok(text.to_string())
    }

    fn fail(kind: ProviderErrorKind, message: &str) -> Result<String, ProviderError> {
        Err(ProviderError::new(kind, message))
    }

    fn generator(provider: Arc<ScriptedProvider>, models: &[&str]) -> MealInsightGenerator {
        MealInsightGenerator::with_provider(provider, models.iter().map(|m| m.to_string()).collect())
    }

    fn lunch() -> Vec<MealEntry> {
        vec![MealEntry::new(MealSlot::Lunch, "bibimbap", Some(650.0))]
    }

    #[tokio::test]
    async fn test_first_candidate_success_makes_one_call() {
        let provider = ScriptedProvider::new(vec![("a", ok("report A")), ("b", ok("report B"))]);
        let generator = generator(provider.clone(), &["a", "b"]);

        let report = generator.generate_report(&lunch(), None).await.unwrap();

        assert_eq!(report, "report A");
        assert_eq!(provider.called_models(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_falls_back_past_not_found_models() {
        let provider = ScriptedProvider::new(vec![
            ("a", fail(ProviderErrorKind::NotFound, "[404] a is not found")),
            ("b", fail(ProviderErrorKind::NotFound, "[404] b is not found")),
            ("c", ok("report C")),
            ("d", ok("report D")),
        ]);
        let generator = generator(provider.clone(), &["a", "b", "c", "d"]);

        let report = generator.generate_report(&lunch(), None).await.unwrap();

        assert_eq!(report, "report C");
        assert_eq!(provider.called_models(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_non_retryable_error_aborts() {
        let provider = ScriptedProvider::new(vec![
            ("a", fail(ProviderErrorKind::NotFound, "[404] a is not found")),
            ("b", fail(ProviderErrorKind::RateLimited, "[429] quota exceeded")),
            ("c", ok("report C")),
        ]);
        let generator = generator(provider.clone(), &["a", "b", "c"]);

        let err = generator.generate_report(&lunch(), None).await.unwrap_err();

        assert!(matches!(err, InsightError::Upstream { ref model, .. } if model == "b"));
        assert_eq!(provider.called_models(), vec!["a", "b"]);
        assert!(err.user_message().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_invalid_credential_aborts_with_distinct_error() {
        let provider = ScriptedProvider::new(vec![
            ("a", fail(ProviderErrorKind::InvalidCredential, "API key not valid")),
            ("b", ok("report B")),
        ]);
        let generator = generator(provider.clone(), &["a", "b"]);

        let err = generator.generate_report(&lunch(), None).await.unwrap_err();

        assert!(matches!(err, InsightError::CredentialRejected { .. }));
        assert!(err.user_message().contains("invalid API key"));
        assert_eq!(provider.called_models(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_all_not_found_reports_last_error() {
        let provider = ScriptedProvider::new(vec![
            ("a", fail(ProviderErrorKind::NotFound, "a gone")),
            ("b", fail(ProviderErrorKind::NotFound, "b gone")),
            ("c", fail(ProviderErrorKind::NotFound, "c gone")),
        ]);
        let generator = generator(provider.clone(), &["a", "b", "c"]);

        let err = generator.generate_report(&lunch(), None).await.unwrap_err();

        match err {
            InsightError::NoModelAvailable { attempted, last } => {
                assert_eq!(attempted, 3);
                let last = last.expect("last error recorded");
                assert!(matches!(*last, InsightError::ModelUnavailable { ref model, ref message }
                    if model == "c" && message == "c gone"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(provider.called_models(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_empty_candidate_list() {
        let provider = ScriptedProvider::new(vec![]);
        let generator = generator(provider.clone(), &[]);

        let err = generator.generate_report(&lunch(), None).await.unwrap_err();

        assert!(matches!(err, InsightError::NoModelAvailable { attempted: 0, last: None }));
        assert!(provider.called_models().is_empty());
    }

    #[tokio::test]
    async fn test_blank_reply_falls_through() {
        let provider = ScriptedProvider::new(vec![("a", ok("  \n")), ("b", ok("report B"))]);
        let generator = generator(provider.clone(), &["a", "b"]);

        let report = generator.generate_report(&lunch(), None).await.unwrap();

        assert_eq!(report, "report B");
        assert_eq!(provider.called_models(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_every_candidate_gets_the_same_prompt() {
        let provider = ScriptedProvider::new(vec![
            ("a", fail(ProviderErrorKind::NotFound, "gone")),
            ("b", ok("report B")),
        ]);
        let generator = generator(provider.clone(), &["a", "b"]);

        generator.generate_report(&lunch(), Some("low sodium")).await.unwrap();

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0], prompts[1]);
        assert_eq!(prompts[0], build_meal_prompt(&lunch(), Some("low sodium")));
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let provider = ScriptedProvider::new(vec![
            ("a", fail(ProviderErrorKind::NotFound, "gone")),
            ("b", ok("report B")),
        ]);
        let generator = Arc::new(generator(provider.clone(), &["a", "b"]));
        let entries = lunch();

        let (first, second) = tokio::join!(
            generator.generate_report(&entries, None),
            generator.generate_report(&entries, None)
        );

        assert_eq!(first.unwrap(), "report B");
        assert_eq!(second.unwrap(), "report B");
        assert_eq!(provider.called_models().len(), 4);
    }

    #[tokio::test]
    async fn test_analyze_wraps_result() {
        let provider = ScriptedProvider::new(vec![("a", ok("report A"))]);
        let generator = generator(provider, &["a"]);
        let request = AnalysisRequest {
            entries: lunch(),
            user_guidance: Some(String::new()),
        };

        let result = generator.analyze(&request).await;

        assert!(result.is_success());
        assert_eq!(result.report_text.as_deref(), Some("report A"));
        assert!(result.failure.is_none());
    }

    #[test]
    fn test_missing_credential_is_configuration_error() {
        let mut config = InsightConfig::new("key").unwrap();
        config.api_key = String::new();

        let err = MealInsightGenerator::new(&config).err().unwrap();
        assert!(matches!(err, InsightError::Configuration(_)));
    }
}
