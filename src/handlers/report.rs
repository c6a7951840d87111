use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use crate::models::{recent_batch, AnalysisRequest, AnalysisResult, MealRecord};
use crate::services::MealInsightGenerator;

pub struct ReportHandler {
    generator: Arc<MealInsightGenerator>,
    batch_limit: usize,
}

impl ReportHandler {
    pub fn new(generator: Arc<MealInsightGenerator>, batch_limit: usize) -> Self {
        Self {
            generator,
            batch_limit,
        }
    }

    /// Reads a JSON array of logged meals (the dashboard's export format).
    pub fn load_meal_log(path: &Path) -> Result<Vec<MealRecord>> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read meal log {}", path.display()))?;
        let records: Vec<MealRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse meal log {}", path.display()))?;

        log::debug!("📄 Loaded {} meal records from {}", records.len(), path.display());
        Ok(records)
    }

    pub fn build_request(&self, records: &[MealRecord], guidance: Option<String>) -> Result<AnalysisRequest> {
        let entries = recent_batch(records, self.batch_limit);
        if entries.is_empty() {
            anyhow::bail!("No meals logged yet, nothing to analyze");
        }

        log::info!("📊 Selected {} of {} meals for analysis", entries.len(), records.len());
        Ok(AnalysisRequest {
            entries,
            user_guidance: guidance,
        })
    }

    pub async fn handle(&self, records: &[MealRecord], guidance: Option<String>) -> Result<AnalysisResult> {
        let request = self.build_request(records, guidance)?;
        Ok(self.generator.analyze(&request).await)
    }
}
