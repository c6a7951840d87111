use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::InsightError;

/// Number of recent meals the dashboard sends for one analysis.
pub const DEFAULT_BATCH_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl std::fmt::Display for MealSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snack => "snack",
        };
        write!(f, "{}", s)
    }
}

impl MealSlot {
    /// Korean dashboard labels are accepted alongside the English names.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" | "아침" => Some(MealSlot::Breakfast),
            "lunch" | "점심" => Some(MealSlot::Lunch),
            "dinner" | "저녁" => Some(MealSlot::Dinner),
            "snack" | "간식" => Some(MealSlot::Snack),
            _ => None,
        }
    }
}

// Older dashboard exports store the Korean label instead of the key.
impl<'de> Deserialize<'de> for MealSlot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        MealSlot::from_string(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown meal slot: {}", raw)))
    }
}

/// One meal as the analysis routine sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealEntry {
    pub meal_slot: MealSlot,
    pub menu_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calorie_estimate: Option<f64>,
}

impl MealEntry {
    pub fn new(meal_slot: MealSlot, menu_description: impl Into<String>, calorie_estimate: Option<f64>) -> Self {
        Self {
            meal_slot,
            menu_description: menu_description.into(),
            calorie_estimate,
        }
    }
}

/// A logged meal, as exported from the dashboard's meal collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRecord {
    #[serde(flatten)]
    pub entry: MealEntry,
    pub logged_at: DateTime<Utc>,
}

/// Picks the `limit` most recent records and returns them oldest first.
pub fn recent_batch(records: &[MealRecord], limit: usize) -> Vec<MealEntry> {
    let mut sorted: Vec<&MealRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));

    let mut batch: Vec<MealEntry> = sorted
        .into_iter()
        .take(limit)
        .map(|record| record.entry.clone())
        .collect();
    batch.reverse();
    batch
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub entries: Vec<MealEntry>,
    #[serde(default, alias = "guidance")]
    pub user_guidance: Option<String>,
}

/// Wire view of one `generate_report` outcome. Exactly one field is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<AnalysisFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisFailure {
    pub kind: String,
    pub message: String,
    pub user_message: String,
}

impl AnalysisResult {
    pub fn is_success(&self) -> bool {
        self.report_text.is_some()
    }
}

impl From<Result<String, InsightError>> for AnalysisResult {
    fn from(result: Result<String, InsightError>) -> Self {
        match result {
            Ok(report_text) => AnalysisResult {
                report_text: Some(report_text),
                failure: None,
            },
            Err(e) => AnalysisResult {
                report_text: None,
                failure: Some(AnalysisFailure {
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                    user_message: e.user_message(),
                }),
            },
        }
    }
}
