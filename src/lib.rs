//! AI meal analysis for the lifelog dashboard.
//!
//! [`MealInsightGenerator`] turns the latest few meal records into a Markdown
//! nutrition report using the Gemini API, falling back through an ordered list
//! of model identifiers when a model has been retired.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod server;

pub use config::InsightConfig;
pub use error::{InsightError, InsightResult};
pub use models::{AnalysisRequest, AnalysisResult, MealEntry, MealRecord, MealSlot};
pub use services::MealInsightGenerator;
