pub mod ai_service;
pub mod gemini; // Google Generative Language API
pub mod insight;
pub mod prompt;

pub use ai_service::{ProviderError, ProviderErrorKind, TextGenerator};
pub use gemini::GeminiClient;
pub use insight::MealInsightGenerator;
