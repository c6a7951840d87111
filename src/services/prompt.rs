use crate::models::MealEntry;

pub const UNKNOWN_CALORIES: &str = "unknown";
pub const NO_GUIDANCE: &str = "no special instructions";

/// Headings the report must use, in order.
pub const REPORT_SECTIONS: [&str; 3] = [
    "## 🥗 영양 균형 평가",
    "## 🔄 현실적인 식단 개선 제안",
    "## ⚡ 대사 및 에너지 영향",
];

const PERSONA: &str = "You are a professional clinical nutritionist. \
Review the user's most recent meals below and write a practical nutrition report.";

const INSTRUCTIONS: &str = "ANALYSIS INSTRUCTIONS:\n\
1. Assess the overall nutritional balance of these meals (macronutrients, fiber, protein, sugar and sodium).\n\
2. Suggest concrete, realistic substitutions for specific items. Prefer swaps between ordinary everyday foods \
the user can actually buy or order; do not push aggressive vegetable-heavy or diet-food recommendations.\n\
3. Explain the likely metabolic effects and the long-term impact on energy levels if this pattern continues.\n\
4. Take the user's personal instructions below into account throughout the report.";

/// Builds the analysis prompt. Pure: the same input always yields the same bytes.
pub fn build_meal_prompt(entries: &[MealEntry], user_guidance: Option<&str>) -> String {
    let meals = entries
        .iter()
        .map(render_entry)
        .collect::<Vec<_>>()
        .join("\n");

    let guidance = user_guidance
        .filter(|g| !g.trim().is_empty())
        .unwrap_or(NO_GUIDANCE);

    format!(
        "{persona}\n\n\
         RECENT MEALS:\n{meals}\n\n\
         {instructions}\n\n\
         USER INSTRUCTIONS:\n{guidance}\n\n\
         OUTPUT FORMAT:\n\
         - Write in Markdown.\n\
         - Use exactly these three section headings, in this order:\n{sections}\n\
         - Keep a professional but friendly tone.\n\
         - Write the entire report in Korean.",
        persona = PERSONA,
        meals = meals,
        instructions = INSTRUCTIONS,
        guidance = guidance,
        sections = REPORT_SECTIONS
            .iter()
            .map(|s| format!("  {}", s))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

fn render_entry(entry: &MealEntry) -> String {
    let calories = match entry.calorie_estimate {
        Some(kcal) => kcal.to_string(),
        None => UNKNOWN_CALORIES.to_string(),
    };
    format!("- {}: {} ({} kcal)", entry.meal_slot, entry.menu_description, calories)
}
