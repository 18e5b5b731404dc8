// Prompt constants for assessment recommendation.

/// Upper bound on recommendations requested from the model. Prompt-enforced only.
pub const MAX_RECOMMENDATIONS: usize = 10;

/// Recommendation prompt template. Replace `{jd_text}` and `{max}` before sending.
pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"You are a helpful assistant. Based on the following job description, recommend up to {max} relevant SHL assessments.

{jd_text}

Your response MUST be a valid JSON list. Each object should have these keys:
- Assessment Name
- URL
- Remote Testing Support (Yes/No)
- Adaptive/IRT Support (Yes/No)
- Duration
- Test Type

Respond ONLY in valid JSON format like this:
[{"Assessment Name": "...", "URL": "...", "Remote Testing Support": "Yes", "Adaptive/IRT Support": "No", "Duration": "30 mins", "Test Type": "Cognitive"}]"#;

/// Fills the template with the trimmed job description.
pub fn build_recommendation_prompt(jd_text: &str) -> String {
    RECOMMENDATION_PROMPT_TEMPLATE
        .replace("{max}", &MAX_RECOMMENDATIONS.to_string())
        .replace("{jd_text}", jd_text.trim())
}
