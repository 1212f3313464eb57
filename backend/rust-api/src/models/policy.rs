use serde::{Deserialize, Serialize};

/// Thresholds and word lists shared by the auditor and the mastery dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptivePolicy {
    pub hint_dependency_threshold: f64,
    pub retry_persistence_threshold: f64,
    /// Below this mastery is "struggling".
    pub mastery_low: f64,
    /// At or above this mastery is "mastered".
    pub mastery_high: f64,
    pub top_n: usize,
    pub wall_of_text_chars: usize,
    pub min_prompt_chars: usize,
    pub generic_feedback_phrase: String,
    pub generic_feedback_max_chars: usize,
    pub coaching_phrases: Vec<String>,
    pub low_cognitive_bloom_levels: Vec<String>,
    pub objective_tones: Vec<String>,
}

impl Default for AdaptivePolicy {
    fn default() -> Self {
        Self {
            hint_dependency_threshold: 0.5,
            retry_persistence_threshold: 0.5,
            mastery_low: 0.5,
            mastery_high: 0.8,
            top_n: 3,
            wall_of_text_chars: 1000,
            min_prompt_chars: 5,
            generic_feedback_phrase: "כל הכבוד".to_string(),
            generic_feedback_max_chars: 20,
            coaching_phrases: [
                "נסה שוב",
                "נסי שוב",
                "רמז",
                "כדאי לחשוב",
                "שים לב",
                "try again",
                "hint",
                "think about",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            low_cognitive_bloom_levels: ["remember", "understand", "knowledge", "זכירה", "הבנה"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            objective_tones: ["objective", "neutral", "examiner"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AdaptivePolicy {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.mastery_low) || !(0.0..=1.0).contains(&self.mastery_high) {
            return Err("mastery thresholds must be within [0, 1]".to_string());
        }
        if self.mastery_low >= self.mastery_high {
            return Err(format!(
                "mastery_low ({}) must be lower than mastery_high ({})",
                self.mastery_low, self.mastery_high
            ));
        }
        Ok(())
    }

    pub fn is_low_cognitive(&self, bloom_level: &str) -> bool {
        let level = bloom_level.trim().to_lowercase();
        self.low_cognitive_bloom_levels
            .iter()
            .any(|candidate| candidate.to_lowercase() == level)
    }

    pub fn is_objective_tone(&self, tone: &str) -> bool {
        let tone = tone.trim().to_lowercase();
        self.objective_tones
            .iter()
            .any(|candidate| candidate.to_lowercase() == tone)
    }

    pub fn find_coaching_phrase(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.coaching_phrases
            .iter()
            .find(|phrase| lowered.contains(&phrase.to_lowercase()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        assert!(AdaptivePolicy::default().validate().is_ok());
    }

    #[test]
    fn inverted_mastery_thresholds_rejected() {
        let policy = AdaptivePolicy {
            mastery_low: 0.9,
            mastery_high: 0.8,
            ..AdaptivePolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn bloom_and_tone_matching_is_case_insensitive() {
        let policy = AdaptivePolicy::default();
        assert!(policy.is_low_cognitive("Remember"));
        assert!(!policy.is_low_cognitive("analyze"));
        assert!(policy.is_objective_tone(" Neutral "));
        assert!(!policy.is_objective_tone("encouraging"));
    }

    #[test]
    fn coaching_phrase_detection() {
        let policy = AdaptivePolicy::default();
        assert_eq!(
            policy.find_coaching_phrase("Wrong. Try again later"),
            Some("try again")
        );
        assert!(policy.find_coaching_phrase("התשובה הנכונה היא 4").is_none());
    }
}
