use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Point values used by the question scoring function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub correct_first_try: u32,
    /// Deducted per revealed hint on a first-try correct answer.
    pub hint_penalty: u32,
    /// Flat score for any correct answer after the first attempt.
    pub retry_partial: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            correct_first_try: 100,
            hint_penalty: 10,
            retry_partial: 50,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.retry_partial >= self.correct_first_try {
            return Err(format!(
                "retry_partial ({}) must be lower than correct_first_try ({})",
                self.retry_partial, self.correct_first_try
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentMode {
    #[default]
    Learning,
    Exam,
}

impl AssessmentMode {
    pub fn is_exam(&self) -> bool {
        matches!(self, AssessmentMode::Exam)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringState {
    pub attempts: u32,
    pub hints_used: u32,
    pub start_time: DateTime<Utc>,
    pub is_submitted: bool,
}

impl ScoringState {
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            attempts: 0,
            hints_used: 0,
            start_time: now,
            is_submitted: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Success,
    Partial,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreFeedback {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: FeedbackKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub score: u32,
    pub xp_gain: u32,
    pub gems_gain: u32,
    pub feedback: ScoreFeedback,
    /// Telemetry only, never part of the score.
    pub response_time_sec: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartScoringRequest {
    #[validate(length(min = 1, max = 200, message = "question_id must be 1-200 characters"))]
    pub question_id: String,
    #[serde(default)]
    pub mode: AssessmentMode,
}

/// Optional body of a reset; keeps the current question when absent.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ResetScoringRequest {
    #[validate(length(min = 1, max = 200, message = "question_id must be 1-200 characters"))]
    pub question_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScoringSessionView {
    pub session_id: String,
    pub question_id: String,
    pub mode: AssessmentMode,
    pub state: ScoringState,
}

#[derive(Debug, Serialize)]
pub struct HintResponse {
    pub hints_used: u32,
    /// False when the hint was refused (exam mode or already submitted).
    pub accepted: bool,
}

#[derive(Debug, Deserialize)]
pub struct SubmitScoreRequest {
    pub is_correct: bool,
}
