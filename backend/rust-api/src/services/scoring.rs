use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;

use crate::models::scoring::{
    AssessmentMode, FeedbackKind, ScoreFeedback, ScoringConfig, ScoringResult, ScoringState,
};

const CELEBRATIONS: &[&str] = &[
    "מושלם! 🎉",
    "מדהים, בדיוק כך!",
    "עבודה מצוינת!",
    "אלוף! תשובה נכונה בניסיון הראשון",
    "וואו, איזה יופי!",
];

/// Score of a single question submission.
///
/// `response_time_sec` is accepted for telemetry and does not change the score.
pub fn calculate_question_score(
    config: &ScoringConfig,
    is_correct: bool,
    attempts: u32,
    hints_used: u32,
    _response_time_sec: f64,
) -> u32 {
    if !is_correct {
        return 0;
    }
    if attempts <= 1 {
        let penalty = hints_used.saturating_mul(config.hint_penalty);
        config.correct_first_try.saturating_sub(penalty)
    } else {
        config.retry_partial
    }
}

/// Per-question counters feeding [`calculate_question_score`].
///
/// Lifecycle is `Fresh/Active -> Submitted`; a submitted tracker is meant to be
/// discarded, calls after submission are ignored with a warning.
#[derive(Debug, Clone)]
pub struct ScoringTracker {
    config: ScoringConfig,
    mode: AssessmentMode,
    state: ScoringState,
}

impl ScoringTracker {
    pub fn new(config: ScoringConfig, mode: AssessmentMode) -> Self {
        Self::started_at(config, mode, Utc::now())
    }

    pub fn started_at(config: ScoringConfig, mode: AssessmentMode, now: DateTime<Utc>) -> Self {
        Self {
            config,
            mode,
            state: ScoringState::fresh(now),
        }
    }

    pub fn state(&self) -> &ScoringState {
        &self.state
    }

    pub fn mode(&self) -> AssessmentMode {
        self.mode
    }

    pub fn is_submitted(&self) -> bool {
        self.state.is_submitted
    }

    pub fn reset_scoring(&mut self) {
        self.reset_scoring_at(Utc::now());
    }

    pub fn reset_scoring_at(&mut self, now: DateTime<Utc>) {
        self.state = ScoringState::fresh(now);
    }

    /// Returns whether the hint was counted.
    pub fn increment_hint(&mut self) -> bool {
        if self.mode.is_exam() {
            tracing::warn!("Hint requested in exam mode; hints are disabled for assessments");
            return false;
        }
        if self.state.is_submitted {
            tracing::warn!("Hint requested after submission; ignoring");
            return false;
        }
        self.state.hints_used += 1;
        true
    }

    pub fn record_attempt(&mut self) {
        if self.state.is_submitted {
            tracing::warn!("Attempt recorded after submission; ignoring");
            return;
        }
        self.state.attempts += 1;
    }

    pub fn calculate_score(&mut self, is_correct: bool) -> ScoringResult {
        self.calculate_score_at(is_correct, Utc::now())
    }

    pub fn calculate_score_at(&mut self, is_correct: bool, now: DateTime<Utc>) -> ScoringResult {
        let elapsed_ms = (now - self.state.start_time).num_milliseconds().max(0);
        let response_time_sec = elapsed_ms as f64 / 1000.0;

        // The submission being scored has not been recorded yet.
        let attempts = self.state.attempts + 1;
        let hints_used = self.state.hints_used;

        let score = calculate_question_score(
            &self.config,
            is_correct,
            attempts,
            hints_used,
            response_time_sec,
        );
        self.state.is_submitted = true;

        let full_score = score == self.config.correct_first_try;
        let gems_gain = if full_score {
            2
        } else if is_correct {
            1
        } else {
            0
        };

        ScoringResult {
            score,
            xp_gain: score,
            gems_gain,
            feedback: self.feedback_for(score, attempts, hints_used),
            response_time_sec,
        }
    }

    fn feedback_for(&self, score: u32, attempts: u32, hints_used: u32) -> ScoreFeedback {
        if score == self.config.correct_first_try {
            let message = CELEBRATIONS
                .choose(&mut rand::rng())
                .copied()
                .unwrap_or("מושלם!");
            return ScoreFeedback {
                message: message.to_string(),
                kind: FeedbackKind::Success,
            };
        }

        if score >= self.config.retry_partial {
            let message = if attempts <= 1 && hints_used > 0 {
                format!("יפה מאוד! הניקוד הופחת בגלל שימוש ב-{} רמזים", hints_used)
            } else {
                "נכון! הצלחת בניסיון חוזר".to_string()
            };
            return ScoreFeedback {
                message,
                kind: FeedbackKind::Partial,
            };
        }

        if score > 0 {
            return ScoreFeedback {
                message: "כמעט! נסו לפתור בפעם הבאה עם פחות רמזים".to_string(),
                kind: FeedbackKind::Partial,
            };
        }

        ScoreFeedback {
            message: "לא נכון, נסו שוב".to_string(),
            kind: FeedbackKind::Failure,
        }
    }
}
