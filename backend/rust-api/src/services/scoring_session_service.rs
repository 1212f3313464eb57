use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::ScoringSessionError;
use crate::metrics::{
    HINTS_REQUESTED_TOTAL, RESPONSE_TIME_SECONDS, SCORE_SUBMISSIONS_TOTAL, SESSIONS_ACTIVE,
    SESSIONS_TOTAL,
};
use crate::models::scoring::{
    AssessmentMode, HintResponse, ScoringConfig, ScoringResult, ScoringSessionView,
    StartScoringRequest,
};
use crate::services::scoring::ScoringTracker;

struct SessionEntry {
    question_id: String,
    tracker: ScoringTracker,
    submitted_at: Option<DateTime<Utc>>,
    last_touched: DateTime<Utc>,
}

impl SessionEntry {
    fn view(&self, session_id: &str) -> ScoringSessionView {
        ScoringSessionView {
            session_id: session_id.to_string(),
            question_id: self.question_id.clone(),
            mode: self.tracker.mode(),
            state: self.tracker.state().clone(),
        }
    }
}

/// Registry of per-question scoring trackers for the player.
///
/// Submitted sessions stay readable for `retention`; unsubmitted ones are
/// dropped after `idle` without activity. Both are pruned when new sessions
/// start.
pub struct ScoringSessionService {
    config: ScoringConfig,
    retention: Duration,
    idle: Duration,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl ScoringSessionService {
    pub fn new(config: ScoringConfig, retention: Duration, idle: Duration) -> Self {
        Self {
            config,
            retention,
            idle,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn start_session(&self, req: StartScoringRequest) -> ScoringSessionView {
        let session_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let entry = SessionEntry {
            question_id: req.question_id,
            tracker: ScoringTracker::new(self.config, req.mode),
            submitted_at: None,
            last_touched: now,
        };
        let view = entry.view(&session_id);

        let mut sessions = self.sessions.write().await;
        self.prune(&mut sessions, now);
        sessions.insert(session_id.clone(), entry);

        SESSIONS_TOTAL.with_label_values(&["created"]).inc();
        SESSIONS_ACTIVE.inc();

        tracing::info!(
            "Scoring session started: session={}, question={}, mode={:?}",
            session_id,
            view.question_id,
            view.mode
        );
        view
    }

    pub async fn get_session(&self, session_id: &str) -> Result<ScoringSessionView, ScoringSessionError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .map(|entry| entry.view(session_id))
            .ok_or_else(|| ScoringSessionError::NotFound(session_id.to_string()))
    }

    pub async fn request_hint(&self, session_id: &str) -> Result<HintResponse, ScoringSessionError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(session_id)
            .ok_or_else(|| ScoringSessionError::NotFound(session_id.to_string()))?;

        entry.last_touched = Utc::now();
        let accepted = entry.tracker.increment_hint();
        let label = if accepted { "accepted" } else { "blocked" };
        HINTS_REQUESTED_TOTAL.with_label_values(&[label]).inc();

        Ok(HintResponse {
            hints_used: entry.tracker.state().hints_used,
            accepted,
        })
    }

    pub async fn record_attempt(&self, session_id: &str) -> Result<ScoringSessionView, ScoringSessionError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(session_id)
            .ok_or_else(|| ScoringSessionError::NotFound(session_id.to_string()))?;
        if entry.tracker.is_submitted() {
            return Err(ScoringSessionError::AlreadySubmitted(session_id.to_string()));
        }

        entry.tracker.record_attempt();
        entry.last_touched = Utc::now();
        tracing::debug!(
            "Attempt recorded: session={}, attempts={}",
            session_id,
            entry.tracker.state().attempts
        );
        Ok(entry.view(session_id))
    }

    /// Scores the session once; a second submit is rejected.
    pub async fn submit(
        &self,
        session_id: &str,
        is_correct: bool,
    ) -> Result<ScoringResult, ScoringSessionError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(session_id)
            .ok_or_else(|| ScoringSessionError::NotFound(session_id.to_string()))?;
        if entry.tracker.is_submitted() {
            tracing::warn!("Duplicate submit rejected for session={}", session_id);
            return Err(ScoringSessionError::AlreadySubmitted(session_id.to_string()));
        }

        let result = entry.tracker.calculate_score(is_correct);
        entry.submitted_at = Some(Utc::now());

        let mode_label = match entry.tracker.mode() {
            AssessmentMode::Learning => "learning",
            AssessmentMode::Exam => "exam",
        };
        let outcome = if result.score == self.config.correct_first_try {
            "perfect"
        } else if is_correct {
            "correct"
        } else {
            "incorrect"
        };
        SCORE_SUBMISSIONS_TOTAL
            .with_label_values(&[mode_label, outcome])
            .inc();
        RESPONSE_TIME_SECONDS
            .with_label_values(&[mode_label])
            .observe(result.response_time_sec);
        SESSIONS_TOTAL.with_label_values(&["submitted"]).inc();
        SESSIONS_ACTIVE.dec();

        tracing::info!(
            "Question scored: session={}, question={}, correct={}, score={}, response_time={:.1}s",
            session_id,
            entry.question_id,
            is_correct,
            result.score,
            result.response_time_sec
        );
        Ok(result)
    }

    /// Re-enters the fresh state, optionally for another question.
    pub async fn reset(
        &self,
        session_id: &str,
        question_id: Option<String>,
    ) -> Result<ScoringSessionView, ScoringSessionError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(session_id)
            .ok_or_else(|| ScoringSessionError::NotFound(session_id.to_string()))?;

        if entry.submitted_at.take().is_some() {
            SESSIONS_ACTIVE.inc();
        }
        entry.tracker.reset_scoring();
        entry.last_touched = Utc::now();
        if let Some(question_id) = question_id {
            entry.question_id = question_id;
        }
        Ok(entry.view(session_id))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn prune(&self, sessions: &mut HashMap<String, SessionEntry>, now: DateTime<Utc>) {
        let mut submitted = 0;
        let mut abandoned = 0;
        sessions.retain(|_, entry| {
            let keep = match entry.submitted_at {
                Some(at) => now - at < self.retention,
                None => now - entry.last_touched < self.idle,
            };
            if !keep {
                match entry.submitted_at {
                    Some(_) => submitted += 1,
                    None => abandoned += 1,
                }
            }
            keep
        });

        if abandoned > 0 {
            SESSIONS_ACTIVE.sub(abandoned);
            SESSIONS_TOTAL
                .with_label_values(&["abandoned"])
                .inc_by(abandoned as u64);
        }
        if submitted + abandoned > 0 {
            tracing::debug!(
                "Pruned scoring sessions: submitted={}, abandoned={}",
                submitted,
                abandoned
            );
        }
    }
}
