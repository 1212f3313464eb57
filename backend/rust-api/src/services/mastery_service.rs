use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::mastery::{
    ContentVariant, HintDependency, LearningStyle, MasteryReport, MasteryTier, Persistence,
    ProficiencyPartition, StudentAnalytics, TopicMastery,
};
use crate::models::policy::AdaptivePolicy;

const BLOOM_PREFIX: &str = "bloom_";
const GENERAL_KEY: &str = "general";

/// Display-side classification of precomputed student analytics.
/// Nothing here recomputes the underlying scores.
pub struct MasteryService {
    policy: AdaptivePolicy,
}

impl MasteryService {
    pub fn new(policy: AdaptivePolicy) -> Self {
        Self { policy }
    }

    pub fn hint_dependency_banner(&self, score: f64) -> HintDependency {
        if score > self.policy.hint_dependency_threshold {
            HintDependency::HighDependency
        } else {
            HintDependency::Independent
        }
    }

    pub fn persistence_banner(&self, score: f64) -> Persistence {
        if score > self.policy.retry_persistence_threshold {
            Persistence::Persistent
        } else {
            Persistence::GivesUpQuickly
        }
    }

    pub fn mastery_tier(&self, mastery: f64) -> MasteryTier {
        if mastery < self.policy.mastery_low {
            MasteryTier::Red
        } else if mastery < self.policy.mastery_high {
            MasteryTier::Yellow
        } else {
            MasteryTier::Green
        }
    }

    pub fn select_variant(&self, mastery: f64) -> ContentVariant {
        match self.mastery_tier(mastery) {
            MasteryTier::Red => ContentVariant::Remedial,
            MasteryTier::Yellow => ContentVariant::Standard,
            MasteryTier::Green => ContentVariant::Challenge,
        }
    }

    /// Splits the vector into curriculum topics and the reserved `bloom_*` /
    /// `general` keys. Topics come back sorted strongest first.
    pub fn partition_proficiency(&self, vector: &BTreeMap<String, f64>) -> ProficiencyPartition {
        let mut partition = ProficiencyPartition::default();

        for (key, &mastery) in vector {
            if !mastery.is_finite() {
                tracing::warn!("Skipping non-finite proficiency value for key={}", key);
                continue;
            }
            if key == GENERAL_KEY {
                partition.general = Some(mastery);
                continue;
            }
            let entry = TopicMastery {
                topic: key.clone(),
                mastery,
                tier: self.mastery_tier(mastery),
            };
            if let Some(level) = key.strip_prefix(BLOOM_PREFIX) {
                partition.bloom.push(TopicMastery {
                    topic: level.to_string(),
                    ..entry
                });
            } else {
                partition.topics.push(entry);
            }
        }

        partition.topics.sort_by(descending);
        partition.bloom.sort_by(descending);
        partition
    }

    pub fn build_report(&self, analytics: &StudentAnalytics) -> MasteryReport {
        let partition = self.partition_proficiency(&analytics.proficiency_vector);
        let top_n = self.policy.top_n;

        let strongest: Vec<TopicMastery> = partition.topics.iter().take(top_n).cloned().collect();
        let mut weakest = partition.topics.clone();
        weakest.sort_by(ascending);
        weakest.truncate(top_n);

        MasteryReport {
            student_id: analytics.student_id.clone(),
            hint_dependency: analytics
                .behavioral
                .hint_dependency_score
                .map(|score| self.hint_dependency_banner(score)),
            persistence: analytics
                .behavioral
                .retry_persistence
                .map(|score| self.persistence_banner(score)),
            learning_style: dominant_learning_style(&analytics.engagement.media_preference),
            strongest,
            weakest,
            bloom_profile: partition.bloom,
            general_mastery: partition.general,
            general_tier: partition.general.map(|g| self.mastery_tier(g)),
        }
    }
}

/// The media type with strictly the highest count; ties or no data are balanced.
pub fn dominant_learning_style(media_preference: &BTreeMap<String, u64>) -> LearningStyle {
    let max = match media_preference.values().max() {
        Some(&max) if max > 0 => max,
        _ => return LearningStyle::Balanced,
    };

    let mut leaders = media_preference.iter().filter(|&(_, &count)| count == max);
    match (leaders.next(), leaders.next()) {
        (Some((media, _)), None) => LearningStyle::Dominant(media.clone()),
        _ => LearningStyle::Balanced,
    }
}

fn descending(a: &TopicMastery, b: &TopicMastery) -> Ordering {
    b.mastery
        .partial_cmp(&a.mastery)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.topic.cmp(&b.topic))
}

fn ascending(a: &TopicMastery, b: &TopicMastery) -> Ordering {
    a.mastery
        .partial_cmp(&b.mastery)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.topic.cmp(&b.topic))
}
