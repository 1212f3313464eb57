use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Precomputed per-student analytics documents, produced by the backend
/// aggregation jobs and read as-is.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StudentAnalytics {
    pub student_id: Option<String>,
    pub performance: Value,
    pub behavioral: BehavioralScores,
    pub engagement: EngagementProfile,
    pub proficiency_vector: BTreeMap<String, f64>,
    pub error_fingerprint: Value,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BehavioralScores {
    pub hint_dependency_score: Option<f64>,
    pub retry_persistence: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EngagementProfile {
    pub media_preference: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintDependency {
    HighDependency,
    Independent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persistence {
    Persistent,
    GivesUpQuickly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "media", rename_all = "snake_case")]
pub enum LearningStyle {
    Dominant(String),
    Balanced,
}

/// Three-band colour used by the dashboard for a mastery value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryTier {
    Red,
    Yellow,
    Green,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentVariant {
    Remedial,
    Standard,
    Challenge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicMastery {
    pub topic: String,
    pub mastery: f64,
    pub tier: MasteryTier,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProficiencyPartition {
    pub topics: Vec<TopicMastery>,
    pub bloom: Vec<TopicMastery>,
    pub general: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasteryReport {
    pub student_id: Option<String>,
    pub hint_dependency: Option<HintDependency>,
    pub persistence: Option<Persistence>,
    pub learning_style: LearningStyle,
    pub strongest: Vec<TopicMastery>,
    pub weakest: Vec<TopicMastery>,
    pub bloom_profile: Vec<TopicMastery>,
    pub general_mastery: Option<f64>,
    pub general_tier: Option<MasteryTier>,
}

#[derive(Debug, Deserialize)]
pub struct VariantRequest {
    pub mastery: f64,
}

#[derive(Debug, Serialize)]
pub struct VariantResponse {
    pub variant: ContentVariant,
    pub tier: MasteryTier,
}
