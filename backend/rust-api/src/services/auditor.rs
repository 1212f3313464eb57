//! Authoring-time pedagogy checks for content blocks.
//!
//! The checklist runs in a fixed order and every check contributes exactly one
//! rule. Missing content and teaching text placed inside an exam end the audit
//! early with a score of zero.

use lazy_static::lazy_static;
use regex::Regex;

use crate::metrics::{AUDIT_RUNS_TOTAL, AUDIT_SCORE};
use crate::models::audit::{AuditResult, ComplianceRule, CourseAuditReport};
use crate::models::block::{ActivityBlock, BlockContent, BlockMetadata};
use crate::models::policy::AdaptivePolicy;
use crate::models::scoring::AssessmentMode;

lazy_static! {
    static ref CITATION_REGEX: Regex = Regex::new(r"\[\d+\]").unwrap();
}

const FULL_FAILURE: u32 = 100;
const PROMPT_IMPACT: u32 = 20;
const OPTIONS_IMPACT: u32 = 20;
const MISSING_HINTS_IMPACT: u32 = 15;
const SINGLE_HINT_IMPACT: u32 = 5;
const EXAM_HINTS_IMPACT: u32 = 30;
const MISSING_FEEDBACK_IMPACT: u32 = 15;
const GENERIC_FEEDBACK_IMPACT: u32 = 5;
const COACHING_FEEDBACK_IMPACT: u32 = 10;
const GROUNDING_IMPACT: u32 = 5;
const BLOOM_IMPACT: u32 = 5;
const LINGUISTIC_IMPACT: u32 = 5;
const LOW_COGNITIVE_IMPACT: u32 = 10;
const TONE_IMPACT: u32 = 5;
const WALL_OF_TEXT_IMPACT: u32 = 5;

pub struct ComplianceAuditor {
    policy: AdaptivePolicy,
}

impl ComplianceAuditor {
    pub fn new(policy: AdaptivePolicy) -> Self {
        Self { policy }
    }

    pub fn validate_block(
        &self,
        block: &ActivityBlock,
        mode: AssessmentMode,
        block_index: usize,
    ) -> AuditResult {
        let result = self.run_checklist(block, mode, block_index);

        let mode_label = if mode.is_exam() { "exam" } else { "learning" };
        AUDIT_RUNS_TOTAL.with_label_values(&[mode_label]).inc();
        AUDIT_SCORE.observe(result.score as f64);

        tracing::debug!(
            "Audited block={} type={} mode={} score={}",
            block.id,
            block.kind.as_str(),
            mode_label,
            result.score
        );
        result
    }

    pub fn audit_course(&self, blocks: &[ActivityBlock], mode: AssessmentMode) -> CourseAuditReport {
        let results: Vec<AuditResult> = blocks
            .iter()
            .enumerate()
            .map(|(index, block)| self.validate_block(block, mode, index))
            .collect();

        let average_score = if results.is_empty() {
            100.0
        } else {
            results.iter().map(|r| r.score as f64).sum::<f64>() / results.len() as f64
        };

        let blocking_issues = results
            .iter()
            .filter(|r| r.failures().next().is_some())
            .map(|r| r.block_id.clone())
            .collect();

        CourseAuditReport {
            results,
            average_score,
            blocking_issues,
        }
    }

    fn run_checklist(
        &self,
        block: &ActivityBlock,
        mode: AssessmentMode,
        block_index: usize,
    ) -> AuditResult {
        let content = match &block.content {
            Some(content) => content,
            None => {
                return AuditResult::from_rules(
                    &block.id,
                    vec![ComplianceRule::fail(
                        "content-presence",
                        "Content presence",
                        "Block has no content",
                        FULL_FAILURE,
                    )],
                );
            }
        };

        if let BlockContent::Text(text) = content {
            return self.audit_text(&block.id, &text.text, mode, block_index);
        }

        let metadata = &block.metadata;
        let prompt = content.prompt_text();
        let mut rules = Vec::with_capacity(10);

        rules.push(self.check_prompt(prompt));

        if let BlockContent::MultipleChoice(mc) = content {
            match &mc.options {
                Some(options) => rules.push(check_options(options)),
                None => {
                    return AuditResult::from_rules(
                        &block.id,
                        vec![ComplianceRule::fail(
                            "mc-options",
                            "Answer options",
                            "Multiple-choice block has no options",
                            FULL_FAILURE,
                        )],
                    );
                }
            }
        }

        rules.push(check_hints(metadata, mode));
        if let Some(rule) = self.check_feedback(metadata, mode) {
            rules.push(rule);
        }
        rules.push(check_grounding(prompt, metadata));
        rules.push(check_bloom(metadata));
        rules.push(check_linguistic_audit(metadata));

        if mode.is_exam() {
            if let Some(rule) = self.check_cognitive_load(metadata) {
                rules.push(rule);
            }
            if let Some(rule) = self.check_tone(metadata) {
                rules.push(rule);
            }
        }

        AuditResult::from_rules(&block.id, rules)
    }

    fn audit_text(
        &self,
        block_id: &str,
        text: &str,
        mode: AssessmentMode,
        block_index: usize,
    ) -> AuditResult {
        let mut rules = Vec::with_capacity(2);

        if mode.is_exam() {
            if block_index > 0 {
                return AuditResult::from_rules(
                    block_id,
                    vec![ComplianceRule::fail(
                        "exam-teaching-content",
                        "Teaching content in exam",
                        "Exams may only open with an introduction; teaching text is forbidden here",
                        FULL_FAILURE,
                    )],
                );
            }
            rules.push(ComplianceRule::pass(
                "exam-introduction",
                "Exam introduction",
                "Opening text block treated as the exam introduction",
            ));
        }

        let length = text.chars().count();
        if length > self.policy.wall_of_text_chars {
            rules.push(ComplianceRule::warning(
                "text-length",
                "Text length",
                format!(
                    "Wall of text: {} characters (limit {})",
                    length, self.policy.wall_of_text_chars
                ),
                WALL_OF_TEXT_IMPACT,
            ));
        } else {
            rules.push(ComplianceRule::pass(
                "text-length",
                "Text length",
                "Text length is digestible",
            ));
        }

        AuditResult::from_rules(block_id, rules)
    }

    fn check_prompt(&self, prompt: &str) -> ComplianceRule {
        if prompt.trim().chars().count() >= self.policy.min_prompt_chars {
            ComplianceRule::pass("prompt", "Question text", "Question text present")
        } else {
            ComplianceRule::fail(
                "prompt",
                "Question text",
                "Question or instruction text is missing or too short",
                PROMPT_IMPACT,
            )
        }
    }

    fn check_feedback(&self, metadata: &BlockMetadata, mode: AssessmentMode) -> Option<ComplianceRule> {
        let correct = non_empty(metadata.feedback_correct.as_deref());
        let incorrect = non_empty(metadata.feedback_incorrect.as_deref());

        if mode.is_exam() {
            let phrase = [correct, incorrect]
                .into_iter()
                .flatten()
                .find_map(|text| self.policy.find_coaching_phrase(text))?;
            return Some(ComplianceRule::warning(
                "feedback",
                "Exam feedback",
                format!("Feedback coaches the examinee (\"{}\")", phrase),
                COACHING_FEEDBACK_IMPACT,
            ));
        }

        if correct.is_none() && incorrect.is_none() {
            return Some(ComplianceRule::fail(
                "feedback",
                "Feedback",
                "Neither correct nor incorrect feedback is provided",
                MISSING_FEEDBACK_IMPACT,
            ));
        }

        let generic = [correct, incorrect].into_iter().flatten().any(|text| {
            text.contains(self.policy.generic_feedback_phrase.as_str())
                && text.trim().chars().count() <= self.policy.generic_feedback_max_chars
        });
        if generic {
            return Some(ComplianceRule::warning(
                "feedback",
                "Feedback",
                "Feedback looks generic; explain why the answer is right or wrong",
                GENERIC_FEEDBACK_IMPACT,
            ));
        }

        Some(ComplianceRule::pass("feedback", "Feedback", "Specific feedback present"))
    }

    fn check_cognitive_load(&self, metadata: &BlockMetadata) -> Option<ComplianceRule> {
        let level = non_empty(metadata.bloom_level.as_deref())?;
        if !self.policy.is_low_cognitive(level) {
            return None;
        }
        Some(ComplianceRule::warning(
            "exam-cognitive-load",
            "Cognitive demand",
            format!("Bloom level '{}' is low for an exam question", level),
            LOW_COGNITIVE_IMPACT,
        ))
    }

    fn check_tone(&self, metadata: &BlockMetadata) -> Option<ComplianceRule> {
        let tone = metadata
            .ai_validation
            .as_ref()
            .and_then(|validation| non_empty(validation.tone.as_deref()))?;
        if self.policy.is_objective_tone(tone) {
            return None;
        }
        Some(ComplianceRule::warning(
            "exam-tone",
            "Examiner tone",
            format!("Tone '{}' is not objective", tone),
            TONE_IMPACT,
        ))
    }
}

fn check_options(options: &[String]) -> ComplianceRule {
    let usable = options.iter().filter(|o| !o.trim().is_empty()).count();
    if options.len() >= 2 {
        ComplianceRule::pass(
            "mc-options",
            "Answer options",
            format!("{} options ({} non-empty)", options.len(), usable),
        )
    } else {
        ComplianceRule::fail(
            "mc-options",
            "Answer options",
            "Multiple-choice questions need at least two options",
            OPTIONS_IMPACT,
        )
    }
}

fn check_hints(metadata: &BlockMetadata, mode: AssessmentMode) -> ComplianceRule {
    let count = metadata.progressive_hints.len();
    match (mode, count) {
        (AssessmentMode::Exam, 0) => {
            ComplianceRule::pass("hints", "Hints", "No hints in assessment")
        }
        (AssessmentMode::Exam, _) => ComplianceRule::fail(
            "hints",
            "Hints",
            format!("Security violation: {} hint(s) exposed in exam mode", count),
            EXAM_HINTS_IMPACT,
        ),
        (AssessmentMode::Learning, 0) => ComplianceRule::fail(
            "hints",
            "Hints",
            "No progressive hints provided",
            MISSING_HINTS_IMPACT,
        ),
        (AssessmentMode::Learning, 1) => ComplianceRule::warning(
            "hints",
            "Hints",
            "Only one hint; add a second for scaffolding",
            SINGLE_HINT_IMPACT,
        ),
        (AssessmentMode::Learning, _) => {
            ComplianceRule::pass("hints", "Hints", format!("{} progressive hints", count))
        }
    }
}

fn check_grounding(prompt: &str, metadata: &BlockMetadata) -> ComplianceRule {
    let mut haystack = String::from(prompt);
    for hint in &metadata.progressive_hints {
        haystack.push(' ');
        haystack.push_str(hint);
    }

    if CITATION_REGEX.is_match(&haystack) {
        ComplianceRule::pass("grounding", "Source grounding", "Citation marker found")
    } else {
        ComplianceRule::warning(
            "grounding",
            "Source grounding",
            "No citation marker like [1] in question or hints",
            GROUNDING_IMPACT,
        )
    }
}

fn check_bloom(metadata: &BlockMetadata) -> ComplianceRule {
    match non_empty(metadata.bloom_level.as_deref()) {
        Some(level) => ComplianceRule::pass(
            "bloom-level",
            "Bloom level",
            format!("Tagged as '{}'", level),
        ),
        None => ComplianceRule::warning(
            "bloom-level",
            "Bloom level",
            "Bloom taxonomy level is not tagged",
            BLOOM_IMPACT,
        ),
    }
}

fn check_linguistic_audit(metadata: &BlockMetadata) -> ComplianceRule {
    if metadata.ai_validation.is_some() {
        ComplianceRule::pass(
            "linguistic-audit",
            "Linguistic audit",
            "AI linguistic validation attached",
        )
    } else {
        ComplianceRule::warning(
            "linguistic-audit",
            "Linguistic audit",
            "Block has not been through linguistic validation",
            LINGUISTIC_IMPACT,
        )
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
