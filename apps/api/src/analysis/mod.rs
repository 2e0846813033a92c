//! JD analysis: section spans, ranked skills, and coursework mentions.
//!
//! The default analyzer segments with header heuristics and asks the language
//! model for spans only when the heuristics cover too little of the text. Skill
//! and coursework extraction are always local.

pub mod prompts;
pub mod segmenter;
pub mod taxonomy;

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::llm_client::{prompts::JSON_ONLY_SYSTEM, LlmClient};
use crate::models::resume::{CourseworkItem, Skill};
use crate::models::spans::{char_len, slice_chars, JdSpans};
use crate::models::vocab::SkillSource;

use prompts::SPAN_SEGMENTATION_PROMPT_TEMPLATE;

/// Below this fraction of covered characters the span fallback is consulted.
pub const COVERAGE_THRESHOLD: f64 = 0.7;
pub const MAX_COURSEWORK: usize = 6;
const OCCURRENCE_WEIGHT: f64 = 0.1;
const COURSEWORK_SCORE: f64 = 1.0;

/// Result of analyzing one job description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JdAnalysis {
    pub spans: JdSpans,
    pub skills: Vec<Skill>,
    pub coursework: Vec<CourseworkItem>,
}

#[async_trait]
pub trait JdAnalyzer: Send + Sync {
    async fn analyze(&self, jd_text: &str) -> Result<JdAnalysis, AppError>;
}

/// Source of spans when the heuristics are not confident.
#[async_trait]
pub trait SpanSegmenter: Send + Sync {
    async fn segment(&self, jd_text: &str) -> Result<JdSpans, AppError>;
}

/// Asks the language model for raw `[start, end]` offsets.
pub struct LlmSpanSegmenter {
    llm: LlmClient,
}

impl LlmSpanSegmenter {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl SpanSegmenter for LlmSpanSegmenter {
    async fn segment(&self, jd_text: &str) -> Result<JdSpans, AppError> {
        let prompt = SPAN_SEGMENTATION_PROMPT_TEMPLATE.replace("{jd_text}", jd_text);
        self.llm
            .call_json::<JdSpans>(&prompt, JSON_ONLY_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Span segmentation failed: {e}")))
    }
}

#[derive(Default)]
pub struct HeuristicJdAnalyzer {
    fallback: Option<Arc<dyn SpanSegmenter>>,
}

impl HeuristicJdAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallback(fallback: Arc<dyn SpanSegmenter>) -> Self {
        Self {
            fallback: Some(fallback),
        }
    }

    async fn segment(&self, jd_text: &str) -> JdSpans {
        let len = char_len(jd_text);
        let spans = segmenter::segment(jd_text);
        let coverage = spans.coverage(len);

        let Some(fallback) = self.fallback.as_ref().filter(|_| coverage < COVERAGE_THRESHOLD)
        else {
            return spans;
        };

        info!(coverage, "Heuristic span coverage is low, consulting fallback segmenter");
        match fallback.segment(jd_text).await {
            Ok(candidate) => {
                let candidate = candidate.sanitized(len);
                if candidate.is_empty() {
                    debug!("Fallback returned no usable spans, keeping heuristic spans");
                    spans
                } else {
                    candidate
                }
            }
            Err(e) => {
                warn!("Fallback segmentation failed, keeping heuristic spans: {e}");
                spans
            }
        }
    }
}

#[async_trait]
impl JdAnalyzer for HeuristicJdAnalyzer {
    async fn analyze(&self, jd_text: &str) -> Result<JdAnalysis, AppError> {
        let spans = self.segment(jd_text).await;
        debug_assert!(spans.is_valid_for(char_len(jd_text)));
        let skills = extract_skills(jd_text, &spans);
        let coursework = extract_coursework(jd_text);
        debug!(
            skills = skills.len(),
            coursework = coursework.len(),
            "JD analysis complete"
        );
        Ok(JdAnalysis {
            spans,
            skills,
            coursework,
        })
    }
}

/// Taxonomy skills mentioned inside the spans, scored and ranked.
///
/// A skill seen in several categories keeps the highest-priority source.
pub fn extract_skills(jd_text: &str, spans: &JdSpans) -> Vec<Skill> {
    let categories = [
        (&spans.requirements, SkillSource::Requirement),
        (&spans.responsibilities, SkillSource::Responsibility),
        (&spans.nice_to_haves, SkillSource::NiceToHave),
    ];

    let mut skills: Vec<Skill> = Vec::new();
    for (list, source) in categories {
        for &span in list.iter() {
            for name in taxonomy::skills_mentioned(slice_chars(jd_text, span)) {
                match skills.iter_mut().find(|s| s.name == name) {
                    Some(existing) if source.base_score() > existing.source.base_score() => {
                        existing.source = source;
                    }
                    Some(_) => {}
                    None => skills.push(Skill::new(name, source)),
                }
            }
        }
    }

    let haystack = jd_text.to_ascii_lowercase();
    for skill in &mut skills {
        let occurrences = taxonomy::count_term(&haystack, &skill.name.to_ascii_lowercase());
        skill.score = Some(skill.source.base_score() + OCCURRENCE_WEIGHT * occurrences as f64);
    }
    rank_skills(&mut skills);
    skills
}

/// Score descending, then name ascending.
pub fn rank_skills(skills: &mut [Skill]) {
    skills.sort_by(|a, b| {
        b.score
            .unwrap_or(0.0)
            .total_cmp(&a.score.unwrap_or(0.0))
            .then_with(|| a.name.cmp(&b.name))
    });
}

fn coursework_patterns() -> &'static [Regex; 2] {
    static PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(?i:\b(?:coursework|course|class)[ \t]+in)[ \t]+([A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)*)")
                .expect("static coursework regex"),
            Regex::new(r"\b([A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)*)[ \t]+(?i:course|class)\b")
                .expect("static coursework regex"),
        ]
    })
}

/// Course names mentioned in the JD, de-duplicated, capped at [`MAX_COURSEWORK`].
pub fn extract_coursework(jd_text: &str) -> Vec<CourseworkItem> {
    let mut seen: Vec<String> = Vec::new();
    let mut items = Vec::new();
    for pattern in coursework_patterns() {
        for caps in pattern.captures_iter(jd_text) {
            let Some(name) = caps.get(1).map(|m| m.as_str().trim()) else {
                continue;
            };
            let key = name.to_lowercase();
            if name.chars().count() <= 3 || seen.contains(&key) {
                continue;
            }
            seen.push(key);
            items.push(CourseworkItem::new(name, Some(COURSEWORK_SCORE)));
        }
    }
    items.truncate(MAX_COURSEWORK);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubSegmenter {
        spans: Option<JdSpans>,
        calls: AtomicUsize,
    }

    impl StubSegmenter {
        fn returning(spans: Option<JdSpans>) -> Arc<Self> {
            Arc::new(Self {
                spans,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SpanSegmenter for StubSegmenter {
        async fn segment(&self, _jd_text: &str) -> Result<JdSpans, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.spans
                .clone()
                .ok_or_else(|| AppError::Llm("model unavailable".into()))
        }
    }

    #[tokio::test]
    async fn test_requires_python_and_sql() {
        let text = "Requires Python and SQL.";
        let analysis = HeuristicJdAnalyzer::new().analyze(text).await.unwrap();

        let covered = analysis
            .spans
            .requirements
            .iter()
            .map(|&s| slice_chars(text, s))
            .any(|body| body.contains("Python") && body.contains("SQL"));
        assert!(covered);

        let python = analysis.skills.iter().find(|s| s.name == "Python").unwrap();
        assert_eq!(python.source, SkillSource::Requirement);
        assert!(!python.locked);
        assert!(analysis.skills.iter().any(|s| s.name == "SQL"));
    }

    #[tokio::test]
    async fn test_highest_priority_source_wins() {
        let text = "Responsibilities: maintain Docker images\n\nRequirements: Docker and Rust\n\nNice to have: Rust macros, Kafka";
        let analysis = HeuristicJdAnalyzer::new().analyze(text).await.unwrap();
        let source_of = |name: &str| {
            analysis
                .skills
                .iter()
                .find(|s| s.name == name)
                .map(|s| s.source)
        };
        assert_eq!(source_of("Docker"), Some(SkillSource::Requirement));
        assert_eq!(source_of("Rust"), Some(SkillSource::Requirement));
        assert_eq!(source_of("Kafka"), Some(SkillSource::NiceToHave));
    }

    #[test]
    fn test_scores_add_occurrence_bonus_and_sort() {
        let text = "Requirements: Python, Rust\n\nNice to have: Redis\n\nPython Python";
        let spans = segmenter::segment(text);
        let skills = extract_skills(text, &spans);
        let names: Vec<&str> = skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Python", "Rust", "Redis"]);
        assert!((skills[0].score.unwrap() - 3.3).abs() < 1e-9);
        assert!((skills[1].score.unwrap() - 3.1).abs() < 1e-9);
        assert!((skills[2].score.unwrap() - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_equal_scores_order_by_name() {
        let mut skills = vec![
            Skill {
                score: Some(3.1),
                ..Skill::new("SQL", SkillSource::Requirement)
            },
            Skill {
                score: Some(3.1),
                ..Skill::new("Python", SkillSource::Requirement)
            },
        ];
        rank_skills(&mut skills);
        assert_eq!(skills[0].name, "Python");
    }

    #[tokio::test]
    async fn test_fallback_used_when_coverage_low() {
        let text = "We need someone great with Kubernetes who likes mentoring people.";
        let stub = StubSegmenter::returning(Some(JdSpans {
            requirements: vec![(0, text.chars().count())],
            ..Default::default()
        }));
        let analyzer = HeuristicJdAnalyzer::with_fallback(stub.clone());
        let analysis = analyzer.analyze(text).await.unwrap();
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
        assert_eq!(analysis.spans.requirements, vec![(0, text.chars().count())]);
        assert_eq!(analysis.skills[0].name, "Kubernetes");
    }

    #[tokio::test]
    async fn test_fallback_skipped_when_coverage_high() {
        let text = "Requirements: Rust, Tokio, Postgres and plenty of async experience";
        let stub = StubSegmenter::returning(None);
        let analyzer = HeuristicJdAnalyzer::with_fallback(stub.clone());
        analyzer.analyze(text).await.unwrap();
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallback_failure_keeps_heuristic_spans() {
        let text = "Requires Python and SQL.";
        let analyzer = HeuristicJdAnalyzer::with_fallback(StubSegmenter::returning(None));
        let analysis = analyzer.analyze(text).await.unwrap();
        assert_eq!(analysis.spans, segmenter::segment(text));
    }

    #[tokio::test]
    async fn test_out_of_range_fallback_spans_are_dropped() {
        let text = "Requires Python and SQL.";
        let stub = StubSegmenter::returning(Some(JdSpans {
            requirements: vec![(5, 500), (9, 3)],
            ..Default::default()
        }));
        let analysis = HeuristicJdAnalyzer::with_fallback(stub)
            .analyze(text)
            .await
            .unwrap();
        // every candidate pair was invalid, so the heuristic spans stand
        assert_eq!(analysis.spans, segmenter::segment(text));
        assert!(analysis.spans.is_valid_for(text.chars().count()));
    }

    #[test]
    fn test_extract_coursework() {
        let text = "Completed coursework in Distributed Systems. A Machine Learning course \
                    is a plus, as is a class in Distributed Systems.";
        let names: Vec<String> = extract_coursework(text).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Distributed Systems", "Machine Learning"]);
    }

    #[test]
    fn test_coursework_is_capped() {
        let text = "Alpha course, Bravo course, Charlie course, Delta course, \
                    Echo course, Foxtrot course, Golf course";
        let items = extract_coursework(text);
        assert_eq!(items.len(), MAX_COURSEWORK);
        assert!(items.iter().all(|c| c.score == Some(1.0)));
    }
}
