//! Header-driven segmentation of a job description into requirement,
//! responsibility, and nice-to-have spans.
//!
//! A span starts right after a section header (plus an optional `:`/`.` and any
//! whitespace) and runs to the first blank line, to a line opening a competing
//! section, or to the end of the text. Offsets are returned in characters.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::spans::{byte_to_char, JdSpans, Span};

struct SectionRule {
    headers: Vec<Regex>,
    /// Line-leading keywords that close a span early.
    stop: Option<Regex>,
}

struct Rules {
    requirements: SectionRule,
    responsibilities: SectionRule,
    nice_to_haves: SectionRule,
    blank_line: Regex,
}

fn header(alternatives: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b(?:{alternatives})\b[:.]?\s*")).expect("static header regex")
}

fn stop(alternatives: &str) -> Regex {
    Regex::new(&format!(r"(?i)\n[ \t]*(?:{alternatives})\b")).expect("static stop regex")
}

fn rules() -> &'static Rules {
    static RULES: OnceLock<Rules> = OnceLock::new();
    RULES.get_or_init(|| Rules {
        requirements: SectionRule {
            headers: vec![
                header("requirements?|required|requires?|qualifications?|must have"),
                header("we are looking for|you must have|you should have"),
            ],
            stop: Some(stop("responsibilities|preferred|nice to have")),
        },
        responsibilities: SectionRule {
            headers: vec![
                header("key responsibilities?|responsibilities?|what you'll do"),
                header("you will|you'll|duties"),
            ],
            stop: Some(stop("requirements?|preferred|nice to have|qualifications?")),
        },
        nice_to_haves: SectionRule {
            headers: vec![
                header("nice to have|preferred|bonus|plus"),
                header("would be great|it's a plus|helpful if"),
            ],
            stop: None,
        },
        blank_line: Regex::new(r"\n[ \t]*\n").expect("static blank-line regex"),
    })
}

/// Segments `text` with header heuristics. The result is already sanitized.
pub fn segment(text: &str) -> JdSpans {
    let rules = rules();
    let len = byte_to_char(text, text.len());
    JdSpans {
        requirements: collect(text, &rules.requirements, &rules.blank_line),
        responsibilities: collect(text, &rules.responsibilities, &rules.blank_line),
        nice_to_haves: collect(text, &rules.nice_to_haves, &rules.blank_line),
    }
    .sanitized(len)
}

fn collect(text: &str, rule: &SectionRule, blank_line: &Regex) -> Vec<Span> {
    let mut spans = Vec::new();
    for header in &rule.headers {
        for found in header.find_iter(text) {
            let start = found.end();
            let rest = &text[start..];

            let mut end = rest.len();
            if let Some(m) = blank_line.find(rest) {
                end = end.min(m.start());
            }
            if let Some(m) = rule.stop.as_ref().and_then(|s| s.find(rest)) {
                end = end.min(m.start());
            }

            let body = rest[..end].trim_end();
            if body.is_empty() {
                continue;
            }
            let end = start + body.len();
            spans.push((byte_to_char(text, start), byte_to_char(text, end)));
        }
    }
    spans
}
