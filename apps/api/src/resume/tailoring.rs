//! Re-ranking a resume's own skills and coursework against a job description.
//!
//! Nothing here adds an entry the caller did not already have. Locked skills
//! keep their exact index and are never dropped.

use std::cmp::Ordering;

use crate::analysis::taxonomy::contains_term;
use crate::models::resume::{CourseworkItem, Skill};

/// Coursework entries kept after tailoring.
pub const MAX_TAILORED_COURSEWORK: usize = 6;

/// Reorders `current` by relevance to `jd_ranked` (already sorted best first).
///
/// Unlocked skills the JD mentions take the JD's source and score and move to
/// the front of the unlocked slots in JD rank order; the rest keep their
/// relative order. `limit` caps the output length but never cuts below the
/// last locked skill.
pub fn tailor_skills(current: &[Skill], jd_ranked: &[Skill], limit: Option<usize>) -> Vec<Skill> {
    let last_locked = current.iter().rposition(|s| s.locked);
    let min_len = last_locked.map_or(0, |i| i + 1);
    let len = limit
        .map_or(current.len(), |l| l.min(current.len()))
        .max(min_len);

    let mut ranked: Vec<(Option<usize>, Skill)> = current
        .iter()
        .filter(|s| !s.locked)
        .map(|skill| {
            let key = skill.key();
            match jd_ranked.iter().position(|jd| jd.key() == key) {
                Some(rank) => {
                    let jd = &jd_ranked[rank];
                    let mut matched = skill.clone();
                    matched.source = jd.source;
                    matched.score = jd.score;
                    (Some(rank), matched)
                }
                None => (None, skill.clone()),
            }
        })
        .collect();

    // Stable: unmatched skills keep their original order.
    ranked.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let mut unlocked = ranked.into_iter().map(|(_, skill)| skill);
    let mut out = Vec::with_capacity(len);
    for skill in current.iter().take(len) {
        if skill.locked {
            out.push(skill.clone());
        } else if let Some(next) = unlocked.next() {
            out.push(next);
        }
    }
    out
}

/// Courses the JD mentions first (score 1.0), then the rest in their original
/// order, capped at [`MAX_TAILORED_COURSEWORK`].
pub fn tailor_coursework(current: &[CourseworkItem], jd_text: &str) -> Vec<CourseworkItem> {
    let haystack = jd_text.to_lowercase();
    let (mut mentioned, others): (Vec<CourseworkItem>, Vec<CourseworkItem>) = current
        .iter()
        .cloned()
        .partition(|c| contains_term(&haystack, &c.name.trim().to_lowercase()));

    for course in &mut mentioned {
        course.score = Some(1.0);
    }
    mentioned.extend(others);
    mentioned.truncate(MAX_TAILORED_COURSEWORK);
    mentioned
}
