//! LaTeX resume scanning and targeted rewriting.
//!
//! Only two blocks are understood: the technical-skills list and the relevant
//! coursework list. Each block starts after a `\textbf{…}` or `\section{…}`
//! header naming it and ends at the next `\section`, the next `\end{…}`, the
//! other block's header, or the first blank line after content. Rewrites
//! replace the span from the first list item to the last one and leave every
//! other byte of the document alone.

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::analysis::taxonomy::contains_term;
use crate::models::resume::{CourseworkItem, ParsedResume, Skill};
use crate::models::vocab::SkillSource;

/// Coursework entries kept when rebuilding a document.
pub const MAX_REBUILT_COURSEWORK: usize = 6;

/// Pieces starting with these are layout, never list items.
const LAYOUT_PREFIXES: &[&str] = &[
    "\\begin", "\\end", "\\vspace", "\\hspace", "\\newline", "\\hfill", "%",
];

struct Patterns {
    section: Regex,
    skills_header: Regex,
    coursework_header: Regex,
    block_end: Regex,
    label_line: Regex,
    blank_line: Regex,
    textbf: Regex,
    list_item: Regex,
    command: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        section: compile(r"\\section\*?\{([^}]+)\}"),
        skills_header: compile(r"(?i)\\(?:textbf|section\*?)\{[^}]*skill[^}]*\}"),
        coursework_header: compile(r"(?i)\\(?:textbf|section\*?)\{[^}]*coursework[^}]*\}"),
        block_end: compile(r"\\section\*?\{|\\end\{"),
        label_line: compile(r"\n[ \t]*\\textbf\{[^}]*\}[ \t]*:"),
        blank_line: compile(r"\n[ \t]*\r?\n"),
        textbf: compile(r"\\textbf\{([^}]+)\}"),
        list_item: compile(r"(?m)^[ \t]*(?:\\item\b|[-•])[ \t]*([^\n]*)$"),
        command: compile(r"\\[a-zA-Z]+\*?"),
    })
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static LaTeX pattern")
}

/// How a block writes its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListStyle {
    /// `\textbf{A}, \textbf{B}`
    Bold,
    /// `A, B`
    Comma,
    /// one `\item X` per line
    Items,
}

#[derive(Debug)]
struct ItemList {
    names: Vec<String>,
    /// Absolute byte range from the first item to the end of the last.
    range: Option<Range<usize>>,
    style: ListStyle,
}

/// Derives the structured view of a master resume. Never fails; unrecognized
/// layouts simply yield empty lists.
pub fn parse_latex_resume(latex: &str) -> ParsedResume {
    let sections = parse_sections(latex);

    let mut technical_skills: Vec<Skill> = skills_list(latex)
        .map(|list| list.names)
        .unwrap_or_default()
        .into_iter()
        .map(|name| Skill::new(name, SkillSource::Static))
        .collect();

    let relevant_coursework = coursework_list(latex)
        .map(|list| list.names)
        .unwrap_or_default()
        .into_iter()
        .map(|name| CourseworkItem::new(name, Some(0.0)))
        .collect();

    let projects = sections
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("projects"))
        .map(|(_, body)| body.to_lowercase());
    if let Some(projects) = projects {
        for skill in &mut technical_skills {
            skill.locked = contains_term(&projects, &skill.key());
        }
    }

    ParsedResume {
        sections,
        technical_skills,
        relevant_coursework,
    }
}

/// Rewrites the master's skills and coursework lists with the given selection.
///
/// Blocks the master lacks, and empty selections, leave the document unchanged.
pub fn rebuild_latex(master_latex: &str, skills: &[Skill], coursework: &[CourseworkItem]) -> String {
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();

    if let Some(list) = skills_list(master_latex) {
        let names: Vec<&str> = skills
            .iter()
            .map(|s| s.name.trim())
            .filter(|n| !n.is_empty())
            .collect();
        if let (Some(range), false) = (list.range, names.is_empty()) {
            edits.push((range, render_list(&names, list.style)));
        }
    }

    if let Some(list) = coursework_list(master_latex) {
        let names: Vec<&str> = coursework
            .iter()
            .map(|c| c.name.trim())
            .filter(|n| !n.is_empty())
            .take(MAX_REBUILT_COURSEWORK)
            .collect();
        if let (Some(range), false) = (list.range, names.is_empty()) {
            edits.push((range, render_list(&names, list.style)));
        }
    }

    // Apply back to front so earlier offsets stay valid.
    edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));
    let mut result = master_latex.to_string();
    let mut floor = usize::MAX;
    for (range, text) in edits {
        if range.end > floor {
            continue;
        }
        floor = range.start;
        result.replace_range(range, &text);
    }
    result
}

fn render_list(names: &[&str], style: ListStyle) -> String {
    match style {
        ListStyle::Bold => names
            .iter()
            .map(|n| format!("\\textbf{{{}}}", escape_latex(n)))
            .collect::<Vec<_>>()
            .join(", "),
        ListStyle::Comma => names
            .iter()
            .map(|n| escape_latex(n))
            .collect::<Vec<_>>()
            .join(", "),
        ListStyle::Items => names
            .iter()
            .map(|n| format!("\\item {}", escape_latex(n)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '&' | '%' | '$' | '#' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn parse_sections(latex: &str) -> BTreeMap<String, String> {
    let p = patterns();
    let headers: Vec<(String, usize, usize)> = p
        .section
        .captures_iter(latex)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str().trim().to_string();
            Some((name, whole.start(), whole.end()))
        })
        .collect();

    let document_end = latex.find("\\end{document}").unwrap_or(latex.len());
    let mut sections = BTreeMap::new();
    for (i, (name, _, body_start)) in headers.iter().enumerate() {
        let next = headers.get(i + 1).map_or(latex.len(), |h| h.1);
        let end = if document_end >= *body_start { next.min(document_end) } else { next };
        sections.insert(name.clone(), latex[*body_start..end].trim().to_string());
    }
    sections
}

fn skills_list(latex: &str) -> Option<ItemList> {
    let p = patterns();
    let body = block_body(latex, &p.skills_header, &[&p.coursework_header])?;
    let text = &latex[body.clone()];

    let bold: Vec<(String, Range<usize>)> = p
        .textbf
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if is_label(&text[whole.end()..]) {
                return None;
            }
            let name = clean_item(caps.get(1)?.as_str());
            (name.chars().count() > 1).then(|| (name, whole.range()))
        })
        .collect();

    if bold.is_empty() {
        Some(collect(split_items(text), body.start, ListStyle::Comma))
    } else {
        Some(collect(bold, body.start, ListStyle::Bold))
    }
}

fn coursework_list(latex: &str) -> Option<ItemList> {
    let p = patterns();
    let body = block_body(latex, &p.coursework_header, &[&p.skills_header, &p.label_line])?;
    let text = &latex[body.clone()];

    let items: Vec<(String, Range<usize>)> = p
        .list_item
        .captures_iter(text)
        .filter_map(|caps| {
            let marker_start = caps.get(0)?.start() + leading_ws(caps.get(0)?.as_str());
            let raw = caps.get(1)?;
            let value = item_value(raw.as_str())?;
            let name = clean_item(&raw.as_str()[value.clone()]);
            (name.chars().count() > 1).then(|| (name, marker_start..raw.start() + value.end))
        })
        .collect();

    if items.is_empty() {
        Some(collect(split_items(text), body.start, ListStyle::Comma))
    } else {
        Some(collect(items, body.start, ListStyle::Items))
    }
}

fn collect(items: Vec<(String, Range<usize>)>, offset: usize, style: ListStyle) -> ItemList {
    let range = match (items.first(), items.last()) {
        (Some(first), Some(last)) => Some(offset + first.1.start..offset + last.1.end),
        _ => None,
    };
    ItemList {
        names: items.into_iter().map(|(name, _)| name).collect(),
        range,
        style,
    }
}

/// Byte range of the block following the first `header` match.
fn block_body(latex: &str, header: &Regex, other_headers: &[&Regex]) -> Option<Range<usize>> {
    let p = patterns();
    let start = header.find(latex)?.end();
    let rest = &latex[start..];

    let mut end = rest.len();
    for boundary in std::iter::once(&p.block_end).chain(other_headers.iter().copied()) {
        if let Some(m) = boundary.find(rest) {
            end = end.min(m.start());
        }
    }
    let content = leading_ws(rest);
    if let Some(m) = p.blank_line.find(&rest[content..]) {
        end = end.min(content + m.start());
    }
    Some(start..start + end)
}

/// `\textbf{Languages}: …` or `\textbf{Languages}{: …}` is a label, not an item.
fn is_label(after: &str) -> bool {
    let after = after.trim_start();
    let after = after.strip_prefix('{').unwrap_or(after).trim_start();
    after.starts_with(':')
}

/// Comma/newline separated items with their ranges relative to `text`.
fn split_items(text: &str) -> Vec<(String, Range<usize>)> {
    let mut items = Vec::new();
    let mut piece_start = 0;
    let separators = text
        .char_indices()
        .filter(|&(_, c)| c == ',' || c == '\n')
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()));

    for sep in separators {
        let piece = &text[piece_start..sep];
        if let Some(value) = item_value(piece) {
            let name = clean_item(&piece[value.clone()]);
            if name.chars().count() > 1 {
                items.push((name, piece_start + value.start..piece_start + value.end));
            }
        }
        piece_start = sep + 1;
    }
    items
}

/// Narrows a raw list piece to the item text: after any `label:` prefix, without
/// surrounding whitespace, trailing `\\`, or unbalanced braces.
fn item_value(piece: &str) -> Option<Range<usize>> {
    let trimmed = piece.trim_start();
    if trimmed.is_empty()
        || LAYOUT_PREFIXES.iter().any(|p| trimmed.starts_with(p))
        || piece.contains(|c: char| matches!(c, '=' | '[' | ']'))
    {
        return None;
    }

    let mut start = piece.rfind(':').map_or(0, |i| i + 1);
    let mut end = piece.len();
    loop {
        let before = (start, end);

        start += leading_ws(&piece[start..end]);
        end = start
            + piece[start..end]
                .trim_end_matches(|c: char| c.is_whitespace() || c == '\\')
                .len();

        let value = &piece[start..end];
        let opens = value.matches('{').count();
        let closes = value.matches('}').count();
        if closes > opens && value.ends_with('}') {
            end -= 1;
        } else if opens > closes && value.starts_with('{') {
            start += 1;
        }

        if (start, end) == before {
            break;
        }
    }
    (start < end).then_some(start..end)
}

/// Plain item name with commands, braces, and escapes removed.
fn clean_item(raw: &str) -> String {
    let without_commands = patterns().command.replace_all(raw, "");
    let plain: String = without_commands
        .chars()
        .filter(|c| !matches!(c, '{' | '}' | '\\'))
        .collect();
    plain
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_start_matches(|c: char| c == '-' || c == '•')
        .trim()
        .to_string()
}

fn leading_ws(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_RESUME: &str = r"\documentclass{article}
\begin{document}
\section{Education}
State University \\
\textbf{Relevant Coursework}: Algorithms, Operating Systems, Databases

\section{Technical Skills}
\textbf{Python}, \textbf{Rust}, \textbf{Docker}, \textbf{C\#}

\section{Projects}
Built a Rust service deployed with Docker.
\end{document}
";

    const TEMPLATE_RESUME: &str = r"\section{Technical Skills}
 \begin{itemize}[leftmargin=0.15in, label={}]
    \small{\item{
     \textbf{Languages}{: Java, Python, SQL (Postgres), R} \\
     \textbf{Frameworks}{: React, Flask, FastAPI} \\
    }}
 \end{itemize}

\section{Relevant Coursework}
\begin{itemize}
  \item Data Structures
  \item Machine Learning \\
\end{itemize}
";

    fn skill_names(parsed: &ParsedResume) -> Vec<&str> {
        parsed.technical_skills.iter().map(|s| s.name.as_str()).collect()
    }

    fn course_names(parsed: &ParsedResume) -> Vec<&str> {
        parsed
            .relevant_coursework
            .iter()
            .map(|c| c.name.as_str())
            .collect()
    }

    #[test]
    fn test_parse_sections() {
        let parsed = parse_latex_resume(SIMPLE_RESUME);
        let names: Vec<&String> = parsed.sections.keys().collect();
        assert_eq!(names, vec!["Education", "Projects", "Technical Skills"]);
        assert_eq!(
            parsed.sections["Projects"],
            "Built a Rust service deployed with Docker."
        );
    }

    #[test]
    fn test_parse_bold_skills_and_comma_coursework() {
        let parsed = parse_latex_resume(SIMPLE_RESUME);
        assert_eq!(skill_names(&parsed), vec!["Python", "Rust", "Docker", "C#"]);
        assert!(parsed
            .technical_skills
            .iter()
            .all(|s| s.source == SkillSource::Static));
        assert_eq!(
            course_names(&parsed),
            vec!["Algorithms", "Operating Systems", "Databases"]
        );
    }

    #[test]
    fn test_skills_used_in_projects_are_locked() {
        let parsed = parse_latex_resume(SIMPLE_RESUME);
        let locked: Vec<&str> = parsed
            .technical_skills
            .iter()
            .filter(|s| s.locked)
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(locked, vec!["Rust", "Docker"]);
    }

    #[test]
    fn test_parse_labelled_template() {
        let parsed = parse_latex_resume(TEMPLATE_RESUME);
        assert_eq!(
            skill_names(&parsed),
            vec!["Java", "Python", "SQL (Postgres)", "React", "Flask", "FastAPI"]
        );
        assert_eq!(
            course_names(&parsed),
            vec!["Data Structures", "Machine Learning"]
        );
        assert!(parsed.technical_skills.iter().all(|s| !s.locked));
    }

    #[test]
    fn test_resume_without_known_blocks() {
        let parsed = parse_latex_resume("\\section{Experience}\nAcme Corp\n");
        assert!(parsed.technical_skills.is_empty());
        assert!(parsed.relevant_coursework.is_empty());
        assert_eq!(parsed.sections["Experience"], "Acme Corp");
    }

    #[test]
    fn test_rebuild_replaces_only_list_ranges() {
        let skills = vec![
            Skill::new("Docker", SkillSource::Requirement),
            Skill::new("Go", SkillSource::Requirement),
            Skill::new("C#", SkillSource::Static),
        ];
        let coursework = vec![CourseworkItem::new("Compilers", None)];
        let rebuilt = rebuild_latex(SIMPLE_RESUME, &skills, &coursework);

        let expected = SIMPLE_RESUME
            .replace(
                r"\textbf{Python}, \textbf{Rust}, \textbf{Docker}, \textbf{C\#}",
                r"\textbf{Docker}, \textbf{Go}, \textbf{C\#}",
            )
            .replace("Algorithms, Operating Systems, Databases", "Compilers");
        assert_eq!(rebuilt, expected);
    }

    #[test]
    fn test_rebuild_keeps_template_structure() {
        let skills = vec![
            Skill::new("Python", SkillSource::Static),
            Skill::new("FastAPI", SkillSource::Static),
        ];
        let coursework = vec![
            CourseworkItem::new("Machine Learning", None),
            CourseworkItem::new("Databases", None),
        ];
        let rebuilt = rebuild_latex(TEMPLATE_RESUME, &skills, &coursework);
        assert!(rebuilt.contains(r"\textbf{Languages}{: Python, FastAPI} \\"));
        assert!(!rebuilt.contains("Frameworks"));
        assert!(rebuilt.contains("\\begin{itemize}\n  \\item Machine Learning\n\\item Databases \\\\\n\\end{itemize}"));
        assert_eq!(
            rebuilt.matches('{').count(),
            rebuilt.matches('}').count()
        );
    }

    #[test]
    fn test_rebuild_caps_coursework() {
        let coursework: Vec<CourseworkItem> = (1..=9)
            .map(|i| CourseworkItem::new(format!("Course {i}"), None))
            .collect();
        let rebuilt = rebuild_latex(SIMPLE_RESUME, &[], &coursework);
        assert!(rebuilt.contains("Course 6"));
        assert!(!rebuilt.contains("Course 7"));
        // empty skill selection leaves the skills block alone
        assert!(rebuilt.contains(r"\textbf{Python}, \textbf{Rust}"));
    }

    #[test]
    fn test_rebuild_without_blocks_is_identity() {
        let latex = "\\section{Experience}\nAcme Corp\n";
        let rebuilt = rebuild_latex(
            latex,
            &[Skill::new("Rust", SkillSource::Static)],
            &[CourseworkItem::new("Compilers", None)],
        );
        assert_eq!(rebuilt, latex);
    }

    #[test]
    fn test_item_value_trims_latex_noise() {
        let piece = "     \\textbf{Languages}{: Java";
        assert_eq!(&piece[item_value(piece).unwrap()], "Java");
        let piece = " R} \\\\";
        assert_eq!(&piece[item_value(piece).unwrap()], "R");
        assert_eq!(item_value(" \\begin{itemize}[leftmargin=0.15in"), None);
        assert_eq!(item_value("   "), None);
    }

    #[test]
    fn test_escape_latex() {
        assert_eq!(escape_latex("C# & R_D"), r"C\# \& R\_D");
    }
}
