//! Skill vocabulary and boundary-aware term matching.
//!
//! Matching runs on ASCII-lowercased text so byte positions stay aligned with
//! the original string.

/// alias (lowercase) → canonical skill name.
const SKILL_TAXONOMY: &[(&str, &str)] = &[
    // Languages
    ("python", "Python"),
    ("java", "Java"),
    ("javascript", "JavaScript"),
    ("typescript", "TypeScript"),
    ("c++", "C++"),
    ("c#", "C#"),
    ("go", "Go"),
    ("golang", "Go"),
    ("rust", "Rust"),
    ("ruby", "Ruby"),
    ("php", "PHP"),
    ("swift", "Swift"),
    ("kotlin", "Kotlin"),
    ("sql", "SQL"),
    // Frameworks
    ("react", "React"),
    ("angular", "Angular"),
    ("vue", "Vue.js"),
    ("node.js", "Node.js"),
    ("express", "Express"),
    ("django", "Django"),
    ("flask", "Flask"),
    ("fastapi", "FastAPI"),
    ("spring", "Spring"),
    ("rails", "Ruby on Rails"),
    ("graphql", "GraphQL"),
    // Databases
    ("postgresql", "PostgreSQL"),
    ("postgres", "PostgreSQL"),
    ("mysql", "MySQL"),
    ("mongodb", "MongoDB"),
    ("redis", "Redis"),
    ("cassandra", "Cassandra"),
    ("kafka", "Kafka"),
    // Cloud & tooling
    ("aws", "AWS"),
    ("azure", "Azure"),
    ("gcp", "Google Cloud"),
    ("docker", "Docker"),
    ("kubernetes", "Kubernetes"),
    ("terraform", "Terraform"),
    ("linux", "Linux"),
    ("git", "Git"),
    ("ci/cd", "CI/CD"),
    // ML/AI
    ("tensorflow", "TensorFlow"),
    ("pytorch", "PyTorch"),
    ("scikit-learn", "scikit-learn"),
    ("machine learning", "Machine Learning"),
    ("deep learning", "Deep Learning"),
];

/// Canonical skill names mentioned in `text`, in taxonomy order, without duplicates.
pub fn skills_mentioned(text: &str) -> Vec<&'static str> {
    let haystack = text.to_ascii_lowercase();
    let mut found: Vec<&'static str> = Vec::new();
    for &(alias, canonical) in SKILL_TAXONOMY {
        if found.contains(&canonical) {
            continue;
        }
        let canonical_lower = canonical.to_ascii_lowercase();
        if contains_term(&haystack, alias) || contains_term(&haystack, &canonical_lower) {
            found.push(canonical);
        }
    }
    found
}

/// Whether `term` occurs in `haystack` as a whole word. Both must already be lowercased.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    count_term(haystack, term) > 0
}

/// Whole-word occurrences of `term` in `haystack`. Both must already be lowercased.
pub fn count_term(haystack: &str, term: &str) -> usize {
    if term.is_empty() {
        return 0;
    }
    haystack
        .match_indices(term)
        .filter(|&(pos, _)| {
            let before = haystack[..pos].chars().next_back();
            let after = haystack[pos + term.len()..].chars().next();
            !is_word_char(before) && !is_word_char(after)
        })
        .count()
}

fn is_word_char(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skills_mentioned_finds_canonical_names() {
        let found = skills_mentioned("Requires Python and SQL.");
        assert_eq!(found, vec!["Python", "SQL"]);
    }

    #[test]
    fn test_aliases_collapse_to_one_canonical() {
        let found = skills_mentioned("Postgres or PostgreSQL, plus Golang");
        assert_eq!(found, vec!["Go", "PostgreSQL"]);
    }

    #[test]
    fn test_word_boundaries_prevent_partial_matches() {
        // "java" inside "javascript", "go" inside "good", "rust" inside "trust"
        let found = skills_mentioned("Good JavaScript skills build trust");
        assert_eq!(found, vec!["JavaScript"]);
    }

    #[test]
    fn test_symbol_terms_match() {
        let found = skills_mentioned("Modern C++ and C#; Node.js services; CI/CD pipelines.");
        assert!(found.contains(&"C++"));
        assert!(found.contains(&"C#"));
        assert!(found.contains(&"Node.js"));
        assert!(found.contains(&"CI/CD"));
    }

    #[test]
    fn test_count_term() {
        assert_eq!(count_term("python, python3, python", "python"), 2);
        assert_eq!(count_term("anything", ""), 0);
        assert_eq!(count_term("machine learning and deep learning", "learning"), 2);
    }
}
