//! Pure keyword matching over article text.
//!
//! Semantics:
//! - Keywords are comma-delimited; tokens are trimmed and empties dropped.
//! - Matching is case-insensitive **substring** matching, not word-boundary:
//!   "py" matches "python" and "script" matches "javascript". That
//!   false-positive behavior is part of the contract.
//! - Exclude wins: any exclude hit vetoes the article regardless of includes.
//! - An empty include list matches everything not excluded.
//!
//! The matcher takes narrow borrowed views rather than the persisted
//! records, so it stays dependency-free and usable in isolation.

use feedloop_core::{Article, Rule};

// ── Inputs ──────────────────────────────────────────────────────────

/// The keyword fields of a rule, as the matcher sees them.
#[derive(Debug, Clone, Copy)]
pub struct RuleCriteria<'a> {
    pub include_keywords: Option<&'a str>,
    pub exclude_keywords: Option<&'a str>,
}

impl<'a> From<&'a Rule> for RuleCriteria<'a> {
    fn from(rule: &'a Rule) -> Self {
        Self {
            include_keywords: rule.include_keywords.as_deref(),
            exclude_keywords: rule.exclude_keywords.as_deref(),
        }
    }
}

/// The searchable text fields of an article.
#[derive(Debug, Clone, Copy)]
pub struct ArticleText<'a> {
    pub title: &'a str,
    pub summary: Option<&'a str>,
    pub content: Option<&'a str>,
}

impl<'a> From<&'a Article> for ArticleText<'a> {
    fn from(article: &'a Article) -> Self {
        Self {
            title: &article.title,
            summary: article.summary.as_deref(),
            content: article.content.as_deref(),
        }
    }
}

// ── Matching ────────────────────────────────────────────────────────

/// Parse a comma-delimited keyword string into trimmed, non-empty tokens.
///
/// `None` yields an empty list; so does a string that is all commas and
/// whitespace. Malformed input is tolerated, never rejected.
pub fn parse_keywords(raw: Option<&str>) -> Vec<String> {
    match raw {
        None => Vec::new(),
        Some(s) => s
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

/// Lowercase concatenation of the present text fields, space-joined.
/// Missing fields contribute nothing, not even a placeholder.
fn searchable_text(text: &ArticleText<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if !text.title.is_empty() {
        parts.push(text.title);
    }
    if let Some(summary) = text.summary.filter(|s| !s.is_empty()) {
        parts.push(summary);
    }
    if let Some(content) = text.content.filter(|s| !s.is_empty()) {
        parts.push(content);
    }
    parts.join(" ").to_lowercase()
}

fn any_keyword_matches(keywords: &[String], haystack: &str) -> bool {
    keywords
        .iter()
        .any(|keyword| haystack.contains(&keyword.to_lowercase()))
}

/// Decide whether an article's text matches a rule's keyword criteria.
///
/// Pure and deterministic; never fails for well-formed inputs.
pub fn matches(criteria: &RuleCriteria<'_>, text: &ArticleText<'_>) -> bool {
    let include = parse_keywords(criteria.include_keywords);
    let exclude = parse_keywords(criteria.exclude_keywords);

    let haystack = searchable_text(text);

    // Exclude check first: a single hit vetoes everything.
    if !exclude.is_empty() && any_keyword_matches(&exclude, &haystack) {
        return false;
    }

    // No include keywords: match-all (that wasn't excluded).
    if include.is_empty() {
        return true;
    }

    any_keyword_matches(&include, &haystack)
}

// ── Tests ───────────────────────────────────────────────────────────
