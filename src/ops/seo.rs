use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::model::article::ArticleFields;

/// How much a failed check should worry the author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(s)
    }
}

/// One SEO heuristic result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeoCheck {
    pub label: &'static str,
    pub passed: bool,
    pub severity: Severity,
}

/// The full assessment: ordered checklist plus aggregate 0-100 score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeoAssessment {
    pub score: u8,
    pub checks: Vec<SeoCheck>,
}

impl SeoAssessment {
    /// Plain-text rendering of the checklist, one line per check
    pub fn summary(&self) -> String {
        let mut lines = vec![format!("score: {}/100", self.score)];
        for check in &self.checks {
            let mark = if check.passed { "pass" } else { "fail" };
            lines.push(format!("{mark}  {} [{}]", check.label, check.severity));
        }
        lines.join("\n")
    }
}

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-z0-9-]+$").expect("slug pattern compiles"));
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(?i)<h[2-4][^>]*>").expect("heading pattern compiles"));

/// Assess the working buffer against the SEO checklist.
///
/// A pure function of the field values: same input, same assessment, with
/// no caching anywhere that could go stale between keystrokes.
///
/// Checks, in order:
/// 1. SEO title length: the SEO title (or the display title when none is
///    set) should run 30 to 60 characters
/// 2. Meta description length: 120 to 160 characters
/// 3. Content length: at least 300 words
/// 4. Slug format: non-empty lowercase letters, digits, and hyphens
/// 5. Heading structure: at least one h2, h3, or h4 tag in the content
pub fn assess(fields: &ArticleFields) -> SeoAssessment {
    let mut checks = Vec::with_capacity(5);

    let effective_title = if fields.seo_title.is_empty() {
        &fields.title
    } else {
        &fields.seo_title
    };
    let title_len = effective_title.chars().count();
    checks.push(SeoCheck {
        label: "SEO title length",
        passed: (30..=60).contains(&title_len),
        severity: if title_len < 10 || title_len > 70 {
            Severity::Critical
        } else {
            Severity::Warning
        },
    });

    let description_len = fields.seo_description.chars().count();
    checks.push(SeoCheck {
        label: "Meta description length",
        passed: (120..=160).contains(&description_len),
        severity: if description_len < 50 {
            Severity::Critical
        } else {
            Severity::Warning
        },
    });

    let word_count = fields.content.split_whitespace().count();
    checks.push(SeoCheck {
        label: "Content length",
        passed: word_count >= 300,
        severity: if word_count < 100 {
            Severity::Critical
        } else {
            Severity::Warning
        },
    });

    checks.push(SeoCheck {
        label: "Slug format",
        passed: !fields.slug.is_empty() && SLUG_RE.is_match(&fields.slug),
        severity: Severity::Warning,
    });

    checks.push(SeoCheck {
        label: "Heading structure",
        passed: HEADING_RE.is_match(&fields.content),
        severity: Severity::Info,
    });

    let passed = checks.iter().filter(|c| c.passed).count();
    let score = ((passed as f64 / checks.len() as f64) * 100.0).round() as u8;

    SeoAssessment { score, checks }
}
