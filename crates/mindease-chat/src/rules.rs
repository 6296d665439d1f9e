//! Keyword-triggered reply tables.
//!
//! A rule fires when any of its trigger keywords occurs as a substring of
//! the lower-cased input. Rules are tried in declaration order and the
//! first hit wins; there is no scoring.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

// =============================================================================
// Keyword groups used by the calendar-aware branches
// =============================================================================

pub(crate) const PREPARE_KEYWORDS: &[&str] = &["prepare", "ready", "help"];
pub(crate) const STRESS_KEYWORDS: &[&str] = &["stress", "anxious", "nervous"];
pub(crate) const EVENT_BREAK_KEYWORDS: &[&str] = &["break", "rest"];
pub(crate) const SCHEDULE_KEYWORDS: &[&str] = &["schedule", "calendar", "event"];
pub(crate) const BREAK_KEYWORDS: &[&str] = &["break", "tired", "rest"];

/// True if `lower` contains any of `keywords`.
pub(crate) fn contains_any(lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| lower.contains(k))
}

// =============================================================================
// ResponseRule
// =============================================================================

/// A canned reply and the keywords that select it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRule {
    pub triggers: Vec<String>,
    pub reply: String,
}

impl ResponseRule {
    pub fn new(triggers: &[&str], reply: &str) -> Self {
        Self {
            triggers: triggers.iter().map(|t| t.to_lowercase()).collect(),
            reply: reply.to_string(),
        }
    }

    /// True if any trigger occurs in the already lower-cased input.
    pub fn matches(&self, lower: &str) -> bool {
        self.triggers
            .iter()
            .any(|t| !t.is_empty() && lower.contains(t.as_str()))
    }
}

// =============================================================================
// RuleTable
// =============================================================================

/// An ordered rule table with a flattened keyword index.
///
/// The index lists every `(keyword, rule)` pair in rule order, built once,
/// so a lookup is a single pass that stops at the first keyword found.
/// Because entries are grouped by rule in declaration order, the first hit
/// belongs to the earliest matching rule.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<ResponseRule>,
    index: Vec<(String, usize)>,
}

impl RuleTable {
    pub fn new(rules: Vec<ResponseRule>) -> Self {
        let index = rules
            .iter()
            .enumerate()
            .flat_map(|(i, rule)| {
                rule.triggers
                    .iter()
                    .filter(|t| !t.is_empty())
                    .map(move |t| (t.clone(), i))
            })
            .collect();
        Self { rules, index }
    }

    /// First rule in declaration order whose triggers occur in `lower`.
    pub fn first_match(&self, lower: &str) -> Option<&ResponseRule> {
        self.index
            .iter()
            .find(|(keyword, _)| lower.contains(keyword.as_str()))
            .map(|(_, i)| &self.rules[*i])
    }

    pub fn rules(&self) -> &[ResponseRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        DEFAULT_RULES.clone()
    }
}

/// The general assistant's reply table.
pub static DEFAULT_RULES: LazyLock<RuleTable> = LazyLock::new(|| {
    RuleTable::new(vec![
        ResponseRule::new(
            &["stress", "anxious", "worried"],
            "I understand you're feeling stressed. Let's break this down together. What's the main thing on your mind right now?",
        ),
        ResponseRule::new(
            &["exam", "test", "study"],
            "I see you have some upcoming exams. Remember to take regular breaks - studies show they improve retention. Would you like to try a quick breathing exercise?",
        ),
        ResponseRule::new(
            &["sleep", "tired", "rest"],
            "Getting good sleep is crucial for mental wellness. Have you tried the guided meditation in our AI Plan? It can help you wind down.",
        ),
    ])
});
