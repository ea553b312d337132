//! Keyword heuristic that guesses a complaint's category and priority.
//!
//! Pure and stateless: the compiled keyword matchers are built once and shared.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::complaints::models::ComplaintPriority;

/// Predicted complaint category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TriageCategory {
    Water,
    Electricity,
    Roads,
    Sanitation,
    Public,
    Other,
}

impl TriageCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriageCategory::Water => "water",
            TriageCategory::Electricity => "electricity",
            TriageCategory::Roads => "roads",
            TriageCategory::Sanitation => "sanitation",
            TriageCategory::Public => "public",
            TriageCategory::Other => "other",
        }
    }
}

/// Categories in tie-break order, with their keywords
const CATEGORY_KEYWORDS: [(TriageCategory, &[&str]); 5] = [
    (
        TriageCategory::Water,
        &["water", "leak", "pipe", "supply", "drinking", "flood", "drainage"],
    ),
    (
        TriageCategory::Electricity,
        &["electricity", "power", "outage", "blackout", "electric", "transformer"],
    ),
    (
        TriageCategory::Roads,
        &["road", "pothole", "traffic", "signal", "highway", "pavement"],
    ),
    (
        TriageCategory::Sanitation,
        &["garbage", "waste", "trash", "sanitation", "clean", "sewer", "hygiene"],
    ),
    (
        TriageCategory::Public,
        &["park", "safety", "noise", "public", "community", "pollution", "neighbor"],
    ),
];

const URGENT_TERMS: [&str; 6] = ["urgent", "emergency", "danger", "immediate", "serious", "severe"];

const LOW_PRIORITY_TERMS: [&str; 4] = ["minor", "small", "low", "slight"];

lazy_static! {
    /// One matcher per keyword, grouped by category in declared order
    static ref CATEGORY_MATCHERS: Vec<(TriageCategory, Vec<Regex>)> = CATEGORY_KEYWORDS
        .iter()
        .map(|(category, keywords)| {
            let matchers = keywords
                .iter()
                .map(|k| Regex::new(&regex::escape(k)).unwrap())
                .collect();
            (*category, matchers)
        })
        .collect();
}

/// Outcome of the heuristic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriageResult {
    pub category: TriageCategory,
    /// Winning category's share of all keyword hits, in [0, 1]
    pub confidence: f64,
    pub priority: ComplaintPriority,
}

/// Categorize and prioritize a complaint from its title and description
pub fn classify(title: &str, description: &str) -> TriageResult {
    let text = format!("{} {}", title, description).to_lowercase();

    let counts: Vec<(TriageCategory, usize)> = CATEGORY_MATCHERS
        .iter()
        .map(|(category, matchers)| {
            let hits = matchers.iter().map(|m| m.find_iter(&text).count()).sum();
            (*category, hits)
        })
        .collect();

    let total: usize = counts.iter().map(|(_, hits)| hits).sum();

    let (category, confidence) = if total == 0 {
        (TriageCategory::Other, 1.0)
    } else {
        // Strictly greater keeps the earliest category on ties
        let mut best = counts[0];
        for candidate in &counts[1..] {
            if candidate.1 > best.1 {
                best = *candidate;
            }
        }
        (best.0, best.1 as f64 / total as f64)
    };

    TriageResult {
        category,
        confidence,
        priority: priority_for(&text),
    }
}

/// Urgent terms win over low-priority terms wherever they appear
fn priority_for(text: &str) -> ComplaintPriority {
    if URGENT_TERMS.iter().any(|t| text.contains(t)) {
        ComplaintPriority::High
    } else if LOW_PRIORITY_TERMS.iter().any(|t| text.contains(t)) {
        ComplaintPriority::Low
    } else {
        ComplaintPriority::Medium
    }
}
