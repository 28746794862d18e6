//! Document-type and press-release subtype detection by weighted keyword
//! scoring, plus plain text statistics.
//!
//! Scores are a heuristic lower bound: `100 * matched weight / keyword count`
//! per category, categories scored independently, ties broken by table order.

use serde::{Deserialize, Serialize};

use crate::lexicon::{DocumentRules, KeywordCategory};

/// Label reported for empty input.
pub const UNKNOWN_TYPE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub primary_type: String,
    pub primary_confidence: u32,
    pub subtype: Option<String>,
    pub subtype_confidence: u32,
}

impl Classification {
    fn unknown() -> Self {
        Self {
            primary_type: UNKNOWN_TYPE.to_string(),
            primary_confidence: 0,
            subtype: None,
            subtype_confidence: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStats {
    pub word_count: usize,
    pub sentence_count: usize,
    pub character_count: usize,
    pub character_count_no_spaces: usize,
}

/// Classify raw text into a primary document type and, for the subtype
/// parent (press releases by default), a subtype.
pub fn classify_document(text: &str, rules: &DocumentRules) -> Classification {
    if text.trim().is_empty() {
        return Classification::unknown();
    }
    let lower = text.to_lowercase();

    let Some((primary, primary_score)) = best_category(&lower, &rules.primary) else {
        return Classification::unknown();
    };
    let primary_confidence = primary_score.round() as u32;

    let mut result = Classification {
        primary_type: primary.name.clone(),
        primary_confidence,
        subtype: None,
        subtype_confidence: 0,
    };

    if primary.name == rules.subtype_parent && primary_confidence >= rules.min_primary_confidence {
        if let Some((subtype, score)) = best_category(&lower, &rules.subtypes) {
            if score >= rules.min_subtype_score {
                result.subtype = Some(subtype.name.clone());
                result.subtype_confidence = score.round() as u32;
            }
        }
    }

    tracing::debug!(
        primary = %result.primary_type,
        confidence = result.primary_confidence,
        subtype = ?result.subtype,
        "classified document"
    );
    result
}

/// Score of one category against already-lowercased text.
pub fn category_score(lower_text: &str, category: &KeywordCategory) -> f64 {
    if category.keywords.is_empty() {
        return 0.0;
    }
    let matched: f64 = category
        .keywords
        .iter()
        .filter(|k| lower_text.contains(k.to_lowercase().as_str()))
        .map(|_| category.weight)
        .sum();
    matched / category.keywords.len() as f64 * 100.0
}

/// Highest-scoring category; a later category must score strictly higher
/// to displace an earlier one.
fn best_category<'a>(
    lower_text: &str,
    categories: &'a [KeywordCategory],
) -> Option<(&'a KeywordCategory, f64)> {
    let mut best: Option<(&KeywordCategory, f64)> = None;
    for category in categories {
        let score = category_score(lower_text, category);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((category, score)),
        }
    }
    best
}

/// Word, sentence and character counts for a block of text.
pub fn analyze_text(text: &str) -> TextStats {
    if text.is_empty() {
        return TextStats::default();
    }
    TextStats {
        word_count: text.split_whitespace().count(),
        sentence_count: text
            .split(|c| matches!(c, '.' | '!' | '?'))
            .filter(|s| !s.trim().is_empty())
            .count(),
        character_count: text.chars().count(),
        character_count_no_spaces: text.chars().filter(|c| !c.is_whitespace()).count(),
    }
}
