//! Evidence confidence scoring.
//!
//! A candidate source for a claim is scored additively from a neutral 0.5:
//! source reliability, excerpt relevance and the claim type's fact-check
//! requirement each nudge the score, which is then clamped to `[0, 1]` and
//! compared against a threshold relaxed by how strongly the claim is worded.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::lexicon::{ClaimTypeRules, HedgeTable, Lexicon, SourceTier};

const BASE_SCORE: f64 = 0.5;
const NO_EXCERPT_PENALTY: f64 = -0.1;
const MISSING_FACT_CHECK_PENALTY: f64 = -0.2;
const MIN_SIGNIFICANT_WORD_CHARS: usize = 4;

/// How definitively a claim is phrased, ordered from "requires the
/// strongest evidence" to "requires the weakest".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssertionStrength {
    Definitive,
    Neutral,
    Qualified,
    Probable,
    Suggestive,
    Speculative,
    Questioning,
}

impl AssertionStrength {
    pub const ALL: [AssertionStrength; 7] = [
        AssertionStrength::Definitive,
        AssertionStrength::Neutral,
        AssertionStrength::Qualified,
        AssertionStrength::Probable,
        AssertionStrength::Suggestive,
        AssertionStrength::Speculative,
        AssertionStrength::Questioning,
    ];

    /// Hedge categories in the order they win when several co-occur.
    const HEDGE_PRIORITY: [AssertionStrength; 4] = [
        AssertionStrength::Speculative,
        AssertionStrength::Suggestive,
        AssertionStrength::Qualified,
        AssertionStrength::Probable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssertionStrength::Definitive => "definitive",
            AssertionStrength::Neutral => "neutral",
            AssertionStrength::Qualified => "qualified",
            AssertionStrength::Probable => "probable",
            AssertionStrength::Suggestive => "suggestive",
            AssertionStrength::Speculative => "speculative",
            AssertionStrength::Questioning => "questioning",
        }
    }

    /// Additive change to the claim type's base threshold.
    pub fn threshold_adjustment(self) -> f64 {
        match self {
            AssertionStrength::Definitive | AssertionStrength::Neutral => 0.0,
            AssertionStrength::Qualified => -0.1,
            AssertionStrength::Probable => -0.15,
            AssertionStrength::Suggestive => -0.2,
            AssertionStrength::Speculative => -0.25,
            AssertionStrength::Questioning => -0.3,
        }
    }
}

impl fmt::Display for AssertionStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A found source for a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceCandidate {
    pub url: String,
    #[serde(default)]
    pub excerpt: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    Insufficient,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            ConfidenceLevel::High
        } else if score >= 0.6 {
            ConfidenceLevel::Medium
        } else if score >= 0.4 {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::Insufficient
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceResult {
    /// Clamped to `[0, 1]`, rounded to two decimals.
    pub score: f64,
    pub level: ConfidenceLevel,
    pub threshold: f64,
    /// `score >= threshold`: the source may be accepted without more checks.
    pub meets_threshold: bool,
    pub factors: Vec<String>,
    pub assertiveness: AssertionStrength,
    pub domain: String,
}

/// Classify how definitively `claim` is worded.
///
/// A question mark anywhere wins outright. Otherwise hedge phrases are
/// matched as case-insensitive substrings; with no hedges, a whole-word
/// definitive verb makes the claim definitive.
pub fn evaluate_assertion_strength(claim: &str, hedges: &HedgeTable) -> AssertionStrength {
    if claim.contains('?') {
        return AssertionStrength::Questioning;
    }

    let lower = claim.to_lowercase();
    let found = find_hedges(&lower, hedges);

    if found.is_empty() {
        let definitive = words(&lower).any(|w| {
            hedges
                .definitive_verbs
                .iter()
                .any(|verb| verb.eq_ignore_ascii_case(w))
        });
        return if definitive {
            AssertionStrength::Definitive
        } else {
            AssertionStrength::Neutral
        };
    }

    AssertionStrength::HEDGE_PRIORITY
        .into_iter()
        .find(|strength| found.iter().any(|(s, _)| s == strength))
        .unwrap_or(AssertionStrength::Qualified)
}

/// Every hedge phrase present in already-lowercased text, with its category.
pub fn find_hedges<'a>(lower_claim: &str, hedges: &'a HedgeTable) -> Vec<(AssertionStrength, &'a str)> {
    hedges
        .rules
        .iter()
        .flat_map(|rule| {
            rule.phrases
                .iter()
                .filter(|p| !p.is_empty() && lower_claim.contains(p.to_lowercase().as_str()))
                .map(move |p| (rule.strength, p.as_str()))
        })
        .collect()
}

/// Base threshold for a claim type; unknown types get the default.
pub fn base_threshold(claim_type: &str, rules: &ClaimTypeRules) -> f64 {
    rules
        .types
        .get(claim_type)
        .map(|r| r.base_threshold)
        .unwrap_or(rules.default_threshold)
}

/// Confidence a source must reach for a claim of this type and wording.
///
/// Always within `[floor, base]` and non-increasing from definitive to
/// questioning.
pub fn required_threshold(claim_type: &str, strength: AssertionStrength, rules: &ClaimTypeRules) -> f64 {
    let adjusted = round2(base_threshold(claim_type, rules) + strength.threshold_adjustment());
    adjusted.max(rules.floor)
}

/// Lowercased host of `url` without a leading `www.`.
///
/// Scheme-less input such as `congress.gov/bill/1` is retried with
/// `https://`; anything still unparseable is used verbatim.
pub fn extract_domain(url: &str) -> String {
    let raw = url.trim();
    let parsed = Url::parse(raw).ok().or_else(|| {
        if raw.contains("://") {
            None
        } else {
            Url::parse(&format!("https://{raw}")).ok()
        }
    });

    let host = parsed
        .as_ref()
        .and_then(|u| u.host_str())
        .map(str::to_string)
        .unwrap_or_else(|| raw.to_string())
        .to_lowercase();

    host.strip_prefix("www.").map(str::to_string).unwrap_or(host)
}

/// Fraction of the claim's significant words (longer than three
/// characters) that appear in the excerpt.
pub fn text_relevance(claim: &str, excerpt: &str) -> f64 {
    let lower_claim = claim.to_lowercase();
    let significant: Vec<&str> = words(&lower_claim)
        .filter(|w| w.chars().count() >= MIN_SIGNIFICANT_WORD_CHARS)
        .collect();
    if significant.is_empty() {
        return 0.0;
    }
    let excerpt = excerpt.to_lowercase();
    let hits = significant.iter().filter(|w| excerpt.contains(**w)).count();
    hits as f64 / significant.len() as f64
}

/// Judge whether `evidence` plausibly substantiates `claim`.
pub fn score_evidence(
    claim: &str,
    evidence: &EvidenceCandidate,
    claim_type: &str,
    lexicon: &Lexicon,
) -> ConfidenceResult {
    let mut factors = Vec::new();
    let mut score = BASE_SCORE;

    let strength = evaluate_assertion_strength(claim, &lexicon.hedges);
    factors.push(format!("Assertion strength: {strength}"));
    let hedges = find_hedges(&claim.to_lowercase(), &lexicon.hedges);
    if !hedges.is_empty() {
        let phrases: Vec<&str> = hedges.iter().map(|(_, p)| *p).collect();
        factors.push(format!("Hedged language: {}", phrases.join(", ")));
    }

    let domain = extract_domain(&evidence.url);
    let tier = lexicon.reliability.tier_of(&domain);
    score += tier.adjustment();
    factors.push(match tier {
        SourceTier::High => format!("High-reliability source: {domain} (+0.3)"),
        SourceTier::Medium => format!("Medium-reliability source: {domain} (+0.1)"),
        SourceTier::Low => format!("Low-reliability source: {domain} (-0.1)"),
        SourceTier::Unrated => format!("Unrated source: {domain} (+0.0)"),
    });

    match evidence.excerpt.as_deref().filter(|e| !e.trim().is_empty()) {
        Some(excerpt) => {
            let relevance = text_relevance(claim, excerpt);
            let pct = (relevance * 100.0).round();
            if relevance >= 0.5 {
                score += 0.2;
                factors.push(format!("Strong text relevance: {pct}% of key terms in excerpt (+0.2)"));
            } else if relevance >= 0.3 {
                score += 0.1;
                factors.push(format!("Partial text relevance: {pct}% of key terms in excerpt (+0.1)"));
            } else {
                score -= 0.1;
                factors.push(format!("Weak text relevance: {pct}% of key terms in excerpt (-0.1)"));
            }
        }
        None => {
            score += NO_EXCERPT_PENALTY;
            factors.push("No excerpt available; relevance unverifiable (-0.1)".to_string());
        }
    }

    let fact_check_required = lexicon
        .claim_types
        .types
        .get(claim_type)
        .is_some_and(|r| r.fact_check_required);
    if fact_check_required && !lexicon.reliability.is_fact_checker(&domain) {
        score += MISSING_FACT_CHECK_PENALTY;
        factors.push(format!(
            "Claim type {claim_type} requires a fact-checking source; {domain} is not one (-0.2)"
        ));
    }

    let score = round2(score.clamp(0.0, 1.0));
    let threshold = required_threshold(claim_type, strength, &lexicon.claim_types);
    factors.push(format!("Required confidence {threshold:.2} for {claim_type} ({strength})"));

    tracing::debug!(%domain, score, threshold, %strength, "scored evidence");

    ConfidenceResult {
        score,
        level: ConfidenceLevel::from_score(score),
        threshold,
        meets_threshold: score >= threshold,
        factors,
        assertiveness: strength,
        domain,
    }
}

fn words(lower: &str) -> impl Iterator<Item = &str> {
    lower.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty())
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> &'static Lexicon {
        Lexicon::builtin()
    }

    fn strength(claim: &str) -> AssertionStrength {
        evaluate_assertion_strength(claim, &lexicon().hedges)
    }

    #[test]
    fn question_mark_short_circuits_hedges() {
        assert_eq!(strength("Did the senator possibly vote for it?"), AssertionStrength::Questioning);
        assert_eq!(strength("Is it true?"), AssertionStrength::Questioning);
    }

    #[test]
    fn hedge_categories_follow_priority() {
        assert_eq!(strength("The policy may reduce costs"), AssertionStrength::Speculative);
        assert_eq!(strength("The data suggests a decline"), AssertionStrength::Suggestive);
        assert_eq!(strength("He reportedly left the firm"), AssertionStrength::Qualified);
        assert_eq!(strength("Turnout is likely to rise"), AssertionStrength::Probable);
        // Speculative beats probable when both appear.
        assert_eq!(strength("It could likely pass"), AssertionStrength::Speculative);
        assert_eq!(strength("She reportedly appears to lead"), AssertionStrength::Suggestive);
    }

    #[test]
    fn definitive_verbs_need_whole_words() {
        assert_eq!(strength("Senator voted for the bill"), AssertionStrength::Definitive);
        assert_eq!(strength("The bill passed in March"), AssertionStrength::Definitive);
        // "this" contains "is" but not as a word.
        assert_eq!(strength("Lower taxes for this district"), AssertionStrength::Neutral);
    }

    #[test]
    fn unprioritised_hedges_default_to_qualified() {
        let mut table = HedgeTable::default();
        table.rules.push(crate::lexicon::HedgeRule {
            strength: AssertionStrength::Definitive,
            phrases: vec!["sources say".into()],
        });
        assert_eq!(
            evaluate_assertion_strength("Sources say the vote was close", &table),
            AssertionStrength::Qualified
        );
    }

    #[test]
    fn thresholds_stay_between_floor_and_base_and_never_increase() {
        let rules = &lexicon().claim_types;
        let mut types: Vec<&str> = rules.types.keys().map(String::as_str).collect();
        types.push("made_up_type");

        for claim_type in types {
            let base = base_threshold(claim_type, rules);
            let mut previous = f64::INFINITY;
            for s in AssertionStrength::ALL {
                let t = required_threshold(claim_type, s, rules);
                assert!(t >= 0.3 && t <= base, "{claim_type}/{s}: {t}");
                assert!(t <= previous, "{claim_type}/{s} increased");
                previous = t;
            }
        }
    }

    #[test]
    fn speculative_policy_claim_threshold() {
        let rules = &lexicon().claim_types;
        assert_eq!(
            required_threshold("policy_claim", strength("The policy may reduce costs"), rules),
            0.45
        );
        assert_eq!(base_threshold("unknown", rules), 0.6);
        assert_eq!(required_threshold("experience", AssertionStrength::Questioning, rules), 0.3);
    }

    #[test]
    fn domains_are_normalised() {
        assert_eq!(extract_domain("https://www.congress.gov/bill/118"), "congress.gov");
        assert_eq!(extract_domain("HTTP://Census.GOV"), "census.gov");
        assert_eq!(extract_domain("congress.gov/votes"), "congress.gov");
        assert_eq!(extract_domain("not a url"), "not a url");
    }

    #[test]
    fn high_tier_source_with_relevant_excerpt_is_high_confidence() {
        let evidence = EvidenceCandidate {
            url: "https://www.congress.gov/roll-call/118".into(),
            excerpt: Some("Roll call: the senator voted yea on final passage.".into()),
        };
        let result = score_evidence("Senator voted for the bill", &evidence, "voting_record", lexicon());

        // senator + voted of {senator, voted, bill}: 67% relevance.
        assert_eq!(result.score, 1.0);
        assert_eq!(result.level, ConfidenceLevel::High);
        assert_eq!(result.threshold, 0.8);
        assert!(result.meets_threshold);
        assert_eq!(result.assertiveness, AssertionStrength::Definitive);
        assert_eq!(result.domain, "congress.gov");
    }

    #[test]
    fn missing_excerpt_and_fact_check_requirement_penalise() {
        let evidence = EvidenceCandidate {
            url: "https://en.wikipedia.org/wiki/Tax".into(),
            excerpt: None,
        };
        let result = score_evidence("The plan cuts taxes", &evidence, "factual_claim", lexicon());

        // 0.5 - 0.1 (low tier) - 0.1 (no excerpt) - 0.2 (not a fact-checker)
        assert_eq!(result.score, 0.1);
        assert_eq!(result.level, ConfidenceLevel::Insufficient);
        assert!(!result.meets_threshold);
        assert!(result.factors.iter().any(|f| f.contains("relevance unverifiable")));
        assert!(result.factors.iter().any(|f| f.contains("requires a fact-checking source")));
    }

    #[test]
    fn fact_checker_satisfies_requirement() {
        let evidence = EvidenceCandidate {
            url: "https://www.politifact.com/factchecks/2024/jan/01/plan".into(),
            excerpt: Some("The plan would cut taxes for families".into()),
        };
        let result = score_evidence("The plan cuts taxes", &evidence, "factual_claim", lexicon());

        // plan, cuts, taxes: "cuts" misses ("cut"), so 2/3 relevance.
        assert_eq!(result.score, 1.0);
        assert!(!result.factors.iter().any(|f| f.contains("fact-checking source")));
    }

    #[test]
    fn partial_relevance_on_unrated_source() {
        let evidence = EvidenceCandidate {
            url: "https://example.com/story".into(),
            excerpt: Some("Local school funding rose sharply".into()),
        };
        // funding and rose of {funding, schools, rose, twenty, percent}: 40%.
        let result = score_evidence("Funding for schools rose twenty percent", &evidence, "statistic", lexicon());
        assert_eq!(result.score, 0.6);
        assert_eq!(result.level, ConfidenceLevel::Medium);
        assert_eq!(result.threshold, 0.7);
        assert!(!result.meets_threshold);
    }

    #[test]
    fn relevance_ignores_short_words() {
        assert_eq!(text_relevance("a is on", "anything"), 0.0);
        assert_eq!(text_relevance("Budget deficit", "the budget deficit grew"), 1.0);
    }
}
