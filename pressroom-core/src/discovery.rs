//! Search strategies per claim type and collaborator-driven discovery of
//! candidate evidence.

use pressroom_common::Result;
use pressroom_llm::traits::{LlmClient, SUGGESTION_TEMPERATURE};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::evidence::{score_evidence, ConfidenceResult, EvidenceCandidate};
use crate::lexicon::Lexicon;

const DISCOVERY_MAX_TOKENS: u32 = 400;

const DISCOVERY_SYSTEM_PROMPT: &str = "You are a fact-checker helping find evidence URLs for campaign press release claims. \
Focus on authoritative sources like .gov sites, fact-checking organizations, official records, and reputable news outlets.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStrategy {
    pub claim_type: String,
    pub preferred_sources: Vec<String>,
    pub site_restrictions: String,
    pub fact_check_required: bool,
}

/// Where to look for evidence of a claim type. Unknown types get a generic
/// strategy with no site restriction.
pub fn search_strategy(claim_type: &str, lexicon: &Lexicon) -> SearchStrategy {
    match lexicon.claim_types.types.get(claim_type) {
        Some(rule) => SearchStrategy {
            claim_type: claim_type.to_string(),
            preferred_sources: rule.preferred_sources.clone(),
            site_restrictions: rule.site_restrictions.clone(),
            fact_check_required: rule.fact_check_required,
        },
        None => SearchStrategy {
            claim_type: claim_type.to_string(),
            preferred_sources: vec!["reputable news".to_string(), ".gov/.edu sites".to_string()],
            site_restrictions: String::new(),
            fact_check_required: false,
        },
    }
}

/// Claim text followed by the strategy's `site:` restriction, if any.
pub fn build_search_query(claim: &str, claim_type: &str, lexicon: &Lexicon) -> String {
    let strategy = search_strategy(claim_type, lexicon);
    let claim = claim.trim();
    if strategy.site_restrictions.is_empty() {
        claim.to_string()
    } else {
        format!("{claim} {}", strategy.site_restrictions)
    }
}

/// A source proposed by the collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredEvidence {
    pub url: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub reliability: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
}

impl DiscoveredEvidence {
    pub fn candidate(&self) -> EvidenceCandidate {
        EvidenceCandidate {
            url: self.url.clone(),
            excerpt: self.excerpt.clone().filter(|e| !e.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDiscovery {
    pub evidence: DiscoveredEvidence,
    pub confidence: ConfidenceResult,
}

fn discovery_prompt(claim: &str, claim_type: &str) -> String {
    format!(
        r#"Find the best evidence URL for this claim: "{claim}"

Claim type: {claim_type}

Please provide:
1. The most authoritative URL that supports or documents this claim
2. A brief explanation of why this source is reliable
3. A relevant excerpt or quote from the source

Format as JSON:
{{
  "url": "https://...",
  "source": "Source name",
  "reliability": "Why this is reliable",
  "excerpt": "Relevant quote"
}}"#
    )
}

/// Ask the collaborator for the most authoritative source for `claim`.
///
/// Transport errors propagate; a reply without a usable JSON object (or
/// without a URL) is `Ok(None)`.
pub async fn discover_evidence(
    llm: &dyn LlmClient,
    claim: &str,
    claim_type: &str,
) -> Result<Option<DiscoveredEvidence>> {
    let response = llm
        .generate(
            &discovery_prompt(claim, claim_type),
            Some(DISCOVERY_SYSTEM_PROMPT),
            Some(DISCOVERY_MAX_TOKENS),
            Some(SUGGESTION_TEMPERATURE),
        )
        .await?;
    tracing::debug!("discovery response: {}", response.text);

    let Some(json) = extract_json_block(&response.text) else {
        tracing::warn!(claim_type, "no JSON object in discovery response");
        return Ok(None);
    };
    match serde_json::from_str::<DiscoveredEvidence>(&json) {
        Ok(found) if !found.url.trim().is_empty() => Ok(Some(found)),
        Ok(_) => {
            tracing::warn!(claim_type, "discovery response has no URL");
            Ok(None)
        }
        Err(e) => {
            tracing::warn!(claim_type, "could not parse discovery JSON: {}", e);
            Ok(None)
        }
    }
}

/// [`discover_evidence`], then score whatever was found.
pub async fn discover_and_score(
    llm: &dyn LlmClient,
    claim: &str,
    claim_type: &str,
    lexicon: &Lexicon,
) -> Result<Option<ScoredDiscovery>> {
    let Some(evidence) = discover_evidence(llm, claim, claim_type).await? else {
        return Ok(None);
    };
    let confidence = score_evidence(claim, &evidence.candidate(), claim_type, lexicon);
    tracing::info!(
        url = %evidence.url,
        score = confidence.score,
        meets_threshold = confidence.meets_threshold,
        "scored discovered evidence"
    );
    Ok(Some(ScoredDiscovery {
        evidence,
        confidence,
    }))
}

/// Fenced ```json block first, otherwise the outermost braces.
fn extract_json_block(text: &str) -> Option<String> {
    let re_fence = Regex::new("(?s)```json\\s*(\\{.*?\\})\\s*```").ok()?;
    if let Some(caps) = re_fence.captures(text) {
        return Some(caps.get(1)?.as_str().to_string());
    }
    let re_plain = Regex::new("(?s)(\\{.*\\})").ok()?;
    re_plain
        .captures(text)
        .and_then(|c| c.get(1).map(|m| m.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_claim_types_carry_site_restrictions() {
        let strategy = search_strategy("voting_record", Lexicon::builtin());
        assert_eq!(strategy.site_restrictions, "site:congress.gov OR site:votesmart.org");
        assert!(!strategy.fact_check_required);
        assert!(search_strategy("policy_document", Lexicon::builtin()).fact_check_required);
    }

    #[test]
    fn unknown_claim_type_gets_generic_strategy() {
        let strategy = search_strategy("horoscope", Lexicon::builtin());
        assert_eq!(strategy.preferred_sources, vec!["reputable news", ".gov/.edu sites"]);
        assert!(strategy.site_restrictions.is_empty());
        assert_eq!(
            build_search_query("  Rivera voted yes ", "horoscope", Lexicon::builtin()),
            "Rivera voted yes"
        );
    }

    #[test]
    fn query_appends_restrictions() {
        assert_eq!(
            build_search_query("Unemployment fell 2%", "statistic", Lexicon::builtin()),
            "Unemployment fell 2% site:census.gov OR site:bls.gov OR site:pewresearch.org"
        );
    }

    #[test]
    fn json_block_prefers_fenced_object() {
        let text = "Sure {not this}\n```json\n{\"url\": \"https://a.gov\"}\n```";
        assert_eq!(extract_json_block(text).as_deref(), Some("{\"url\": \"https://a.gov\"}"));

        let bare = "Here: {\"url\": \"https://b.gov\", \"excerpt\": \"x\"} done";
        assert_eq!(
            extract_json_block(bare).as_deref(),
            Some("{\"url\": \"https://b.gov\", \"excerpt\": \"x\"}")
        );
        assert_eq!(extract_json_block("no json here"), None);
    }

    #[test]
    fn blank_excerpt_is_dropped_from_candidate() {
        let found = DiscoveredEvidence {
            url: "https://a.gov".into(),
            source: None,
            reliability: None,
            excerpt: Some("  ".into()),
        };
        assert_eq!(found.candidate().excerpt, None);
    }
}
