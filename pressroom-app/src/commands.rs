use anyhow::{Context, Result};
use pressroom_config::RuleSet;
use pressroom_core::discovery::{discover_and_score, search_strategy};
use pressroom_core::{
    EvidenceCandidate, analyze_coherence, analyze_text, build_search_query, check_parity,
    classify_document, generate_suggestions, score_coverage, score_evidence,
};
use pressroom_llm::traits::LlmClient;
use serde_json::{Value, json};
use std::path::Path;

pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn read_record(path: &Path) -> Result<Value> {
    let raw = read_text(path)?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

pub fn classify(text: &str, rules: &RuleSet) -> Value {
    json!({
        "classification": classify_document(text, &rules.lexicon.documents),
        "stats": analyze_text(text),
    })
}

pub fn coherence(prose: &str, record: &Value, rules: &RuleSet) -> Result<Value> {
    Ok(serde_json::to_value(analyze_coherence(prose, record, &rules.lexicon))?)
}

pub fn coverage(prose: &str, record: &Value, rules: &RuleSet) -> Result<Value> {
    let report = score_coverage(prose, record, &rules.lexicon, rules.weights.as_ref());
    Ok(serde_json::to_value(report)?)
}

pub async fn suggest(
    prose: &str,
    record: &Value,
    rules: &RuleSet,
    style: &str,
    llm: Option<&dyn LlmClient>,
) -> Result<Value> {
    let suggestions =
        generate_suggestions(prose, record, &rules.lexicon, &rules.templates, style, llm).await;
    Ok(serde_json::to_value(suggestions)?)
}

pub fn evidence(
    claim: &str,
    url: &str,
    excerpt: Option<String>,
    claim_type: &str,
    rules: &RuleSet,
) -> Result<Value> {
    let candidate = EvidenceCandidate {
        url: url.to_string(),
        excerpt,
    };
    let result = score_evidence(claim, &candidate, claim_type, &rules.lexicon);
    Ok(serde_json::to_value(result)?)
}

pub async fn discover(
    llm: &dyn LlmClient,
    claim: &str,
    claim_type: &str,
    rules: &RuleSet,
) -> Result<Value> {
    let found = discover_and_score(llm, claim, claim_type, &rules.lexicon).await?;
    Ok(serde_json::to_value(found)?)
}

pub fn strategy(claim_type: &str, claim: Option<&str>, rules: &RuleSet) -> Value {
    json!({
        "strategy": search_strategy(claim_type, &rules.lexicon),
        "query": claim.map(|c| build_search_query(c, claim_type, &rules.lexicon)),
    })
}

/// Parity report plus whether it passed.
pub fn lint(record: &Value) -> Result<(Value, bool)> {
    let report = check_parity(record);
    let ok = report.ok;
    Ok((serde_json::to_value(report)?, ok))
}
