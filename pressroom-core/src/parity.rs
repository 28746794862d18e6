//! Self-consistency lint between a structured record and its own
//! `articleBody`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coherence::FieldKey;
use crate::entities::extract_entities;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParityFinding {
    pub severity: Severity,
    pub field: FieldKey,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParityReport {
    /// False when any finding is an error.
    pub ok: bool,
    pub findings: Vec<ParityFinding>,
}

/// Check that the record's key facts appear verbatim in its body.
///
/// Missing headline or publication date is an error; facts present in the
/// record but absent from the body are warnings.
pub fn check_parity(record: &Value) -> ParityReport {
    let entities = extract_entities(record);
    let body = entities.article_body.as_str();
    let mut findings = Vec::new();

    for (field, value) in [
        (FieldKey::Headline, entities.headline.as_str()),
        (FieldKey::DatePublished, entities.date_published.as_str()),
    ] {
        if value.is_empty() {
            findings.push(ParityFinding {
                severity: Severity::Error,
                field,
                message: format!("Missing required field: {field}"),
            });
        } else if !body.contains(value) {
            findings.push(ParityFinding {
                severity: Severity::Warning,
                field,
                message: format!("'{field}' value not found in articleBody"),
            });
        }
    }

    if let Some(cta) = entities.cta.as_ref().filter(|c| !body.contains(c.url.as_str())) {
        findings.push(ParityFinding {
            severity: Severity::Warning,
            field: FieldKey::CallToAction,
            message: format!("CTA url {} not referenced in articleBody", cta.url),
        });
    }

    for claim in &entities.claims {
        let lead = claim.text.split('.').next().unwrap_or_default();
        if !claim.text.is_empty() && !body.contains(lead) {
            findings.push(ParityFinding {
                severity: Severity::Warning,
                field: FieldKey::Claims,
                message: format!("Claim not obviously referenced in articleBody: {lead}"),
            });
        }
    }

    let ok = findings.iter().all(|f| f.severity != Severity::Error);
    tracing::debug!(ok, findings = findings.len(), "parity check");
    ParityReport { ok, findings }
}
