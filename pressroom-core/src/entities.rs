//! Field extraction from a semi-structured (JSON-LD shaped) press-release
//! record.
//!
//! Extraction is total: absent or mistyped fields become empty strings,
//! `None` or empty vectors, never errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A factual claim attached to the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub text: String,
    pub claim_type: Option<String>,
    pub evidence_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToAction {
    pub url: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedEvent {
    pub name: String,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entities {
    pub types: Vec<String>,
    pub headline: String,
    pub date_published: String,
    /// Ordered subtype codes; the first one is the primary subtype.
    pub subtypes: Vec<String>,
    pub primary_subtype: String,
    pub endorser: Option<Value>,
    pub location: Option<Value>,
    pub author: Option<Value>,
    pub claims: Vec<Claim>,
    pub cta: Option<CallToAction>,
    /// Related items whose type tags include `Event`.
    pub events: Vec<RelatedEvent>,
    pub article_body: String,
}

impl Entities {
    pub fn endorser_name(&self) -> Option<String> {
        self.endorser.as_ref().and_then(entity_label)
    }

    pub fn location_name(&self) -> Option<String> {
        self.location.as_ref().and_then(entity_label)
    }

    /// Names of related events, skipping unnamed ones.
    pub fn event_names(&self) -> Vec<&str> {
        self.events
            .iter()
            .map(|e| e.name.as_str())
            .filter(|n| !n.is_empty())
            .collect()
    }
}

/// Pull the fields the coherence analyzer needs out of `record`.
pub fn extract_entities(record: &Value) -> Entities {
    let subtypes = string_list(first_of(record, &["cpo:subtype", "subtype"]));
    let primary_subtype = subtypes.first().cloned().unwrap_or_default();

    let claims = record
        .get("cpo:claims")
        .or_else(|| record.get("claims"))
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(claim_from).collect())
        .unwrap_or_default();

    let events = ["subjectOf", "relatedEvents"]
        .iter()
        .filter_map(|key| record.get(*key).and_then(Value::as_array))
        .flatten()
        .filter_map(event_from)
        .collect();

    Entities {
        types: string_list(record.get("@type")),
        headline: string_field(record, "headline"),
        date_published: string_field(record, "datePublished"),
        subtypes,
        primary_subtype,
        endorser: present(first_of(record, &["endorser", "cpo:endorser"])),
        location: present(record.get("location")),
        author: present(record.get("author")),
        claims,
        cta: first_of(record, &["cpo:cta", "callToAction"]).and_then(cta_from),
        events,
        article_body: string_field(record, "articleBody"),
    }
}

/// Display name of an entity given either as a string or as an object
/// with a `name`.
pub fn entity_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(map) => map
            .get("name")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string),
        _ => None,
    }
}

fn first_of<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .find(|v| present_ref(v))
}

fn present_ref(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Bool(b) => *b,
        _ => true,
    }
}

fn present(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| present_ref(v)).cloned()
}

fn string_field(record: &Value, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// A scalar or a sequence, normalised to non-empty trimmed strings.
fn string_list(value: Option<&Value>) -> Vec<String> {
    let as_code = |v: &Value| match v {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    };
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(as_code).filter(|s| !s.is_empty()).collect(),
        Some(other) => as_code(other).filter(|s| !s.is_empty()).into_iter().collect(),
        None => Vec::new(),
    }
}

fn claim_from(item: &Value) -> Option<Claim> {
    match item {
        Value::String(text) => Some(Claim {
            text: text.clone(),
            claim_type: None,
            evidence_url: None,
        }),
        Value::Object(_) => {
            let text_of = |keys: &[&str]| {
                first_of(item, keys)
                    .and_then(Value::as_str)
                    .map(str::to_string)
            };
            Some(Claim {
                text: text_of(&["cpo:claimText", "claimText", "text"]).unwrap_or_default(),
                claim_type: text_of(&["cpo:claimType", "claimType"]),
                evidence_url: text_of(&["cpo:evidenceUrl", "evidenceUrl", "url"]),
            })
        }
        _ => None,
    }
}

fn cta_from(value: &Value) -> Option<CallToAction> {
    let url = value.get("url").and_then(Value::as_str)?.trim();
    if url.is_empty() {
        return None;
    }
    Some(CallToAction {
        url: url.to_string(),
        label: value
            .get("label")
            .or_else(|| value.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

fn event_from(item: &Value) -> Option<RelatedEvent> {
    let types = string_list(item.get("@type").or_else(|| item.get("type")));
    if !types.iter().any(|t| t == "Event") {
        return None;
    }
    Some(RelatedEvent {
        name: string_field(item, "name"),
        types,
    })
}
