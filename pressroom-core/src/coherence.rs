//! Prose/record coherence: which structured facts the free-text prose fails
//! to mention, how much of the record it covers, and where a fix belongs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::{extract_entities, Entities};
use crate::lexicon::{CueTable, FamilyRule, Lexicon, DEFAULT_FAMILY};

const REQUIRED_FALLBACK_WEIGHT: f64 = 0.2;
const OPTIONAL_FALLBACK_WEIGHT: f64 = 0.1;
/// Stand-in value for the claims field, which has no single string.
const CLAIMS_PLACEHOLDER: &str = "[claims]";

/// Family-specific field weights: `family -> field -> weight`.
pub type WeightTable = BTreeMap<String, BTreeMap<String, f64>>;

/// A structured field the analyzer knows how to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldKey {
    #[serde(rename = "headline")]
    Headline,
    #[serde(rename = "datePublished")]
    DatePublished,
    #[serde(rename = "cpo:subtype")]
    Subtype,
    #[serde(rename = "endorser")]
    Endorser,
    #[serde(rename = "location")]
    Location,
    #[serde(rename = "cpo:claims")]
    Claims,
    #[serde(rename = "cpo:cta")]
    CallToAction,
    #[serde(rename = "Event")]
    Event,
}

impl FieldKey {
    /// Wire name, also the key into cue, weight and template tables.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Headline => "headline",
            FieldKey::DatePublished => "datePublished",
            FieldKey::Subtype => "cpo:subtype",
            FieldKey::Endorser => "endorser",
            FieldKey::Location => "location",
            FieldKey::Claims => "cpo:claims",
            FieldKey::CallToAction => "cpo:cta",
            FieldKey::Event => "Event",
        }
    }

    /// Where a sentence covering this field belongs.
    pub fn placement(self, family: &str) -> Placement {
        match self {
            FieldKey::Headline => Placement::Headline,
            FieldKey::DatePublished | FieldKey::Subtype => Placement::Lede,
            FieldKey::Endorser if family == "ENDORSEMENT" => Placement::Lede,
            FieldKey::CallToAction => Placement::Close,
            _ => Placement::Body,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Headline,
    Lede,
    Body,
    Close,
}

/// A field the prose does not cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub field: FieldKey,
    /// Expected value rendered as text; empty when the record has none.
    pub value: String,
    pub required: bool,
    pub placement: Placement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageItem {
    pub field: FieldKey,
    pub weight: f64,
    pub covered: bool,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    /// 0 to 100.
    pub score: u32,
    pub items: Vec<CoverageItem>,
    pub family: String,
    pub total_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoherenceAnalysis {
    pub entities: Entities,
    pub family: String,
    pub gaps: Vec<Gap>,
}

#[derive(Debug, Clone)]
struct FieldCheck {
    field: FieldKey,
    value: String,
    required: bool,
    covered: bool,
}

/// Family of a single subtype code: first matching prefix rule wins.
pub fn subtype_family(code: &str, rules: &[FamilyRule]) -> String {
    rules
        .iter()
        .find(|rule| rule.prefixes.iter().any(|p| !p.is_empty() && code.starts_with(p.as_str())))
        .map(|rule| rule.family.clone())
        .unwrap_or_else(|| DEFAULT_FAMILY.to_string())
}

/// Family of the record, decided by its primary (first) subtype only.
pub fn primary_family(entities: &Entities, rules: &[FamilyRule]) -> String {
    if entities.primary_subtype.is_empty() {
        return DEFAULT_FAMILY.to_string();
    }
    subtype_family(&entities.primary_subtype, rules)
}

/// Whether `prose` covers `field`: one of its cue phrases or its own value
/// appears (case-insensitively). Fields without a cue rule never count.
pub fn prose_covers(prose: &str, field: FieldKey, value: &str, cues: &CueTable) -> bool {
    let text = prose.to_lowercase();
    if text.is_empty() {
        return false;
    }
    let Some(rule) = cues.get(field.as_str()) else {
        return false;
    };
    let cue_found = rule
        .cues
        .iter()
        .any(|c| !c.is_empty() && text.contains(c.to_lowercase().as_str()));
    let literal_found = !value.is_empty() && text.contains(value.to_lowercase().as_str());
    cue_found || literal_found
}

/// Required fields always; optional fields only when the record has them.
fn check_fields(prose: &str, entities: &Entities, cues: &CueTable) -> Vec<FieldCheck> {
    let mut candidates: Vec<(FieldKey, String, bool)> = vec![
        (FieldKey::Headline, entities.headline.clone(), true),
        (FieldKey::DatePublished, entities.date_published.clone(), true),
        (FieldKey::Subtype, entities.subtypes.join(","), true),
    ];
    if entities.endorser.is_some() {
        candidates.push((FieldKey::Endorser, entities.endorser_name().unwrap_or_default(), false));
    }
    if entities.location.is_some() {
        candidates.push((FieldKey::Location, entities.location_name().unwrap_or_default(), false));
    }
    if !entities.claims.is_empty() {
        candidates.push((FieldKey::Claims, CLAIMS_PLACEHOLDER.to_string(), false));
    }
    if let Some(cta) = &entities.cta {
        candidates.push((FieldKey::CallToAction, cta.url.clone(), false));
    }

    let mut checks: Vec<FieldCheck> = candidates
        .into_iter()
        .map(|(field, value, required)| {
            let covered = prose_covers(prose, field, &value, cues);
            tracing::debug!(%field, covered, required, "field coverage");
            FieldCheck {
                field,
                value,
                required,
                covered,
            }
        })
        .collect();

    // Events are matched by name only, no cue words.
    let names = entities.event_names();
    if let Some(first) = names.first() {
        let lower = prose.to_lowercase();
        let covered = names.iter().any(|n| lower.contains(n.to_lowercase().as_str()));
        checks.push(FieldCheck {
            field: FieldKey::Event,
            value: first.to_string(),
            required: false,
            covered,
        });
    }
    checks
}

/// Every field the prose fails to cover, with its recommended placement.
pub fn find_gaps(prose: &str, entities: &Entities, cues: &CueTable, family: &str) -> Vec<Gap> {
    check_fields(prose, entities, cues)
        .into_iter()
        .filter(|c| !c.covered)
        .map(|c| Gap {
            placement: c.field.placement(family),
            field: c.field,
            value: c.value,
            required: c.required,
        })
        .collect()
}

/// Extract entities from `record` and list the gaps in `prose`.
pub fn analyze_coherence(prose: &str, record: &Value, lexicon: &Lexicon) -> CoherenceAnalysis {
    let entities = extract_entities(record);
    let family = primary_family(&entities, &lexicon.families);
    let gaps = find_gaps(prose, &entities, &lexicon.cues, &family);
    tracing::info!(family = %family, gaps = gaps.len(), "coherence analysis complete");
    CoherenceAnalysis {
        entities,
        family,
        gaps,
    }
}

/// Weighted share of scored fields the prose covers.
pub fn coverage_report(
    prose: &str,
    entities: &Entities,
    cues: &CueTable,
    family: &str,
    weights: Option<&WeightTable>,
) -> CoverageReport {
    let items: Vec<CoverageItem> = check_fields(prose, entities, cues)
        .into_iter()
        .map(|c| CoverageItem {
            weight: field_weight(weights, family, c.field, c.required),
            field: c.field,
            covered: c.covered,
            required: c.required,
        })
        .collect();

    let total_weight: f64 = items.iter().map(|i| i.weight).sum();
    let covered_weight: f64 = items.iter().filter(|i| i.covered).map(|i| i.weight).sum();
    let denominator = if total_weight > 0.0 { total_weight } else { 1.0 };
    let score = (100.0 * covered_weight / denominator).round().clamp(0.0, 100.0) as u32;

    CoverageReport {
        score,
        items,
        family: family.to_string(),
        total_weight,
    }
}

/// [`coverage_report`] straight from a raw record.
pub fn score_coverage(
    prose: &str,
    record: &Value,
    lexicon: &Lexicon,
    weights: Option<&WeightTable>,
) -> CoverageReport {
    let entities = extract_entities(record);
    let family = primary_family(&entities, &lexicon.families);
    coverage_report(prose, &entities, &lexicon.cues, &family, weights)
}

/// Family table, then the `default` family table, then the fixed fallback.
fn field_weight(weights: Option<&WeightTable>, family: &str, field: FieldKey, required: bool) -> f64 {
    let lookup = |fam: &str| {
        weights
            .and_then(|w| w.get(fam))
            .and_then(|table| table.get(field.as_str()))
            .copied()
    };
    lookup(family)
        .or_else(|| lookup(DEFAULT_FAMILY))
        .unwrap_or(if required {
            REQUIRED_FALLBACK_WEIGHT
        } else {
            OPTIONAL_FALLBACK_WEIGHT
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lexicon() -> &'static Lexicon {
        Lexicon::builtin()
    }

    fn record() -> Value {
        json!({
            "headline": "Rivera Wins Teachers Union Backing",
            "datePublished": "2024-05-02",
            "cpo:subtype": ["END.ORG", "NEWS.LOCAL"],
            "endorser": { "name": "Teachers Union" },
            "cpo:cta": { "url": "https://rivera.example/volunteer" },
            "subjectOf": [{ "@type": "Event", "name": "Spring Rally" }]
        })
    }

    #[test]
    fn families_follow_prefix_rules() {
        let rules = &lexicon().families;
        assert_eq!(subtype_family("ANN.CANDIDACY", rules), "ANN");
        assert_eq!(subtype_family("POLICY.HEALTH", rules), "POLICY");
        assert_eq!(subtype_family("ENDORSEMENT.LABOR", rules), "ENDORSEMENT");
        assert_eq!(subtype_family("FR.EMAIL", rules), "FUNDRAISING");
        assert_eq!(subtype_family("GRA.CANVASS", rules), "MOBILIZATION");
        assert_eq!(subtype_family("OPERATIONS.STAFF", rules), "OPS");
        assert_eq!(subtype_family("XYZ.1", rules), DEFAULT_FAMILY);
    }

    #[test]
    fn family_comes_from_primary_subtype_only() {
        let e = extract_entities(&record());
        assert_eq!(primary_family(&e, &lexicon().families), "ENDORSEMENT");
        assert_eq!(primary_family(&Entities::default(), &lexicon().families), DEFAULT_FAMILY);
    }

    #[test]
    fn uncovered_required_fields_always_gap() {
        let analysis = analyze_coherence("Volunteers gathered.", &json!({}), lexicon());
        let fields: Vec<FieldKey> = analysis.gaps.iter().map(|g| g.field).collect();
        assert_eq!(fields, vec![FieldKey::Headline, FieldKey::DatePublished, FieldKey::Subtype]);
        assert!(analysis.gaps.iter().all(|g| g.required));
    }

    #[test]
    fn absent_optional_fields_never_gap() {
        let prose = "Statement dated today: a new announcement.";
        let analysis = analyze_coherence(prose, &json!({ "headline": "x" }), lexicon());
        assert!(analysis.gaps.is_empty(), "got {:?}", analysis.gaps);
    }

    #[test]
    fn literal_values_and_cues_cover_fields() {
        let cues = &lexicon().cues;
        assert!(prose_covers("Published 2024-05-02.", FieldKey::DatePublished, "2024-05-02", cues));
        assert!(prose_covers("Donate TODAY", FieldKey::DatePublished, "", cues));
        assert!(!prose_covers("", FieldKey::Headline, "", cues));
        // Event has no cue rule.
        assert!(!prose_covers("Spring Rally", FieldKey::Event, "Spring Rally", cues));
    }

    #[test]
    fn gaps_carry_value_and_placement() {
        let prose = "Rivera Wins Teachers Union Backing. The announcement came 2024-05-02.";
        let analysis = analyze_coherence(prose, &record(), lexicon());

        let by_field: BTreeMap<FieldKey, &Gap> = analysis.gaps.iter().map(|g| (g.field, g)).collect();
        assert!(!by_field.contains_key(&FieldKey::Headline));
        assert!(!by_field.contains_key(&FieldKey::Subtype));

        // No endorser cue, but the endorser's name appears in the headline.
        assert!(!by_field.contains_key(&FieldKey::Endorser));

        let cta = by_field[&FieldKey::CallToAction];
        assert_eq!(cta.placement, Placement::Close);
        assert_eq!(by_field[&FieldKey::Event].value, "Spring Rally");
        assert!(!by_field[&FieldKey::Event].required);
    }

    #[test]
    fn endorser_placement_depends_on_family() {
        assert_eq!(FieldKey::Endorser.placement("ENDORSEMENT"), Placement::Lede);
        assert_eq!(FieldKey::Endorser.placement("ANN"), Placement::Body);
        assert_eq!(FieldKey::Headline.placement("default"), Placement::Headline);
        assert_eq!(FieldKey::Subtype.placement("default"), Placement::Lede);
        assert_eq!(FieldKey::Location.placement("default"), Placement::Body);
    }

    #[test]
    fn coverage_is_zero_or_full_at_the_extremes() {
        let rec = record();
        let none = score_coverage("", &rec, lexicon(), None);
        assert_eq!(none.score, 0);
        assert_eq!(none.family, "ENDORSEMENT");

        let everything = "Rivera Wins Teachers Union Backing, endorses, dated 2024-05-02 \
                          endorsement news https://rivera.example/volunteer at the Spring Rally";
        let full = score_coverage(everything, &rec, lexicon(), None);
        assert!(full.items.iter().all(|i| i.covered), "{:?}", full.items);
        assert_eq!(full.score, 100);
    }

    #[test]
    fn fallback_and_family_weights() {
        let rec = record();
        // headline + date + subtype covered, optional endorser/cta/event not.
        let prose = "Statement dated 2024-05-02, policy news.";
        let fallback = score_coverage(prose, &rec, lexicon(), None);
        // covered 0.6 of 0.6 + 3 * 0.1
        assert!((fallback.total_weight - 0.9).abs() < 1e-9);
        assert_eq!(fallback.score, 67);

        let weights: WeightTable = BTreeMap::from([
            (
                "ENDORSEMENT".to_string(),
                BTreeMap::from([("endorser".to_string(), 0.6)]),
            ),
            (
                "default".to_string(),
                BTreeMap::from([("cpo:cta".to_string(), 0.0), ("Event".to_string(), 0.0)]),
            ),
        ]);
        let weighted = score_coverage(prose, &rec, lexicon(), Some(&weights));
        // 0.6 covered of 0.6 + 0.6
        assert_eq!(weighted.score, 50);
    }

    #[test]
    fn zero_total_weight_scores_zero() {
        let weights: WeightTable = BTreeMap::from([(
            "default".to_string(),
            BTreeMap::from([
                ("headline".to_string(), 0.0),
                ("datePublished".to_string(), 0.0),
                ("cpo:subtype".to_string(), 0.0),
            ]),
        )]);
        let report = score_coverage("anything", &json!({}), lexicon(), Some(&weights));
        assert_eq!(report.total_weight, 0.0);
        assert_eq!(report.score, 0);
    }
}
