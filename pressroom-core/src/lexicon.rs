//! Static rule tables: keyword lists, cue words, family prefixes,
//! reliability tiers, hedge words and claim-type thresholds.
//!
//! Every table is plain serde data so deployments can swap it out through
//! `pressroom-config` without code changes. [`Lexicon::builtin`] hands out a
//! process-wide read-only copy of the defaults.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::evidence::AssertionStrength;

/// Family used when no prefix rule matches a subtype code.
pub const DEFAULT_FAMILY: &str = "default";

static BUILTIN: LazyLock<Lexicon> = LazyLock::new(Lexicon::default);

/// One scored category: a label and the keywords that vote for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordCategory {
    pub name: String,
    pub keywords: Vec<String>,
    #[serde(default = "unit_weight")]
    pub weight: f64,
}

fn unit_weight() -> f64 {
    1.0
}

fn category(name: &str, keywords: &[&str]) -> KeywordCategory {
    KeywordCategory {
        name: name.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        weight: 1.0,
    }
}

/// Keyword tables for document-type and subtype detection.
///
/// Vector order is the tie-breaking priority: on equal scores the
/// earlier category wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentRules {
    pub primary: Vec<KeywordCategory>,
    /// Primary type whose detection triggers the subtype pass.
    pub subtype_parent: String,
    pub subtypes: Vec<KeywordCategory>,
    /// Minimum rounded primary confidence before subtypes are scored.
    pub min_primary_confidence: u32,
    /// Minimum raw subtype score for a subtype to be reported.
    pub min_subtype_score: f64,
}

impl Default for DocumentRules {
    fn default() -> Self {
        Self {
            primary: vec![
                category(
                    "Press Release",
                    &["press release", "for immediate release", "contact:", "announces", "###"],
                ),
                category(
                    "Speech",
                    &["thank you", "my fellow", "ladies and gentlemen", "today i stand", "together we"],
                ),
                category(
                    "Policy Statement",
                    &[
                        "policy statement",
                        "whereas",
                        "therefore",
                        "section 1:",
                        "section 2:",
                        "section 3:",
                        "legislation",
                        "reform",
                        "shall take effect",
                    ],
                ),
                category(
                    "Social Media Post",
                    &["#", "@", "follow", "like", "share", "retweet", "link in bio"],
                ),
                category(
                    "Email Campaign",
                    &["dear friend", "unsubscribe", "donate now", "contribute", "forward this", "election day"],
                ),
            ],
            subtype_parent: "Press Release".to_string(),
            subtypes: vec![
                category(
                    "Candidacy Announcement",
                    &[
                        "announces candidacy",
                        "announces her candidacy",
                        "announces his candidacy",
                        "announces their candidacy",
                        "running for",
                        "seeks election",
                        "campaign for",
                        "candidate for",
                        "announces",
                        "candidacy",
                    ],
                ),
                category(
                    "Endorsement Announcement",
                    &["endorses", "endorsement", "supports", "backing", "support from", "endorsed by"],
                ),
                category(
                    "Event Promotion",
                    &["join us", "attend", "event", "rally", "town hall", "meeting", "forum", "when:", "where:"],
                ),
                category(
                    "Policy/Initiative Update",
                    &["proposes", "initiative", "plan", "legislation", "policy update", "announces plan"],
                ),
                category(
                    "Issue-Based Campaign",
                    &["campaign launches", "awareness", "public urged", "calls for", "advocates for"],
                ),
                category(
                    "Grant Award",
                    &[
                        "awarded",
                        "announces",
                        "million",
                        "funding",
                        "grant",
                        "contract",
                        "construction",
                        "project",
                        "investment",
                        "federal funding",
                        "infrastructure",
                    ],
                ),
            ],
            min_primary_confidence: 10,
            min_subtype_score: 10.0,
        }
    }
}

/// Whether a structured field is required and which prose phrases cover it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueRule {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub cues: Vec<String>,
}

fn cue(required: bool, cues: &[&str]) -> CueRule {
    CueRule {
        required,
        cues: cues.iter().map(|c| c.to_string()).collect(),
    }
}

/// Cue rules keyed by wire field name (`headline`, `cpo:cta`, ...).
pub type CueTable = BTreeMap<String, CueRule>;

fn default_cues() -> CueTable {
    BTreeMap::from([
        ("headline".to_string(), cue(true, &["headline", "announces", "statement"])),
        ("datePublished".to_string(), cue(true, &["today", "on ", "dated"])),
        (
            "cpo:subtype".to_string(),
            cue(
                true,
                &[
                    "announcement",
                    "policy",
                    "endorsement",
                    "fundraising",
                    "crisis",
                    "mobilization",
                    "operations",
                    "news",
                ],
            ),
        ),
        ("endorser".to_string(), cue(false, &["endorses", "endorsement", "backed by"])),
        ("location".to_string(), cue(false, &["in ", "at "])),
        (
            "cpo:claims".to_string(),
            cue(false, &["according to", "cites", "research", "study", "estimate"]),
        ),
        (
            "cpo:cta".to_string(),
            cue(false, &["RSVP", "donate", "volunteer", "learn more", "sign up"]),
        ),
    ])
}

/// Maps subtype codes starting with any of `prefixes` to `family`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyRule {
    pub prefixes: Vec<String>,
    pub family: String,
}

fn family(family: &str, prefixes: &[&str]) -> FamilyRule {
    FamilyRule {
        prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
        family: family.to_string(),
    }
}

fn default_families() -> Vec<FamilyRule> {
    vec![
        family("ANN", &["ANN."]),
        family("POLICY", &["POL.", "POLICY."]),
        family("ENDORSEMENT", &["END.", "ENDORSE"]),
        family("FUNDRAISING", &["FUND.", "FR."]),
        family("CRISIS", &["CRI.", "CRISIS"]),
        family("MOBILIZATION", &["MOB.", "GRA.", "MOBIL"]),
        family("OPS", &["OPS.", "OPER"]),
        family("NEWS", &["NEWS."]),
    ]
}

/// Reliability tier a source domain falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTier {
    High,
    Medium,
    Low,
    Unrated,
}

impl SourceTier {
    /// Additive adjustment applied to the evidence score.
    pub fn adjustment(self) -> f64 {
        match self {
            SourceTier::High => 0.3,
            SourceTier::Medium => 0.1,
            SourceTier::Low => -0.1,
            SourceTier::Unrated => 0.0,
        }
    }
}

/// Domain lists per reliability tier.
///
/// Entries starting with `.` match as suffixes (`.edu`); other entries match
/// the domain itself and any of its subdomains.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliabilityTiers {
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
    /// Sites accepted for claim types that demand fact-check-grade sourcing.
    pub fact_checkers: Vec<String>,
}

impl Default for ReliabilityTiers {
    fn default() -> Self {
        let owned = |xs: &[&str]| xs.iter().map(|x| x.to_string()).collect::<Vec<_>>();
        Self {
            high: owned(&[
                ".gov",
                ".mil",
                "politifact.com",
                "factcheck.org",
                "snopes.com",
                "pewresearch.org",
                "votesmart.org",
                "ballotpedia.org",
                "fullfact.org",
                "rand.org",
                "brookings.edu",
            ]),
            medium: owned(&[
                ".edu",
                ".org",
                "apnews.com",
                "reuters.com",
                "nytimes.com",
                "washingtonpost.com",
                "wsj.com",
                "bloomberg.com",
                "politico.com",
                "thehill.com",
                "bbc.com",
                "bbc.co.uk",
                "cnn.com",
                "nbcnews.com",
                "cbsnews.com",
                "abcnews.go.com",
                "usatoday.com",
            ]),
            low: owned(&[
                "wikipedia.org",
                "twitter.com",
                "x.com",
                "facebook.com",
                "instagram.com",
                "tiktok.com",
                "reddit.com",
                "youtube.com",
                "linkedin.com",
                "medium.com",
                "substack.com",
                "quora.com",
            ]),
            fact_checkers: owned(&["politifact.com", "factcheck.org", "snopes.com", "fullfact.org"]),
        }
    }
}

impl ReliabilityTiers {
    /// Explicit low-tier entries are checked before the medium tier so the
    /// generic `.org` suffix never promotes social or reference sites.
    pub fn tier_of(&self, domain: &str) -> SourceTier {
        if matches_any(domain, &self.high) {
            SourceTier::High
        } else if matches_any(domain, &self.low) {
            SourceTier::Low
        } else if matches_any(domain, &self.medium) {
            SourceTier::Medium
        } else {
            SourceTier::Unrated
        }
    }

    pub fn is_fact_checker(&self, domain: &str) -> bool {
        matches_any(domain, &self.fact_checkers)
    }
}

fn matches_any(domain: &str, entries: &[String]) -> bool {
    entries.iter().any(|entry| domain_matches(domain, entry))
}

fn domain_matches(domain: &str, entry: &str) -> bool {
    let entry = entry.trim().to_lowercase();
    if entry.is_empty() {
        return false;
    }
    if entry.starts_with('.') {
        return domain.ends_with(&entry);
    }
    domain == entry || domain.ends_with(&format!(".{entry}"))
}

/// Hedge phrases that signal a given assertion strength.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgeRule {
    pub strength: AssertionStrength,
    pub phrases: Vec<String>,
}

/// Hedge-word table plus the verbs that mark an unhedged claim as definitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HedgeTable {
    pub rules: Vec<HedgeRule>,
    pub definitive_verbs: Vec<String>,
}

impl Default for HedgeTable {
    fn default() -> Self {
        let rule = |strength, phrases: &[&str]| HedgeRule {
            strength,
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
        };
        Self {
            rules: vec![
                rule(
                    AssertionStrength::Speculative,
                    &["may", "might", "could", "would", "possibly", "perhaps"],
                ),
                rule(
                    AssertionStrength::Suggestive,
                    &[
                        "appears to",
                        "seems to",
                        "suggests",
                        "indicates",
                        "implies",
                        "raises questions about",
                        "raises concerns about",
                    ],
                ),
                rule(
                    AssertionStrength::Qualified,
                    &["allegedly", "reportedly", "claims to", "said to"],
                ),
                rule(AssertionStrength::Probable, &["likely", "probably", "tends to"]),
            ],
            definitive_verbs: ["will", "has", "is", "are", "was", "were", "voted", "passed", "failed", "rejected"]
                .iter()
                .map(|v| v.to_string())
                .collect(),
        }
    }
}

/// Per-claim-type evidence requirements and search hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimTypeRule {
    pub base_threshold: f64,
    #[serde(default)]
    pub fact_check_required: bool,
    #[serde(default)]
    pub preferred_sources: Vec<String>,
    #[serde(default)]
    pub site_restrictions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimTypeRules {
    pub types: BTreeMap<String, ClaimTypeRule>,
    /// Base threshold for claim types missing from `types`.
    pub default_threshold: f64,
    /// Lowest threshold any assertion adjustment may reach.
    pub floor: f64,
}

impl Default for ClaimTypeRules {
    fn default() -> Self {
        let rule = |base, fact_check, sources: &[&str], sites: &str| ClaimTypeRule {
            base_threshold: base,
            fact_check_required: fact_check,
            preferred_sources: sources.iter().map(|s| s.to_string()).collect(),
            site_restrictions: sites.to_string(),
        };
        let types = BTreeMap::from([
            (
                "policy_claim".to_string(),
                rule(
                    0.7,
                    true,
                    &["CBO", ".gov analysis", ".edu research"],
                    "site:cbo.gov OR site:*.gov OR site:*.edu",
                ),
            ),
            (
                "policy_document".to_string(),
                rule(
                    0.7,
                    true,
                    &["Politifact", "FactCheck.org", ".gov sites"],
                    "site:politifact.com OR site:factcheck.org OR site:*.gov",
                ),
            ),
            (
                "factual_claim".to_string(),
                rule(
                    0.7,
                    true,
                    &["fact-checking sites", "reputable news"],
                    "site:politifact.com OR site:factcheck.org OR site:snopes.com",
                ),
            ),
            (
                "voting_record".to_string(),
                rule(
                    0.8,
                    false,
                    &["Congress.gov", "VoteSmart.org", "official records"],
                    "site:congress.gov OR site:votesmart.org",
                ),
            ),
            (
                "statistic".to_string(),
                rule(
                    0.7,
                    false,
                    &["Census", "BLS", "government stats", "Pew Research"],
                    "site:census.gov OR site:bls.gov OR site:pewresearch.org",
                ),
            ),
            (
                "experience".to_string(),
                rule(
                    0.5,
                    false,
                    &["linkedin.com", "campaign websites", "news articles"],
                    "site:linkedin.com OR site:*.com/about",
                ),
            ),
            (
                "org_description".to_string(),
                rule(
                    0.5,
                    false,
                    &["official .org sites", "Wikipedia", "news"],
                    "site:*.org OR site:wikipedia.org",
                ),
            ),
            (
                "org_composition".to_string(),
                rule(
                    0.5,
                    false,
                    &["organization about pages", "member directories"],
                    "site:*.org/about OR site:*.org/members",
                ),
            ),
        ]);
        Self {
            types,
            default_threshold: 0.6,
            floor: 0.3,
        }
    }
}

/// The full set of rule tables the core consults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    pub documents: DocumentRules,
    pub cues: CueTable,
    pub families: Vec<FamilyRule>,
    pub reliability: ReliabilityTiers,
    pub hedges: HedgeTable,
    pub claim_types: ClaimTypeRules,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            documents: DocumentRules::default(),
            cues: default_cues(),
            families: default_families(),
            reliability: ReliabilityTiers::default(),
            hedges: HedgeTable::default(),
            claim_types: ClaimTypeRules::default(),
        }
    }
}

impl Lexicon {
    /// Shared built-in tables, initialised on first use.
    pub fn builtin() -> &'static Lexicon {
        &BUILTIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_entries_match_any_registrable_domain() {
        let tiers = ReliabilityTiers::default();
        assert_eq!(tiers.tier_of("congress.gov"), SourceTier::High);
        assert_eq!(tiers.tier_of("bls.gov"), SourceTier::High);
        assert_eq!(tiers.tier_of("stanford.edu"), SourceTier::Medium);
        assert_eq!(tiers.tier_of("example.com"), SourceTier::Unrated);
    }

    #[test]
    fn plain_entries_cover_subdomains_only() {
        let tiers = ReliabilityTiers::default();
        assert_eq!(tiers.tier_of("en.wikipedia.org"), SourceTier::Low);
        assert_eq!(tiers.tier_of("mobile.twitter.com"), SourceTier::Low);
        // Must not match on a bare string suffix.
        assert_eq!(tiers.tier_of("notx.com"), SourceTier::Unrated);
    }

    #[test]
    fn fact_checkers_outrank_generic_org_suffix() {
        let tiers = ReliabilityTiers::default();
        assert_eq!(tiers.tier_of("factcheck.org"), SourceTier::High);
        assert!(tiers.is_fact_checker("www.politifact.com"));
        assert!(!tiers.is_fact_checker("congress.gov"));
    }

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let lexicon: Lexicon = serde_yaml::from_str(
            r#"
families:
  - prefixes: ["TOWN."]
    family: MOBILIZATION
claim_types:
  default_threshold: 0.55
"#,
        )
        .unwrap();

        assert_eq!(lexicon.families.len(), 1);
        assert_eq!(lexicon.claim_types.default_threshold, 0.55);
        assert_eq!(lexicon.claim_types.floor, 0.3);
        assert!(lexicon.cues.contains_key("datePublished"));
        assert_eq!(lexicon.documents.primary[0].name, "Press Release");
    }

    #[test]
    fn builtin_is_shared() {
        assert!(std::ptr::eq(Lexicon::builtin(), Lexicon::builtin()));
    }
}
