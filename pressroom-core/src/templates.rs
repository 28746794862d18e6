//! Template library lookup, placeholder filling and suggestion generation.
//!
//! A suggestion starts life as a filled template. When a text-generation
//! collaborator is available the filled template is sent to it for
//! paraphrasing; any failure falls back to the template itself.

use std::collections::BTreeMap;

use pressroom_llm::traits::LlmClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coherence::{analyze_coherence, FieldKey, Gap, Placement};
use crate::lexicon::Lexicon;

pub const NEUTRAL_STYLE: &str = "neutral";
/// Last-resort phrasing when the library has nothing for a gap.
pub const GENERIC_TEMPLATE: &str = "Write one sentence addressing {{key}} ({{value}}).";

/// Candidate phrasings, either keyed by style or a plain list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyledTemplates {
    Plain(Vec<String>),
    Styled(BTreeMap<String, Vec<String>>),
}

impl StyledTemplates {
    /// First phrasing for `style`, else for the neutral style. Plain lists
    /// ignore the style.
    pub fn first_for(&self, style: &str) -> Option<&str> {
        let candidates = match self {
            StyledTemplates::Plain(list) => Some(list),
            StyledTemplates::Styled(by_style) => by_style
                .get(style)
                .or_else(|| by_style.get(NEUTRAL_STYLE)),
        };
        candidates
            .and_then(|list| list.first())
            .map(String::as_str)
            .filter(|t| !t.trim().is_empty())
    }
}

/// Templates for one subtype family: per-field blocks plus a fallback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyTemplates {
    #[serde(default)]
    pub default: Option<StyledTemplates>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, StyledTemplates>,
}

/// Configuration-supplied phrasing library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateLibrary {
    /// System prompt for the collaborator; empty means its own default.
    pub system: Option<String>,
    /// Tone descriptions by style name, sent as a hint.
    pub styles: BTreeMap<String, String>,
    /// Keyed by family name (`ENDORSEMENT`, `default`, ...).
    pub families: BTreeMap<String, FamilyTemplates>,
    /// Keyed by field wire name (`endorser`, `cpo:cta`, ...).
    pub fields: BTreeMap<String, StyledTemplates>,
    pub default: Option<StyledTemplates>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub missing_field: FieldKey,
    pub value: String,
    pub required: bool,
    pub placement: Placement,
    pub suggestions: Vec<String>,
}

/// Values substituted into a template.
#[derive(Debug, Clone, Copy)]
pub struct FillContext<'a> {
    pub subtypes: &'a [String],
    pub headline: &'a str,
}

/// Pick the template for `gap`. Lookup order, first non-empty wins:
/// family+field, field, family default, global default, generic sentence.
pub fn select_template<'a>(
    gap: &Gap,
    library: &'a TemplateLibrary,
    style: &str,
    family: &str,
) -> &'a str {
    let key = gap.field.as_str();
    let family_block = library.families.get(family);

    family_block
        .and_then(|block| block.fields.get(key))
        .and_then(|t| t.first_for(style))
        .or_else(|| library.fields.get(key).and_then(|t| t.first_for(style)))
        .or_else(|| {
            family_block
                .and_then(|block| block.default.as_ref())
                .and_then(|t| t.first_for(style))
        })
        .or_else(|| library.default.as_ref().and_then(|t| t.first_for(style)))
        .unwrap_or(GENERIC_TEMPLATE)
}

/// Literal replacement of `{{key}}`, `{{value}}`, `{{subtype}}` and
/// `{{headline}}`.
pub fn fill_template(template: &str, gap: &Gap, ctx: FillContext<'_>) -> String {
    template
        .replace("{{key}}", gap.field.as_str())
        .replace("{{value}}", &gap.value)
        .replace("{{subtype}}", &ctx.subtypes.join(","))
        .replace("{{headline}}", ctx.headline)
}

/// Tone and context lines prepended to the filled template.
fn collaborator_prompt(library: &TemplateLibrary, style: &str, subtypes: &[String], family: &str, filled: &str) -> String {
    let tone = library
        .styles
        .get(style)
        .map(|desc| format!("Tone: {desc}."))
        .unwrap_or_default();
    let context = format!(
        "Context subtype(s): {}. Primary family: {family}.",
        subtypes.join(", ")
    );
    format!("{tone}\n{context}\n{filled}")
}

/// One suggestion per gap, in gap order.
///
/// With `llm` the filled template is paraphrased; collaborator errors and
/// empty replies are logged and the filled template is used instead, so this
/// never fails.
pub async fn generate_suggestions(
    prose: &str,
    record: &Value,
    lexicon: &Lexicon,
    library: &TemplateLibrary,
    style: &str,
    llm: Option<&dyn LlmClient>,
) -> Vec<Suggestion> {
    let analysis = analyze_coherence(prose, record, lexicon);
    let entities = &analysis.entities;
    let family = analysis.family.as_str();
    let ctx = FillContext {
        subtypes: &entities.subtypes,
        headline: &entities.headline,
    };
    let system = library.system.as_deref().unwrap_or_default();

    let mut out = Vec::with_capacity(analysis.gaps.len());
    for gap in &analysis.gaps {
        let template = select_template(gap, library, style, family);
        let filled = fill_template(template, gap, ctx);

        let suggestion = match llm {
            Some(client) => {
                let prompt = collaborator_prompt(library, style, &entities.subtypes, family, &filled);
                match client.complete(system, &prompt).await {
                    Ok(text) if !text.is_empty() => text,
                    Ok(_) => {
                        tracing::warn!(field = %gap.field, "collaborator returned empty text, using template");
                        filled
                    }
                    Err(e) => {
                        tracing::warn!(field = %gap.field, "collaborator failed, using template: {}", e);
                        filled
                    }
                }
            }
            None => filled,
        };

        out.push(Suggestion {
            missing_field: gap.field,
            value: gap.value.clone(),
            required: gap.required,
            placement: gap.placement,
            suggestions: vec![suggestion],
        });
    }

    tracing::info!(family, style, suggestions = out.len(), "generated suggestions");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = r#"
system: "You edit press releases."
styles:
  campaign: "energetic and direct"
families:
  ENDORSEMENT:
    endorser:
      campaign: ["{{value}} proudly endorses the campaign."]
      neutral: ["{{value}} has endorsed the campaign."]
    default: ["Endorsement note on {{key}}."]
fields:
  endorser:
    neutral: ["Endorsed by {{value}}."]
  cpo:cta: ["Visit {{value}} to get involved."]
default:
  neutral: ["Add {{key}}: {{value}} ({{subtype}}) to \"{{headline}}\"."]
"#;

    fn library() -> TemplateLibrary {
        serde_yaml::from_str(LIBRARY).unwrap()
    }

    fn gap(field: FieldKey, value: &str) -> Gap {
        Gap {
            field,
            value: value.to_string(),
            required: false,
            placement: Placement::Body,
        }
    }

    #[test]
    fn family_field_template_honours_style() {
        let lib = library();
        let g = gap(FieldKey::Endorser, "Teachers Union");
        assert_eq!(
            select_template(&g, &lib, "campaign", "ENDORSEMENT"),
            "{{value}} proudly endorses the campaign."
        );
        // Unknown style falls back to neutral.
        assert_eq!(
            select_template(&g, &lib, "somber", "ENDORSEMENT"),
            "{{value}} has endorsed the campaign."
        );
    }

    #[test]
    fn field_block_used_outside_the_family() {
        let lib = library();
        let g = gap(FieldKey::Endorser, "Teachers Union");
        assert_eq!(select_template(&g, &lib, "campaign", "ANN"), "Endorsed by {{value}}.");

        let cta = gap(FieldKey::CallToAction, "https://x.example");
        assert_eq!(
            select_template(&cta, &lib, "campaign", "ANN"),
            "Visit {{value}} to get involved."
        );
    }

    #[test]
    fn family_default_then_global_default_then_generic() {
        let lib = library();
        let g = gap(FieldKey::Location, "Springfield");
        assert_eq!(
            select_template(&g, &lib, "neutral", "ENDORSEMENT"),
            "Endorsement note on {{key}}."
        );
        assert_eq!(
            select_template(&g, &lib, "neutral", "POLICY"),
            "Add {{key}}: {{value}} ({{subtype}}) to \"{{headline}}\"."
        );
        assert_eq!(
            select_template(&g, &TemplateLibrary::default(), "neutral", "POLICY"),
            GENERIC_TEMPLATE
        );
    }

    #[test]
    fn empty_candidate_lists_are_skipped() {
        let lib: TemplateLibrary = serde_yaml::from_str(
            r#"
fields:
  location: []
default: ["Mention {{key}}."]
"#,
        )
        .unwrap();
        let g = gap(FieldKey::Location, "Springfield");
        assert_eq!(select_template(&g, &lib, "neutral", "default"), "Mention {{key}}.");
    }

    #[test]
    fn fill_replaces_every_placeholder() {
        let subtypes = vec!["END.ORG".to_string(), "NEWS.LOCAL".to_string()];
        let ctx = FillContext {
            subtypes: &subtypes,
            headline: "Union Backs Rivera",
        };
        let g = gap(FieldKey::Location, "Springfield");
        let filled = fill_template(
            "Add {{key}}: {{value}} ({{subtype}}) to \"{{headline}}\". {{value}}!",
            &g,
            ctx,
        );
        assert_eq!(
            filled,
            "Add location: Springfield (END.ORG,NEWS.LOCAL) to \"Union Backs Rivera\". Springfield!"
        );
    }

    #[test]
    fn collaborator_prompt_has_tone_and_context_lines() {
        let lib = library();
        let subtypes = vec!["END.ORG".to_string(), "NEWS.LOCAL".to_string()];
        let prompt = collaborator_prompt(&lib, "campaign", &subtypes, "ENDORSEMENT", "Endorsed.");
        assert_eq!(
            prompt,
            "Tone: energetic and direct.\nContext subtype(s): END.ORG, NEWS.LOCAL. Primary family: ENDORSEMENT.\nEndorsed."
        );
        let plain = collaborator_prompt(&lib, "neutral", &subtypes, "ENDORSEMENT", "Endorsed.");
        assert!(plain.starts_with("\nContext subtype(s):"));
    }
}
