use pressroom_common::LlmConfig;
use pressroom_config::{ConfigLoadError, PressroomConfigLoader, RuleSet};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a file in a temp dir and return its path.
fn write_file(tmp: &TempDir, name: &str, contents: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, contents).expect("write file");
    p
}

#[test]
#[serial]
fn file_env_and_rule_tables_load_together() {
    let tmp = TempDir::new().unwrap();

    write_file(
        &tmp,
        "lexicon.yaml",
        r#"
families:
  - prefixes: ["TOWN."]
    family: MOBILIZATION
cues:
  datePublished:
    required: true
    cues: ["released"]
"#,
    );
    write_file(
        &tmp,
        "templates.yaml",
        r#"
system: "You edit press releases."
fields:
  datePublished: ["Released {{value}}."]
"#,
    );
    write_file(
        &tmp,
        "weights.json",
        r#"{ "MOBILIZATION": { "datePublished": 0.5, "Event": 0.3 } }"#,
    );
    let config_path = write_file(
        &tmp,
        "pressroom.yaml",
        r#"
version: "1"
style: neutral
llm:
  provider: proxy
  endpoint: "${PRESSROOM_TEST_PROXY}"
rules:
  lexicon: lexicon.yaml
  templates: templates.yaml
  weights: weights.json
logging:
  format: json
"#,
    );

    temp_env::with_vars(
        [
            ("PRESSROOM_TEST_PROXY", Some("http://localhost:3000/api/llm")),
            ("PRESSROOM__STYLE", Some("campaign")),
        ],
        || {
            let config = PressroomConfigLoader::new()
                .with_file(&config_path)
                .load()
                .expect("load pressroom config");

            assert_eq!(config.version.as_deref(), Some("1"));
            assert_eq!(config.style, "campaign");
            assert_eq!(config.logging.format, "json");
            match &config.llm {
                Some(LlmConfig::Proxy { endpoint, .. }) => {
                    assert_eq!(endpoint, "http://localhost:3000/api/llm")
                }
                other => panic!("expected proxy, got {other:?}"),
            }

            let rules = RuleSet::from_config(&config).expect("rule tables");
            assert_eq!(rules.lexicon.families.len(), 1);
            assert_eq!(rules.lexicon.cues.len(), 1);
            assert!(rules.lexicon.cues.contains_key("datePublished"));
            assert_eq!(rules.lexicon.claim_types.default_threshold, 0.6);
            assert!(rules.templates.fields.contains_key("datePublished"));
            let weights = rules.weights.expect("weights table");
            assert_eq!(weights["MOBILIZATION"]["datePublished"], 0.5);
        },
    );
}

#[test]
#[serial]
fn optional_file_may_be_missing() {
    let tmp = TempDir::new().unwrap();
    let config = PressroomConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("missing optional file is fine");

    assert!(config.llm.is_none());
    let rules = RuleSet::from_config(&config).unwrap();
    assert_eq!(rules.lexicon.families.len(), 8);
    assert!(rules.weights.is_none());
}

#[test]
#[serial]
fn required_file_must_exist() {
    let tmp = TempDir::new().unwrap();
    let result = PressroomConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(matches!(result, Err(ConfigLoadError::Config(_))));
}

#[test]
#[serial]
fn broken_rule_file_reports_its_path() {
    let tmp = TempDir::new().unwrap();
    write_file(&tmp, "weights.yaml", "ENDORSEMENT: [not, a, map]");
    let config_path = write_file(&tmp, "pressroom.yaml", "rules:\n  weights: weights.yaml\n");

    let config = PressroomConfigLoader::new().with_file(&config_path).load().unwrap();
    let err = RuleSet::from_config(&config).unwrap_err();
    assert!(matches!(err, ConfigLoadError::Parse { .. }));
    assert!(err.to_string().contains("weights.yaml"));
}
