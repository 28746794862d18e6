//! Loader for Pressroom configuration with YAML + environment overlays.
//!
//! `pressroom.yaml` names the text-generation collaborator, the default
//! suggestion style, logging settings and the paths of three rule files:
//! the lexicon (keyword/cue/reliability tables), the template library and
//! the coverage weight table. Later sources win: files in the order given,
//! inline YAML, then `PRESSROOM__`-prefixed environment variables
//! (`PRESSROOM__STYLE=campaign`). String values may reference `${VAR}`.
//!
//! Rule files are read with `serde_yaml` directly so mixed-case keys such
//! as `datePublished` survive untouched; JSON files work as well.
use config::{Config, ConfigError, Environment, File};
use pressroom_common::observability::{LogConfig, LogFormat};
use pressroom_common::{LlmConfig, PressroomError};
use pressroom_core::{Lexicon, TemplateLibrary, WeightTable};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
pub const DEFAULT_STYLE: &str = "neutral";

#[derive(thiserror::Error, Debug)]
pub enum ConfigLoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rule file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl From<ConfigLoadError> for PressroomError {
    fn from(e: ConfigLoadError) -> Self {
        PressroomError::Config(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct PressroomConfig {
    pub version: Option<String>,
    #[serde(default)]
    pub llm: Option<LlmConfig>,
    #[serde(default)]
    pub rules: RuleSources,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Directory of the first config file; relative rule paths resolve
    /// against it.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

fn default_style() -> String {
    DEFAULT_STYLE.into()
}

/// Paths of the swappable rule tables. Absent entries use built-in defaults.
#[derive(Debug, Default, Deserialize)]
pub struct RuleSources {
    #[serde(default)]
    pub lexicon: Option<PathBuf>,
    #[serde(default)]
    pub templates: Option<PathBuf>,
    #[serde(default)]
    pub weights: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub stderr: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: None,
            format: default_log_format(),
            filter: default_log_filter(),
            stderr: false,
        }
    }
}

fn default_log_format() -> String {
    "text".into()
}
fn default_log_filter() -> String {
    "info".into()
}

impl LoggingSettings {
    pub fn log_config(&self, app_name: &'static str) -> LogConfig {
        LogConfig {
            app_name,
            log_dir: self.dir.clone(),
            emit_stderr: self.stderr,
            format: LogFormat::from_name(&self.format),
            default_filter: self.filter.clone(),
        }
    }
}

/// Resolved rule tables ready to hand to the core.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub lexicon: Lexicon,
    pub templates: TemplateLibrary,
    pub weights: Option<WeightTable>,
}

impl RuleSet {
    /// Load every table named in `config.rules`, defaulting the rest.
    pub fn from_config(config: &PressroomConfig) -> Result<Self, ConfigLoadError> {
        let resolve = |p: &PathBuf| match &config.base_dir {
            Some(base) if p.is_relative() => base.join(p),
            _ => p.clone(),
        };
        let rules = &config.rules;

        let lexicon = match &rules.lexicon {
            Some(p) => load_lexicon(resolve(p))?,
            None => Lexicon::builtin().clone(),
        };
        let templates = match &rules.templates {
            Some(p) => load_templates(resolve(p))?,
            None => TemplateLibrary::default(),
        };
        let weights = rules.weights.as_ref().map(|p| load_weights(resolve(p))).transpose()?;

        tracing::debug!(
            lexicon = ?rules.lexicon,
            templates = ?rules.templates,
            weights = ?rules.weights,
            "loaded rule set"
        );
        Ok(Self {
            lexicon,
            templates,
            weights,
        })
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            lexicon: Lexicon::builtin().clone(),
            templates: TemplateLibrary::default(),
            weights: None,
        }
    }
}

/// Rule tables; tables missing from the file keep their defaults.
pub fn load_lexicon<P: AsRef<Path>>(path: P) -> Result<Lexicon, ConfigLoadError> {
    read_rule_file(path.as_ref())
}

pub fn load_templates<P: AsRef<Path>>(path: P) -> Result<TemplateLibrary, ConfigLoadError> {
    read_rule_file(path.as_ref())
}

pub fn load_weights<P: AsRef<Path>>(path: P) -> Result<WeightTable, ConfigLoadError> {
    read_rule_file(path.as_ref())
}

fn read_rule_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigLoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&raw).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct PressroomConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    base_dir: Option<PathBuf>,
}

impl Default for PressroomConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PressroomConfigLoader {
    /// Start with `PRESSROOM__` env overrides only.
    ///
    /// ```
    /// use pressroom_config::PressroomConfigLoader;
    ///
    /// let config = PressroomConfigLoader::new()
    ///     .with_yaml_str("version: '1'\nstyle: campaign")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.style, "campaign");
    /// assert!(config.llm.is_none());
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            base_dir: None,
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Self {
        self.add_file(path.as_ref(), true)
    }

    /// Like [`Self::with_file`], but a missing file is skipped so deployments
    /// can rely purely on environment variables.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Self {
        self.add_file(path.as_ref(), false)
    }

    fn add_file(mut self, path: &Path, required: bool) -> Self {
        if self.base_dir.is_none() {
            self.base_dir = path.parent().map(Path::to_path_buf);
        }
        self.builder = self.builder.add_source(File::from(path).required(required));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// Environment overrides are applied last, then `${VAR}` placeholders are
    /// expanded (recursively, up to a fixed depth).
    ///
    /// ```
    /// use pressroom_common::LlmConfig;
    /// use pressroom_config::PressroomConfigLoader;
    ///
    /// unsafe { std::env::set_var("EDITOR_PROXY_HOST", "proxy.internal"); }
    ///
    /// let config = PressroomConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// llm:
    ///   provider: "proxy"
    ///   endpoint: "http://${EDITOR_PROXY_HOST}/api/llm"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// match &config.llm {
    ///     Some(LlmConfig::Proxy { endpoint, model }) => {
    ///         assert_eq!(endpoint, "http://proxy.internal/api/llm");
    ///         assert!(model.is_none());
    ///     }
    ///     other => panic!("expected proxy configuration, got {other:?}"),
    /// }
    ///
    /// unsafe { std::env::remove_var("EDITOR_PROXY_HOST"); }
    /// ```
    pub fn load(self) -> Result<PressroomConfig, ConfigLoadError> {
        let cfg = self
            .builder
            .add_source(Environment::with_prefix("PRESSROOM").separator("__"))
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let mut typed: PressroomConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.base_dir = self.base_dir;

        Ok(typed)
    }
}
