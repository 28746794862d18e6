use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, DEFAULT_CONFIG_FILE};
use pressroom_common::observability::init_logging;
use pressroom_config::{PressroomConfig, PressroomConfigLoader, RuleSet};
use pressroom_llm::ensure_llm_ready;
use pressroom_llm::traits::LlmClient;
use std::process::ExitCode;
use std::sync::Arc;

mod cli;
mod commands;

type SharedClient = Arc<dyn LlmClient + Send + Sync>;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Cli::parse();

    // 1) Load config (env wins)
    let loader = PressroomConfigLoader::new();
    let loader = match &args.config {
        Some(path) => loader.with_file(path),
        None => loader.with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let cfg: PressroomConfig = loader.load().context("failed to load configuration")?;

    // 2) Logging from the config's logging block
    let log_path = init_logging(cfg.logging.log_config("pressroom"))?;
    tracing::debug!(log = %log_path.display(), "logging initialised");

    let rules = RuleSet::from_config(&cfg).context("failed to load rule tables")?;

    let mut ok = true;
    let output = match args.command {
        Commands::Classify { text } => commands::classify(&commands::read_text(&text)?, &rules),
        Commands::Coherence { prose, record } => commands::coherence(
            &commands::read_text(&prose)?,
            &commands::read_record(&record)?,
            &rules,
        )?,
        Commands::Coverage { prose, record } => commands::coverage(
            &commands::read_text(&prose)?,
            &commands::read_record(&record)?,
            &rules,
        )?,
        Commands::Suggest {
            prose,
            record,
            style,
            no_llm,
        } => {
            let client = if no_llm { None } else { optional_client(&cfg).await };
            let style = style.unwrap_or_else(|| cfg.style.clone());
            commands::suggest(
                &commands::read_text(&prose)?,
                &commands::read_record(&record)?,
                &rules,
                &style,
                client.as_deref().map(|c| c as &dyn LlmClient),
            )
            .await?
        }
        Commands::Evidence {
            claim,
            url,
            excerpt,
            claim_type,
        } => commands::evidence(&claim, &url, excerpt, &claim_type, &rules)?,
        Commands::Discover { claim, claim_type } => {
            let llm_cfg = cfg
                .llm
                .as_ref()
                .context("discover needs an `llm` section in the configuration")?;
            let client = ensure_llm_ready(llm_cfg).await?;
            commands::discover(client.as_ref(), &claim, &claim_type, &rules).await?
        }
        Commands::Strategy { claim_type, claim } => {
            commands::strategy(&claim_type, claim.as_deref(), &rules)
        }
        Commands::Lint { record } => {
            let (report, passed) = commands::lint(&commands::read_record(&record)?)?;
            ok = passed;
            report
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// The configured client, or `None` (logged) when it is absent or unreachable.
async fn optional_client(cfg: &PressroomConfig) -> Option<SharedClient> {
    let llm_cfg = cfg.llm.as_ref()?;
    match ensure_llm_ready(llm_cfg).await {
        Ok(client) => {
            tracing::info!(model = client.model_name(), "using LLM for suggestions");
            Some(client)
        }
        Err(e) => {
            tracing::warn!("LLM unavailable, using literal templates: {}", e);
            None
        }
    }
}
