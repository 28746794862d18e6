use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "pressroom.yaml";

#[derive(Parser, Debug)]
#[command(name = "pressroom", version, about = "Press release coherence and evidence toolkit")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "PRESSROOM_CONFIG",
        help = "Configuration file (defaults to ./pressroom.yaml when present)"
    )]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect the document type and subtype of a text.
    Classify { text: PathBuf },
    /// List record fields the prose does not mention.
    Coherence { prose: PathBuf, record: PathBuf },
    /// Weighted share of record fields covered by the prose.
    Coverage { prose: PathBuf, record: PathBuf },
    /// Suggest a sentence for every gap.
    Suggest {
        prose: PathBuf,
        record: PathBuf,
        #[arg(long, help = "Template style (defaults to the configured style)")]
        style: Option<String>,
        #[arg(long, default_value_t = false, help = "Use literal templates even when an LLM is configured")]
        no_llm: bool,
    },
    /// Score how well a source supports a claim.
    Evidence {
        #[arg(long)]
        claim: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        excerpt: Option<String>,
        #[arg(long, default_value = "factual_claim")]
        claim_type: String,
    },
    /// Ask the configured LLM for a source, then score it.
    Discover {
        #[arg(long)]
        claim: String,
        #[arg(long, default_value = "factual_claim")]
        claim_type: String,
    },
    /// Where to look for evidence of a claim type.
    Strategy {
        #[arg(long)]
        claim_type: String,
        #[arg(long)]
        claim: Option<String>,
    },
    /// Check a record against its own article body.
    Lint { record: PathBuf },
}
