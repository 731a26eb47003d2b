use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use callrisk::io::{ERROR_PREFIX, render_json, write_json};
use callrisk::models::TenantConfigInput;
use callrisk::{
    AnalysisRecord, Analyzer, AnthropicClient, AnthropicConfig, DeepgramConfig,
    DeepgramTranscriber, Pipeline, PipelineConfig, RiskVerdict, TenantConfig, build_prompt,
    list_audio_files, normalize, retrieve_policies, score, validate_filename,
};

#[derive(Parser)]
#[command(name = "callrisk")]
#[command(author, version, about = "Call transcript analysis and risk scoring", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transcribe, analyze and score one recorded call
    Analyze {
        /// Audio file name inside the files directory
        #[arg(short, long)]
        file: String,

        /// Directory holding selectable audio files
        #[arg(long, default_value = "files")]
        files_dir: PathBuf,

        /// Policy document (sections separated by blank lines)
        #[arg(long, default_value = "policies.txt")]
        policies: PathBuf,

        #[command(flatten)]
        tenant: TenantArgs,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List audio files available for analysis
    Files {
        /// Directory holding selectable audio files
        #[arg(long, default_value = "files")]
        files_dir: PathBuf,
    },

    /// Re-normalize a saved analysis and recompute its risk verdict offline
    Score {
        /// Saved analysis or report (JSON)
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        tenant: TenantArgs,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the exact prompt that would be sent for a transcript
    Prompt {
        /// Transcript text file
        #[arg(short, long)]
        transcript: PathBuf,

        /// Policy document; omitted means no policies
        #[arg(long)]
        policies: Option<PathBuf>,

        #[command(flatten)]
        tenant: TenantArgs,
    },
}

/// Tenant options; flags override values from --tenant-config
#[derive(Args)]
struct TenantArgs {
    /// JSON file with any of domain, risk_threshold, compliance_triggers
    #[arg(long)]
    tenant_config: Option<PathBuf>,

    /// Business domain used to frame the prompt
    #[arg(long)]
    domain: Option<String>,

    /// Score at which a call is high risk (0-100)
    #[arg(long)]
    risk_threshold: Option<i64>,

    /// Compliance trigger phrase (repeatable)
    #[arg(long = "trigger")]
    triggers: Vec<String>,
}

impl TenantArgs {
    fn load(self) -> Result<TenantConfig> {
        let mut input = match &self.tenant_config {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read file: {:?}", path))?;
                serde_json::from_str::<TenantConfigInput>(&content)
                    .with_context(|| format!("Failed to parse tenant config: {:?}", path))?
            }
            None => TenantConfigInput::default(),
        };

        if self.domain.is_some() {
            input.domain = self.domain;
        }
        if self.risk_threshold.is_some() {
            input.risk_threshold = self.risk_threshold;
        }
        if !self.triggers.is_empty() {
            input.compliance_triggers = Some(self.triggers);
        }

        Ok(TenantConfig::from(input))
    }
}

/// Output of the offline `score` command
#[derive(Serialize)]
struct ScoredRecord {
    #[serde(flatten)]
    analysis: AnalysisRecord,
    risk_analysis: RiskVerdict,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            files_dir,
            policies,
            tenant,
            output,
            verbose,
        } => {
            setup_logging(verbose);
            let config = PipelineConfig {
                files_dir,
                policies_path: policies,
            };
            analyze_call(&file, config, tenant.load()?, output.as_deref()).await
        }
        Commands::Files { files_dir } => {
            setup_logging(false);
            for name in list_audio_files(&files_dir)? {
                println!("{}", name);
            }
            Ok(())
        }
        Commands::Score {
            input,
            tenant,
            verbose,
        } => {
            setup_logging(verbose);
            score_saved(&input, &tenant.load()?)
        }
        Commands::Prompt {
            transcript,
            policies,
            tenant,
        } => {
            setup_logging(false);
            print_prompt(&transcript, policies.as_deref(), &tenant.load()?).await
        }
    }
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn analyze_call(
    file: &str,
    config: PipelineConfig,
    tenant: TenantConfig,
    output: Option<&Path>,
) -> Result<()> {
    validate_filename(file)?;

    let generator = AnthropicClient::from_config(AnthropicConfig::from_env()?)?;
    if generator.is_none() {
        warn!("ANTHROPIC_API_KEY not set; analysis will return an error record");
    }
    let transcriber = DeepgramTranscriber::new(DeepgramConfig::from_env()?)?;

    info!(
        "Analyzing {} for domain '{}' (threshold {})",
        file,
        tenant.domain(),
        tenant.risk_threshold()
    );
    let pipeline = Pipeline::new(transcriber, Analyzer::new(generator), config);
    let report = pipeline.handle_analysis_request(file, &tenant).await?;

    match output {
        Some(path) => {
            write_json(&report, path)?;
            info!("Report written to {:?}", path);
        }
        None => println!("{}", render_json(&report)?),
    }

    Ok(())
}

fn score_saved(input: &Path, tenant: &TenantConfig) -> Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read file: {:?}", input))?;
    let raw: serde_json::Value =
        serde_json::from_str(&content).context("Failed to parse saved analysis")?;

    let analysis = normalize(&raw);
    let risk_analysis = score(&analysis, tenant);
    info!(
        "Risk score {} ({})",
        risk_analysis.risk_score, risk_analysis.risk_level
    );

    println!(
        "{}",
        render_json(&ScoredRecord {
            analysis,
            risk_analysis,
        })?
    );
    Ok(())
}

async fn print_prompt(
    transcript: &Path,
    policies: Option<&Path>,
    tenant: &TenantConfig,
) -> Result<()> {
    let transcript = std::fs::read_to_string(transcript)
        .with_context(|| format!("Failed to read file: {:?}", transcript))?;

    let policy_text = match policies {
        Some(path) => {
            let text = retrieve_policies(&transcript, path).await;
            if text.starts_with(ERROR_PREFIX) {
                warn!("{}", text);
                String::new()
            } else {
                text
            }
        }
        None => String::new(),
    };

    print!("{}", build_prompt(&transcript, &policy_text, tenant));
    Ok(())
}
