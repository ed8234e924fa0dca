//! BrandGuard CLI
//!
//! The `brandguard` command runs guardrailed content generation and exposes
//! the individual checks for ad-hoc use.
//!
//! ## Commands
//!
//! - `run`: drive an external agent through the guardrail loop
//! - `critique`: score one channel draft
//! - `verify`: attribute claims to chunks from a corpus file
//! - `show`: reload a persisted run's bundle and audit
//! - `analyze`: summarise agent behaviour from a persisted audit

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use brandguard_core::metrics::METRICS;
use brandguard_core::obs::RunSpan;
use brandguard_core::{
    analyze_audit, read_audit_artifact, read_bundle_artifact, ClaimVerification, ClaimVerifier,
    CommandAgent, CommandAgentConfig, ContentAgent, CritiqueEngine, CritiqueReport, EventBrief,
    GuardError, GuardrailConfig, GuardrailRunner, RunAnalysis, RunnerResult,
};
use brandguard_similarity::{EmbeddingSimilarity, LexicalSimilarity, SimilarityService};
use brandguard_store::{ChunkStore, MemoryChunkStore, SurrealChunkStore};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{info, warn, Level};

const DEFAULT_ARTIFACTS_DIR: &str = ".brandguard/runs";

#[derive(Parser)]
#[command(name = "brandguard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Guardrails for generated marketing copy", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Guardrail config file (TOML)
    #[arg(long, global = true, env = "BRANDGUARD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate content for a brief and enforce the guardrails
    Run {
        /// Event brief (JSON)
        #[arg(long)]
        brief: PathBuf,

        /// Agent program to spawn
        #[arg(long)]
        agent_cmd: String,

        /// Argument passed to the agent program (repeatable)
        #[arg(long = "agent-arg", allow_hyphen_values = true)]
        agent_args: Vec<String>,

        /// Chunk corpus (JSON array); defaults to the SurrealDB store
        #[arg(long)]
        chunks: Option<PathBuf>,

        /// Use the embeddings endpoint instead of lexical similarity
        #[arg(long)]
        embeddings: bool,

        /// Directory for persisted run artifacts
        #[arg(long)]
        artifacts_dir: Option<PathBuf>,
    },

    /// Score a single channel draft
    Critique {
        #[arg(long)]
        channel: String,

        #[arg(long)]
        headline: Option<String>,

        #[arg(long)]
        body: String,

        #[arg(long)]
        cta: String,

        /// Claim declared with the draft (repeatable)
        #[arg(long = "claim")]
        claims: Vec<String>,
    },

    /// Verify claims against a chunk corpus file
    Verify {
        /// Chunk corpus (JSON array)
        #[arg(long)]
        chunks: PathBuf,

        /// Claim to verify (repeatable)
        #[arg(long = "claim", required = true)]
        claims: Vec<String>,

        /// Candidate chunk id (repeatable); defaults to every chunk in the file
        #[arg(long = "chunk-id")]
        chunk_ids: Vec<String>,

        /// Use the embeddings endpoint instead of lexical similarity
        #[arg(long)]
        embeddings: bool,
    },

    /// Show a persisted run
    Show {
        #[arg(long)]
        run: String,

        #[arg(long)]
        artifacts_dir: Option<PathBuf>,
    },

    /// Analyse agent behaviour for a persisted run
    Analyze {
        #[arg(long)]
        run: String,

        #[arg(long)]
        artifacts_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    brandguard_core::telemetry::init_tracing(cli.json, level);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            brief,
            agent_cmd,
            agent_args,
            chunks,
            embeddings,
            artifacts_dir,
        } => {
            let mut config = config;
            if artifacts_dir.is_some() {
                config.runner.artifacts_dir = artifacts_dir;
            }
            if config.runner.artifacts_dir.is_none() {
                config.runner.artifacts_dir = Some(PathBuf::from(DEFAULT_ARTIFACTS_DIR));
            }
            let agent = CommandAgentConfig {
                program: agent_cmd,
                args: agent_args,
                working_dir: None,
            };

            let (cancel_tx, cancel_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupt received, cancelling run");
                    let _ = cancel_tx.send(true);
                }
            });

            let result = cmd_run(
                config,
                &brief,
                agent,
                chunks.as_deref(),
                embeddings,
                cancel_rx,
            )
            .await?;
            print_json(&result)?;
            METRICS.flush();

            if !result.success {
                anyhow::bail!(
                    "guardrails not satisfied after {} iteration(s): {}",
                    result.iterations,
                    result.flags.join(", ")
                );
            }
            Ok(())
        }
        Commands::Critique {
            channel,
            headline,
            body,
            cta,
            claims,
        } => {
            let report = cmd_critique(&config, &channel, headline.as_deref(), &body, &cta, &claims);
            print_json(&report)
        }
        Commands::Verify {
            chunks,
            claims,
            chunk_ids,
            embeddings,
        } => {
            let results = cmd_verify(&config, &chunks, &claims, &chunk_ids, embeddings).await?;
            print_json(&results)
        }
        Commands::Show { run, artifacts_dir } => {
            let dir = artifacts_dir_or_default(&config, artifacts_dir);
            let shown = cmd_show(&dir, &run)?;
            print_json(&shown)
        }
        Commands::Analyze { run, artifacts_dir } => {
            let dir = artifacts_dir_or_default(&config, artifacts_dir);
            let analysis = cmd_analyze(&dir, &run)?;
            print_json(&analysis)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Config file (if given) with `BRANDGUARD_*` environment overrides on top.
fn load_config(path: Option<&Path>) -> Result<GuardrailConfig> {
    match path {
        Some(path) => {
            let mut config = GuardrailConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            config.apply_env()?;
            config.validate()?;
            Ok(config)
        }
        None => GuardrailConfig::from_env().context("Invalid BRANDGUARD_* environment"),
    }
}

fn artifacts_dir_or_default(config: &GuardrailConfig, flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| config.runner.artifacts_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR))
}

fn similarity_service(embeddings: bool) -> Result<Arc<dyn SimilarityService>> {
    if embeddings {
        let service =
            EmbeddingSimilarity::from_env().context("Failed to configure embeddings endpoint")?;
        Ok(Arc::new(service))
    } else {
        Ok(Arc::new(LexicalSimilarity))
    }
}

async fn chunk_store(chunks: Option<&Path>) -> Result<Arc<dyn ChunkStore>> {
    match chunks {
        Some(path) => {
            let store = MemoryChunkStore::from_json_file(path)
                .with_context(|| format!("Failed to load chunks from {}", path.display()))?;
            Ok(Arc::new(store))
        }
        None => {
            let store = SurrealChunkStore::from_env()
                .await
                .context("Failed to connect to chunk store")?;
            Ok(Arc::new(store))
        }
    }
}

async fn cmd_run(
    config: GuardrailConfig,
    brief_path: &Path,
    agent: CommandAgentConfig,
    chunks: Option<&Path>,
    embeddings: bool,
    cancel: watch::Receiver<bool>,
) -> Result<RunnerResult> {
    let raw = std::fs::read(brief_path)
        .with_context(|| format!("Failed to read brief {}", brief_path.display()))?;
    let brief: EventBrief = serde_json::from_slice(&raw).context("Brief is not valid JSON")?;
    brief.validate()?;

    let verifier = ClaimVerifier::new(chunk_store(chunks).await?, similarity_service(embeddings)?)
        .with_config(config.verifier.clone());
    let agent: Arc<dyn ContentAgent> = Arc::new(CommandAgent::new(agent));
    let runner = GuardrailRunner::new(agent, config.runner.clone())
        .with_critique(CritiqueEngine::new(config.critique.clone()))
        .with_verifier(verifier);

    info!(event_title = %brief.event_title, channels = brief.channels.len(), "starting guardrail run");
    Ok(runner.run_with_cancel(brief, cancel).await)
}

fn cmd_critique(
    config: &GuardrailConfig,
    channel: &str,
    headline: Option<&str>,
    body: &str,
    cta: &str,
    claims: &[String],
) -> CritiqueReport {
    CritiqueEngine::new(config.critique.clone()).critique(channel, headline, body, cta, claims)
}

async fn cmd_verify(
    config: &GuardrailConfig,
    chunks: &Path,
    claims: &[String],
    chunk_ids: &[String],
    embeddings: bool,
) -> Result<Vec<ClaimVerification>> {
    let store = MemoryChunkStore::from_json_file(chunks)
        .with_context(|| format!("Failed to load chunks from {}", chunks.display()))?;
    let ids = if chunk_ids.is_empty() {
        store.all_ids()
    } else {
        chunk_ids.to_vec()
    };

    let verifier = ClaimVerifier::new(Arc::new(store), similarity_service(embeddings)?)
        .with_config(config.verifier.clone());
    Ok(verifier.verify(claims, &ids).await)
}

#[derive(Debug, Serialize)]
struct ShownRun {
    run_id: String,
    bundle: Option<brandguard_core::ContentBundle>,
    audit: brandguard_core::AuditLog,
}

fn cmd_show(dir: &Path, run_id: &str) -> Result<ShownRun> {
    let _span = RunSpan::enter(run_id);
    let audit = read_audit_artifact(run_id, dir)
        .with_context(|| format!("Failed to read audit for run {}", run_id))?;
    let bundle = match read_bundle_artifact(run_id, dir) {
        Ok(bundle) => Some(bundle),
        Err(GuardError::ArtifactNotFound(_)) => None,
        Err(e) => return Err(e).context("Failed to read bundle"),
    };
    Ok(ShownRun {
        run_id: run_id.to_string(),
        bundle,
        audit,
    })
}

fn cmd_analyze(dir: &Path, run_id: &str) -> Result<RunAnalysis> {
    let _span = RunSpan::enter(run_id);
    let audit = read_audit_artifact(run_id, dir)
        .with_context(|| format!("Failed to read audit for run {}", run_id))?;
    Ok(analyze_audit(&audit))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = r#"[
        {"id": "chunk_customers", "text": "Acme Cloud is trusted by over 18,000 customers worldwide.", "source": "facts.md"},
        {"id": "chunk_security", "text": "The platform is SOC 2 certified.", "source": "security.md"}
    ]"#;

    #[test]
    fn parses_run_with_repeated_agent_args() {
        let cli = Cli::try_parse_from([
            "brandguard",
            "run",
            "--brief",
            "brief.json",
            "--agent-cmd",
            "python3",
            "--agent-arg",
            "agent.py",
            "--agent-arg",
            "--fast",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { agent_args, .. } => assert_eq!(agent_args, vec!["agent.py", "--fast"]),
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn verify_requires_a_claim() {
        assert!(Cli::try_parse_from(["brandguard", "verify", "--chunks", "c.json"]).is_err());
    }

    #[test]
    fn critique_uses_config_tables() {
        let report = cmd_critique(
            &GuardrailConfig::default(),
            "web",
            None,
            &"A".repeat(400),
            "Register now",
            &[],
        );
        assert!(!report.passed);
        assert!(!report.length_ok);
    }

    #[tokio::test]
    async fn verify_defaults_to_every_chunk() {
        let tmp = tempfile::tempdir().unwrap();
        let chunks = tmp.path().join("chunks.json");
        std::fs::write(&chunks, CORPUS).unwrap();

        let results = cmd_verify(
            &GuardrailConfig::default(),
            &chunks,
            &["Acme Cloud is trusted by over 18,000 customers".to_string()],
            &[],
            false,
        )
        .await
        .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].supported);
        assert_eq!(results[0].source_id.as_deref(), Some("chunk_customers"));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/brandguard.toml"))).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_show_and_analyze_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let chunks = tmp.path().join("chunks.json");
        std::fs::write(&chunks, CORPUS).unwrap();

        let brief = tmp.path().join("brief.json");
        std::fs::write(
            &brief,
            r#"{"event_title": "AI Summit", "event_description": "Talks", "channels": ["web"]}"#,
        )
        .unwrap();

        let agent_out = tmp.path().join("agent_out.json");
        std::fs::write(
            &agent_out,
            r#"{
                "bundle": {
                    "event_title": "AI Summit",
                    "content": {"web": {"body": "Join your team and learn together.", "cta": "Register now"}},
                    "scorecard": {},
                    "claims_table": [{"claim": "Acme Cloud is trusted by over 18,000 customers"}]
                },
                "audit": {
                    "started_at": "2026-01-01T00:00:00Z",
                    "tool_calls": [
                        {"timestamp": "2026-01-01T00:00:01Z", "tool": "mcp__brandguard__retrieve_context"},
                        {"timestamp": "2026-01-01T00:00:02Z", "tool": "mcp__brandguard__verify_claims"}
                    ]
                },
                "retrieved_chunk_ids": ["chunk_customers", "chunk_security"]
            }"#,
        )
        .unwrap();

        let mut config = GuardrailConfig::default();
        let artifacts = tmp.path().join("runs");
        config.runner.artifacts_dir = Some(artifacts.clone());

        let agent = CommandAgentConfig::new("sh")
            .arg("-c")
            .arg(format!("cat > /dev/null; cat '{}'", agent_out.display()));
        let (_tx, rx) = watch::channel(false);

        let result = cmd_run(config, &brief, agent, Some(&chunks), false, rx)
            .await
            .unwrap();
        assert!(result.success, "flags: {:?}", result.flags);

        let shown = cmd_show(&artifacts, &result.run_id).unwrap();
        assert_eq!(shown.bundle.as_ref(), result.result.as_ref());
        assert_eq!(shown.audit, result.audit_log);

        let analysis = cmd_analyze(&artifacts, &result.run_id).unwrap();
        assert_eq!(
            analysis.tool_sequence,
            vec!["retrieve_context", "verify_claims"]
        );
    }
}
