use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use luminos_common::Config;
use luminos_llm::Claude;
use luminos_triage::judge::{ClaudeIncidentJudge, ClaudePhotoJudge};
use luminos_triage::validation::load_photo;
use luminos_triage::{rewards, CollectionEngine, MemoryIssueStore, ReportValidator};

#[derive(Parser)]
#[command(name = "luminos", about = "Issue triage tools for TheLumiNos")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Group issues into same-incident collections.
    Group {
        /// JSON array of issues.
        #[arg(long)]
        issues: PathBuf,
        /// Assign only this issue instead of rebuilding everything.
        #[arg(long)]
        issue: Option<Uuid>,
        /// Write the updated issues back to the file.
        #[arg(long)]
        write: bool,
    },
    /// Check whether a photo plausibly matches a description.
    Validate {
        #[arg(long)]
        description: String,
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Print the citizen reward leaderboard.
    Leaderboard {
        #[arg(long)]
        issues: PathBuf,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("luminos=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    config.log_redacted();

    let claude = config
        .llm_enabled()
        .then(|| Claude::new(&config.anthropic_api_key, &config.anthropic_model));

    match cli.command {
        Command::Group {
            issues,
            issue,
            write,
        } => {
            let store = Arc::new(MemoryIssueStore::load_json(&issues).await?);
            let mut engine = CollectionEngine::new(store.clone(), config.collection.clone());
            if let Some(claude) = claude {
                engine = engine.with_judge(Arc::new(ClaudeIncidentJudge::new(claude)));
            }

            match issue {
                Some(id) => {
                    let head = engine.assign(id).await?;
                    println!("{}", serde_json::json!({ "issue": id, "same_collection": head }));
                }
                None => {
                    let stats = engine.rebuild().await?;
                    for issue in store.snapshot().await {
                        if let Some(head) = issue.same_collection {
                            println!("{} -> {}", issue.id, head);
                        }
                    }
                    println!(
                        "{} issues, {} collections, {} grouped, {} unlocatable",
                        stats.issues, stats.collections, stats.grouped, stats.unlocatable
                    );
                }
            }

            if write {
                store.save_json(&issues).await?;
                info!(path = %issues.display(), "Wrote updated issues");
            }
        }
        Command::Validate { description, photo } => {
            let validator = match claude {
                Some(claude) => ReportValidator::with_vision(Arc::new(ClaudePhotoJudge::new(claude))),
                None => ReportValidator::keyword_only(),
            };
            let photo = match photo {
                Some(path) => Some(load_photo(&path).await?),
                None => None,
            };
            let verdict = validator.validate(&description, photo.as_ref()).await;
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        Command::Leaderboard { issues, limit } => {
            let store = MemoryIssueStore::load_json(&issues).await?;
            let board = rewards::leaderboard(&store.snapshot().await, limit);
            for entry in board {
                println!(
                    "{:>3}. {}  {:>5} pts  ({} reports, {} confirmed)",
                    entry.rank, entry.reporter_id, entry.points, entry.reports, entry.confirmed
                );
            }
        }
    }

    Ok(())
}
