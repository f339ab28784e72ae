//! Manual poking at the Lever API. Not part of the web app.
//!
//! Reads `LEVER_API_KEY` (and optionally `LEVER_API_URL`) from the
//! environment or `.env`, prints results as pretty JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use catapult::feedback::compile_feedback_from;
use catapult::lever_client::{LeverClient, RecruitingApi, DEFAULT_API_URL};
use catapult::models::{FeedbackSubmission, NewCandidate};
use catapult::user_cache::{MemoryUserCache, UserDirectory, DEFAULT_USER_TTL};

#[derive(Parser)]
#[command(name = "lever-explore")]
#[command(about = "Inspect raw Lever API responses", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "LEVER_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    #[arg(long, env = "LEVER_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Raw feedback forms for a candidate
    Feedback {
        candidate_id: String,
        /// Print the compiled report instead of raw forms
        #[arg(long)]
        compiled: bool,
    },
    /// A single candidate
    Candidate { candidate_id: String },
    /// A single user
    User { user_id: String },
    /// Every posting for a team
    Postings { team: String },
    /// A single posting
    Posting { posting_id: String },
    /// Create a candidate, or update the existing one with the same email
    CreateCandidate {
        /// Lever user id the write is attributed to
        #[arg(long)]
        perform_as: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Vec<String>,
        #[arg(long)]
        posting: Vec<String>,
        #[arg(long)]
        tag: Vec<String>,
        #[arg(long, default_value = "")]
        location: String,
    },
    /// Submit a feedback form read from a JSON file
    PostFeedback {
        candidate_id: String,
        #[arg(long)]
        perform_as: String,
        file: PathBuf,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = LeverClient::new(&cli.api_url, cli.api_key, cli.timeout)
        .context("Failed to build Lever client")?;

    match cli.command {
        Commands::Feedback {
            candidate_id,
            compiled,
        } => {
            let records = client.list_candidate_feedback(&candidate_id).await;
            eprintln!("{} feedback forms", records.len());
            if compiled {
                let users = UserDirectory::new(
                    std::sync::Arc::new(client.clone()),
                    std::sync::Arc::new(MemoryUserCache::new()),
                    DEFAULT_USER_TTL,
                );
                print_json(&compile_feedback_from(records, &users).await)?;
            } else {
                print_json(&records)?;
            }
        }
        Commands::Candidate { candidate_id } => {
            print_json(&client.get_candidate(&candidate_id).await?)?;
        }
        Commands::User { user_id } => {
            print_json(&client.get_user(&user_id).await?)?;
        }
        Commands::Postings { team } => {
            let postings = client.list_postings(&team).await;
            eprintln!("{} postings", postings.len());
            print_json(&postings)?;
        }
        Commands::Posting { posting_id } => {
            print_json(&client.get_posting(&posting_id).await?)?;
        }
        Commands::CreateCandidate {
            perform_as,
            name,
            email,
            posting,
            tag,
            location,
        } => {
            let candidate = NewCandidate {
                name,
                headline: String::new(),
                location,
                emails: email,
                tags: tag,
                origin: None,
                owner: perform_as.clone(),
                postings: posting,
            };
            print_json(&client.create_or_update_candidate(&perform_as, &candidate).await?)?;
        }
        Commands::PostFeedback {
            candidate_id,
            perform_as,
            file,
        } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let submission: FeedbackSubmission =
                serde_json::from_str(&raw).context("Feedback file is not a valid submission")?;
            client
                .post_feedback(&candidate_id, &perform_as, &submission)
                .await?;
            eprintln!("Feedback submitted for {candidate_id}");
        }
    }

    Ok(())
}
