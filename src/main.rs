//! # Folio CLI (`folio`)
//!
//! The `folio` binary runs the HTTP server and exposes the content and AI
//! pipelines for local use.
//!
//! ## Usage
//!
//! ```bash
//! folio --config ./config/folio.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `folio init` | Create the SQLite database and run schema migrations |
//! | `folio serve` | Start the HTTP API server |
//! | `folio seed <file>` | Replace all content with a TOML seed file |
//! | `folio knowledge` | Print the assistant's knowledge base |
//! | `folio context <slug>` | Print the focused context for one project |
//! | `folio ask "<question>"` | Ask the assistant a question |
//! | `folio extract <readme> --repo <name>` | Extract a project record from a README |
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `info`).

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use folio::assistant::{AiService, AskRequest};
use folio::{config, db, extract, github, knowledge, migrate, seed, server};

/// Folio CLI: portfolio content service with an AI assistant.
#[derive(Parser)]
#[command(
    name = "folio",
    about = "Folio: portfolio content service with an AI knowledge-base assistant",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/folio.toml`.
    #[arg(long, global = true, default_value = "./config/folio.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all tables. Idempotent.
    Init,

    /// Start the HTTP API server.
    Serve,

    /// Replace all content records with the contents of a TOML seed file.
    Seed {
        /// Seed file with `[[projects]]`, `[[experience]]`, `[[skills]]`
        /// and `[[journey]]` tables.
        file: PathBuf,
    },

    /// Print the knowledge base the assistant is grounded on.
    Knowledge {
        /// Print the full knowledge context as JSON instead of the summary.
        #[arg(long)]
        json: bool,
    },

    /// Print the focused context for a project. Prints nothing if the slug
    /// is unknown.
    Context {
        slug: String,
    },

    /// Ask the assistant a question.
    Ask {
        question: String,

        /// Slug of a project to focus the answer on.
        #[arg(long)]
        project: Option<String>,

        /// Message to send instead of the question.
        #[arg(long)]
        context: Option<String>,
    },

    /// Extract a structured project record from a README file.
    Extract {
        /// Path to the README.
        readme: PathBuf,

        /// Repository name (used for the slug and the fallback title).
        #[arg(long)]
        repo: String,

        /// Upsert the extracted project into the database.
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Seed { file } => {
            let seed_file = seed::load_seed(&file)?;
            let pool = open_pool(&cfg).await?;
            let report = seed::apply_seed(&pool, seed_file).await?;
            pool.close().await;
            println!(
                "Seeded {} projects, {} experience entries, {} skills, {} journey points, \
                 {} roles.",
                report.projects,
                report.experience,
                report.skills,
                report.journey,
                report.roles
            );
        }
        Commands::Knowledge { json } => {
            let pool = open_pool(&cfg).await?;
            let kb = knowledge::build_knowledge_base(&pool, &cfg.profile).await?;
            pool.close().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&kb)?);
            } else {
                println!("{}", kb.summary);
            }
        }
        Commands::Context { slug } => {
            let pool = open_pool(&cfg).await?;
            let ctx = knowledge::get_project_context(&pool, &slug).await?;
            pool.close().await;
            if !ctx.is_empty() {
                println!("{}", ctx);
            }
        }
        Commands::Ask {
            question,
            project,
            context,
        } => {
            let pool = open_pool(&cfg).await?;
            let ai = AiService::from_config(&cfg.ai, &cfg.profile);
            let request = AskRequest {
                user_question: question,
                context,
                project_id: project,
            };
            let answer = ai.generate_response(&pool, &request).await;
            pool.close().await;
            println!("{}", answer);
        }
        Commands::Extract { readme, repo, save } => {
            let text = std::fs::read_to_string(&readme)
                .with_context(|| format!("Failed to read README: {}", readme.display()))?;
            let ai = AiService::from_config(&cfg.ai, &cfg.profile);
            let mut fields =
                extract::parse_readme_to_project(ai.chain(), ai.settings(), &text, &repo).await;

            if save {
                let pool = open_pool(&cfg).await?;
                let project = github::store_extracted(&pool, &mut fields, &repo, None).await?;
                pool.close().await;
                eprintln!("Saved project '{}' ({})", project.title, project.slug);
            }
            println!("{}", serde_json::to_string_pretty(&fields)?);
        }
    }

    Ok(())
}

/// Connects and makes sure the schema exists.
async fn open_pool(cfg: &config::Config) -> anyhow::Result<sqlx::SqlitePool> {
    let pool = db::connect(cfg).await?;
    migrate::apply(&pool).await?;
    Ok(pool)
}
