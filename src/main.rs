use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use quill::completion::openai::OpenAiCompleter;
use quill::completion::traits::TextCompleter;
use quill::config::Config;
use quill::extract::llm::AttributeExtractor;
use quill::generate::Generator;
use quill::model::{GenerationRequest, LengthBucket};
use quill::pipeline::ingest::IngestOptions;
use quill::store::{MemoryStore, PostFilter, PostStore};

/// Quill: draft new social-media posts in the style of your own past writing.
///
/// Ingest your published posts once, then generate drafts that borrow the
/// voice of your most similar past posts.
#[derive(Parser)]
#[command(name = "quill", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Classify past posts and add them to the corpus
    Ingest {
        /// JSON file of posts (array of strings or objects with `text`/`caption`)
        #[arg(long, conflicts_with = "bluesky", required_unless_present = "bluesky")]
        file: Option<PathBuf>,

        /// Fetch posts from this Bluesky handle instead
        #[arg(long)]
        bluesky: Option<String>,

        /// Max posts to fetch from Bluesky (default: 200)
        #[arg(long, default_value = "200")]
        limit: usize,

        /// Number of posts to classify in parallel (default: 4)
        #[arg(long, default_value = "4")]
        concurrency: usize,

        /// Merge near-duplicate topic labels across the batch
        #[arg(long)]
        unify_topics: bool,
    },

    /// Generate a new post in your style
    Generate {
        /// Topic of the new post
        #[arg(long)]
        topic: Option<String>,

        /// Language of the new post (e.g. en, Hinglish)
        #[arg(long)]
        language: Option<String>,

        /// Length of the new post: short, medium or long
        #[arg(long)]
        length: Option<LengthBucket>,

        /// Max past posts to show the model as style examples (default: 3)
        #[arg(long, default_value = "3")]
        max_examples: usize,

        /// Classify this JSON file in memory and use it instead of the database
        #[arg(long)]
        corpus: Option<PathBuf>,
    },

    /// List stored posts, optionally filtered by attributes
    Posts {
        #[arg(long)]
        topic: Option<String>,

        #[arg(long)]
        language: Option<String>,

        #[arg(long)]
        length: Option<LengthBucket>,
    },

    /// Show corpus status (DB size, topic/language/length breakdown)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quill=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let config = Config::load()?;
            init_database(&config).await?;
        }

        Commands::Ingest {
            file,
            bluesky,
            limit,
            concurrency,
            unify_topics,
        } => {
            let config = Config::load()?;
            config.require_llm()?;
            let store = open_database(&config)?;

            let texts = match (file, bluesky) {
                (Some(path), _) => quill::source::json::load_posts(&path)?,
                (None, Some(handle)) => {
                    println!("Fetching up to {limit} posts from @{handle}...");
                    let client = quill::source::bluesky::BlueskyClient::new(&config.public_api_url)?;
                    quill::source::bluesky::fetch_recent_posts(&client, &handle, limit).await?
                }
                (None, None) => anyhow::bail!("Pass --file or --bluesky"),
            };

            println!("Classifying {} posts...", texts.len());
            let extractor = AttributeExtractor::new(create_completer(&config)?, config.timeout);
            let options = IngestOptions {
                concurrency,
                unify_topics,
                show_progress: true,
            };
            let report =
                quill::pipeline::ingest::run(texts, &extractor, store.as_ref(), &options).await?;
            quill::output::terminal::display_ingest_report(&report);
        }

        Commands::Generate {
            topic,
            language,
            length,
            max_examples,
            corpus,
        } => {
            let config = Config::load()?;
            config.require_llm()?;
            let completer = create_completer(&config)?;

            let store: Arc<dyn PostStore> = match corpus {
                Some(path) => {
                    let texts = quill::source::json::load_posts(&path)?;
                    println!("Classifying {} posts in memory...", texts.len());
                    let store: Arc<dyn PostStore> = Arc::new(MemoryStore::new());
                    let extractor = AttributeExtractor::new(completer.clone(), config.timeout);
                    let options = IngestOptions {
                        show_progress: true,
                        ..IngestOptions::default()
                    };
                    quill::pipeline::ingest::run(texts, &extractor, store.as_ref(), &options)
                        .await?;
                    store
                }
                None => open_database(&config)?,
            };

            let request = GenerationRequest::new(topic, language, length);
            let generator = Generator::new(completer, config.timeout);

            match quill::pipeline::compose::run(&request, max_examples, store.as_ref(), &generator)
                .await
            {
                Ok(post) => quill::output::terminal::display_generated(&post),
                Err(e) => {
                    println!("{} {}", "Generation failed:".red().bold(), e);
                    anyhow::bail!("generation failed ({})", e.kind());
                }
            }
        }

        Commands::Posts {
            topic,
            language,
            length,
        } => {
            let config = Config::load()?;
            let store = open_database(&config)?;
            let filter = PostFilter {
                topic,
                language,
                length_bucket: length,
            };
            let posts = store.filter(&filter).await?;
            quill::output::terminal::display_posts(&posts);
        }

        Commands::Status => {
            let config = Config::load()?;
            if !quill::status::database_exists(&config.db_path) {
                println!("Database: not initialized");
                println!("\nRun `quill init` to set up the database.");
                return Ok(());
            }
            let store = open_database(&config)?;
            quill::status::show(store.as_ref(), &config.db_path).await?;
        }
    }

    Ok(())
}

/// Build the text-completion client from configuration.
fn create_completer(config: &Config) -> Result<Arc<dyn TextCompleter>> {
    info!(
        base_url = %config.llm_base_url,
        model = %config.llm_model,
        temperature = config.llm_temperature,
        "Using OpenAI-compatible completer"
    );
    let completer = OpenAiCompleter::new(
        &config.llm_base_url,
        config.llm_api_key.clone(),
        config.llm_model.clone(),
    )?
    .with_temperature(config.llm_temperature);
    Ok(Arc::new(completer))
}

#[cfg(feature = "sqlite")]
async fn init_database(config: &Config) -> Result<()> {
    info!("Initializing Quill database...");
    let store = quill::store::initialize_sqlite(&config.db_path)?;
    let tables = store.table_count().await?;
    println!("Database initialized at: {}", config.db_path);
    println!("Tables created: {tables}");
    println!("\nNext: set LLM_API_KEY in your .env, then run:");
    println!("  quill ingest --file posts.json");
    Ok(())
}

#[cfg(not(feature = "sqlite"))]
async fn init_database(_config: &Config) -> Result<()> {
    anyhow::bail!(
        "This build has no database support.\n\
         Rebuild with: cargo build --features sqlite, or use `generate --corpus <file>`."
    )
}

#[cfg(feature = "sqlite")]
fn open_database(config: &Config) -> Result<Arc<dyn PostStore>> {
    let store = quill::store::open_sqlite(&config.db_path)
        .with_context(|| format!("Could not open the post store at {}", config.db_path))?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "sqlite"))]
fn open_database(_config: &Config) -> Result<Arc<dyn PostStore>> {
    anyhow::bail!(
        "This build has no database support.\n\
         Rebuild with: cargo build --features sqlite, or use `generate --corpus <file>`."
    )
}
