use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tabletalk_core::{Config, SchemaDefinition};
use tabletalk_embeddings::HttpEmbedder;
use tabletalk_executor::PgExecutor;
use tabletalk_http::{AppState, create_router};
use tabletalk_index::{Retriever, SchemaIndex};
use tabletalk_llm::generator_from_config;
use tabletalk_service::{ChatService, SchemaService, SessionStore};

#[derive(Parser)]
#[command(name = "tabletalk")]
#[command(about = "Natural-language SQL assistant over an indexed warehouse schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server.
    Serve {
        #[arg(short, long, default_value = "8080")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        /// JSON file of table definitions to index at startup.
        #[arg(short, long)]
        schemas: Option<PathBuf>,
    },
    /// Parse and validate a schema seed file without touching any backend.
    Seed { file: PathBuf },
    /// Ask a single question against an in-process pipeline and print the
    /// reply as JSON.
    Ask {
        question: String,
        /// JSON file of table definitions to index first.
        #[arg(short, long)]
        schemas: Option<PathBuf>,
    },
}

fn load_schema_file(path: &Path) -> Result<Vec<SchemaDefinition>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading schema file {}", path.display()))?;
    let definitions: Vec<SchemaDefinition> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing schema file {}", path.display()))?;
    Ok(definitions)
}

struct Services {
    chat: Arc<ChatService>,
    schemas: Arc<SchemaService>,
    sessions: Arc<SessionStore>,
    database: Arc<PgExecutor>,
}

/// Wire the full pipeline from environment configuration, seeding the
/// index from `schema_file` when given.
async fn build_services(config: &Config, schema_file: Option<&Path>) -> Result<Services> {
    let embedder = Arc::new(HttpEmbedder::new(&config.embedding_url, &config.embedding_model)?);
    let generator = generator_from_config(config)?;
    let database = Arc::new(
        PgExecutor::connect(&config.database_url, config.statement_timeout, config.max_result_rows)
            .await?,
    );

    let index = Arc::new(SchemaIndex::new());
    let sessions = Arc::new(SessionStore::new());
    let schema_service =
        Arc::new(SchemaService::new(Arc::clone(&embedder) as _, Arc::clone(&index)));

    if let Some(path) = schema_file {
        let definitions = load_schema_file(path)?;
        let total = definitions.len();
        let seeded = schema_service.seed(definitions).await;
        tracing::info!(seeded, total, "schema index seeded");
    }

    let retriever =
        Retriever::new(Arc::clone(&embedder) as _, Arc::clone(&index), config.retrieval_k);
    let chat = Arc::new(ChatService::new(
        retriever,
        generator,
        Arc::clone(&database) as _,
        Arc::clone(&sessions),
        index,
        config.history_window,
    ));

    Ok(Services { chat, schemas: schema_service, sessions, database })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host, schemas } => {
            let config = Config::from_env();
            let services = build_services(&config, schemas.as_deref()).await?;
            services.database.test_connection().await?;

            let state = Arc::new(AppState {
                chat_service: services.chat,
                schema_service: services.schemas,
                sessions: services.sessions,
                database: services.database,
            });
            let router = create_router(state);
            let addr = format!("{host}:{port}");
            tracing::info!("Starting HTTP server on {addr}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, router).await?;
        },
        Commands::Seed { file } => {
            let definitions = load_schema_file(&file)?;
            for def in &definitions {
                anyhow::ensure!(
                    !def.table_name.trim().is_empty(),
                    "definition with empty table_name in {}",
                    file.display()
                );
                anyhow::ensure!(
                    !def.columns.is_empty(),
                    "table '{}' has no columns",
                    def.table_name
                );
            }
            println!("{} table definition(s) OK", definitions.len());
        },
        Commands::Ask { question, schemas } => {
            let config = Config::from_env();
            let services = build_services(&config, schemas.as_deref()).await?;
            let reply = services.chat.chat(&question, None).await?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        },
    }

    Ok(())
}
