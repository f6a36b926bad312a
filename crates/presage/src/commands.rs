//! presage command implementations

use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;

use presage_agent::tools::{register_default_tools, PortalSession};
use presage_agent::{Assistant, ChatPlanner, Executor, ToolRegistry};
use presage_config::Config;
use presage_index::{Ingestor, ProviderEmbedder, VectorStore};
use presage_provider::{OpenAiProvider, Provider};
use presage_session::ConversationStore;

/// Initialize config and data directories
pub async fn init_command() -> Result<()> {
    let config = presage_config::init().await?;
    println!("Config ready at {:?}", presage_config::config_path());
    if !config.has_api_key() {
        println!("Set an API key in the config file before chatting.");
    }
    Ok(())
}

fn build_provider(config: &Config) -> Result<Arc<dyn Provider>> {
    let api_key = config
        .api_key()
        .context("No API key configured. Set one in ~/.presage/config.json")?;
    Ok(Arc::new(OpenAiProvider::new(
        api_key,
        config.api_base(),
        Some(config.default_model()),
    )))
}

fn build_assistant(config: &Config) -> Result<Assistant> {
    let provider = build_provider(config)?;

    let mut registry = ToolRegistry::new();
    register_default_tools(&mut registry, config, provider.clone());
    let registry = Arc::new(registry);

    let planner = ChatPlanner::new(
        provider.clone(),
        config.default_model(),
        registry.descriptors(),
    )
    .with_sampling(config.assistant.max_tokens, config.assistant.temperature);

    let executor = Executor::new(registry, Box::new(planner))
        .with_max_steps(config.assistant.max_steps);

    let store = ConversationStore::new(presage_config::sessions_dir());

    Ok(Assistant::new(
        executor,
        store,
        provider,
        config.assistant.clone(),
    ))
}

/// Chat with the assistant
pub async fn chat_command(message: Option<String>, conversation: String) -> Result<()> {
    let config = Config::load().await?;
    let assistant = build_assistant(&config)?;

    if let Some(msg) = message {
        let reply = assistant.process(&conversation, &msg).await;
        println!("\n{}", reply);
        return Ok(());
    }

    println!("Interactive mode (type 'exit' to quit)");
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        let reply = assistant.process(&conversation, input).await;
        println!("\n{}\n", reply);
    }

    Ok(())
}

/// Ingest a file or URL into the vector index
pub async fn ingest_command(
    file: Option<String>,
    url: Option<String>,
    collection: String,
) -> Result<()> {
    let config = Config::load().await?;
    let provider = build_provider(&config)?;
    let embedder = ProviderEmbedder::new(provider);

    let ingestor = Ingestor::new(
        presage_config::index_dir(),
        presage_config::documents_dir(),
    );

    let report = match (file, url) {
        (Some(file), None) => {
            ingestor
                .ingest_path(std::path::Path::new(&file), &collection, &embedder)
                .await?
        }
        (None, Some(url)) => ingestor.ingest_url(&url, &collection, &embedder).await?,
        _ => anyhow::bail!("Provide exactly one of --file or --url"),
    };

    println!(
        "Indexed {} chunks from {} into {}",
        report.chunks_added, report.source, report.collection
    );
    Ok(())
}

/// Save a knowledge-portal access token
pub async fn login_command() -> Result<()> {
    println!("Paste your knowledge-portal access token (input hidden):");
    let token = rpassword::read_password()?;
    let token = token.trim().to_string();
    if token.is_empty() {
        anyhow::bail!("Empty token");
    }

    let session = PortalSession {
        access_token: token,
    };
    session
        .save(&presage_config::portal_session_path())
        .await?;
    println!("Portal session saved");
    Ok(())
}

/// Show configuration and index status
pub async fn status_command() -> Result<()> {
    let config = Config::load().await?;

    println!("presage status");
    println!("--------------");
    println!(
        "API key: {}",
        if config.has_api_key() { "[set]" } else { "[not set]" }
    );
    println!("Model: {}", config.default_model());
    println!("Max steps per turn: {}", config.assistant.max_steps);
    println!(
        "Require firmware version: {}",
        config.assistant.require_version
    );
    println!(
        "Portal session: {}",
        if presage_config::portal_session_path().exists() {
            "[saved]"
        } else {
            "[not saved]"
        }
    );

    let store = VectorStore::new(presage_config::index_dir());
    let collections = store.list().await;
    if collections.is_empty() {
        println!("Index collections: none");
    } else {
        println!("Index collections:");
        for name in collections {
            println!("  {}", name);
        }
    }

    Ok(())
}
