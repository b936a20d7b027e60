use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

use text2sql::config::{AppConfig, CliArgs};
use text2sql::db::QueryExecutor;
use text2sql::llm::Translator;
use text2sql::pipeline::Text2Sql;
use text2sql::util::logging::init_tracing;
use text2sql::web;
use text2sql::web::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = CliArgs::parse();

    // Initialize logging
    init_tracing(args.log_json);

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if !config.database.path.is_file() {
        warn!(
            "Database file {} does not exist yet; queries will fail until it does",
            config.database.path.display()
        );
    }
    if !config.database.read_only {
        warn!("Read-only mode is disabled: generated statements may modify the database");
    }

    // Initialize translation client
    info!("Initializing LLM backend: {}", config.llm.backend);
    let translator = match Translator::new(&config.llm) {
        Ok(translator) => translator,
        Err(e) => {
            error!("Failed to initialize LLM backend: {}", e);
            return Err(e.into());
        }
    };

    let executor = QueryExecutor::new(&config.database.path, config.database.read_only);
    let text2sql = Text2Sql::new(translator, executor);

    let web_config = config.web.clone();
    let app_state = Arc::new(AppState::new(config, text2sql)?);

    // Start the web server
    info!("Starting Text2SQL server on {}:{}", web_config.host, web_config.port);
    match web::run_server(web_config, app_state).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
