use crate::config::AppConfig;
use crate::pipeline::Text2Sql;
use crate::web::templates::init_templates;
use minijinja::Environment;

/// Shared application state for the web server. Read-only after startup;
/// every request opens its own database connection.
pub struct AppState {
    pub config: AppConfig,
    pub template_env: Environment<'static>,
    pub text2sql: Text2Sql,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: AppConfig, text2sql: Text2Sql) -> Result<Self, minijinja::Error> {
        Ok(Self {
            config,
            template_env: init_templates()?,
            text2sql,
            startup_time: chrono::Utc::now(),
        })
    }
}
