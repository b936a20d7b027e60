use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable holding the generative-language API credential.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    /// Reject statements that would modify the database.
    pub read_only: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub backend: String, // "gemini", "remote", or "ollama"
    pub model: String,   // Model name
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub temperature: Option<f32>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub llm: LlmConfig,
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// SQLite database file to query
    #[arg(short, long, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::from_sources(args.config.as_deref(), true)?;

        if config.llm.api_key.is_none() {
            config.llm.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        }

        config.apply_args(args);
        Ok(config)
    }

    /// Builds the layered configuration: defaults, then the file, then
    /// `TEXT2SQL__*` environment variables when `with_env` is set.
    pub fn from_sources(config_path: Option<&Path>, with_env: bool) -> Result<Self, ConfigError> {
        let mut config_builder = Config::builder()
            .set_default("database.path", "apartment_rentals.sqlite")?
            .set_default("database.read_only", true)?
            .set_default("web.host", "127.0.0.1")?
            .set_default("web.port", 3000)?
            .set_default("llm.backend", "gemini")?
            .set_default("llm.model", "gemini-pro")?
            .set_default("llm.request_timeout_secs", 60)?;

        // Add configuration from file if specified
        if let Some(config_path) = config_path {
            config_builder = config_builder.add_source(File::from(config_path));
        } else {
            // Check for config in default locations
            let default_locations = [
                "config.toml",
                "config/config.toml",
                "/etc/text2sql/config.toml",
            ];

            for location in default_locations {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    break;
                }
            }
        }

        if with_env {
            config_builder = config_builder.add_source(
                Environment::with_prefix("TEXT2SQL")
                    .prefix_separator("__")
                    .separator("__"),
            );
        }

        config_builder.build()?.try_deserialize()
    }

    /// Command line flags win over every other source.
    pub fn apply_args(&mut self, args: &CliArgs) {
        if let Some(host) = &args.host {
            self.web.host = host.clone();
        }
        if let Some(port) = args.port {
            self.web.port = port;
        }
        if let Some(database) = &args.database {
            self.database.path = database.clone();
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: PathBuf::from("apartment_rentals.sqlite"),
                read_only: true,
            },
            web: WebConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            llm: LlmConfig {
                backend: "gemini".to_string(),
                model: "gemini-pro".to_string(),
                api_key: None,
                api_url: None,
                temperature: None,
                request_timeout_secs: 60,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[database]
path = "/srv/data/rentals.sqlite"
read_only = false

[llm]
backend = "ollama"
model = "sqlcoder"
"#
        )
        .unwrap();

        let config = AppConfig::from_sources(Some(file.path()), false).unwrap();

        assert_eq!(config.database.path, PathBuf::from("/srv/data/rentals.sqlite"));
        assert!(!config.database.read_only);
        assert_eq!(config.llm.backend, "ollama");
        assert_eq!(config.llm.model, "sqlcoder");
        // untouched sections keep their defaults
        assert_eq!(config.web.port, 3000);
        assert_eq!(config.llm.request_timeout_secs, 60);
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn cli_flags_take_precedence() {
        let mut config = AppConfig::default();
        let args = CliArgs {
            host: Some("0.0.0.0".to_string()),
            port: Some(8080),
            database: Some(PathBuf::from("other.sqlite")),
            ..Default::default()
        };

        config.apply_args(&args);

        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.database.path, PathBuf::from("other.sqlite"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = AppConfig::from_sources(Some(Path::new("/nonexistent/text2sql.toml")), false);
        assert!(result.is_err());
    }
}
