use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Deck render service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP bind address
    pub bind: SocketAddr,

    /// The one template every deck is rendered from
    pub template_path: PathBuf,

    /// LibreOffice executable used for PDF conversion
    pub soffice: PathBuf,

    /// Seconds a single conversion may run before it is killed
    pub conversion_timeout_secs: u64,

    /// Log level, overridden by `RUST_LOG`
    pub log_level: String,

    /// Emit JSON logs instead of human-readable lines
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            template_path: PathBuf::from("templates/silicon_eic_template.pptx"),
            soffice: PathBuf::from("libreoffice"),
            conversion_timeout_secs: 120,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

/// CLI arguments
#[derive(Parser, Debug, Default)]
#[command(name = "deckrender")]
#[command(about = "Renders proposal decks from a PowerPoint template, as .pptx or PDF")]
pub struct Cli {
    /// Configuration file path (TOML or JSON)
    #[arg(short, long, env = "DECKRENDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// HTTP bind address
    #[arg(long, env = "DECKRENDER_BIND")]
    pub bind: Option<SocketAddr>,

    /// Template .pptx path
    #[arg(long, env = "DECKRENDER_TEMPLATE")]
    pub template: Option<PathBuf>,

    /// LibreOffice executable
    #[arg(long, env = "DECKRENDER_SOFFICE")]
    pub soffice: Option<PathBuf>,

    /// Conversion timeout in seconds
    #[arg(long, env = "DECKRENDER_CONVERSION_TIMEOUT")]
    pub conversion_timeout: Option<u64>,

    /// Log level
    #[arg(long, env = "DECKRENDER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// JSON log output
    #[arg(long, env = "DECKRENDER_LOG_JSON")]
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment, CLI args, and optional config file
    pub fn from_env() -> Result<Self> {
        Self::from_cli(Cli::parse())
    }

    pub fn from_cli(cli: Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(config_path) => {
                let config_str = std::fs::read_to_string(config_path)
                    .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
                Self::parse_file(&config_str).context("Failed to parse config file")?
            },
            None => Self::default(),
        };

        // Override with CLI args
        if let Some(bind) = cli.bind {
            config.bind = bind;
        }
        if let Some(template) = cli.template {
            config.template_path = template;
        }
        if let Some(soffice) = cli.soffice {
            config.soffice = soffice;
        }
        if let Some(timeout) = cli.conversion_timeout {
            config.conversion_timeout_secs = timeout;
        }
        if let Some(log_level) = cli.log_level {
            config.log_level = log_level;
        }
        if cli.log_json {
            config.log_json = true;
        }

        config.validate()?;

        Ok(config)
    }

    fn parse_file(contents: &str) -> Result<Self> {
        serde_json::from_str(contents)
            .or_else(|_| toml::from_str(contents))
            .map_err(anyhow::Error::from)
    }

    #[inline]
    pub fn conversion_timeout(&self) -> Duration {
        Duration::from_secs(self.conversion_timeout_secs)
    }

    /// Whether the template file is present right now.
    pub fn template_available(&self) -> bool {
        self.template_path.is_file()
    }

    fn validate(&self) -> Result<()> {
        if self.conversion_timeout_secs == 0 {
            anyhow::bail!("conversion_timeout_secs must be greater than 0");
        }

        if self.log_level.trim().is_empty() {
            anyhow::bail!("log_level must not be empty");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bind.port(), 8000);
        assert_eq!(config.conversion_timeout(), Duration::from_secs(120));
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.conversion_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "deckrender",
            "--bind",
            "127.0.0.1:9000",
            "--template",
            "/srv/template.pptx",
            "--conversion-timeout",
            "30",
            "--log-json",
        ])
        .unwrap();
        let config = Config::from_cli(cli).unwrap();

        assert_eq!(config.bind, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.template_path, PathBuf::from("/srv/template.pptx"));
        assert_eq!(config.conversion_timeout_secs, 30);
        assert!(config.log_json);
        assert_eq!(config.soffice, PathBuf::from("libreoffice"));
    }

    #[test]
    fn test_toml_file_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deckrender.toml");
        std::fs::write(
            &path,
            "soffice = \"/usr/bin/soffice\"\nconversion_timeout_secs = 45\nlog_level = \"debug\"\n",
        )
        .unwrap();

        let cli = Cli {
            config: Some(path),
            log_level: Some("warn".to_string()),
            ..Cli::default()
        };
        let config = Config::from_cli(cli).unwrap();

        assert_eq!(config.soffice, PathBuf::from("/usr/bin/soffice"));
        assert_eq!(config.conversion_timeout_secs, 45);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.bind, Config::default().bind);
    }

    #[test]
    fn test_json_file() {
        let config = Config::parse_file(r#"{"bind": "127.0.0.1:8001", "log_json": true}"#).unwrap();
        assert_eq!(config.bind.port(), 8001);
        assert!(config.log_json);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let cli = Cli {
            conversion_timeout: Some(0),
            ..Cli::default()
        };
        assert!(Config::from_cli(cli).is_err());
    }
}
