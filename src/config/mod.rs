pub mod toml_config;

pub use toml_config::CinemaConfig;

#[cfg(feature = "cli")]
use crate::utils::error::{CinemaError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "cinema-hub")]
#[command(about = "Look up a movie across all configured cinema providers")]
pub struct CliConfig {
    #[arg(long, default_value = "cinema-hub.toml")]
    pub config: String,

    #[arg(long, help = "Catalogue-wide movie id, without the provider prefix")]
    pub movie_id: String,

    #[arg(long, help = "Overrides service.deadline_seconds from the config file")]
    pub deadline_seconds: Option<u64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        // id 原樣比對，只拒絕空字串
        if self.movie_id.is_empty() {
            return Err(CinemaError::MissingConfigError {
                field: "movie_id".to_string(),
            });
        }
        if let Some(deadline) = self.deadline_seconds {
            validation::validate_positive_number("deadline_seconds", deadline, 1)?;
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_arguments() {
        let config = CliConfig::parse_from([
            "cinema-hub",
            "--config",
            "providers.toml",
            "--movie-id",
            "123",
            "--deadline-seconds",
            "15",
        ]);

        assert_eq!(config.config, "providers.toml");
        assert_eq!(config.movie_id, "123");
        assert_eq!(config.deadline_seconds, Some(15));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_movie_id_is_rejected() {
        let config = CliConfig::parse_from(["cinema-hub", "--movie-id", ""]);
        assert!(config.validate().is_err());

        let config = CliConfig::parse_from(["cinema-hub", "--movie-id", " "]);
        assert!(config.validate().is_ok());
    }
}
