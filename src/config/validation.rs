use crate::config::types::{Config, CrawlerConfig, OriginConfig, OutputConfig, UserAgentConfig};
use crate::{ConfigError, ConfigResult};
use url::Url;

const MAX_WORKERS: u32 = 256;
const MAX_CONCURRENCY: u32 = 256;
const MAX_RETRY_LIMIT: u32 = 20;

/// Validates the entire configuration
///
/// An empty seed list is accepted here because seeds can be supplied after
/// the file is loaded; the coordinator enforces that at least one exists.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_origin_config(&config.origin)?;
    validate_output_config(&config.output)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.max_concurrency < 1 || config.max_concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.max_concurrency
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be greater than zero".to_string(),
        ));
    }

    if config.retry_limit < 1 || config.retry_limit > MAX_RETRY_LIMIT {
        return Err(ConfigError::Validation(format!(
            "retry_limit must be between 1 and {}, got {}",
            MAX_RETRY_LIMIT, config.retry_limit
        )));
    }

    Ok(())
}

fn validate_origin_config(config: &OriginConfig) -> ConfigResult<()> {
    if config.host.trim().is_empty() {
        return Err(ConfigError::Validation(
            "origin host cannot be empty".to_string(),
        ));
    }

    if config.port == 0 {
        return Err(ConfigError::Validation(
            "origin port cannot be zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.root.is_empty() {
        return Err(ConfigError::Validation(
            "output root cannot be empty".to_string(),
        ));
    }

    if config.index_file.is_empty() || config.index_file.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "index_file must be a plain file name, got '{}'",
            config.index_file
        )));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters, hyphens and underscores, got '{}'",
            config.crawler_name
        )));
    }

    Ok(())
}

fn validate_seeds(seeds: &[String]) -> ConfigResult<()> {
    for seed in seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Seed URL '{}' must use http or https",
                seed
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_worker_bounds() {
        let mut config = Config::default();
        config.crawler.workers = 0;
        assert!(validate(&config).is_err());

        config.crawler.workers = MAX_WORKERS + 1;
        assert!(validate(&config).is_err());

        config.crawler.workers = MAX_WORKERS;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.crawler.request_timeout_secs = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_retry_limit_bounds() {
        let mut config = Config::default();
        config.crawler.retry_limit = 0;
        assert!(validate(&config).is_err());

        config.crawler.retry_limit = 1;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_origin_validation() {
        let mut config = Config::default();
        config.origin.host = "  ".to_string();
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.origin.port = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_index_file_must_be_plain_name() {
        let mut config = Config::default();
        config.output.index_file = "nested/index.json".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_crawler_name_characters() {
        let mut config = Config::default();
        config.user_agent.crawler_name = "my crawler".to_string();
        assert!(validate(&config).is_err());

        config.user_agent.crawler_name = "my-crawler_2".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_seed_validation() {
        assert!(validate_seeds(&["http://127.0.0.1:8000/".to_string()]).is_ok());
        assert!(validate_seeds(&["ftp://127.0.0.1/".to_string()]).is_err());
        assert!(validate_seeds(&["not a url".to_string()]).is_err());
    }
}
