use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use gleaner::config::load_config;
///
/// let config = load_config(Path::new("gleaner.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
///
/// Every section and key is optional; missing values take their defaults.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Loads the configuration file if one was given, otherwise the defaults
pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
max-depth = 1
concurrency-limit = 2
fetch-timeout-ms = 5000

[content]
text = true
images = false
links = true
videos = false

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"

[output]
format = "csv"
file-name = "pages"

[scope]
allowed-domains = ["*.example.com"]
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.max_depth, 1);
        assert_eq!(config.crawler.concurrency_limit, 2);
        assert_eq!(config.crawler.fetch_timeout_ms, 5000);
        // Unspecified keys keep their defaults
        assert_eq!(config.crawler.max_attempts, 3);
        assert_eq!(config.crawler.text_limit, 1000);
        assert_eq!(config.crawler.max_body_bytes, 5 * 1024 * 1024);
        assert!(config.content.text);
        assert!(!config.content.images);
        assert!(!config.content.videos);
        assert_eq!(config.user_agent.crawler_name, "TestCrawler");
        assert_eq!(config.output.format, "csv");
        assert_eq!(config.output.directory, ".");
        assert_eq!(config.scope.allowed_domains, vec!["*.example.com"]);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.crawler.max_depth, 3);
        assert_eq!(config.crawler.concurrency_limit, 5);
        assert_eq!(config.crawler.backoff_base_ms, 1000);
        assert!(config.content.links);
        assert_eq!(config.output.file_name, "scrape_result");
        assert!(config.scope.allowed_domains.is_empty());
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/gleaner.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[crawler]
concurrency-limit = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = load_or_default(None).unwrap();
        assert_eq!(config.crawler.fetch_timeout_ms, 10_000);
    }
}
