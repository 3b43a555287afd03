use crate::config::types::{Config, CrawlerConfig, DictionaryConfig, OutputConfig, SourceConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_dictionary_config(&config.dictionary)?;
    validate_crawler_config(&config.crawler)?;
    validate_source_config(&config.source)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates dictionary configuration
fn validate_dictionary_config(config: &DictionaryConfig) -> Result<(), ConfigError> {
    if config.word_file.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "word_file cannot be empty".to_string(),
        ));
    }

    if config.max_phrase_length < 1 || config.max_phrase_length > 32 {
        return Err(ConfigError::Validation(format!(
            "max_phrase_length must be between 1 and 32, got {}",
            config.max_phrase_length
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_pages < 1 || config.max_concurrent_pages > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_pages must be between 1 and 100, got {}",
            config.max_concurrent_pages
        )));
    }

    if config.request_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be >= 100ms, got {}ms",
            config.request_timeout_ms
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.capture_matches && config.capture_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "capture_dir cannot be empty when capture_matches is enabled".to_string(),
        ));
    }

    Ok(())
}

/// Validates upstream source configuration
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    validate_http_url("base_url", &config.base_url)?;

    if config.page_size < 1 || config.page_size > 1000 {
        return Err(ConfigError::Validation(format!(
            "page_size must be between 1 and 1000, got {}",
            config.page_size
        )));
    }

    if config.requests_per_second < 1 {
        return Err(ConfigError::Validation(format!(
            "requests_per_second must be >= 1, got {}",
            config.requests_per_second
        )));
    }

    if !config.url_template.contains("{id}") {
        return Err(ConfigError::InvalidPattern(format!(
            "url_template '{}' must contain the {{id}} placeholder",
            config.url_template
        )));
    }

    let sample = config.url_template.replace("{id}", "aaaaa-aa");
    validate_http_url("url_template", &sample)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.database_path {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "database_path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use the http or https scheme",
            field, value
        )));
    }

    Ok(())
}

/// Validates the entries of an interesting-domains list
///
/// Entries may be a full host, a registrable domain or a bare TLD, with an
/// optional `*.` prefix.
pub fn validate_domains(domains: &[String]) -> Result<(), ConfigError> {
    for domain in domains {
        validate_domain_pattern(domain)?;
    }
    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    let domain = pattern.strip_prefix("*.").unwrap_or(pattern);
    let domain = domain.strip_suffix('.').unwrap_or(domain);

    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain pattern '{}' names no domain",
            pattern
        )));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            pattern
        )));
    }

    if domain.starts_with('.') || domain.starts_with('-') || domain.ends_with('-') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start with '.' or start or end with '-'",
            pattern
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            pattern
        )));
    }

    Ok(())
}
