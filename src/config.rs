
use crate::models::EntityType;

pub const DEFAULT_MCP_URL: &str = "http://localhost:8081/mcp";
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;
pub const DEFAULT_CONTACT_LIMIT: usize = 1000;
pub const DEFAULT_COMPANY_LIMIT: usize = 500;

/// Critical contact fields, in the order gaps report them.
pub const CONTACT_CRITICAL_FIELDS: [&str; 6] =
    ["firstname", "lastname", "email", "phone", "jobtitle", "company"];

/// Critical company fields, in the order gaps report them.
pub const COMPANY_CRITICAL_FIELDS: [&str; 8] = [
    "name", "domain", "industry", "city", "state", "country", "phone", "website",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub mcp_url: String,
    pub similarity_threshold: f64,
    pub contact_limit: usize,
    pub company_limit: usize,
    pub contact_critical_fields: Vec<String>,
    pub company_critical_fields: Vec<String>,
    pub report_cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            mcp_url: validate_mcp_url(
                std::env::var("MCP_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_MCP_URL.to_string()),
            )?,
            similarity_threshold: match std::env::var("SIMILARITY_THRESHOLD") {
                Ok(raw) => parse_threshold(&raw)?,
                Err(_) => DEFAULT_SIMILARITY_THRESHOLD,
            },
            contact_limit: parse_limit("CONTACT_LIMIT", DEFAULT_CONTACT_LIMIT)?,
            company_limit: parse_limit("COMPANY_LIMIT", DEFAULT_COMPANY_LIMIT)?,
            contact_critical_fields: parse_field_list(
                "CONTACT_CRITICAL_FIELDS",
                &CONTACT_CRITICAL_FIELDS,
            ),
            company_critical_fields: parse_field_list(
                "COMPANY_CRITICAL_FIELDS",
                &COMPANY_CRITICAL_FIELDS,
            ),
            report_cache_ttl_secs: std::env::var("REPORT_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("REPORT_CACHE_TTL_SECS must be a whole number"))?,
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("MCP URL: {}", config.mcp_url);
        tracing::debug!(
            "Similarity threshold: {}, limits: {} contacts / {} companies",
            config.similarity_threshold,
            config.contact_limit,
            config.company_limit
        );
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Analysis settings derived from this configuration.
    pub fn analysis(&self) -> AnalysisConfig {
        AnalysisConfig {
            similarity_threshold: self.similarity_threshold,
            contact_critical_fields: self.contact_critical_fields.clone(),
            company_critical_fields: self.company_critical_fields.clone(),
        }
    }
}

/// Settings consumed by the analysis core for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub similarity_threshold: f64,
    pub contact_critical_fields: Vec<String>,
    pub company_critical_fields: Vec<String>,
}

impl AnalysisConfig {
    pub fn with_threshold(mut self, similarity_threshold: f64) -> Self {
        self.similarity_threshold = similarity_threshold;
        self
    }

    pub fn critical_fields(&self, entity: EntityType) -> &[String] {
        match entity {
            EntityType::Contact => &self.contact_critical_fields,
            EntityType::Company => &self.company_critical_fields,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            contact_critical_fields: CONTACT_CRITICAL_FIELDS.iter().map(|f| f.to_string()).collect(),
            company_critical_fields: COMPANY_CRITICAL_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Parses a similarity threshold, rejecting values outside 0.0..=1.0.
pub fn parse_threshold(raw: &str) -> anyhow::Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("SIMILARITY_THRESHOLD must be a number"))?;
    if !(0.0..=1.0).contains(&value) {
        anyhow::bail!("SIMILARITY_THRESHOLD must be between 0.0 and 1.0");
    }
    Ok(value)
}

fn parse_limit(var: &str, default: usize) -> anyhow::Result<usize> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a whole number", var)),
        Err(_) => Ok(default),
    }
}

fn parse_field_list(var: &str, default: &[&str]) -> Vec<String> {
    std::env::var(var)
        .ok()
        .map(|raw| split_field_list(&raw))
        .filter(|fields| !fields.is_empty())
        .unwrap_or_else(|| default.iter().map(|f| f.to_string()).collect())
}

/// Splits a comma-separated field list, dropping blanks.
pub fn split_field_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|f| f.trim().to_lowercase())
        .filter(|f| !f.is_empty())
        .collect()
}

pub fn validate_mcp_url(url: String) -> anyhow::Result<String> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("MCP_URL must start with http:// or https://");
    }
    url::Url::parse(&url).map_err(|e| anyhow::anyhow!("MCP_URL is not a valid URL: {}", e))?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threshold_bounds() {
        assert_eq!(parse_threshold("0.85").unwrap(), 0.85);
        assert_eq!(parse_threshold(" 1 ").unwrap(), 1.0);
        assert!(parse_threshold("1.5").is_err());
        assert!(parse_threshold("-0.1").is_err());
        assert!(parse_threshold("abc").is_err());
    }

    #[test]
    fn test_split_field_list() {
        assert_eq!(
            split_field_list(" Email, phone,,jobtitle "),
            vec!["email", "phone", "jobtitle"]
        );
        assert!(split_field_list(" , ").is_empty());
    }

    #[test]
    fn test_url_validation() {
        assert!(validate_mcp_url("http://localhost:8081/mcp".to_string()).is_ok());
        assert!(validate_mcp_url("localhost:8081".to_string()).is_err());
    }

    #[test]
    fn test_default_analysis_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.similarity_threshold, 0.8);
        assert_eq!(config.critical_fields(EntityType::Contact).len(), 6);
        assert_eq!(config.critical_fields(EntityType::Company)[1], "domain");
    }
}
