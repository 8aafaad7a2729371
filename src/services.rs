use crate::config::{AnalysisConfig, Config};
use crate::errors::AppError;
use crate::models::{CleanupAnalysis, Record};
use crate::recommendations::Recommendations;
use crate::render::render_agent_summary;
use crate::report::generate_cleanup_report;
use serde_json::{json, Value};
use std::sync::Arc;

/// Limits used for the short agent summary.
pub const SUMMARY_CONTACT_LIMIT: usize = 100;
pub const SUMMARY_COMPANY_LIMIT: usize = 50;

/// Supplies CRM records for analysis.
///
/// Fetching never fails: implementations log errors and return whatever they
/// collected, possibly nothing.
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_contacts(&self, limit: usize) -> Vec<Record>;
    async fn fetch_companies(&self, limit: usize) -> Vec<Record>;
}

/// In-memory records, used for offline input files and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticRecordSource {
    contacts: Vec<Record>,
    companies: Vec<Record>,
}

impl StaticRecordSource {
    pub fn new(contacts: Vec<Record>, companies: Vec<Record>) -> Self {
        Self {
            contacts,
            companies,
        }
    }
}

#[async_trait::async_trait]
impl RecordSource for StaticRecordSource {
    async fn fetch_contacts(&self, limit: usize) -> Vec<Record> {
        self.contacts.iter().take(limit).cloned().collect()
    }

    async fn fetch_companies(&self, limit: usize) -> Vec<Record> {
        self.companies.iter().take(limit).cloned().collect()
    }
}

/// Rejects thresholds outside `[0, 1]`.
pub fn validate_threshold(threshold: Option<f64>) -> Result<Option<f64>, AppError> {
    match threshold {
        Some(t) if !(0.0..=1.0).contains(&t) => Err(AppError::BadRequest(format!(
            "similarity_threshold must be between 0.0 and 1.0, got {}",
            t
        ))),
        other => Ok(other),
    }
}

/// Fetches records and runs the cleanup analysis.
#[derive(Clone)]
pub struct CleanupService {
    source: Arc<dyn RecordSource>,
    analysis: AnalysisConfig,
}

impl CleanupService {
    pub fn new(source: Arc<dyn RecordSource>, analysis: AnalysisConfig) -> Self {
        Self { source, analysis }
    }

    pub fn analysis_config(&self) -> &AnalysisConfig {
        &self.analysis
    }

    fn config_for(&self, threshold: Option<f64>) -> AnalysisConfig {
        match threshold {
            Some(t) => self.analysis.clone().with_threshold(t),
            None => self.analysis.clone(),
        }
    }

    /// Fetches contacts, then companies.
    pub async fn fetch_records(
        &self,
        contact_limit: usize,
        company_limit: usize,
    ) -> (Vec<Record>, Vec<Record>) {
        let contacts = self.source.fetch_contacts(contact_limit).await;
        let companies = self.source.fetch_companies(company_limit).await;
        (contacts, companies)
    }

    /// Analyzes records already in hand.
    pub fn analyze_records(
        &self,
        contacts: &[Record],
        companies: &[Record],
        threshold: Option<f64>,
    ) -> Result<CleanupAnalysis, AppError> {
        let threshold = validate_threshold(threshold)?;
        let report = generate_cleanup_report(contacts, companies, &self.config_for(threshold))?;
        let recommendations = Recommendations::from_report(&report);
        Ok(CleanupAnalysis {
            report,
            recommendations,
        })
    }

    /// Fetches from the record source and analyzes the result.
    pub async fn analyze_crm_quality(
        &self,
        contact_limit: usize,
        company_limit: usize,
        threshold: Option<f64>,
    ) -> Result<CleanupAnalysis, AppError> {
        let threshold = validate_threshold(threshold)?;
        tracing::info!(
            "Running CRM quality analysis (contacts <= {}, companies <= {})",
            contact_limit,
            company_limit
        );

        let (contacts, companies) = self.fetch_records(contact_limit, company_limit).await;
        if contacts.is_empty() && companies.is_empty() {
            tracing::warn!("Record source returned no contacts and no companies");
            return Err(AppError::NoData(
                "No data retrieved from HubSpot".to_string(),
            ));
        }

        self.analyze_records(&contacts, &companies, threshold)
    }

    /// Concise summary for agent-to-agent messages.
    pub async fn cleanup_summary_for_agent(&self) -> Result<String, AppError> {
        let analysis = self
            .analyze_crm_quality(SUMMARY_CONTACT_LIMIT, SUMMARY_COMPANY_LIMIT, None)
            .await?;
        Ok(render_agent_summary(
            &analysis.report,
            &analysis.recommendations,
        ))
    }
}

/// Tool definition other agents use to call the analysis.
pub fn analyze_tool_definition(config: &Config) -> Value {
    json!({
        "name": "analyze_crm_data_quality",
        "description": "Analyze CRM data quality, identify duplicates, and find data gaps",
        "parameters": {
            "type": "object",
            "properties": {
                "contact_limit": {
                    "type": "integer",
                    "description": format!(
                        "Maximum number of contacts to analyze (default: {})",
                        config.contact_limit
                    ),
                    "default": config.contact_limit
                },
                "company_limit": {
                    "type": "integer",
                    "description": format!(
                        "Maximum number of companies to analyze (default: {})",
                        config.company_limit
                    ),
                    "default": config.company_limit
                },
                "similarity_threshold": {
                    "type": "number",
                    "description": format!(
                        "Similarity threshold for duplicate detection (0.0-1.0, default: {})",
                        config.similarity_threshold
                    ),
                    "default": config.similarity_threshold,
                    "minimum": 0.0,
                    "maximum": 1.0
                },
                "force_refresh": {
                    "type": "boolean",
                    "description": "Bypass the cached report",
                    "default": false
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(contacts: Vec<Record>, companies: Vec<Record>) -> CleanupService {
        CleanupService::new(
            Arc::new(StaticRecordSource::new(contacts, companies)),
            AnalysisConfig::default(),
        )
    }

    #[test]
    fn test_validate_threshold() {
        assert_eq!(validate_threshold(None).unwrap(), None);
        assert_eq!(validate_threshold(Some(0.0)).unwrap(), Some(0.0));
        assert_eq!(validate_threshold(Some(1.0)).unwrap(), Some(1.0));
        assert!(matches!(
            validate_threshold(Some(1.5)),
            Err(AppError::BadRequest(_))
        ));
        assert!(validate_threshold(Some(-0.1)).is_err());
    }

    #[tokio::test]
    async fn test_static_source_respects_limit() {
        let source = StaticRecordSource::new(
            vec![Record::new("1"), Record::new("2"), Record::new("3")],
            vec![],
        );
        assert_eq!(source.fetch_contacts(2).await.len(), 2);
        assert!(source.fetch_companies(10).await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_source_is_no_data() {
        let err = service(vec![], vec![])
            .analyze_crm_quality(10, 10, None)
            .await
            .unwrap_err();
        assert!(err.is_no_data());
    }

    #[tokio::test]
    async fn test_summary_mentions_counts() {
        let contacts = vec![
            Record::new("1").with("firstname", "Ana").with("email", "ana@x.com"),
            Record::new("2").with("firstname", "Ana").with("email", "ana@x.com"),
        ];
        let summary = service(contacts, vec![])
            .cleanup_summary_for_agent()
            .await
            .unwrap();
        assert!(summary.contains("2 contacts, 0 companies"));
        assert!(summary.contains("1 contact groups"));
        assert!(summary.contains("Merge 1 groups of duplicate contacts"));
    }

    #[test]
    fn test_tool_definition_defaults_follow_config() {
        let config = Config {
            port: 3000,
            mcp_url: "http://localhost:8081/mcp".to_string(),
            similarity_threshold: 0.85,
            contact_limit: 250,
            company_limit: 100,
            contact_critical_fields: vec![],
            company_critical_fields: vec![],
            report_cache_ttl_secs: 300,
        };
        let tool = analyze_tool_definition(&config);
        assert_eq!(tool["name"], "analyze_crm_data_quality");
        assert_eq!(tool["parameters"]["properties"]["contact_limit"]["default"], 250);
        assert_eq!(
            tool["parameters"]["properties"]["similarity_threshold"]["default"],
            0.85
        );
    }
}
