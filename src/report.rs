//! Cleanup report generation.

use chrono::Utc;
use uuid::Uuid;

use crate::clustering::DuplicateClusterer;
use crate::config::AnalysisConfig;
use crate::errors::AppError;
use crate::gaps::GapAnalyzer;
use crate::models::{CleanupReport, DuplicateCluster, GapBuckets, Record};

/// Quality penalty per duplicate cluster.
const CLUSTER_PENALTY: f64 = 0.1;

const MINUTES_PER_CLUSTER: u64 = 5;
const MINUTES_PER_CRITICAL_GAP: u64 = 2;
const MINUTES_PER_MODERATE_GAP: u64 = 1;

/// `max(0, 1 - gaps/records - 0.1 * clusters)`.
///
/// With no records the gap ratio counts as zero.
pub fn data_quality_score(total_records: usize, total_gaps: usize, total_clusters: usize) -> f64 {
    let gap_ratio = if total_records > 0 {
        total_gaps as f64 / total_records as f64
    } else {
        0.0
    };
    (1.0 - gap_ratio - total_clusters as f64 * CLUSTER_PENALTY).max(0.0)
}

/// Estimated manual cleanup effort in minutes.
pub fn estimate_cleanup_minutes(total_clusters: usize, critical_gaps: usize, moderate_gaps: usize) -> u64 {
    total_clusters as u64 * MINUTES_PER_CLUSTER
        + critical_gaps as u64 * MINUTES_PER_CRITICAL_GAP
        + moderate_gaps as u64 * MINUTES_PER_MODERATE_GAP
}

/// `"45 minutes"` below one hour, `"2h 5m"` from one hour up.
pub fn format_duration(minutes: u64) -> String {
    if minutes < 60 {
        format!("{} minutes", minutes)
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

/// One line per non-empty category, most urgent first.
pub fn priority_actions(
    duplicate_contacts: &[DuplicateCluster],
    duplicate_companies: &[DuplicateCluster],
    gaps: &GapBuckets,
) -> Vec<String> {
    let mut actions = Vec::new();
    if !duplicate_contacts.is_empty() {
        actions.push(format!(
            "Merge {} groups of duplicate contacts",
            duplicate_contacts.len()
        ));
    }
    if !duplicate_companies.is_empty() {
        actions.push(format!(
            "Merge {} groups of duplicate companies",
            duplicate_companies.len()
        ));
    }
    if !gaps.critical.is_empty() {
        actions.push(format!("Fill {} critical data gaps", gaps.critical.len()));
    }
    if !gaps.moderate.is_empty() {
        actions.push(format!("Address {} moderate data gaps", gaps.moderate.len()));
    }
    actions
}

/// Runs duplicate detection and gap analysis and assembles the report.
///
/// Returns [`AppError::NoData`] when both inputs are empty; callers report
/// that upstream instead of showing an all-zero report.
pub fn generate_cleanup_report(
    contacts: &[Record],
    companies: &[Record],
    config: &AnalysisConfig,
) -> Result<CleanupReport, AppError> {
    if contacts.is_empty() && companies.is_empty() {
        return Err(AppError::NoData(
            "no contacts or companies to analyze".to_string(),
        ));
    }

    tracing::info!(
        "Starting CRM cleanup analysis: {} contacts, {} companies",
        contacts.len(),
        companies.len()
    );

    let clusterer = DuplicateClusterer::new(config.similarity_threshold);
    let duplicate_contacts = clusterer.find_duplicate_contacts(contacts);
    let duplicate_companies = clusterer.find_duplicate_companies(companies);
    let gaps = GapAnalyzer::from_config(config).analyze(contacts, companies);

    let total_records = contacts.len() + companies.len();
    let total_gaps = gaps.total();
    let total_clusters = duplicate_contacts.len() + duplicate_companies.len();

    let data_quality_score = data_quality_score(total_records, total_gaps, total_clusters);
    let priority_actions = priority_actions(&duplicate_contacts, &duplicate_companies, &gaps);
    let estimated_cleanup_minutes =
        estimate_cleanup_minutes(total_clusters, gaps.critical.len(), gaps.moderate.len());

    let GapBuckets {
        critical,
        moderate,
        minor,
    } = gaps;

    let report = CleanupReport {
        analysis_id: Uuid::new_v4(),
        analysis_timestamp: Utc::now(),
        total_contacts_analyzed: contacts.len(),
        total_companies_analyzed: companies.len(),
        potential_duplicate_contacts: duplicate_contacts.len(),
        potential_duplicate_companies: duplicate_companies.len(),
        duplicate_contacts,
        duplicate_companies,
        critical_gaps: critical,
        moderate_gaps: moderate,
        minor_gaps: minor,
        total_data_gaps: total_gaps,
        data_quality_score,
        priority_actions,
        estimated_cleanup_minutes,
        estimated_cleanup_time: format_duration(estimated_cleanup_minutes),
    };

    tracing::info!(
        "Cleanup analysis completed: quality {:.3}, {} clusters, {} gaps",
        report.data_quality_score,
        total_clusters,
        total_gaps
    );
    Ok(report)
}
