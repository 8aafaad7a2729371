//! Plain-text renderings of a cleanup report.

use std::fmt::Write;

use crate::models::{CleanupReport, DataGap, DuplicateCluster};
use crate::recommendations::{ActionPlan, Recommendations};

/// Items shown per section unless the caller asks otherwise.
pub const DEFAULT_TOP_N: usize = 5;

/// Number of priority actions in the agent summary.
const SUMMARY_ACTIONS: usize = 3;

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn write_clusters(out: &mut String, title: &str, clusters: &[DuplicateCluster], top_n: usize) {
    if clusters.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{} ({})", title, clusters.len());
    for (i, c) in clusters.iter().take(top_n).enumerate() {
        let _ = writeln!(out, "  {}. {} ({})", i + 1, c.primary_name, c.primary_key);
        let _ = writeln!(out, "     Duplicates: {} records", c.duplicate_ids.len());
        let _ = writeln!(out, "     Match type: {}", c.match_type.as_str());
        let _ = writeln!(out, "     Similarity: {}", percent(c.similarity_score));
        let _ = writeln!(out, "     Action: {}", c.recommended_action.as_str());
    }
    if clusters.len() > top_n {
        let _ = writeln!(out, "  ... and {} more", clusters.len() - top_n);
    }
}

fn write_gaps(out: &mut String, title: &str, gaps: &[DataGap], top_n: usize) {
    if gaps.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{} ({})", title, gaps.len());
    for (i, g) in gaps.iter().take(top_n).enumerate() {
        let _ = writeln!(out, "  {}. {} ({})", i + 1, g.object_name, g.object_type);
        let _ = writeln!(out, "     Missing: {}", g.missing_fields.join(", "));
        let _ = writeln!(out, "     Importance: {}", percent(g.importance_score));
        if !g.suggested_sources.is_empty() {
            let _ = writeln!(out, "     Sources: {}", g.suggested_sources.join(", "));
        }
    }
    if gaps.len() > top_n {
        let _ = writeln!(out, "  ... and {} more", gaps.len() - top_n);
    }
}

/// Full console report, listing at most `top_n` items per section.
pub fn render_report(report: &CleanupReport, top_n: usize) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "CRM CLEANUP REPORT");
    let _ = writeln!(out, "{}", "=".repeat(50));
    let _ = writeln!(out, "\nANALYSIS SUMMARY");
    let _ = writeln!(
        out,
        "  Analysis date: {}",
        report.analysis_timestamp.format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "  Contacts analyzed: {}", report.total_contacts_analyzed);
    let _ = writeln!(out, "  Companies analyzed: {}", report.total_companies_analyzed);
    let _ = writeln!(out, "  Data quality score: {}", percent(report.data_quality_score));

    let _ = writeln!(out, "\nDUPLICATE DETECTION");
    let _ = writeln!(
        out,
        "  Potential duplicate contacts: {}",
        report.potential_duplicate_contacts
    );
    let _ = writeln!(
        out,
        "  Potential duplicate companies: {}",
        report.potential_duplicate_companies
    );
    write_clusters(&mut out, "DUPLICATE CONTACTS", &report.duplicate_contacts, top_n);
    write_clusters(&mut out, "DUPLICATE COMPANIES", &report.duplicate_companies, top_n);

    let _ = writeln!(out, "\nDATA GAPS");
    let _ = writeln!(out, "  Critical: {}", report.critical_gaps.len());
    let _ = writeln!(out, "  Moderate: {}", report.moderate_gaps.len());
    let _ = writeln!(out, "  Minor: {}", report.minor_gaps.len());
    let _ = writeln!(out, "  Total: {}", report.total_data_gaps);
    write_gaps(&mut out, "CRITICAL GAPS", &report.critical_gaps, top_n);
    write_gaps(&mut out, "MODERATE GAPS", &report.moderate_gaps, top_n);
    write_gaps(&mut out, "MINOR GAPS", &report.minor_gaps, top_n);

    let _ = writeln!(out, "\nPRIORITY ACTIONS");
    if report.priority_actions.is_empty() {
        let _ = writeln!(out, "  None, the data looks clean");
    }
    for (i, action) in report.priority_actions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, action);
    }

    let _ = writeln!(out, "\nESTIMATED CLEANUP TIME: {}", report.estimated_cleanup_time);
    out
}

/// Every cluster and gap, for writing to a file.
pub fn render_export(report: &CleanupReport) -> String {
    let mut out = format!("Analysis id: {}\n\n", report.analysis_id);
    out.push_str(&render_report(report, usize::MAX));
    out
}

/// Short summary for agent-to-agent messages.
pub fn render_agent_summary(report: &CleanupReport, recommendations: &Recommendations) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "CRM CLEANUP ANALYSIS SUMMARY:");
    let _ = writeln!(out, "- Data quality score: {}", percent(report.data_quality_score));
    let _ = writeln!(
        out,
        "- Records analyzed: {} contacts, {} companies",
        report.total_contacts_analyzed, report.total_companies_analyzed
    );
    let _ = writeln!(
        out,
        "- Duplicates found: {} contact groups, {} company groups",
        report.potential_duplicate_contacts, report.potential_duplicate_companies
    );
    let _ = writeln!(
        out,
        "- Data gaps: {} critical, {} moderate, {} minor",
        report.critical_gaps.len(),
        report.moderate_gaps.len(),
        report.minor_gaps.len()
    );
    let _ = writeln!(out, "- Estimated cleanup time: {}", report.estimated_cleanup_time);

    let _ = writeln!(out, "\nTOP RECOMMENDATIONS:");
    for action in recommendations.priority_actions.iter().take(SUMMARY_ACTIONS) {
        let _ = writeln!(out, "- {}", action);
    }
    out.trim_end().to_string()
}

pub fn render_action_plan(plan: &ActionPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "CLEANUP ACTION PLAN");
    let _ = writeln!(out, "{}", "=".repeat(50));
    let _ = writeln!(out, "Current quality score: {}", percent(plan.current_score));
    let _ = writeln!(out, "Target quality score: {}", percent(plan.target_score));

    for phase in &plan.phases {
        let _ = writeln!(out, "\n{}", phase.title);
        if phase.steps.is_empty() {
            let _ = writeln!(out, "  Nothing to do");
        }
        for step in &phase.steps {
            match step.estimated_time_minutes {
                Some(minutes) => {
                    let _ = writeln!(out, "  - {} (~{} min)", step.description, minutes);
                }
                None => {
                    let _ = writeln!(out, "  - {}", step.description);
                }
            }
        }
    }

    let _ = writeln!(out, "\nEXPECTED RESULTS");
    let _ = writeln!(
        out,
        "  Duplicate groups resolved: {}",
        plan.duplicate_records_removed
    );
    let _ = writeln!(out, "  Critical gaps closed: {}", plan.critical_gaps_closed);
    let _ = writeln!(out, "  Expected quality score: {}", percent(plan.expected_score));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.8947), "89.5%");
        assert_eq!(percent(1.0), "100.0%");
    }
}
