//! Follow-up recommendations derived from a cleanup report.

use serde::{Deserialize, Serialize};

use crate::models::{CleanupReport, DataGap, DuplicateCluster};

/// Clusters scoring at least this are safe to merge without review.
pub const HIGH_CONFIDENCE_SCORE: f64 = 0.95;

const QUICK_MERGE_MINUTES: u64 = 3;
const QUICK_GAP_MINUTES: u64 = 2;
const REVIEW_MERGE_MINUTES: u64 = 5;
const RESEARCH_GAP_MINUTES: u64 = 5;
const MODERATE_GAP_MINUTES: u64 = 2;
const MAX_PHASE_THREE_GAPS: usize = 50;

/// Score the action plan aims for.
pub const TARGET_QUALITY_SCORE: f64 = 0.9;
const MAX_EXPECTED_SCORE: f64 = 0.95;
const MAX_EXPECTED_IMPROVEMENT: f64 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickWin {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: usize,
    pub estimated_time_minutes: u64,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    #[serde(rename = "type")]
    pub kind: String,
    pub priority: Priority,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    pub description: String,
    pub estimated_time_minutes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanPhase {
    pub title: String,
    pub steps: Vec<PlanStep>,
}

/// Three-phase plan from quick wins to process changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub current_score: f64,
    pub target_score: f64,
    pub expected_score: f64,
    pub phases: Vec<PlanPhase>,
    pub duplicate_records_removed: usize,
    pub critical_gaps_closed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub priority_actions: Vec<String>,
    pub quick_wins: Vec<QuickWin>,
    pub long_term_improvements: Vec<Improvement>,
    pub action_plan: ActionPlan,
}

impl Recommendations {
    pub fn from_report(report: &CleanupReport) -> Self {
        Self {
            priority_actions: report.priority_actions.clone(),
            quick_wins: quick_wins(report),
            long_term_improvements: long_term_improvements(report),
            action_plan: action_plan(report),
        }
    }
}

fn high_confidence(clusters: &[DuplicateCluster]) -> usize {
    clusters
        .iter()
        .filter(|c| c.similarity_score >= HIGH_CONFIDENCE_SCORE)
        .count()
}

fn has_source(gap: &DataGap, source: &str) -> bool {
    gap.suggested_sources.iter().any(|s| s == source)
}

pub fn quick_wins(report: &CleanupReport) -> Vec<QuickWin> {
    let mut wins = Vec::new();

    let contacts = high_confidence(&report.duplicate_contacts);
    if contacts > 0 {
        wins.push(QuickWin {
            kind: "merge_high_confidence_contacts".to_string(),
            count: contacts,
            estimated_time_minutes: contacts as u64 * QUICK_MERGE_MINUTES,
            description: format!("Merge {} high-confidence duplicate contacts", contacts),
        });
    }

    let companies = high_confidence(&report.duplicate_companies);
    if companies > 0 {
        wins.push(QuickWin {
            kind: "merge_high_confidence_companies".to_string(),
            count: companies,
            estimated_time_minutes: companies as u64 * QUICK_MERGE_MINUTES,
            description: format!("Merge {} high-confidence duplicate companies", companies),
        });
    }

    let linkedin = report
        .critical_gaps
        .iter()
        .filter(|g| has_source(g, "LinkedIn"))
        .count();
    if linkedin > 0 {
        wins.push(QuickWin {
            kind: "fill_linkedin_gaps".to_string(),
            count: linkedin,
            estimated_time_minutes: linkedin as u64 * QUICK_GAP_MINUTES,
            description: format!("Fill {} critical gaps using LinkedIn", linkedin),
        });
    }

    wins
}

pub fn long_term_improvements(report: &CleanupReport) -> Vec<Improvement> {
    let mut improvements = Vec::new();

    if report.data_quality_score < 0.8 {
        improvements.push(Improvement {
            kind: "implement_data_quality_processes".to_string(),
            priority: Priority::High,
            description: "Implement automated data quality checks and validation rules".to_string(),
        });
    }
    if report.potential_duplicate_contacts + report.potential_duplicate_companies > 10 {
        improvements.push(Improvement {
            kind: "duplicate_prevention".to_string(),
            priority: Priority::Medium,
            description: "Set up duplicate prevention workflows in HubSpot".to_string(),
        });
    }
    if report.critical_gaps.len() > 20 {
        improvements.push(Improvement {
            kind: "data_enrichment_automation".to_string(),
            priority: Priority::Medium,
            description: "Implement automated data enrichment using external APIs".to_string(),
        });
    }

    improvements
}

fn step(description: String, minutes: Option<u64>) -> PlanStep {
    PlanStep {
        description,
        estimated_time_minutes: minutes,
    }
}

pub fn action_plan(report: &CleanupReport) -> ActionPlan {
    let hc_contacts = high_confidence(&report.duplicate_contacts);
    let hc_companies = high_confidence(&report.duplicate_companies);
    let easy_gaps = report
        .critical_gaps
        .iter()
        .filter(|g| has_source(g, "LinkedIn") || has_source(g, "Company website"))
        .count();

    let mut quick = Vec::new();
    if hc_contacts > 0 {
        quick.push(step(
            format!("Merge {} high-confidence duplicate contacts", hc_contacts),
            Some(hc_contacts as u64 * QUICK_MERGE_MINUTES),
        ));
    }
    if hc_companies > 0 {
        quick.push(step(
            format!("Merge {} high-confidence duplicate companies", hc_companies),
            Some(hc_companies as u64 * QUICK_MERGE_MINUTES),
        ));
    }
    if easy_gaps > 0 {
        quick.push(step(
            format!("Fill {} critical gaps from LinkedIn/websites", easy_gaps),
            Some(easy_gaps as u64 * QUICK_GAP_MINUTES),
        ));
    }

    let mut systematic = Vec::new();
    let rest_contacts = report.duplicate_contacts.len() - hc_contacts;
    if rest_contacts > 0 {
        systematic.push(step(
            format!(
                "Review and merge {} moderate-confidence contact duplicates",
                rest_contacts
            ),
            Some(rest_contacts as u64 * REVIEW_MERGE_MINUTES),
        ));
    }
    let rest_companies = report.duplicate_companies.len() - hc_companies;
    if rest_companies > 0 {
        systematic.push(step(
            format!(
                "Review and merge {} moderate-confidence company duplicates",
                rest_companies
            ),
            Some(rest_companies as u64 * REVIEW_MERGE_MINUTES),
        ));
    }
    let rest_gaps = report.critical_gaps.len() - easy_gaps;
    if rest_gaps > 0 {
        systematic.push(step(
            format!("Research and fill {} remaining critical gaps", rest_gaps),
            Some(rest_gaps as u64 * RESEARCH_GAP_MINUTES),
        ));
    }

    let mut optimization = Vec::new();
    if !report.moderate_gaps.is_empty() {
        let n = report.moderate_gaps.len().min(MAX_PHASE_THREE_GAPS);
        optimization.push(step(
            format!("Address {} moderate data gaps", n),
            Some(n as u64 * MODERATE_GAP_MINUTES),
        ));
    }
    optimization.push(step(
        "Implement data quality processes to prevent future issues".to_string(),
        None,
    ));
    optimization.push(step("Set up regular cleanup reviews (monthly)".to_string(), None));

    let clusters = report.total_duplicate_clusters();
    let improvement = (clusters as f64 * 0.02 + report.critical_gaps.len() as f64 * 0.01)
        .min(MAX_EXPECTED_IMPROVEMENT);

    ActionPlan {
        current_score: report.data_quality_score,
        target_score: TARGET_QUALITY_SCORE,
        expected_score: (report.data_quality_score + improvement).min(MAX_EXPECTED_SCORE),
        phases: vec![
            PlanPhase {
                title: "Phase 1: Quick wins (week 1)".to_string(),
                steps: quick,
            },
            PlanPhase {
                title: "Phase 2: Systematic cleanup (weeks 2-3)".to_string(),
                steps: systematic,
            },
            PlanPhase {
                title: "Phase 3: Optimization (week 4)".to_string(),
                steps: optimization,
            },
        ],
        duplicate_records_removed: clusters,
        critical_gaps_closed: report.critical_gaps.len(),
    }
}
