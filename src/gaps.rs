//! Missing-field analysis.
//!
//! Each record is checked against the critical fields of its entity type. The
//! importance of a gap is the weight of its missing fields over the total
//! weight of the entity's table. Weights are kept in hundredths so sums are
//! exact.

use crate::config::AnalysisConfig;
use crate::models::{DataGap, EntityType, GapBuckets, Record, Severity};

/// Weight of a field that is not listed in the entity's table.
///
/// Counted in the numerator only; the denominator is the table total.
const UNLISTED_FIELD_WEIGHT: u32 = 10;

const CONTACT_WEIGHTS: &[(&str, u32)] = &[
    ("email", 90),
    ("firstname", 70),
    ("lastname", 70),
    ("company", 60),
    ("jobtitle", 50),
    ("phone", 40),
];

const COMPANY_WEIGHTS: &[(&str, u32)] = &[
    ("name", 90),
    ("domain", 80),
    ("industry", 70),
    ("website", 60),
    ("phone", 40),
    ("city", 40),
    ("state", 30),
    ("country", 30),
];

const CONTACT_SOURCES: &[(&str, &[&str])] = &[
    ("email", &["LinkedIn", "Company website", "Business cards"]),
    ("jobtitle", &["LinkedIn", "Company website"]),
    ("company", &["LinkedIn", "Email domain"]),
    ("phone", &["Company directory", "LinkedIn"]),
];

const COMPANY_SOURCES: &[(&str, &[&str])] = &[
    ("domain", &["Company website", "Google search"]),
    ("industry", &["LinkedIn company page", "Clearbit", "Crunchbase"]),
    ("website", &["Google search", "Domain lookup"]),
];

const COMPANY_LOCATION_FIELDS: [&str; 3] = ["city", "state", "country"];
const COMPANY_LOCATION_SOURCES: [&str; 3] = ["Company website", "LinkedIn", "Google Maps"];

fn weight_table(entity: EntityType) -> &'static [(&'static str, u32)] {
    match entity {
        EntityType::Contact => CONTACT_WEIGHTS,
        EntityType::Company => COMPANY_WEIGHTS,
    }
}

fn weight_of(entity: EntityType, field: &str) -> u32 {
    weight_table(entity)
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, w)| *w)
        .unwrap_or(UNLISTED_FIELD_WEIGHT)
}

/// Importance of a set of missing fields, clamped to `[0, 1]`.
pub fn gap_importance<S: AsRef<str>>(entity: EntityType, missing_fields: &[S]) -> f64 {
    let max_possible: u32 = weight_table(entity).iter().map(|(_, w)| w).sum();
    if max_possible == 0 {
        return 0.0;
    }
    let missing: u32 = missing_fields
        .iter()
        .map(|f| weight_of(entity, f.as_ref()))
        .sum();
    (missing as f64 / max_possible as f64).min(1.0)
}

/// External sources that could fill the missing fields, deduplicated in
/// first-seen order.
pub fn suggest_data_sources<S: AsRef<str>>(entity: EntityType, missing_fields: &[S]) -> Vec<String> {
    let is_missing = |field: &str| missing_fields.iter().any(|m| m.as_ref() == field);
    let mut sources: Vec<&str> = Vec::new();

    let table = match entity {
        EntityType::Contact => CONTACT_SOURCES,
        EntityType::Company => COMPANY_SOURCES,
    };
    for (field, field_sources) in table {
        if is_missing(field) {
            sources.extend_from_slice(field_sources);
        }
    }
    if entity == EntityType::Company && COMPANY_LOCATION_FIELDS.iter().any(|f| is_missing(f)) {
        sources.extend_from_slice(&COMPANY_LOCATION_SOURCES);
    }

    let mut unique: Vec<String> = Vec::with_capacity(sources.len());
    for source in sources {
        if !unique.iter().any(|s| s == source) {
            unique.push(source.to_string());
        }
    }
    unique
}

#[derive(Debug, Clone)]
pub struct GapAnalyzer {
    contact_fields: Vec<String>,
    company_fields: Vec<String>,
}

impl Default for GapAnalyzer {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl GapAnalyzer {
    pub fn new(contact_fields: Vec<String>, company_fields: Vec<String>) -> Self {
        Self {
            contact_fields,
            company_fields,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            config.critical_fields(EntityType::Contact).to_vec(),
            config.critical_fields(EntityType::Company).to_vec(),
        )
    }

    fn critical_fields(&self, entity: EntityType) -> &[String] {
        match entity {
            EntityType::Contact => &self.contact_fields,
            EntityType::Company => &self.company_fields,
        }
    }

    /// Critical fields the record lacks, in configured order.
    pub fn missing_fields(&self, entity: EntityType, record: &Record) -> Vec<String> {
        self.critical_fields(entity)
            .iter()
            .filter(|field| record.is_missing(field))
            .cloned()
            .collect()
    }

    /// The record's gap, or `None` when no critical field is missing.
    pub fn analyze_record(&self, entity: EntityType, record: &Record) -> Option<DataGap> {
        let missing_fields = self.missing_fields(entity, record);
        if missing_fields.is_empty() {
            return None;
        }

        let importance_score = gap_importance(entity, &missing_fields);
        Some(DataGap {
            object_type: entity,
            object_id: record.id.clone(),
            object_name: record.display_name(entity),
            suggested_sources: suggest_data_sources(entity, &missing_fields),
            severity: Severity::from_importance(importance_score),
            importance_score,
            missing_fields,
        })
    }

    /// Gaps for all contacts then all companies, bucketed by severity.
    pub fn analyze(&self, contacts: &[Record], companies: &[Record]) -> GapBuckets {
        let mut buckets = GapBuckets::default();

        let contact_gaps = contacts
            .iter()
            .filter_map(|r| self.analyze_record(EntityType::Contact, r));
        let company_gaps = companies
            .iter()
            .filter_map(|r| self.analyze_record(EntityType::Company, r));
        for gap in contact_gaps.chain(company_gaps) {
            buckets.push(gap);
        }

        tracing::debug!(
            "Gap analysis: {} critical, {} moderate, {} minor",
            buckets.critical.len(),
            buckets.moderate.len(),
            buckets.minor.len()
        );
        buckets
    }
}
