use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

// ============ CRM Records ============

/// Kind of CRM object a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Contact,
    Company,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Contact => "contact",
            EntityType::Company => "company",
        }
    }

    /// Property compared in the exact-key duplicate pass.
    pub fn match_key_field(&self) -> &'static str {
        match self {
            EntityType::Contact => "email",
            EntityType::Company => "domain",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contact or company as returned by the HubSpot CRM objects API.
///
/// Absent and `null` properties are both stored as missing values. A payload
/// without a `properties` object deserializes to a record with no fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// HubSpot object id (numeric ids are stringified).
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_properties")]
    pub properties: BTreeMap<String, Option<String>>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style property setter.
    pub fn with(mut self, field: &str, value: &str) -> Self {
        self.properties
            .insert(field.to_string(), Some(value.to_string()));
        self
    }

    /// Returns the raw property value, or `""` when absent or null.
    pub fn field(&self, name: &str) -> &str {
        self.properties
            .get(name)
            .and_then(|v| v.as_deref())
            .unwrap_or("")
    }

    /// A field counts as missing when absent, null, or whitespace-only.
    pub fn is_missing(&self, name: &str) -> bool {
        self.field(name).trim().is_empty()
    }

    /// Name compared in the fuzzy duplicate pass.
    ///
    /// Contacts compose `"{firstname} {lastname}"`; companies use `name`.
    pub fn composed_name(&self, entity: EntityType) -> String {
        match entity {
            EntityType::Contact => format!("{} {}", self.field("firstname"), self.field("lastname"))
                .trim()
                .to_string(),
            EntityType::Company => self.field("name").trim().to_string(),
        }
    }

    /// Human-readable label used in gap listings.
    pub fn display_name(&self, entity: EntityType) -> String {
        let name = self.composed_name(entity);
        if !name.is_empty() {
            return name;
        }
        match entity {
            EntityType::Contact if !self.is_missing("email") => self.field("email").to_string(),
            EntityType::Contact => format!("Contact {}", self.id),
            EntityType::Company => format!("Company {}", self.id),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "record id must be a string or number, got {}",
            other
        ))),
    }
}

fn deserialize_properties<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Null => None,
                Value::String(s) => Some(s),
                other => Some(other.to_string()),
            };
            (key, value)
        })
        .collect())
}

// ============ Duplicate Clusters ============

/// How the members of a duplicate cluster were matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Email,
    Domain,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    MergeRecords,
    ReviewAndMerge,
    ManualReview,
}

impl RecommendedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendedAction::MergeRecords => "merge_records",
            RecommendedAction::ReviewAndMerge => "review_and_merge",
            RecommendedAction::ManualReview => "manual_review",
        }
    }
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Email => "email",
            MatchType::Domain => "domain",
            MatchType::Name => "name",
        }
    }
}

/// Records judged to represent one real-world contact or company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateCluster {
    pub entity_type: EntityType,
    pub primary_id: String,
    pub primary_name: String,
    /// Email for contacts, domain for companies.
    pub primary_key: String,
    pub duplicate_ids: Vec<String>,
    pub duplicate_names: Vec<String>,
    pub duplicate_keys: Vec<String>,
    pub similarity_score: f64,
    pub match_type: MatchType,
    pub recommended_action: RecommendedAction,
}

impl DuplicateCluster {
    /// Primary id followed by duplicate ids.
    pub fn member_ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary_id.as_str()).chain(self.duplicate_ids.iter().map(String::as_str))
    }
}

// ============ Data Gaps ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Moderate,
    Minor,
}

impl Severity {
    pub fn from_importance(score: f64) -> Self {
        if score >= 0.8 {
            Severity::Critical
        } else if score >= 0.5 {
            Severity::Moderate
        } else {
            Severity::Minor
        }
    }
}

/// Missing critical fields of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataGap {
    pub object_type: EntityType,
    pub object_id: String,
    pub object_name: String,
    pub missing_fields: Vec<String>,
    pub importance_score: f64,
    pub severity: Severity,
    pub suggested_sources: Vec<String>,
}

/// Gaps of one analysis run split by severity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapBuckets {
    pub critical: Vec<DataGap>,
    pub moderate: Vec<DataGap>,
    pub minor: Vec<DataGap>,
}

impl GapBuckets {
    pub fn push(&mut self, gap: DataGap) {
        match gap.severity {
            Severity::Critical => self.critical.push(gap),
            Severity::Moderate => self.moderate.push(gap),
            Severity::Minor => self.minor.push(gap),
        }
    }

    pub fn total(&self) -> usize {
        self.critical.len() + self.moderate.len() + self.minor.len()
    }
}

// ============ Cleanup Report ============

/// Snapshot produced by one cleanup analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanupReport {
    pub analysis_id: Uuid,
    pub analysis_timestamp: DateTime<Utc>,
    pub total_contacts_analyzed: usize,
    pub total_companies_analyzed: usize,
    pub duplicate_contacts: Vec<DuplicateCluster>,
    pub duplicate_companies: Vec<DuplicateCluster>,
    pub critical_gaps: Vec<DataGap>,
    pub moderate_gaps: Vec<DataGap>,
    pub minor_gaps: Vec<DataGap>,
    pub potential_duplicate_contacts: usize,
    pub potential_duplicate_companies: usize,
    pub total_data_gaps: usize,
    pub data_quality_score: f64,
    pub priority_actions: Vec<String>,
    pub estimated_cleanup_minutes: u64,
    pub estimated_cleanup_time: String,
}

impl CleanupReport {
    pub fn total_duplicate_clusters(&self) -> usize {
        self.duplicate_contacts.len() + self.duplicate_companies.len()
    }
}

// ============ API Payloads ============

/// Body of `POST /api/v1/cleanup/analyze`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub contact_limit: Option<usize>,
    pub company_limit: Option<usize>,
    pub similarity_threshold: Option<f64>,
    #[serde(default)]
    pub force_refresh: bool,
}

/// Body of `POST /api/v1/cleanup/records`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordsAnalyzeRequest {
    #[serde(default)]
    pub contacts: Vec<Record>,
    #[serde(default)]
    pub companies: Vec<Record>,
    pub similarity_threshold: Option<f64>,
}

/// Report plus derived recommendations, as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupAnalysis {
    pub report: CleanupReport,
    pub recommendations: crate::recommendations::Recommendations,
}
