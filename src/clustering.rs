//! Duplicate detection for contacts and companies.
//!
//! Clustering runs in two passes over one entity type:
//!
//! 1. Exact-key partition: records sharing a normalized email (contacts) or
//!    domain (companies) form a cluster. Members leave the candidate pool.
//! 2. Fuzzy name pass over what remains: each candidate gathers the later,
//!    still-unclaimed candidates whose names score at or above the threshold.
//!
//! The first record seen is always the primary. A record id lands in at most
//! one cluster; repeated ids are dropped up front, keeping the first copy.

use std::collections::{HashMap, HashSet};

use crate::config::DEFAULT_SIMILARITY_THRESHOLD;
use crate::models::{DuplicateCluster, EntityType, MatchType, Record, RecommendedAction};
use crate::normalize::normalize_key;
use crate::similarity::similarity;

/// Names shorter than this never take part in fuzzy matching.
pub const MIN_NAME_LEN: usize = 3;

/// Mean fuzzy score above which a cluster is recommended for review-and-merge.
pub const REVIEW_AND_MERGE_ABOVE: f64 = 0.9;

/// Placeholder domain HubSpot imports use for unknown companies.
const UNKNOWN_DOMAIN: &str = "unknown";

#[derive(Debug, Clone)]
pub struct DuplicateClusterer {
    similarity_threshold: f64,
}

impl Default for DuplicateClusterer {
    fn default() -> Self {
        Self::new(DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl DuplicateClusterer {
    pub fn new(similarity_threshold: f64) -> Self {
        Self {
            similarity_threshold,
        }
    }

    /// Finds duplicate clusters among records of one entity type.
    ///
    /// Exact-key clusters come first (in first-seen key order), followed by
    /// name clusters (in input order of their primary).
    pub fn find_duplicates(&self, entity: EntityType, records: &[Record]) -> Vec<DuplicateCluster> {
        let unique = unique_by_id(records);
        if unique.len() < records.len() {
            tracing::warn!(
                "Ignoring {} {} records with repeated ids",
                records.len() - unique.len(),
                entity
            );
        }

        let (mut clusters, remaining) = exact_key_partition(entity, &unique);
        let exact = clusters.len();
        clusters.extend(fuzzy_name_clusters(
            entity,
            &remaining,
            self.similarity_threshold,
        ));

        tracing::debug!(
            "Found {} {} duplicate clusters ({} exact, {} by name) among {} records",
            clusters.len(),
            entity,
            exact,
            clusters.len() - exact,
            records.len()
        );

        clusters
    }

    pub fn find_duplicate_contacts(&self, contacts: &[Record]) -> Vec<DuplicateCluster> {
        self.find_duplicates(EntityType::Contact, contacts)
    }

    pub fn find_duplicate_companies(&self, companies: &[Record]) -> Vec<DuplicateCluster> {
        self.find_duplicates(EntityType::Company, companies)
    }
}

/// Normalized exact-match key of a record, if it has a usable one.
fn exact_key(entity: EntityType, record: &Record) -> Option<String> {
    let key = normalize_key(record.field(entity.match_key_field()));
    if key.is_empty() {
        return None;
    }
    if entity == EntityType::Company && key == UNKNOWN_DOMAIN {
        return None;
    }
    Some(key)
}

/// First occurrence of every record id, in input order.
pub fn unique_by_id(records: &[Record]) -> Vec<&Record> {
    let mut seen: HashSet<&str> = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.id.as_str()))
        .collect()
}

/// Splits records into exact-key clusters and the records left for fuzzy
/// matching (input order preserved). Record ids are expected to be unique.
pub fn exact_key_partition<'a>(
    entity: EntityType,
    records: &[&'a Record],
) -> (Vec<DuplicateCluster>, Vec<&'a Record>) {
    let mut groups: Vec<(String, Vec<&'a Record>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for &record in records {
        if let Some(key) = exact_key(entity, record) {
            match index.get(&key) {
                Some(&pos) => groups[pos].1.push(record),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push((key, vec![record]));
                }
            }
        }
    }

    let clusters: Vec<DuplicateCluster> = groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .filter_map(|(key, members)| exact_cluster(entity, key, &members))
        .collect();

    let clustered: HashSet<&str> = clusters
        .iter()
        .flat_map(|c| c.member_ids())
        .collect();

    let remaining = records
        .iter()
        .copied()
        .filter(|r| !clustered.contains(r.id.as_str()))
        .collect();

    (clusters, remaining)
}

fn exact_cluster(entity: EntityType, key: String, members: &[&Record]) -> Option<DuplicateCluster> {
    let (primary, duplicates) = members.split_first()?;
    let key_field = entity.match_key_field();

    Some(DuplicateCluster {
        entity_type: entity,
        primary_id: primary.id.clone(),
        primary_name: primary.composed_name(entity),
        primary_key: key,
        duplicate_ids: duplicates.iter().map(|r| r.id.clone()).collect(),
        duplicate_names: duplicates.iter().map(|r| r.composed_name(entity)).collect(),
        duplicate_keys: duplicates
            .iter()
            .map(|r| r.field(key_field).to_string())
            .collect(),
        similarity_score: 1.0,
        match_type: match entity {
            EntityType::Contact => MatchType::Email,
            EntityType::Company => MatchType::Domain,
        },
        recommended_action: RecommendedAction::MergeRecords,
    })
}

/// Fuzzy name clustering over the records left by the exact-key pass.
///
/// Comparisons only run forward (`j > i`), and a record claimed as someone's
/// duplicate is neither compared again nor used as a primary.
pub fn fuzzy_name_clusters(
    entity: EntityType,
    candidates: &[&Record],
    threshold: f64,
) -> Vec<DuplicateCluster> {
    let names: Vec<String> = candidates.iter().map(|r| r.composed_name(entity)).collect();
    let comparable: Vec<bool> = names
        .iter()
        .map(|n| n.chars().count() >= MIN_NAME_LEN)
        .collect();
    let mut claimed = vec![false; candidates.len()];
    let mut clusters = Vec::new();

    for i in 0..candidates.len() {
        if claimed[i] || !comparable[i] {
            continue;
        }

        let mut matches: Vec<(usize, f64)> = Vec::new();
        for j in (i + 1)..candidates.len() {
            if claimed[j] || !comparable[j] {
                continue;
            }
            let score = similarity(&names[i], &names[j]);
            if score >= threshold {
                matches.push((j, score));
                claimed[j] = true;
            }
        }

        if matches.is_empty() {
            continue;
        }
        claimed[i] = true;
        clusters.push(name_cluster(entity, candidates, &names, i, &matches));
    }

    clusters
}

fn name_cluster(
    entity: EntityType,
    candidates: &[&Record],
    names: &[String],
    primary: usize,
    matches: &[(usize, f64)],
) -> DuplicateCluster {
    let key_field = entity.match_key_field();
    let mean = matches.iter().map(|(_, s)| s).sum::<f64>() / matches.len() as f64;
    let record = candidates[primary];

    DuplicateCluster {
        entity_type: entity,
        primary_id: record.id.clone(),
        primary_name: names[primary].clone(),
        primary_key: record.field(key_field).to_string(),
        duplicate_ids: matches.iter().map(|(j, _)| candidates[*j].id.clone()).collect(),
        duplicate_names: matches.iter().map(|(j, _)| names[*j].clone()).collect(),
        duplicate_keys: matches
            .iter()
            .map(|(j, _)| candidates[*j].field(key_field).to_string())
            .collect(),
        similarity_score: mean,
        match_type: MatchType::Name,
        recommended_action: if mean > REVIEW_AND_MERGE_ABOVE {
            RecommendedAction::ReviewAndMerge
        } else {
            RecommendedAction::ManualReview
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(id: &str, first: &str, last: &str, email: &str) -> Record {
        Record::new(id)
            .with("firstname", first)
            .with("lastname", last)
            .with("email", email)
    }

    #[test]
    fn test_email_group_first_seen_is_primary() {
        let contacts = vec![
            contact("1", "Jo", "Doe", "a@x.com"),
            contact("2", "Joe", "Doe", "A@X.com "),
        ];
        let clusters = DuplicateClusterer::default().find_duplicate_contacts(&contacts);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].primary_id, "1");
        assert_eq!(clusters[0].duplicate_ids, vec!["2"]);
        assert_eq!(clusters[0].primary_key, "a@x.com");
        assert_eq!(clusters[0].duplicate_keys, vec!["A@X.com "]);
    }

    #[test]
    fn test_unknown_domain_is_not_a_key() {
        let companies = vec![
            Record::new("1").with("name", "Alpha").with("domain", "unknown"),
            Record::new("2").with("name", "Omega").with("domain", "UNKNOWN"),
        ];
        let clusters = DuplicateClusterer::default().find_duplicate_companies(&companies);
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_exact_members_excluded_from_fuzzy_pass() {
        let contacts = vec![
            contact("1", "John", "Smith", "j@x.com"),
            contact("2", "John", "Smith", "j@x.com"),
            contact("3", "John", "Smith", "other@y.com"),
        ];
        let unique = unique_by_id(&contacts);
        let (clusters, remaining) = exact_key_partition(EntityType::Contact, &unique);
        assert_eq!(clusters.len(), 1);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "3");

        let all = DuplicateClusterer::default().find_duplicate_contacts(&contacts);
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_short_names_never_fuzzy_matched() {
        let contacts = vec![contact("1", "Al", "", ""), contact("2", "Al", "", "")];
        assert!(DuplicateClusterer::default()
            .find_duplicate_contacts(&contacts)
            .is_empty());
    }

    #[test]
    fn test_fuzzy_action_depends_on_mean() {
        let contacts = vec![
            contact("1", "John", "Smith", "john@a.com"),
            contact("2", "Jon", "Smith", "jon@b.com"),
        ];
        let clusters = DuplicateClusterer::default().find_duplicate_contacts(&contacts);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].match_type, MatchType::Name);
        assert!((clusters[0].similarity_score - 18.0 / 19.0).abs() < 1e-9);
        assert_eq!(clusters[0].recommended_action, RecommendedAction::ReviewAndMerge);
        assert_eq!(clusters[0].primary_key, "john@a.com");
    }

    #[test]
    fn test_claimed_record_is_not_a_later_primary() {
        let companies = vec![
            Record::new("1").with("name", "Northwind Traders"),
            Record::new("2").with("name", "Northwind Trader"),
            Record::new("3").with("name", "Northwind Traders"),
        ];
        let clusters = DuplicateClusterer::default().find_duplicate_companies(&companies);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].primary_id, "1");
        assert_eq!(clusters[0].duplicate_ids, vec!["2", "3"]);
    }

    #[test]
    fn test_repeated_id_is_not_its_own_duplicate() {
        let contacts = vec![
            contact("1", "John", "Smith", "a@x.com"),
            contact("1", "John", "Smith", "a@x.com"),
        ];
        assert!(DuplicateClusterer::default()
            .find_duplicate_contacts(&contacts)
            .is_empty());

        let contacts = vec![
            contact("1", "John", "Smith", "a@x.com"),
            contact("1", "John", "Smith", "b@y.com"),
            contact("2", "John", "Smith", "a@x.com"),
        ];
        let clusters = DuplicateClusterer::default().find_duplicate_contacts(&contacts);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].primary_id, "1");
        assert_eq!(clusters[0].duplicate_ids, vec!["2"]);
    }
}
