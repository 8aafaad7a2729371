/// Property-based tests using proptest
/// Checks invariants of similarity, clustering, gap scoring and the quality score
use proptest::prelude::*;
use std::collections::HashSet;

use crm_cleanup_api::clustering::DuplicateClusterer;
use crm_cleanup_api::gaps::{gap_importance, GapAnalyzer};
use crm_cleanup_api::models::{EntityType, Record, Severity};
use crm_cleanup_api::normalize::normalize_string;
use crm_cleanup_api::report::data_quality_score;
use crm_cleanup_api::similarity::similarity;

fn arb_contact() -> impl Strategy<Value = (String, String, String)> {
    (
        prop::sample::select(vec!["John", "Jon", "Jane", "Ana", "Anna", ""]),
        prop::sample::select(vec!["Smith", "Smyth", "Lima", "Doe", ""]),
        prop::sample::select(vec!["a@x.com", "A@X.com", "b@y.com", "", "c@z.com"]),
    )
        .prop_map(|(f, l, e)| (f.to_string(), l.to_string(), e.to_string()))
}

fn contacts_from(raw: Vec<(String, String, String)>) -> Vec<Record> {
    raw.into_iter()
        .enumerate()
        .map(|(i, (first, last, email))| {
            Record::new(i.to_string())
                .with("firstname", &first)
                .with("lastname", &last)
                .with("email", &email)
        })
        .collect()
}

// Property: similarity bounds
proptest! {
    #[test]
    fn similarity_with_self_is_one(s in "[a-zA-Z0-9 ]{1,40}") {
        prop_assert_eq!(similarity(&s, &s), 1.0);
    }

    #[test]
    fn similarity_with_empty_is_zero(s in "\\PC*") {
        prop_assert_eq!(similarity(&s, ""), 0.0);
        prop_assert_eq!(similarity("", &s), 0.0);
    }

    #[test]
    fn similarity_stays_in_unit_range(a in "\\PC{0,30}", b in "\\PC{0,30}") {
        let score = similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn normalized_names_have_no_punctuation_or_runs(s in "\\PC{0,40}") {
        let normalized = normalize_string(&s);
        prop_assert!(!normalized.contains("  "));
        prop_assert!(!normalized.chars().any(|c| c.is_ascii_punctuation()));
    }
}

// Property: clustering never double-books a record
proptest! {
    #[test]
    fn record_in_at_most_one_cluster(raw in prop::collection::vec(arb_contact(), 0..25)) {
        let contacts = contacts_from(raw);
        let clusters = DuplicateClusterer::default().find_duplicate_contacts(&contacts);

        let mut seen = HashSet::new();
        for cluster in &clusters {
            for id in cluster.member_ids() {
                prop_assert!(seen.insert(id.to_string()), "id {} in two clusters", id);
            }
            prop_assert!(!cluster.duplicate_ids.is_empty());
        }
    }

    #[test]
    fn repeated_ids_never_cluster_with_themselves(
        raw in prop::collection::vec((0usize..4, arb_contact()), 0..20)
    ) {
        let contacts: Vec<Record> = raw
            .into_iter()
            .map(|(id, (first, last, email))| {
                Record::new(id.to_string())
                    .with("firstname", &first)
                    .with("lastname", &last)
                    .with("email", &email)
            })
            .collect();
        let clusters = DuplicateClusterer::default().find_duplicate_contacts(&contacts);

        let mut seen = HashSet::new();
        for cluster in &clusters {
            prop_assert!(!cluster.duplicate_ids.contains(&cluster.primary_id));
            for id in cluster.member_ids() {
                prop_assert!(seen.insert(id.to_string()), "id {} in two clusters", id);
            }
        }
    }

    #[test]
    fn shared_email_always_clusters(first in "[a-z]{3,8}", other in "[a-z]{3,8}") {
        let contacts = vec![
            Record::new("1").with("firstname", &first).with("email", "same@x.com"),
            Record::new("2").with("firstname", &other).with("email", " SAME@x.com"),
        ];
        let clusters = DuplicateClusterer::default().find_duplicate_contacts(&contacts);
        prop_assert_eq!(clusters.len(), 1);
        prop_assert_eq!(clusters[0].similarity_score, 1.0);
    }
}

// Property: gap scoring
proptest! {
    #[test]
    fn importance_stays_in_unit_range(
        fields in prop::collection::vec("[a-z]{1,10}", 0..12)
    ) {
        let score = gap_importance(EntityType::Contact, &fields);
        prop_assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn gap_analysis_is_idempotent(raw in prop::collection::vec(arb_contact(), 0..15)) {
        let contacts = contacts_from(raw);
        let analyzer = GapAnalyzer::default();
        let first = analyzer.analyze(&contacts, &[]);
        let second = analyzer.analyze(&contacts, &[]);
        prop_assert_eq!(first.critical, second.critical);
        prop_assert_eq!(first.moderate, second.moderate);
        prop_assert_eq!(first.minor, second.minor);
    }
}

#[test]
fn empty_record_is_critical_with_full_importance() {
    let gap = GapAnalyzer::default()
        .analyze_record(EntityType::Company, &Record::new("1"))
        .unwrap();
    assert_eq!(gap.importance_score, 1.0);
    assert_eq!(gap.severity, Severity::Critical);
}

// Property: quality score is monotone and never negative
proptest! {
    #[test]
    fn quality_score_monotone(records in 1usize..500, gaps in 0usize..500, clusters in 0usize..20) {
        let base = data_quality_score(records, gaps, clusters);
        prop_assert!(base >= 0.0);
        prop_assert!(data_quality_score(records, gaps + 1, clusters) <= base);
        prop_assert!(data_quality_score(records, gaps, clusters + 1) <= base);
    }
}
