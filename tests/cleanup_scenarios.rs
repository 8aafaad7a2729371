/// End-to-end cleanup scenarios
/// Runs duplicate detection, gap analysis and report generation over small record sets
use crm_cleanup_api::config::AnalysisConfig;
use crm_cleanup_api::core::clustering::DuplicateClusterer;
use crm_cleanup_api::core::gaps::GapAnalyzer;
use crm_cleanup_api::core::models::{EntityType, MatchType, Record, RecommendedAction, Severity};
use crm_cleanup_api::core::recommendations::{Priority, Recommendations};
use crm_cleanup_api::core::report::generate_cleanup_report;
use crm_cleanup_api::api::render::{render_action_plan, render_report};

fn full_contact(id: &str, first: &str, last: &str, email: &str) -> Record {
    Record::new(id)
        .with("firstname", first)
        .with("lastname", last)
        .with("email", email)
        .with("phone", "+1 555 0100")
        .with("jobtitle", "Engineer")
        .with("company", "Acme")
}

#[test]
fn test_shared_email_forms_one_cluster() {
    let contacts = vec![
        Record::new("1")
            .with("email", "a@x.com")
            .with("firstname", "Jo")
            .with("lastname", "Doe"),
        Record::new("2")
            .with("email", "a@x.com")
            .with("firstname", "Joe")
            .with("lastname", "Doe"),
    ];

    let clusters = DuplicateClusterer::default().find_duplicate_contacts(&contacts);

    assert_eq!(clusters.len(), 1);
    let cluster = &clusters[0];
    assert_eq!(cluster.primary_id, "1");
    assert_eq!(cluster.duplicate_ids, vec!["2"]);
    assert_eq!(cluster.match_type, MatchType::Email);
    assert_eq!(cluster.similarity_score, 1.0);
    assert_eq!(cluster.recommended_action, RecommendedAction::MergeRecords);
}

#[test]
fn test_contact_missing_most_fields_is_critical() {
    let contact = Record::new("3")
        .with("email", "")
        .with("firstname", "")
        .with("lastname", "")
        .with("phone", "555")
        .with("jobtitle", "")
        .with("company", "");

    let gap = GapAnalyzer::default()
        .analyze_record(EntityType::Contact, &contact)
        .expect("contact 3 has gaps");

    assert_eq!(
        gap.missing_fields,
        vec!["firstname", "lastname", "email", "jobtitle", "company"]
    );
    assert!((gap.importance_score - 3.4 / 3.8).abs() < 1e-9);
    assert_eq!(gap.severity, Severity::Critical);
    assert_eq!(gap.object_name, "Contact 3");
}

#[test]
fn test_shared_domain_forms_one_cluster() {
    let companies = vec![
        Record::new("1").with("name", "Acme").with("domain", "acme.com"),
        Record::new("2").with("name", "Acme Corp").with("domain", "acme.com"),
    ];

    let clusters = DuplicateClusterer::default().find_duplicate_companies(&companies);

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].primary_id, "1");
    assert_eq!(clusters[0].duplicate_ids, vec!["2"]);
    assert_eq!(clusters[0].match_type, MatchType::Domain);
    assert_eq!(clusters[0].similarity_score, 1.0);
}

#[test]
fn test_report_totals_and_actions() {
    let contacts = vec![
        full_contact("1", "Ana", "Lima", "ana@x.com"),
        full_contact("2", "Ana", "Lima", "ana@x.com"),
        full_contact("3", "Bruno", "Souza", "bruno@y.com"),
        Record::new("4").with("phone", "555"),
        Record::new("5")
            .with("phone", "555")
            .with("jobtitle", "CFO")
            .with("company", "Acme"),
    ];

    let report = generate_cleanup_report(&contacts, &[], &AnalysisConfig::default()).unwrap();

    assert_eq!(report.total_contacts_analyzed, 5);
    assert_eq!(report.total_companies_analyzed, 0);
    assert_eq!(report.potential_duplicate_contacts, 1);
    assert_eq!(report.critical_gaps.len(), 1);
    assert_eq!(report.moderate_gaps.len(), 1);
    assert!(report.minor_gaps.is_empty());
    assert_eq!(report.total_data_gaps, 2);
    assert!((report.data_quality_score - 0.5).abs() < 1e-9);
    assert_eq!(report.estimated_cleanup_minutes, 8);
    assert_eq!(report.estimated_cleanup_time, "8 minutes");
    assert_eq!(
        report.priority_actions,
        vec![
            "Merge 1 groups of duplicate contacts",
            "Fill 1 critical data gaps",
            "Address 1 moderate data gaps",
        ]
    );

    let recommendations = Recommendations::from_report(&report);
    let kinds: Vec<&str> = recommendations
        .quick_wins
        .iter()
        .map(|w| w.kind.as_str())
        .collect();
    assert_eq!(kinds, vec!["merge_high_confidence_contacts", "fill_linkedin_gaps"]);
    assert_eq!(recommendations.long_term_improvements.len(), 1);
    assert_eq!(
        recommendations.long_term_improvements[0].priority,
        Priority::High
    );
    assert!((recommendations.action_plan.expected_score - 0.53).abs() < 1e-9);

    let text = render_report(&report, 5);
    assert!(text.contains("Data quality score: 50.0%"));
    assert!(text.contains("ESTIMATED CLEANUP TIME: 8 minutes"));

    let plan = render_action_plan(&recommendations.action_plan);
    assert!(plan.contains("Phase 1: Quick wins"));
    assert!(plan.contains("Expected quality score: 53.0%"));
}

#[test]
fn test_clean_data_has_perfect_score() {
    let contacts = vec![
        full_contact("1", "Ana", "Lima", "ana@x.com"),
        full_contact("2", "Bruno", "Souza", "bruno@y.com"),
    ];
    let report = generate_cleanup_report(&contacts, &[], &AnalysisConfig::default()).unwrap();

    assert_eq!(report.data_quality_score, 1.0);
    assert!(report.priority_actions.is_empty());
    assert_eq!(report.estimated_cleanup_time, "0 minutes");
}

#[test]
fn test_long_cleanup_formats_hours() {
    // 30 companies with only an industry: each misses 370/440 of the weight
    let companies: Vec<Record> = (0..30)
        .map(|i| Record::new(i.to_string()).with("industry", "Retail"))
        .collect();
    let report = generate_cleanup_report(&[], &companies, &AnalysisConfig::default()).unwrap();

    assert_eq!(report.critical_gaps.len(), 30);
    assert_eq!(report.estimated_cleanup_minutes, 60);
    assert_eq!(report.estimated_cleanup_time, "1h 0m");
    assert_eq!(report.data_quality_score, 0.0);
}

#[test]
fn test_report_serializes_expected_fields() {
    let contacts = vec![full_contact("1", "Ana", "Lima", "ana@x.com")];
    let report = generate_cleanup_report(&contacts, &[], &AnalysisConfig::default()).unwrap();
    let value = serde_json::to_value(&report).unwrap();

    for field in [
        "analysis_timestamp",
        "total_contacts_analyzed",
        "total_companies_analyzed",
        "duplicate_contacts",
        "duplicate_companies",
        "critical_gaps",
        "moderate_gaps",
        "minor_gaps",
        "potential_duplicate_contacts",
        "potential_duplicate_companies",
        "total_data_gaps",
        "data_quality_score",
        "priority_actions",
        "estimated_cleanup_time",
    ] {
        assert!(value.get(field).is_some(), "missing field {}", field);
    }
}
