use std::io::Write;
use std::path::PathBuf;

use jacoco_review::{
    ChangedFiles, CollectedFeedback, CoverageReview, ReportOptions, ReviewError, ScopeConfig, ThresholdConfig,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn changes() -> ChangedFiles {
    ChangedFiles::new(
        vec!["src/java/com/example/CachedRepository.java".to_string()],
        vec!["src/java/io/sample/UseCase.java".to_string()],
    )
}

fn review(thresholds: ThresholdConfig) -> CoverageReview {
    CoverageReview::new(thresholds, ScopeConfig::default(), changes())
}

fn markdown_of(feedback: &CollectedFeedback) -> &str {
    assert_eq!(feedback.markdowns.len(), 1);
    &feedback.markdowns[0]
}

#[test]
fn test_report_with_class_override() {
    let thresholds = ThresholdConfig::new(50.0)
        .with_class_threshold("com/example/CachedRepository", 100.0)
        .unwrap();
    let mut feedback = CollectedFeedback::default();

    review(thresholds)
        .report(&fixture("output_a.xml"), ReportOptions::default(), &mut feedback)
        .unwrap();

    assert_eq!(
        feedback.errors,
        vec![
            "Total coverage of 32.9%. Improve this to at least 50%",
            "Class coverage is below minimum. Improve to at least 0%",
        ]
    );
    let markdown = markdown_of(&feedback);
    assert!(markdown.contains("### JaCoCo Code Coverage 32.9% :warning:"));
    assert!(markdown.contains("| Class | Covered | Required | Status |"));
    assert!(markdown.contains("|:---|:---:|:---:|:---:|"));
    assert!(markdown.contains("| `com/example/CachedRepository` | 50% | 100% | :warning: |"));
}

#[test]
fn test_regex_class_coverage() {
    let thresholds = ThresholdConfig::new(50.0).with_class_threshold(".*Repository", 60.0).unwrap();
    let mut feedback = CollectedFeedback::default();

    review(thresholds)
        .report(&fixture("output_a.xml"), ReportOptions::default(), &mut feedback)
        .unwrap();

    assert!(markdown_of(&feedback).contains("| `com/example/CachedRepository` | 50% | 60% | :warning: |"));
}

#[test]
fn test_package_coverage() {
    let cases: Vec<(Vec<(&str, f64)>, Option<f64>, &str)> = vec![
        (vec![("com/example/", 70.0)], None, "70%"),
        (vec![("com/example/", 70.0), ("com/", 90.0)], None, "70%"),
        (vec![("com/example/", 77.0), ("com/", 30.0)], None, "77%"),
        (vec![("com/example/", 77.0), ("com/", 30.0)], Some(100.0), "100%"),
        (vec![("com/example/", 90.0), ("com/", 85.0)], Some(80.0), "80%"),
    ];

    for (packages, class_override, required) in cases {
        let mut thresholds = ThresholdConfig::new(50.0);
        for (prefix, percentage) in &packages {
            thresholds.add_package_threshold(prefix, *percentage);
        }
        if let Some(percentage) = class_override {
            thresholds.add_class_threshold("com/example/CachedRepository", percentage).unwrap();
        }

        let mut feedback = CollectedFeedback::default();
        review(thresholds)
            .report(&fixture("output_a.xml"), ReportOptions::default(), &mut feedback)
            .unwrap();

        let expected = format!("| `com/example/CachedRepository` | 50% | {} | :warning: |", required);
        assert!(
            markdown_of(&feedback).contains(&expected),
            "missing {:?} for packages {:?}",
            expected,
            packages
        );
    }
}

#[test]
fn test_reports_all_classes_by_default() {
    let mut feedback = CollectedFeedback::default();

    let verdict = review(ThresholdConfig::new(50.0))
        .report(&fixture("output_c.xml"), ReportOptions::default(), &mut feedback)
        .unwrap();

    assert!(verdict.passed());
    assert!(feedback.errors.is_empty());
    let markdown = markdown_of(&feedback);
    assert!(markdown.contains("### JaCoCo Code Coverage 55.59% :white_check_mark:"));
    assert!(markdown.contains("| `com/example/CachedRepository` | 50% | 0% | :white_check_mark: |"));
    assert!(markdown.contains("| `io/sample/UseCase` | 66% | 0% | :white_check_mark: |"));
}

#[test]
fn test_only_new_files() {
    let thresholds = ThresholdConfig::new(50.0).with_minimum_class(70.0);
    let scope = ScopeConfig {
        only_new_files: true,
        ..Default::default()
    };
    let mut feedback = CollectedFeedback::default();

    CoverageReview::new(thresholds, scope, changes())
        .report(&fixture("output_c.xml"), ReportOptions::default(), &mut feedback)
        .unwrap();

    let markdown = markdown_of(&feedback);
    assert!(markdown.contains("### JaCoCo Code Coverage 55.59% :white_check_mark:"));
    assert!(markdown.contains("| `io/sample/UseCase` | 66% | 70% | :warning: |"));
    assert!(!markdown.contains("com/example/CachedRepository"));
    assert_eq!(
        feedback.errors,
        vec!["Class coverage is below minimum. Improve to at least 70%"]
    );
}

#[test]
fn test_far_below_project_threshold() {
    let thresholds = ThresholdConfig::new(70.0).with_minimum_class(100.0);
    let mut feedback = CollectedFeedback::default();

    let verdict = review(thresholds)
        .report(&fixture("output_a.xml"), ReportOptions::default(), &mut feedback)
        .unwrap();

    assert!(!verdict.passed());
    assert_eq!(
        feedback.errors,
        vec![
            "Total coverage of 32.9%. Improve this to at least 70%",
            "Class coverage is below minimum. Improve to at least 100%",
        ]
    );
    let markdown = markdown_of(&feedback);
    assert!(markdown.contains("### JaCoCo Code Coverage 32.9% :skull:"));
    // Exactly half the requirement is not far below it
    assert!(markdown.contains("| `com/example/CachedRepository` | 50% | 100% | :warning: |"));
}

#[test]
fn test_link_to_report() {
    let thresholds = ThresholdConfig::new(50.0).with_minimum_class(80.0);
    let mut feedback = CollectedFeedback::default();

    review(thresholds)
        .report(&fixture("output_a.xml"), "http://test.com/", &mut feedback)
        .unwrap();

    assert!(markdown_of(&feedback).contains(
        "| [`com/example/CachedRepository`](http://test.com/com.example/CachedRepository.html) | 50% | 80% | :warning: |"
    ));
}

#[test]
fn test_fail_on_no_data_with_classes_present() {
    let thresholds = ThresholdConfig::new(50.0).with_minimum_class(80.0);
    let options = ReportOptions {
        link_base_url: None,
        fail_on_no_data: Some(true),
    };
    let mut feedback = CollectedFeedback::default();

    assert!(review(thresholds)
        .report(&fixture("output_a.xml"), options, &mut feedback)
        .is_ok());
}

#[test]
fn test_empty_report_fails_by_default() {
    let thresholds = ThresholdConfig::new(50.0).with_minimum_class(80.0);
    let mut feedback = CollectedFeedback::default();

    let result = review(thresholds).report(&fixture("output_b.xml"), ReportOptions::default(), &mut feedback);

    assert!(matches!(result, Err(ReviewError::NoCoverageData(_))));
    assert!(feedback.markdowns.is_empty());
}

#[test]
fn test_empty_report_fails_when_requested() {
    let thresholds = ThresholdConfig::new(50.0).with_minimum_class(80.0);
    let options = ReportOptions {
        link_base_url: None,
        fail_on_no_data: Some(true),
    };
    let mut feedback = CollectedFeedback::default();

    let result = review(thresholds).report(&fixture("output_b.xml"), options, &mut feedback);
    assert!(matches!(result, Err(ReviewError::NoCoverageData(_))));
}

#[test]
fn test_empty_report_warns_when_requested() {
    let thresholds = ThresholdConfig::new(50.0).with_minimum_class(80.0);
    let options = ReportOptions {
        link_base_url: None,
        fail_on_no_data: Some(false),
    };
    let mut feedback = CollectedFeedback::default();

    let verdict = review(thresholds)
        .report(&fixture("output_b.xml"), options, &mut feedback)
        .unwrap();

    assert!(!verdict.has_data);
    assert!(feedback.errors.is_empty());
    assert_eq!(feedback.warnings, vec!["No classes found in coverage report empty"]);
    assert!(feedback.markdowns.is_empty());
}

#[test]
fn test_malformed_report() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"<coverage line-rate=\"0.8\"><packages/></coverage>").unwrap();
    let mut feedback = CollectedFeedback::default();

    let result = review(ThresholdConfig::new(50.0)).report(file.path(), ReportOptions::default(), &mut feedback);

    assert!(matches!(result, Err(ReviewError::MalformedReport(_))));
    assert!(feedback.errors.is_empty());
    assert!(feedback.markdowns.is_empty());
}
