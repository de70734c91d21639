//! End-to-end run over a checked-in series matrix fixture: load the numeric
//! body, infer the grouping from the metadata lines, and query it the way
//! the interactive surface does.

use approx::assert_relative_eq;
use geodiff::groups::{fallback_mapping, infer_groups};
use geodiff::matrix::ExpressionMatrix;
use geodiff::param::Input;
use geodiff::session::{Command, Outcome, Session};
use geodiff::AnalysisError;

const FIXTURE: &str = "samples/tests/GSE9002_series_matrix.txt";

fn load_fixture() -> ExpressionMatrix {
    let input = Input {
        path: FIXTURE.to_string(),
        comment_char: "!".to_string(),
        skip_rows: 0,
    };
    ExpressionMatrix::load(FIXTURE, &input).unwrap()
}

#[test]
fn test_load_infer_compare() {
    let matrix = load_fixture();
    let mapping = infer_groups(FIXTURE);
    let session = Session::new(&matrix, &mapping, 10);

    let outcome = session.dispatch(Command::Compare {
        probe: "1007_s_at".to_string(),
        group1: "Brain".to_string(),
        group2: "Lung".to_string(),
    });
    let result = match outcome {
        Outcome::Comparison(result) => result,
        other => panic!("expected a comparison, got {:?}", other),
    };

    assert_relative_eq!(result.mean1, 6.0);
    assert_relative_eq!(result.mean2, 11.0);
    assert_eq!((result.n1, result.n2), (2, 2));
    // Welch on {5,7} vs {10,12}
    assert_relative_eq!(result.p_value, 0.07152330911474068, max_relative = 1e-6);
    assert!(result.t_statistic < 0.0, "Brain expresses below Lung for this probe");
}

#[test]
fn test_missing_cell_shrinks_one_group() {
    let matrix = load_fixture();
    let mapping = infer_groups(FIXTURE);

    // 1053_at has a null reading for GSM104, leaving Lung with one value
    let err = geodiff::compare(&matrix, &mapping, "1053_at", "Brain", "Lung").unwrap_err();
    assert_eq!(err, AnalysisError::InsufficientData(vec!["Lung".to_string()]));

    // Brain vs Colon is unaffected by that hole
    let result = geodiff::compare(&matrix, &mapping, "1053_at", "Brain", "Colon").unwrap();
    assert_eq!((result.n1, result.n2), (2, 2));
    assert_relative_eq!(result.mean1, 3.55);
    assert_relative_eq!(result.mean2, 5.55);
}

#[test]
fn test_search_matches_fixture_probes() {
    let matrix = load_fixture();
    let mapping = infer_groups(FIXTURE);
    let session = Session::new(&matrix, &mapping, 10);

    match session.dispatch(Command::Search("s_AT".to_string())) {
        Outcome::Matches(matches) => assert_eq!(matches, ["1007_s_at"]),
        other => panic!("expected matches, got {:?}", other),
    }
}

#[test]
fn test_dropped_column_never_reappears() {
    let matrix = load_fixture();
    assert!(
        matrix.sample_col("GSM107").is_none(),
        "the fully-missing GSM107 column must not resurface after loading"
    );

    // A mapping that still references it desynchronizes loudly
    let mut mapping = infer_groups(FIXTURE);
    mapping.push("Brain", "GSM107");
    let err = geodiff::compare(&matrix, &mapping, "1007_s_at", "Brain", "Lung").unwrap_err();
    assert_eq!(err, AnalysisError::SampleIdMismatch("GSM107".to_string()));
}

#[test]
fn test_fallback_mapping_desynchronizes_from_foreign_matrix() {
    // The fallback table names GSM157xx accessions that this matrix does not
    // carry; comparisons against it must name the offending id.
    let matrix = load_fixture();
    let mapping = fallback_mapping();
    let err = geodiff::compare(&matrix, &mapping, "1007_s_at", "Brain", "Lung").unwrap_err();
    assert_eq!(err, AnalysisError::SampleIdMismatch("GSM15785".to_string()));
}
