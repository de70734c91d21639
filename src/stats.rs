use crate::groups::GroupMapping;
use crate::matrix::ExpressionMatrix;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

/// A comparison needs at least this many readings per group.
pub const MIN_GROUP_SIZE: usize = 2;

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("probe id '{0}' not found")]
    ProbeNotFound(String),
    #[error("group '{0}' is not in the detected group list")]
    GroupNotFound(String),
    #[error("not enough data points for a t-test in group(s) {}", .0.join(", "))]
    InsufficientData(Vec<String>),
    #[error("sample id '{0}' is listed in the metadata but missing from the data columns")]
    SampleIdMismatch(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub probe_id: String,
    pub group1: String,
    pub group2: String,
    pub mean1: f64,
    pub mean2: f64,
    pub t_statistic: f64,
    pub p_value: f64,
    pub n1: usize,
    pub n2: usize,
}

/// The probe's non-missing readings over one group's samples, in the
/// mapping's sample order.
pub fn group_values(
    matrix: &ExpressionMatrix,
    mapping: &GroupMapping,
    probe_id: &str,
    label: &str,
) -> Result<Vec<f64>, AnalysisError> {
    let row = matrix
        .probe_row(probe_id)
        .ok_or_else(|| AnalysisError::ProbeNotFound(probe_id.to_string()))?;
    let accessions = mapping
        .get(label)
        .ok_or_else(|| AnalysisError::GroupNotFound(label.to_string()))?;

    let mut values = Vec::with_capacity(accessions.len());
    for accession in accessions {
        let col = matrix
            .sample_col(accession)
            .ok_or_else(|| AnalysisError::SampleIdMismatch(accession.clone()))?;
        if let Some(value) = matrix.value(row, col) {
            values.push(value);
        }
    }
    Ok(values)
}

/// Compare one probe's expression between two sample groups with Welch's
/// t-test. Pure over its inputs; identical arguments always yield identical
/// statistics.
pub fn compare(
    matrix: &ExpressionMatrix,
    mapping: &GroupMapping,
    probe_id: &str,
    label1: &str,
    label2: &str,
) -> Result<ComparisonResult, AnalysisError> {
    let values1 = group_values(matrix, mapping, probe_id, label1)?;
    let values2 = group_values(matrix, mapping, probe_id, label2)?;

    let mut short: Vec<String> = Vec::new();
    if values1.len() < MIN_GROUP_SIZE {
        short.push(label1.to_string());
    }
    if values2.len() < MIN_GROUP_SIZE {
        short.push(label2.to_string());
    }
    if !short.is_empty() {
        return Err(AnalysisError::InsufficientData(short));
    }

    let (t_statistic, p_value) = welch_t_test(&values1, &values2);

    Ok(ComparisonResult {
        probe_id: probe_id.to_string(),
        group1: label1.to_string(),
        group2: label2.to_string(),
        mean1: mean(&values1),
        mean2: mean(&values2),
        t_statistic,
        p_value,
        n1: values1.len(),
        n2: values2.len(),
    })
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().copied().sum::<f64>() / values.len() as f64
}

fn sample_variance(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0)
}

/// Two-sample t-test without assuming equal variances. Returns the
/// t-statistic and the two-sided p-value. Callers guarantee n >= 2 per side.
pub fn welch_t_test(class_1: &[f64], class_2: &[f64]) -> (f64, f64) {
    let n1 = class_1.len() as f64;
    let n2 = class_2.len() as f64;

    let mean_1 = mean(class_1);
    let mean_2 = mean(class_2);
    let var_1 = sample_variance(class_1, mean_1);
    let var_2 = sample_variance(class_2, mean_2);

    let term_1 = var_1 / n1;
    let term_2 = var_2 / n2;
    let std_err = (term_1 + term_2).sqrt();
    if std_err == 0.0 {
        // Both groups constant and equal: no evidence either way
        if mean_1 == mean_2 {
            return (0.0, 1.0);
        }
        return (f64::INFINITY * (mean_1 - mean_2).signum(), 0.0);
    }

    let t_stat = (mean_1 - mean_2) / std_err;

    // Welch-Satterthwaite degrees of freedom
    let df = (term_1 + term_2).powi(2)
        / (term_1 * term_1 / (n1 - 1.0) + term_2 * term_2 / (n2 - 1.0));

    let p_value = match StudentsT::new(0.0, 1.0, df) {
        Ok(t_dist) => {
            let cumulative = t_dist.cdf(t_stat.abs()); // CDF up to |t_stat|
            2.0 * (1.0 - cumulative) // Two-tailed test
        }
        Err(_) => 1.0,
    };

    (t_stat, p_value)
}
