//! Console formatting of comparison results: the text block and an ASCII
//! box-and-whisker plot. Everything here is presentation; the statistics are
//! computed in `stats`.

use crate::stats::ComparisonResult;

const PLOT_WIDTH: usize = 60;
const LABEL_WIDTH: usize = 12;
const GROUP_COLORS: [&str; 2] = ["\x1b[36m", "\x1b[33m"];
const COLOR_RESET: &str = "\x1b[0m";

pub fn format_result(result: &ComparisonResult) -> String {
    format!(
        "--- Results for {} ---\n\
         {} mean: {:.4} (n={})\n\
         {} mean: {:.4} (n={})\n\
         t-statistic: {:.4}\n\
         P-value: {:.6}",
        result.probe_id,
        result.group1,
        result.mean1,
        result.n1,
        result.group2,
        result.mean2,
        result.n2,
        result.t_statistic,
        result.p_value,
    )
}

/// Five-number summary of a group's readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveNumbers {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Quartiles by linear interpolation over the order statistics. `values`
/// must be non-empty.
pub fn five_numbers(values: &[f64]) -> FiveNumbers {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    FiveNumbers {
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    }
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let low = pos.floor() as usize;
    let high = pos.ceil() as usize;
    let frac = pos - low as f64;
    sorted[low] + (sorted[high] - sorted[low]) * frac
}

/// Side-by-side boxplot of the two groups on a shared scale, annotated with
/// the comparison's p-value.
pub fn render_boxplot(
    result: &ComparisonResult,
    values1: &[f64],
    values2: &[f64],
    colorful: bool,
) -> String {
    let summaries = [five_numbers(values1), five_numbers(values2)];
    let lo = summaries.iter().map(|s| s.min).fold(f64::INFINITY, f64::min);
    let hi = summaries.iter().map(|s| s.max).fold(f64::NEG_INFINITY, f64::max);

    let mut out = format!(
        "Comparison: {} {} vs {} (p={:.4})\n",
        result.probe_id, result.group1, result.group2, result.p_value
    );
    let labels = [&result.group1, &result.group2];
    let counts = [result.n1, result.n2];
    for (index, summary) in summaries.iter().enumerate() {
        let row = boxplot_row(summary, lo, hi);
        let (tint, reset) = if colorful {
            (GROUP_COLORS[index], COLOR_RESET)
        } else {
            ("", "")
        };
        out.push_str(&format!(
            "{:<width$} {}{}{} (n={})\n",
            labels[index],
            tint,
            row,
            reset,
            counts[index],
            width = LABEL_WIDTH
        ));
    }
    out.push_str(&format!("{:<width$} {:<8.2} -> {:.2}", "scale", lo, hi, width = LABEL_WIDTH));
    out
}

fn boxplot_row(summary: &FiveNumbers, lo: f64, hi: f64) -> String {
    let span = if hi > lo { hi - lo } else { 1.0 };
    let position = |value: f64| -> usize {
        (((value - lo) / span) * (PLOT_WIDTH - 1) as f64).round() as usize
    };

    let mut row = vec![' '; PLOT_WIDTH];
    let (min, q1, med, q3, max) =
        (position(summary.min), position(summary.q1), position(summary.median), position(summary.q3), position(summary.max));
    for cell in row.iter_mut().take(max + 1).skip(min) {
        *cell = '-';
    }
    for cell in row.iter_mut().take(q3 + 1).skip(q1) {
        *cell = '=';
    }
    row[min] = '|';
    row[max] = '|';
    row[q1] = '[';
    row[q3] = ']';
    row[med] = '|';
    row.into_iter().collect()
}

// unit tests
#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_result() -> ComparisonResult {
        ComparisonResult {
            probe_id: "1007_s_at".to_string(),
            group1: "Brain".to_string(),
            group2: "Lung".to_string(),
            mean1: 6.0,
            mean2: 11.0,
            t_statistic: -3.5355,
            p_value: 0.071523,
            n1: 2,
            n2: 2,
        }
    }

    #[test]
    fn test_five_numbers_interpolates() {
        let summary = five_numbers(&[4.0, 1.0, 3.0, 2.0]);
        assert_relative_eq!(summary.min, 1.0);
        assert_relative_eq!(summary.q1, 1.75);
        assert_relative_eq!(summary.median, 2.5);
        assert_relative_eq!(summary.q3, 3.25);
        assert_relative_eq!(summary.max, 4.0);

        let single = five_numbers(&[7.0, 7.0]);
        assert_eq!(single.median, 7.0);
        assert_eq!(single.q1, 7.0, "constant data collapses the box");
    }

    #[test]
    fn test_format_result() {
        let text = format_result(&test_result());
        assert!(text.contains("--- Results for 1007_s_at ---"));
        assert!(text.contains("Brain mean: 6.0000 (n=2)"));
        assert!(text.contains("Lung mean: 11.0000 (n=2)"));
        assert!(text.contains("P-value: 0.071523"));
    }

    #[test]
    fn test_render_boxplot_markers() {
        let plot = render_boxplot(&test_result(), &[5.0, 7.0], &[10.0, 12.0], false);
        assert!(plot.contains("(p=0.0715)"));
        assert!(plot.contains("Brain"));
        assert!(plot.contains("(n=2)"));
        let brain_row = plot.lines().nth(1).unwrap();
        assert!(brain_row.contains('[') && brain_row.contains(']'), "box edges must be drawn");
        assert!(!plot.contains('\x1b'), "no ANSI codes without display_colorful");

        let colored = render_boxplot(&test_result(), &[5.0, 7.0], &[10.0, 12.0], true);
        assert!(colored.contains("\x1b[36m") && colored.contains("\x1b[0m"));
    }

    #[test]
    fn test_boxplot_rows_share_scale() {
        let plot = render_boxplot(&test_result(), &[5.0, 7.0], &[10.0, 12.0], false);
        let rows: Vec<&str> = plot.lines().skip(1).take(2).collect();
        let first_box = rows[0].find('[').unwrap();
        let second_box = rows[1].find('[').unwrap();
        assert!(
            first_box < second_box,
            "the lower-expressed group must sit left of the higher one on the shared axis"
        );
    }
}
