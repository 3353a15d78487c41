//! Describe-style summary table over the numeric columns of a dataset.

use super::Dataset;

const ROWS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Render count, mean, std, min, quartiles, and max per numeric column.
///
/// Standard deviation is the sample (n - 1) estimate; quartiles use linear
/// interpolation between closest ranks.
pub fn describe(dataset: &Dataset) -> String {
    let columns: Vec<(&str, [f64; 8])> = dataset
        .columns
        .iter()
        .filter_map(|name| {
            let values = dataset.numeric_column(name)?;
            Some((name.as_str(), column_stats(values)))
        })
        .collect();

    if columns.is_empty() {
        return "No numeric columns.".to_string();
    }

    let cells: Vec<Vec<String>> = columns
        .iter()
        .map(|(_, stats)| stats.iter().map(|v| format_cell(*v)).collect())
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .zip(&cells)
        .map(|((name, _), col)| {
            col.iter()
                .map(String::len)
                .chain(std::iter::once(name.len()))
                .max()
                .unwrap_or(0)
                + 2
        })
        .collect();
    let label_width = ROWS.iter().map(|r| r.len()).max().unwrap_or(0);

    let mut out = String::new();
    out.push_str(&" ".repeat(label_width));
    for ((name, _), &width) in columns.iter().zip(&widths) {
        out.push_str(&format!("{name:>width$}"));
    }
    for (row, label) in ROWS.iter().enumerate() {
        out.push('\n');
        out.push_str(&format!("{label:<label_width$}"));
        for (col, &width) in cells.iter().zip(&widths) {
            out.push_str(&format!("{:>width$}", col[row]));
        }
    }
    out
}

fn format_cell(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:.6}")
    }
}

fn column_stats(mut values: Vec<f64>) -> [f64; 8] {
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = if values.len() > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    } else {
        f64::NAN
    };

    [
        n,
        mean,
        std,
        values[0],
        quantile(&values, 0.25),
        quantile(&values, 0.5),
        quantile(&values, 0.75),
        values[values.len() - 1],
    ]
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
