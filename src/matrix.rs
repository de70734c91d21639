use crate::param::Input;
use log::{info, warn};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file '{0}' was not found")]
    FileNotFound(String),
    #[error("no expression data found in '{0}'")]
    EmptyData(String),
    #[error("malformed matrix file: {0}")]
    MalformedFile(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Expression values indexed by probe row and sample column. A missing
/// reading is an absent key in `values`, never a sentinel number, so zero
/// expression and "no measurement" stay distinct.
#[derive(Clone)]
pub struct ExpressionMatrix {
    pub values: HashMap<(usize, usize), f64>,
    pub probes: Vec<String>,
    pub samples: Vec<String>,
    probe_index: HashMap<String, usize>,
    sample_index: HashMap<String, usize>,
    pub probe_len: usize,
    pub sample_len: usize,
}

/// GEO wraps identifiers in double quotes; metadata fields may also carry
/// stray spaces or line endings.
pub(crate) fn strip_field(field: &str) -> &str {
    field.trim_matches(|c| c == '"' || c == ' ' || c == '\n' || c == '\r')
}

impl ExpressionMatrix {
    /// Load the numeric body of a series matrix file.
    ///
    /// The first `input.skip_rows` raw lines are skipped, then every line
    /// starting with `input.comment_char`. The first remaining line is the
    /// header (probe-id column followed by sample ids); each following row
    /// maps its first field to a probe id and the rest to values, with
    /// non-numeric cells kept as missing. Columns with no value for any
    /// probe are dropped.
    pub fn load(path: &str, input: &Input) -> Result<ExpressionMatrix, LoadError> {
        info!("Loading dataset {}...", path);
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoadError::FileNotFound(path.to_string()),
            _ => LoadError::Io(e),
        })?;
        let reader = BufReader::new(file);

        let mut header: Option<Vec<String>> = None;
        let mut rows: Vec<(String, Vec<Option<f64>>)> = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line_no < input.skip_rows {
                continue;
            }
            let trimmed_line = line.strip_suffix('\r').unwrap_or(&line);
            if trimmed_line.starts_with(&input.comment_char) || trimmed_line.is_empty() {
                continue;
            }

            let mut fields = trimmed_line.split('\t');
            match header {
                None => {
                    let names: Vec<String> = fields.skip(1).map(|f| strip_field(f).to_string()).collect();
                    if names.is_empty() {
                        return Err(LoadError::MalformedFile(format!(
                            "header row of '{}' has no sample columns",
                            path
                        )));
                    }
                    header = Some(names);
                }
                Some(ref names) => {
                    // First field is the probe id, the rest are readings
                    let probe = match fields.next() {
                        Some(id) => strip_field(id).to_string(),
                        None => continue,
                    };
                    let mut cells: Vec<Option<f64>> =
                        fields.map(|value| strip_field(value).parse::<f64>().ok()).collect();
                    cells.resize(names.len(), None);
                    rows.push((probe, cells));
                }
            }
        }

        let header = header.ok_or_else(|| {
            LoadError::MalformedFile(format!("no header row found in '{}'", path))
        })?;
        if rows.is_empty() {
            return Err(LoadError::EmptyData(path.to_string()));
        }

        let matrix = Self::from_rows(rows, header);
        if matrix.sample_len == 0 {
            return Err(LoadError::EmptyData(path.to_string()));
        }
        info!("Loaded {} gene probes across {} samples.", matrix.probe_len, matrix.sample_len);
        Ok(matrix)
    }

    /// Build a matrix from parsed rows, dropping columns that carry no
    /// reading for any probe. For duplicated probe ids the last occurrence
    /// wins on lookup.
    pub fn from_rows(rows: Vec<(String, Vec<Option<f64>>)>, header: Vec<String>) -> ExpressionMatrix {
        let kept: Vec<usize> = (0..header.len())
            .filter(|&col| rows.iter().any(|(_, cells)| cells.get(col).copied().flatten().is_some()))
            .collect();
        if kept.len() < header.len() {
            warn!("Dropping {} fully-missing sample column(s).", header.len() - kept.len());
        }

        let samples: Vec<String> = kept.iter().map(|&col| header[col].clone()).collect();
        let mut values: HashMap<(usize, usize), f64> = HashMap::new();
        let mut probes: Vec<String> = Vec::with_capacity(rows.len());
        let mut probe_index: HashMap<String, usize> = HashMap::new();
        for (row, (probe, cells)) in rows.into_iter().enumerate() {
            for (new_col, &col) in kept.iter().enumerate() {
                if let Some(value) = cells.get(col).copied().flatten() {
                    values.insert((row, new_col), value);
                }
            }
            probe_index.insert(probe.clone(), row);
            probes.push(probe);
        }
        let sample_index: HashMap<String, usize> = samples
            .iter()
            .enumerate()
            .map(|(col, name)| (name.clone(), col))
            .collect();

        ExpressionMatrix {
            values,
            probe_len: probes.len(),
            sample_len: samples.len(),
            probes,
            samples,
            probe_index,
            sample_index,
        }
    }

    pub fn probe_row(&self, probe_id: &str) -> Option<usize> {
        self.probe_index.get(probe_id).copied()
    }

    pub fn sample_col(&self, sample_id: &str) -> Option<usize> {
        self.sample_index.get(sample_id).copied()
    }

    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(&(row, col)).copied()
    }

    /// Case-insensitive substring search over probe ids, capped at `limit`.
    pub fn search(&self, term: &str, limit: usize) -> Vec<&str> {
        let needle = term.to_lowercase();
        self.probes
            .iter()
            .filter(|probe| probe.to_lowercase().contains(&needle))
            .map(|probe| probe.as_str())
            .take(limit)
            .collect()
    }
}

impl fmt::Display for ExpressionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Probes: {}   Samples: {}", self.probe_len, self.sample_len)?;

        let samples_string = self.samples.join("\t");
        let truncated_samples = if samples_string.len() > 100 {
            format!("{}...", &samples_string[..97])
        } else {
            samples_string
        };
        writeln!(f, "{:<20} {}", "", truncated_samples)?;

        // Limit to the first 20 rows
        for row in (0..self.probe_len).take(20) {
            let row_display: String = (0..self.sample_len)
                .map(|col| match self.values.get(&(row, col)) {
                    Some(value) => format!("{:.2}", value),
                    None => "".to_string(),
                })
                .collect::<Vec<_>>()
                .join("\t");

            let truncated_row = if row_display.len() > 80 {
                format!("{}...", &row_display[..77])
            } else {
                row_display
            };

            writeln!(f, "{:<20} {}", self.probes[row], truncated_row)?;
        }

        Ok(())
    }
}

impl fmt::Debug for ExpressionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Reuse the Display formatter
        write!(f, "{}", self)
    }
}
