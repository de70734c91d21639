use crate::matrix::strip_field;
use log::{debug, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};

/// Metadata row holding the free-text sample titles.
const TITLE_MARKER: &str = "!Sample_title";
/// Metadata row holding the sample accession ids, aligned with the titles.
const ACCESSION_MARKER: &str = "!Sample_geo_accession";
/// Alternate title rows mentioning this keyword describe the assayed protein
/// rather than the tissue and must not drive the grouping.
const EXCLUDED_TITLE_KEYWORD: &str = "aspartic";
/// Inference that fails to produce this label is considered garbled and is
/// replaced wholesale by the fallback table.
const REQUIRED_LABEL: &str = "Brain";

/// Known-good grouping for the GSE1000 dataset family, used whenever
/// inference fails. Initialized once, immutable.
const FALLBACK_GROUPS: [(&str, &[&str]); 3] = [
    ("Brain", &["GSM15785", "GSM15786", "GSM15787", "GSM15788", "GSM15789"]),
    ("Lung", &["GSM15790", "GSM15791", "GSM15792", "GSM15794", "GSM15795"]),
    ("Colon", &["GSM15796", "GSM15797", "GSM15798", "GSM15799", "GSM15800"]),
];

/// Group label -> accession ids, insertion-ordered by first appearance.
#[derive(Clone, Debug, Default)]
pub struct GroupMapping {
    labels: Vec<String>,
    samples: HashMap<String, Vec<String>>,
}

impl GroupMapping {
    pub fn push(&mut self, label: &str, accession: &str) {
        if !self.samples.contains_key(label) {
            self.labels.push(label.to_string());
        }
        self.samples
            .entry(label.to_string())
            .or_default()
            .push(accession.to_string());
    }

    pub fn get(&self, label: &str) -> Option<&[String]> {
        self.samples.get(label).map(|ids| ids.as_slice())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.samples.contains_key(label)
    }

    /// Labels in first-seen order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Labels sorted alphabetically, for display.
    pub fn sorted_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.labels.iter().map(|l| l.as_str()).collect();
        labels.sort_unstable();
        labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

pub fn fallback_mapping() -> GroupMapping {
    let mut mapping = GroupMapping::default();
    for (label, accessions) in FALLBACK_GROUPS {
        for accession in accessions {
            mapping.push(label, accession);
        }
    }
    mapping
}

/// Reduce a free-text sample title to a group label: first whitespace token,
/// truncated at the first `_` or `:`, trimmed, capitalized. Crude on purpose;
/// downstream lookups depend on this exact text.
pub fn normalize_label(title: &str) -> String {
    let token = title.split_whitespace().next().unwrap_or("");
    let token = token.split(['_', ':']).next().unwrap_or("");
    capitalize(token.trim())
}

/// First character uppercased, the rest lowercased. Applied to inferred
/// labels and to user-typed group names so both sides match textually.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

/// Infer the sample grouping from the file's metadata lines. Total: any
/// read failure, and any result missing the required label, degrades to the
/// fixed fallback table instead of surfacing an error.
pub fn infer_groups(path: &str) -> GroupMapping {
    let mapping = match try_infer(path) {
        Ok(mapping) => mapping,
        Err(e) => {
            warn!("Could not parse sample metadata from {} ({}). Using default groups.", path, e);
            return fallback_mapping();
        }
    };

    if !mapping.contains(REQUIRED_LABEL) {
        debug!(
            "Inferred groups {:?} lack '{}'; substituting the default table.",
            mapping.labels(),
            REQUIRED_LABEL
        );
        return fallback_mapping();
    }

    debug!("Inferred {} sample groups: {:?}", mapping.len(), mapping.labels());
    mapping
}

fn try_infer(path: &str) -> Result<GroupMapping, std::io::Error> {
    let reader = BufReader::new(File::open(path)?);

    let mut titles: Vec<String> = Vec::new();
    let mut accessions: Vec<String> = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.starts_with(TITLE_MARKER) && !line.to_lowercase().contains(EXCLUDED_TITLE_KEYWORD) {
            titles = metadata_fields(&line);
        }
        if line.starts_with(ACCESSION_MARKER) {
            accessions = metadata_fields(&line);
        }
    }

    let mut mapping = GroupMapping::default();
    for (title, accession) in titles.iter().zip(accessions.iter()) {
        mapping.push(&normalize_label(title), accession);
    }
    Ok(mapping)
}

/// Tab-separated fields after the marker token, quote-stripped.
fn metadata_fields(line: &str) -> Vec<String> {
    line.split('\t').skip(1).map(|field| strip_field(field).to_string()).collect()
}
