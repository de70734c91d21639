use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::BufReader;

// Field definitions and associated default values

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Param {
    #[serde(default)]
    pub general: General,
    #[serde(default)]
    pub input: Input,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct General {
    #[serde(default = "log_base_default")]
    pub log_base: String,
    #[serde(default = "log_suffix_default")]
    pub log_suffix: String,
    #[serde(default = "log_level_default")]
    pub log_level: String,
    #[serde(default = "true_default")]
    pub display_colorful: bool,
    #[serde(default = "n_search_results_default")]
    pub n_search_results: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Input {
    #[serde(default = "empty_string")]
    pub path: String,
    #[serde(default = "comment_char_default")]
    pub comment_char: String,
    #[serde(default = "skip_rows_default")]
    pub skip_rows: usize,
}

// Default section definitions

impl Default for General {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Default for Input {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Default for Param {
    fn default() -> Self {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }
}

impl Param {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn get(param_file: String) -> Result<Param, Box<dyn Error>> {
    let param_file_reader = File::open(param_file)?;
    let param_reader = BufReader::new(param_file_reader);

    let mut config: Param = serde_yaml::from_reader(param_reader)?;

    validate(&mut config)?;

    Ok(config)
}

pub fn validate(param: &mut Param) -> Result<(), String> {
    if !param.general.log_base.is_empty() {
        param.general.display_colorful = false;
    }

    if param.input.path.is_empty() {
        return Err("input.path must point to a series matrix file.".to_string());
    }

    if param.input.comment_char.is_empty() {
        return Err("input.comment_char must not be empty.".to_string());
    }

    if param.general.n_search_results == 0 {
        warn!("n_search_results=0: probe searches will never return matches.");
    }

    Ok(())
}

// Default value definitions

fn empty_string() -> String {
    "".to_string()
}
fn log_base_default() -> String {
    "".to_string()
}
fn log_suffix_default() -> String {
    "log".to_string()
}
fn log_level_default() -> String {
    "info".to_string()
}
fn true_default() -> bool {
    true
}
fn n_search_results_default() -> usize {
    10
}
fn comment_char_default() -> String {
    "!".to_string()
}
fn skip_rows_default() -> usize {
    30
}

// unit tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let param = Param::new();
        assert_eq!(param.input.comment_char, "!", "metadata lines are marked with ! by default");
        assert_eq!(param.input.skip_rows, 30, "series matrix preambles span 30 lines by default");
        assert_eq!(param.general.n_search_results, 10, "probe searches return up to 10 matches by default");
        assert_eq!(param.general.log_level, "info");
        assert!(param.input.path.is_empty(), "no input file is configured by default");
    }

    #[test]
    fn test_validate_requires_path() {
        let mut param = Param::new();
        assert!(validate(&mut param).is_err(), "validation must reject a missing input path");

        param.input.path = "GSE1000_series_matrix.txt".to_string();
        assert!(validate(&mut param).is_ok());
    }

    #[test]
    fn test_validate_disables_color_with_file_logging() {
        let mut param = Param::new();
        param.input.path = "GSE1000_series_matrix.txt".to_string();
        param.general.log_base = "geodiff".to_string();
        validate(&mut param).unwrap();
        assert!(
            !param.general.display_colorful,
            "ANSI color must be disabled when logging to a file"
        );
    }

    #[test]
    fn test_yaml_roundtrip() {
        let yaml = "input:\n  path: data.txt\n  skip_rows: 0\n";
        let param: Param = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(param.input.path, "data.txt");
        assert_eq!(param.input.skip_rows, 0);
        assert_eq!(param.input.comment_char, "!", "unset fields fall back to their defaults");
    }
}
