use crate::groups::GroupMapping;
use crate::matrix::ExpressionMatrix;
use crate::stats::{self, AnalysisError, ComparisonResult};

/// The three operations the interactive surface can request.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    Compare { probe: String, group1: String, group2: String },
    Quit,
}

#[derive(Debug)]
pub enum Outcome {
    Matches(Vec<String>),
    Comparison(Box<ComparisonResult>),
    /// A rejected analysis: reported to the user, never fatal.
    Failed(AnalysisError),
    Bye,
}

/// Read-only view over the loaded state; dispatch never blocks on input and
/// never mutates the matrix or the mapping.
pub struct Session<'a> {
    pub matrix: &'a ExpressionMatrix,
    pub mapping: &'a GroupMapping,
    pub search_limit: usize,
}

impl<'a> Session<'a> {
    pub fn new(matrix: &'a ExpressionMatrix, mapping: &'a GroupMapping, search_limit: usize) -> Session<'a> {
        Session { matrix, mapping, search_limit }
    }

    pub fn dispatch(&self, command: Command) -> Outcome {
        match command {
            Command::Search(term) => Outcome::Matches(
                self.matrix
                    .search(&term, self.search_limit)
                    .into_iter()
                    .map(String::from)
                    .collect(),
            ),
            Command::Compare { probe, group1, group2 } => {
                match stats::compare(self.matrix, self.mapping, &probe, &group1, &group2) {
                    Ok(result) => Outcome::Comparison(Box::new(result)),
                    Err(e) => Outcome::Failed(e),
                }
            }
            Command::Quit => Outcome::Bye,
        }
    }
}
