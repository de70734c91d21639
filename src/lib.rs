//! Interactive comparison of gene-expression levels between tissue groups.
//!
//! The library loads the numeric body of a GEO series-matrix file into an
//! [`ExpressionMatrix`], infers the sample grouping from the file's
//! `!Sample_*` metadata lines (falling back to a known-good table when the
//! metadata is unusable), and answers two-group Welch t-test queries for
//! individual probes. The binary wraps this in a small console menu.

pub mod display;
pub mod groups;
pub mod matrix;
pub mod param;
pub mod session;
pub mod stats;

pub use groups::{infer_groups, GroupMapping};
pub use matrix::{ExpressionMatrix, LoadError};
pub use stats::{compare, AnalysisError, ComparisonResult};
