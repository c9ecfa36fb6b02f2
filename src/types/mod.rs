pub mod error;
pub mod unit;

pub use error::{AutodocError, ErrorCategory, ErrorClassifier, LlmError, Result};
pub use unit::{AnalysisUnit, UnitKind, base_name, join_key};
