//! Result types produced by every analysis provider
//!
//! - Per-dimension scores, issues and suggestions
//! - The complete diagnosis handed back to callers
//! - Score bands used for reporting

mod diagnosis;
mod score;

pub use diagnosis::{
    DiagnosisPayload, DiagnosisResult, Dimension, DimensionResult, Dimensions, rounded_mean,
};
pub use score::ScoreLevel;
