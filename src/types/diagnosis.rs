use crate::image::ImageFile;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, IntoStaticStr};

/// The five fixed design dimensions
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    Display,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Dimension {
    Color,
    Layout,
    Typography,
    Hierarchy,
    Branding,
}

impl Dimension {
    /// Human-readable title for reports
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Color => "Color Scheme",
            Self::Layout => "Layout",
            Self::Typography => "Typography",
            Self::Hierarchy => "Visual Hierarchy",
            Self::Branding => "Brand Consistency",
        }
    }
}

/// Score, issues and suggestions for a single dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DimensionResult {
    /// Integer score from 0 to 100
    pub score: u8,
    /// Concrete problems found, most important first (may be empty)
    pub issues: Vec<String>,
    /// Actionable improvement suggestions
    pub suggestions: Vec<String>,
}

/// All five dimension results; every dimension is always present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Dimensions {
    pub color: DimensionResult,
    pub layout: DimensionResult,
    pub typography: DimensionResult,
    pub hierarchy: DimensionResult,
    pub branding: DimensionResult,
}

impl Dimensions {
    pub fn get(&self, dimension: Dimension) -> &DimensionResult {
        match dimension {
            Dimension::Color => &self.color,
            Dimension::Layout => &self.layout,
            Dimension::Typography => &self.typography,
            Dimension::Hierarchy => &self.hierarchy,
            Dimension::Branding => &self.branding,
        }
    }

    /// Iterate in the fixed dimension order
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, &DimensionResult)> {
        use strum::IntoEnumIterator;
        Dimension::iter().map(move |d| (d, self.get(d)))
    }

    pub fn scores(&self) -> [u8; 5] {
        [
            self.color.score,
            self.layout.score,
            self.typography.score,
            self.hierarchy.score,
            self.branding.score,
        ]
    }

    /// First dimension whose score exceeds 100, if any
    pub fn out_of_range(&self) -> Option<(Dimension, u8)> {
        self.iter()
            .find(|(_, result)| result.score > 100)
            .map(|(d, result)| (d, result.score))
    }
}

/// The JSON object every hosted provider is asked to return
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisPayload {
    /// Overall design score from 0 to 100
    pub overall_score: u8,
    /// Per-dimension analysis
    pub dimensions: Dimensions,
}

/// A completed design diagnosis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResult {
    id: String,
    image_ref: String,
    file_name: String,
    overall_score: u8,
    timestamp: DateTime<Utc>,
    dimensions: Dimensions,
}

impl DiagnosisResult {
    /// Create a result for `file` with a fresh identifier and timestamp
    pub fn new(file: &ImageFile, overall_score: u8, dimensions: Dimensions) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            image_ref: file.source().to_string(),
            file_name: file.name().to_string(),
            overall_score,
            timestamp: Utc::now(),
            dimensions,
        }
    }

    pub fn from_payload(file: &ImageFile, payload: DiagnosisPayload) -> Self {
        Self::new(file, payload.overall_score, payload.dimensions)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn image_ref(&self) -> &str {
        &self.image_ref
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn overall_score(&self) -> u8 {
        self.overall_score
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Overall score recomputed from the five dimension scores
    pub fn computed_overall_score(&self) -> u8 {
        rounded_mean(&self.dimensions.scores())
    }
}

/// Integer mean rounded half up; 0 for an empty slice
pub fn rounded_mean(scores: &[u8]) -> u8 {
    if scores.is_empty() {
        return 0;
    }
    let sum: u32 = scores.iter().copied().map(u32::from).sum();
    let n = u32::try_from(scores.len()).unwrap_or(u32::MAX);
    let mean = (sum * 2 + n) / (n * 2);
    u8::try_from(mean).unwrap_or(u8::MAX)
}
