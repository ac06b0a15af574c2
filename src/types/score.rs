use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative band for a 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreLevel {
    Rebuild,
    NeedsWork,
    Fair,
    Good,
    Excellent,
}

impl ScoreLevel {
    pub const fn from_score(score: u8) -> Self {
        match score {
            90.. => Self::Excellent,
            80..=89 => Self::Good,
            70..=79 => Self::Fair,
            60..=69 => Self::NeedsWork,
            _ => Self::Rebuild,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::NeedsWork => "Needs work",
            Self::Rebuild => "Needs a rebuild",
        }
    }
}

impl From<u8> for ScoreLevel {
    fn from(score: u8) -> Self {
        Self::from_score(score)
    }
}

impl fmt::Display for ScoreLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges() {
        assert_eq!(ScoreLevel::from_score(100), ScoreLevel::Excellent);
        assert_eq!(ScoreLevel::from_score(90), ScoreLevel::Excellent);
        assert_eq!(ScoreLevel::from_score(89), ScoreLevel::Good);
        assert_eq!(ScoreLevel::from_score(70), ScoreLevel::Fair);
        assert_eq!(ScoreLevel::from_score(60), ScoreLevel::NeedsWork);
        assert_eq!(ScoreLevel::from_score(59), ScoreLevel::Rebuild);
        assert!(ScoreLevel::Good > ScoreLevel::Fair);
    }
}
