//! Offline analysis that fabricates plausible scores.
//!
//! Used for development, demos, and as the `local` provider. Scores are drawn
//! independently per dimension from fixed ranges, and issues are picked from
//! a fixed catalogue by score band.

use super::AnalysisService;
use crate::error::Result;
use crate::image::ImageFile;
use crate::log_debug;
use crate::providers::Provider;
use crate::types::{DiagnosisResult, Dimension, DimensionResult, Dimensions, rounded_mean};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Simulated analysis time
pub const DEFAULT_DELAY: Duration = Duration::from_millis(3000);

/// Inclusive score range drawn for each dimension
pub const fn score_range(dimension: Dimension) -> (u8, u8) {
    match dimension {
        Dimension::Color | Dimension::Hierarchy => (65, 94),
        Dimension::Layout | Dimension::Branding => (70, 94),
        Dimension::Typography => (60, 94),
    }
}

struct Catalogue {
    severe: [&'static str; 3],
    moderate: [&'static str; 2],
    suggestions: [&'static str; 3],
}

const fn catalogue(dimension: Dimension) -> Catalogue {
    match dimension {
        Dimension::Color => Catalogue {
            severe: [
                "Primary color contrast is too low and hurts readability",
                "The palette lacks tonal depth",
                "Brand colors are applied inconsistently",
            ],
            moderate: [
                "Some color pairings feel abrupt",
                "Consider adding a supporting accent color",
            ],
            suggestions: [
                "Balance dominant, secondary and accent colors in a clear ratio",
                "Make text-to-background contrast meet WCAG AA",
                "Use tints and shades of the brand color for variety",
            ],
        },
        Dimension::Layout => Catalogue {
            severe: [
                "Elements are not aligned to a grid",
                "Too little whitespace makes the page feel crowded",
                "Key information is not emphasized",
            ],
            moderate: [
                "Spacing between sections is uneven",
                "The visual center of gravity is slightly off",
            ],
            suggestions: [
                "Lay out content on a 12-column grid",
                "Increase spacing between elements to let the design breathe",
                "Use golden-ratio proportions to refine the composition",
            ],
        },
        Dimension::Typography => Catalogue {
            severe: [
                "Type hierarchy is unclear",
                "Line spacing is poorly set",
                "Font sizes follow no consistent scale",
            ],
            moderate: [
                "Headings could use a heavier weight",
                "Body text readability can be improved",
            ],
            suggestions: [
                "Define a clear type scale for headings and body",
                "Set body line height to 1.5-1.6",
                "Keep heading and body sizes in a consistent ratio",
            ],
        },
        Dimension::Hierarchy => Catalogue {
            severe: [
                "Information hierarchy is confusing",
                "The reading path is not guided",
                "Primary actions do not stand out",
            ],
            moderate: [
                "Secondary information draws too much attention",
                "Information priority could be sharpened",
            ],
            suggestions: [
                "Use size, color and position to build a clear hierarchy",
                "Place key information where the eye lands first",
                "Use contrast to highlight the main call to action",
            ],
        },
        Dimension::Branding => Catalogue {
            severe: [
                "Brand identity elements are not prominent",
                "The overall style lacks consistency",
                "The brand tone is not communicated",
            ],
            moderate: [
                "Brand elements could be more unified",
                "The style could be more distinctive",
            ],
            suggestions: [
                "Unify brand colors and typefaces",
                "Give the logo more visual weight",
                "Keep the design language consistent across surfaces",
            ],
        },
    }
}

/// Catalogue entry for `dimension` at `score`
pub fn dimension_result(dimension: Dimension, score: u8) -> DimensionResult {
    let entry = catalogue(dimension);
    let issues: &[&str] = match score {
        0..=69 => &entry.severe,
        70..=84 => &entry.moderate,
        _ => &[],
    };

    DimensionResult {
        score,
        issues: issues.iter().map(ToString::to_string).collect(),
        suggestions: entry.suggestions.iter().map(ToString::to_string).collect(),
    }
}

/// Assemble a full result from scores given in dimension order
pub fn build_result(file: &ImageFile, scores: [u8; 5]) -> DiagnosisResult {
    let [color, layout, typography, hierarchy, branding] = scores;
    let dimensions = Dimensions {
        color: dimension_result(Dimension::Color, color),
        layout: dimension_result(Dimension::Layout, layout),
        typography: dimension_result(Dimension::Typography, typography),
        hierarchy: dimension_result(Dimension::Hierarchy, hierarchy),
        branding: dimension_result(Dimension::Branding, branding),
    };

    DiagnosisResult::new(file, rounded_mean(&scores), dimensions)
}

fn draw_scores(rng: &mut impl Rng) -> [u8; 5] {
    use strum::IntoEnumIterator;

    let mut scores = [0u8; 5];
    for (slot, dimension) in scores.iter_mut().zip(Dimension::iter()) {
        let (low, high) = score_range(dimension);
        *slot = rng.random_range(low..=high);
    }
    scores
}

/// Mock provider: no network, random but plausible scores
pub struct MockService {
    provider: Provider,
    delay: Duration,
    rng: Mutex<StdRng>,
}

impl MockService {
    pub fn new(delay: Duration) -> Self {
        Self {
            provider: Provider::Mock,
            delay,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic scores for a given seed
    pub fn with_seed(delay: Duration, seed: u64) -> Self {
        Self {
            provider: Provider::Mock,
            delay,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Report results under a different provider tag (used for `local`)
    #[must_use]
    pub fn reporting_as(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

#[async_trait]
impl AnalysisService for MockService {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn analyze(&self, file: &ImageFile) -> Result<DiagnosisResult> {
        log_debug!(
            "Simulating analysis of {} ({} bytes) for {:?}",
            file.name(),
            file.len(),
            self.delay
        );
        tokio::time::sleep(self.delay).await;

        let scores = draw_scores(&mut *self.rng.lock());
        Ok(build_result(file, scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::MAX_FILE_SIZE;

    fn jpeg(len: usize) -> ImageFile {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.resize(len, 7);
        ImageFile::from_bytes("poster.jpg", bytes, MAX_FILE_SIZE).expect("valid jpeg")
    }

    #[test]
    fn test_scores_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let scores = draw_scores(&mut rng);
            for (score, dimension) in scores.iter().zip([
                Dimension::Color,
                Dimension::Layout,
                Dimension::Typography,
                Dimension::Hierarchy,
                Dimension::Branding,
            ]) {
                let (low, high) = score_range(dimension);
                assert!((low..=high).contains(score), "{dimension} = {score}");
            }
        }
    }

    #[test]
    fn test_issue_bands() {
        assert_eq!(dimension_result(Dimension::Color, 69).issues.len(), 3);
        assert_eq!(dimension_result(Dimension::Color, 70).issues.len(), 2);
        assert_eq!(dimension_result(Dimension::Color, 84).issues.len(), 2);
        assert!(dimension_result(Dimension::Color, 85).issues.is_empty());
        assert_eq!(dimension_result(Dimension::Branding, 94).suggestions.len(), 3);
    }

    #[test]
    fn test_overall_is_rounded_mean() {
        let result = build_result(&jpeg(1024), [70, 75, 62, 68, 80]);
        assert_eq!(result.overall_score(), 71);
        assert_eq!(result.dimensions().typography.score, 62);
        assert_eq!(result.dimensions().typography.issues.len(), 3);
        assert_eq!(result.computed_overall_score(), result.overall_score());
    }

    #[tokio::test]
    async fn test_mock_waits_then_scores_50kb_jpeg() {
        let delay = Duration::from_millis(40);
        let service = MockService::with_seed(delay, 7);
        let file = jpeg(50 * 1024);

        let started = tokio::time::Instant::now();
        let result = service.analyze(&file).await.expect("mock never fails");
        assert!(started.elapsed() >= delay);

        let scores = result.dimensions().scores();
        assert!(scores.iter().all(|s| (60..=94).contains(s)));
        assert_eq!(result.overall_score(), rounded_mean(&scores));
        assert_eq!(result.file_name(), "poster.jpg");
    }

    #[tokio::test]
    async fn test_seeded_mocks_agree() {
        let file = jpeg(256);
        let a = MockService::with_seed(Duration::ZERO, 99)
            .analyze(&file)
            .await
            .expect("mock never fails");
        let b = MockService::with_seed(Duration::ZERO, 99)
            .analyze(&file)
            .await
            .expect("mock never fails");
        assert_eq!(a.dimensions(), b.dimensions());
        assert_ne!(a.id(), b.id());
    }
}
