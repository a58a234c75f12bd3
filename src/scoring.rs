//! Score accumulation and stress band classification
//!
//! Each of the ten questions contributes 0-3 points. The total (0-30) maps to
//! one of five ordinal bands, with thresholds checked from the top down.

use crate::catalog::questions;
use crate::error::WellnessError;
use crate::types::{StressLevel, Tone};

/// Lowest total classified as 高压
pub const HIGH_THRESHOLD: u32 = 25;
/// Lowest total classified as 中度压力
pub const MODERATE_THRESHOLD: u32 = 20;
/// Lowest total classified as 轻度压力
pub const MILD_THRESHOLD: u32 = 12;
/// Lowest total classified as 良
pub const GOOD_THRESHOLD: u32 = 6;

/// Highest score a single answer may carry
pub const MAX_OPTION_SCORE: u8 = 3;

/// Sum a list of per-question answer scores
pub fn total_score(answers: &[u8]) -> u32 {
    answers.iter().map(|&s| s as u32).sum()
}

impl StressLevel {
    /// Classify a total score into a stress band
    pub fn from_score(score: u32) -> Self {
        if score >= HIGH_THRESHOLD {
            StressLevel::High
        } else if score >= MODERATE_THRESHOLD {
            StressLevel::Moderate
        } else if score >= MILD_THRESHOLD {
            StressLevel::Mild
        } else if score >= GOOD_THRESHOLD {
            StressLevel::Good
        } else {
            StressLevel::Excellent
        }
    }

    /// Badge colour for dashboards
    pub fn tone(&self) -> Tone {
        match self {
            StressLevel::Excellent => Tone::Emerald,
            StressLevel::Good => Tone::Green,
            StressLevel::Mild => Tone::Yellow,
            StressLevel::Moderate => Tone::Orange,
            StressLevel::High => Tone::Red,
        }
    }
}

/// Ordered answers for one pass through the questionnaire.
///
/// Holds at most one answer per question and only scores in 0-3, so a
/// complete sheet always totals within 0-30.
#[derive(Debug, Clone, Default)]
pub struct AnswerSheet {
    scores: Vec<u8>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self {
            scores: Vec::with_capacity(questions().len()),
        }
    }

    /// Record the score of the next answered question
    pub fn push(&mut self, score: u8) -> Result<(), WellnessError> {
        if score > MAX_OPTION_SCORE {
            return Err(WellnessError::InvalidAnswer(format!(
                "score {} is outside 0-{}",
                score, MAX_OPTION_SCORE
            )));
        }
        if self.is_complete() {
            return Err(WellnessError::InvalidAnswer(
                "all questions are already answered".to_string(),
            ));
        }
        self.scores.push(score);
        Ok(())
    }

    /// Number of questions answered so far
    pub fn answered(&self) -> usize {
        self.scores.len()
    }

    pub fn is_complete(&self) -> bool {
        self.scores.len() == questions().len()
    }

    pub fn scores(&self) -> &[u8] {
        &self.scores
    }

    pub fn total(&self) -> u32 {
        total_score(&self.scores)
    }

    /// Band for the current total
    pub fn level(&self) -> StressLevel {
        StressLevel::from_score(self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_band_boundaries() {
        let cases = [
            (0, StressLevel::Excellent),
            (5, StressLevel::Excellent),
            (6, StressLevel::Good),
            (11, StressLevel::Good),
            (12, StressLevel::Mild),
            (19, StressLevel::Mild),
            (20, StressLevel::Moderate),
            (24, StressLevel::Moderate),
            (25, StressLevel::High),
            (30, StressLevel::High),
        ];

        for (score, expected) in cases {
            assert_eq!(StressLevel::from_score(score), expected, "score {}", score);
        }
    }

    #[test]
    fn test_band_mapping_is_monotonic() {
        let mut previous = StressLevel::from_score(0);
        for score in 1..=30 {
            let level = StressLevel::from_score(score);
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn test_random_sheets_total_in_range() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let mut sheet = AnswerSheet::new();
            let mut expected = 0u32;
            for _ in 0..10 {
                let s: u8 = rng.gen_range(0..=3);
                expected += s as u32;
                sheet.push(s).unwrap();
            }
            assert!(sheet.is_complete());
            assert_eq!(sheet.total(), expected);
            assert!(sheet.total() <= 30);
        }
    }

    #[test]
    fn test_sheet_rejects_out_of_range_score() {
        let mut sheet = AnswerSheet::new();
        assert!(matches!(
            sheet.push(4),
            Err(WellnessError::InvalidAnswer(_))
        ));
        assert_eq!(sheet.answered(), 0);
    }

    #[test]
    fn test_sheet_rejects_eleventh_answer() {
        let mut sheet = AnswerSheet::new();
        for _ in 0..10 {
            sheet.push(1).unwrap();
        }
        assert!(sheet.push(1).is_err());
        assert_eq!(sheet.total(), 10);
        assert_eq!(sheet.level(), StressLevel::Good);
    }

    #[test]
    fn test_tone_per_level() {
        assert_eq!(StressLevel::Excellent.tone(), Tone::Emerald);
        assert_eq!(StressLevel::High.tone(), Tone::Red);
    }
}
