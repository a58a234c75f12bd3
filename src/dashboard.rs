//! Dashboard view model
//!
//! Summarises session history: the latest result, its band, the recommended
//! scene, and the score trend in completion order.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{AssessmentResult, SceneId, StressLevel, Tone};

/// One point of the stress trend chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub score: u32,
}

/// Latest assessment as shown on the summary card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestReport {
    pub score: u32,
    pub level: StressLevel,
    pub tone: Tone,
    pub recommendation: String,
    pub date: DateTime<Utc>,
    pub recommended_scene_id: Option<SceneId>,
    pub guidance: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub latest: Option<LatestReport>,
    pub trend: Vec<TrendPoint>,
}

impl DashboardView {
    pub fn from_history(history: &[AssessmentResult]) -> Self {
        let latest = history.last().map(|r| LatestReport {
            score: r.score,
            level: r.level,
            tone: r.level.tone(),
            recommendation: r.recommendation.clone(),
            date: r.date,
            recommended_scene_id: r.recommended_scene_id,
            guidance: r.guidance.clone(),
        });

        let trend = history
            .iter()
            .map(|r| TrendPoint {
                label: r.label.clone(),
                score: r.score,
            })
            .collect();

        Self { latest, trend }
    }

    pub fn has_data(&self) -> bool {
        !self.trend.is_empty()
    }

    /// Headline score, `--` before the first assessment
    pub fn headline(&self) -> String {
        match &self.latest {
            Some(latest) => latest.score.to_string(),
            None => "--".to_string(),
        }
    }

    /// Scene offered by the "open recommended therapy" action
    pub fn therapy_shortcut(&self) -> Option<SceneId> {
        self.latest.as_ref().and_then(|l| l.recommended_scene_id)
    }

    pub fn average_score(&self) -> Option<f64> {
        if self.trend.is_empty() {
            return None;
        }
        let sum: u32 = self.trend.iter().map(|p| p.score).sum();
        Some(sum as f64 / self.trend.len() as f64)
    }

    /// Change between the last two results (positive = more stress)
    pub fn delta_from_previous(&self) -> Option<i64> {
        match self.trend.as_slice() {
            [.., prev, last] => Some(last.score as i64 - prev.score as i64),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_history() {
        let view = DashboardView::from_history(&[]);
        assert!(!view.has_data());
        assert_eq!(view.headline(), "--");
        assert_eq!(view.therapy_shortcut(), None);
        assert_eq!(view.average_score(), None);
        assert_eq!(view.delta_from_previous(), None);
    }

    #[test]
    fn test_summary_of_history() {
        let mut session = Session::new();
        session.record(8, Some("a"), None, vec![]);
        session.record(22, Some("b"), Some(SceneId::Ocean), vec![]);
        session.record(3, Some("c"), Some(SceneId::Zen), vec!["散步".to_string()]);

        let view = DashboardView::from_history(session.history());
        let scores: Vec<u32> = view.trend.iter().map(|p| p.score).collect();
        assert_eq!(scores, vec![8, 22, 3]);

        let latest = view.latest.as_ref().unwrap();
        assert_eq!(latest.level, StressLevel::Excellent);
        assert_eq!(latest.tone, Tone::Emerald);
        assert_eq!(latest.recommendation, "c");
        assert_eq!(latest.guidance, vec!["散步".to_string()]);

        assert_eq!(view.headline(), "3");
        assert_eq!(view.therapy_shortcut(), Some(SceneId::Zen));
        assert_eq!(view.average_score(), Some(11.0));
        assert_eq!(view.delta_from_previous(), Some(-19));
    }
}
