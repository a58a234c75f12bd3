//! Session context
//!
//! Holds the state that outlives a single view for the lifetime of one run:
//! the assessment history, the active tab, and a pending therapy auto-start.
//! The history is append-only and kept in completion order.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::types::{AppTab, AssessmentResult, SceneId, StressLevel};

/// Recommendation stored when an assessment finishes without analysis text
pub const DEFAULT_RECOMMENDATION: &str = "测评完成，建议多接触自然，保持规律作息。";

#[derive(Debug, Clone, Default, Serialize)]
pub struct Session {
    history: Vec<AssessmentResult>,
    active_tab: AppTab,
    auto_start_scene: Option<SceneId>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed assessments, oldest first
    pub fn history(&self) -> &[AssessmentResult] {
        &self.history
    }

    pub fn latest(&self) -> Option<&AssessmentResult> {
        self.history.last()
    }

    pub fn active_tab(&self) -> AppTab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: AppTab) {
        if self.active_tab != tab {
            tracing::debug!(from = ?self.active_tab, to = ?tab, "tab change");
        }
        self.active_tab = tab;
    }

    /// Scene the therapy room should open straight into, if any
    pub fn auto_start_scene(&self) -> Option<SceneId> {
        self.auto_start_scene
    }

    /// Clear the pending auto-start once the therapy room has consumed it
    pub fn take_auto_start(&mut self) -> Option<SceneId> {
        self.auto_start_scene.take()
    }

    /// Append a completed assessment stamped with the current time
    pub fn record(
        &mut self,
        score: u32,
        recommendation: Option<&str>,
        recommended_scene_id: Option<SceneId>,
        guidance: Vec<String>,
    ) -> &AssessmentResult {
        self.record_at(Utc::now(), score, recommendation, recommended_scene_id, guidance)
    }

    /// Append a completed assessment with an explicit timestamp
    pub fn record_at(
        &mut self,
        date: DateTime<Utc>,
        score: u32,
        recommendation: Option<&str>,
        recommended_scene_id: Option<SceneId>,
        guidance: Vec<String>,
    ) -> &AssessmentResult {
        let recommendation = recommendation
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_RECOMMENDATION)
            .to_string();

        let result = AssessmentResult {
            score,
            level: StressLevel::from_score(score),
            recommendation,
            date,
            label: date.with_timezone(&Local).format("%m/%d").to_string(),
            recommended_scene_id,
            guidance,
        };

        tracing::info!(score, level = %result.level, entries = self.history.len() + 1, "assessment recorded");
        self.history.push(result);
        &self.history[self.history.len() - 1]
    }

    /// Route to the therapy room and have it open `scene` directly
    pub fn open_therapy(&mut self, scene: SceneId) {
        self.auto_start_scene = Some(scene);
        self.set_active_tab(AppTab::Therapy);
    }
}
