//! Assessment flow
//!
//! Steps through the ten questions, asks the gateway for an analysis of the
//! total, and holds the result until the user either opens the recommended
//! therapy scene or skips back to the dashboard. Gateway failures are replaced
//! with a canned analysis, so the flow always reaches a result.

use serde::Serialize;

use crate::catalog::{questions, scene};
use crate::error::WellnessError;
use crate::gateway::{AiGateway, Analysis};
use crate::scoring::AnswerSheet;
use crate::session::Session;
use crate::types::{AppTab, Question, SceneId, StressLevel, TherapyScene};

/// Result of a finished assessment, before it is recorded into history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentOutcome {
    pub score: u32,
    pub level: StressLevel,
    pub analysis: Analysis,
    /// True when the gateway failed and canned text was used
    pub used_fallback: bool,
}

impl AssessmentOutcome {
    pub fn recommended_scene(&self) -> &'static TherapyScene {
        scene(self.analysis.recommended_scene_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    /// Waiting for an answer to question `step` (0-based)
    AnsweringQuestion { step: usize },
    /// All answers in; analysis not yet requested or still pending
    AwaitingAnalysis,
    ShowingResult(AssessmentOutcome),
}

/// Where the user goes after leaving the result screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Therapy(SceneId),
    Dashboard,
}

#[derive(Debug, Clone)]
pub struct AssessmentFlow {
    sheet: AnswerSheet,
    state: FlowState,
    recorded: bool,
}

impl Default for AssessmentFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessmentFlow {
    pub fn new() -> Self {
        Self {
            sheet: AnswerSheet::new(),
            state: FlowState::AnsweringQuestion { step: 0 },
            recorded: false,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Question currently awaiting an answer
    pub fn current_question(&self) -> Option<&'static Question> {
        match self.state {
            FlowState::AnsweringQuestion { step } => questions().get(step),
            _ => None,
        }
    }

    /// (1-based question number, total questions) for progress display
    pub fn progress(&self) -> (usize, usize) {
        let total = questions().len();
        match self.state {
            FlowState::AnsweringQuestion { step } => (step + 1, total),
            _ => (total, total),
        }
    }

    /// Answer the current question with the option at `option_index`
    pub fn select(&mut self, option_index: usize) -> Result<&FlowState, WellnessError> {
        let step = match self.state {
            FlowState::AnsweringQuestion { step } => step,
            _ => {
                return Err(WellnessError::InvalidState(
                    "answers are closed for this assessment".to_string(),
                ))
            }
        };

        let question = &questions()[step];
        let option = question.options.get(option_index).ok_or_else(|| {
            WellnessError::InvalidAnswer(format!(
                "question {} has no option {}",
                question.id, option_index
            ))
        })?;
        self.sheet.push(option.score)?;

        self.state = if step + 1 < questions().len() {
            FlowState::AnsweringQuestion { step: step + 1 }
        } else {
            tracing::debug!(score = self.sheet.total(), "all questions answered");
            FlowState::AwaitingAnalysis
        };
        Ok(&self.state)
    }

    /// Request the analysis and move to the result screen.
    ///
    /// Issues exactly one gateway call. Any gateway error yields the canned
    /// analysis instead.
    pub async fn finish(
        &mut self,
        gateway: &dyn AiGateway,
    ) -> Result<&AssessmentOutcome, WellnessError> {
        if self.state != FlowState::AwaitingAnalysis {
            return Err(WellnessError::InvalidState(
                "analysis requested before all questions were answered".to_string(),
            ));
        }

        let score = self.sheet.total();
        let (analysis, used_fallback) = match gateway.analyze(score).await {
            Ok(analysis) => (analysis, false),
            Err(e) => {
                tracing::warn!(gateway = gateway.name(), error = %e, "analysis failed, using fallback");
                (Analysis::fallback(score), true)
            }
        };

        self.state = FlowState::ShowingResult(AssessmentOutcome {
            score,
            level: StressLevel::from_score(score),
            analysis,
            used_fallback,
        });

        self.outcome()
            .ok_or_else(|| WellnessError::InvalidState("result missing".to_string()))
    }

    pub fn outcome(&self) -> Option<&AssessmentOutcome> {
        match &self.state {
            FlowState::ShowingResult(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Record the result and open the recommended therapy scene
    pub fn accept(&mut self, session: &mut Session) -> Result<Exit, WellnessError> {
        let outcome = self.take_for_recording()?;
        let scene_id = outcome.analysis.recommended_scene_id;
        session.record(
            outcome.score,
            Some(&outcome.analysis.analysis),
            Some(scene_id),
            outcome.analysis.guidance,
        );
        session.open_therapy(scene_id);
        Ok(Exit::Therapy(scene_id))
    }

    /// Record the result and return to the dashboard
    pub fn skip(&mut self, session: &mut Session) -> Result<Exit, WellnessError> {
        let outcome = self.take_for_recording()?;
        session.record(
            outcome.score,
            Some(&outcome.analysis.analysis),
            None,
            outcome.analysis.guidance,
        );
        session.set_active_tab(AppTab::Dashboard);
        Ok(Exit::Dashboard)
    }

    fn take_for_recording(&mut self) -> Result<AssessmentOutcome, WellnessError> {
        if self.recorded {
            return Err(WellnessError::InvalidState(
                "assessment already recorded".to_string(),
            ));
        }
        let outcome = self.outcome().cloned().ok_or_else(|| {
            WellnessError::InvalidState("no result to record yet".to_string())
        })?;
        self.recorded = true;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::gateway::OfflineGateway;
    use crate::types::ChatMessage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubGateway {
        reply: Option<Analysis>,
        calls: AtomicUsize,
    }

    impl StubGateway {
        fn ok(scene: SceneId) -> Self {
            Self {
                reply: Some(Analysis {
                    analysis: "请注意休息。".to_string(),
                    guidance: vec!["早睡".to_string()],
                    recommended_scene_id: scene,
                }),
                calls: AtomicUsize::new(0),
            }
        }

        fn malformed() -> Self {
            Self {
                reply: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AiGateway for StubGateway {
        async fn analyze(&self, _score: u32) -> Result<Analysis, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Some(a) => Ok(a.clone()),
                None => Analysis::from_model_json("not json"),
            }
        }

        async fn chat(&self, _m: &str, _p: &[ChatMessage]) -> Result<String, GatewayError> {
            Ok(String::new())
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    fn answer_all(flow: &mut AssessmentFlow, options: &[usize]) {
        for &idx in options {
            flow.select(idx).unwrap();
        }
    }

    #[test]
    fn test_steps_through_questions() {
        let mut flow = AssessmentFlow::new();
        assert_eq!(flow.progress(), (1, 10));
        assert_eq!(flow.current_question().map(|q| q.id), Some(1));

        for expected_step in 1..10 {
            let state = flow.select(1).unwrap();
            assert_eq!(state, &FlowState::AnsweringQuestion { step: expected_step });
        }

        let state = flow.select(2).unwrap();
        assert_eq!(state, &FlowState::AwaitingAnalysis);
        assert!(flow.current_question().is_none());
    }

    #[test]
    fn test_input_rejected_while_awaiting() {
        let mut flow = AssessmentFlow::new();
        answer_all(&mut flow, &[0; 10]);
        assert!(matches!(flow.select(0), Err(WellnessError::InvalidState(_))));
    }

    #[test]
    fn test_invalid_option_index() {
        let mut flow = AssessmentFlow::new();
        assert!(matches!(flow.select(4), Err(WellnessError::InvalidAnswer(_))));
        assert_eq!(flow.progress(), (1, 10));
    }

    #[tokio::test]
    async fn test_finish_before_complete_is_rejected() {
        let mut flow = AssessmentFlow::new();
        flow.select(3).unwrap();
        assert!(flow.finish(&OfflineGateway).await.is_err());
    }

    #[tokio::test]
    async fn test_successful_analysis() {
        let gateway = StubGateway::ok(SceneId::Ocean);
        let mut flow = AssessmentFlow::new();
        answer_all(&mut flow, &[3, 3, 3, 2, 2, 2, 2, 2, 2, 1]);

        let outcome = flow.finish(&gateway).await.unwrap().clone();
        assert_eq!(outcome.score, 22);
        assert_eq!(outcome.level, StressLevel::Moderate);
        assert!(!outcome.used_fallback);
        assert_eq!(outcome.recommended_scene().title, "蔚蓝海岸");
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gateway_failure_still_reaches_result() {
        let mut flow = AssessmentFlow::new();
        answer_all(&mut flow, &[1; 10]);

        let outcome = flow.finish(&OfflineGateway).await.unwrap();
        assert!(outcome.used_fallback);
        assert!(!outcome.analysis.analysis.is_empty());
        assert!(SceneId::ALL.contains(&outcome.analysis.recommended_scene_id));
        assert!(matches!(flow.state(), FlowState::ShowingResult(_)));
    }

    #[tokio::test]
    async fn test_malformed_payload_falls_back() {
        let gateway = StubGateway::malformed();
        let mut flow = AssessmentFlow::new();
        answer_all(&mut flow, &[0; 10]);

        let outcome = flow.finish(&gateway).await.unwrap();
        assert!(outcome.used_fallback);
        assert_eq!(outcome.analysis.recommended_scene_id, SceneId::Forest);
        assert_eq!(outcome.analysis.analysis, "测评已完成，您的分数为：0");
    }

    #[tokio::test]
    async fn test_accept_records_and_opens_therapy() {
        let gateway = StubGateway::ok(SceneId::Zen);
        let mut session = Session::new();
        let mut flow = AssessmentFlow::new();
        answer_all(&mut flow, &[2; 10]);
        flow.finish(&gateway).await.unwrap();

        assert_eq!(flow.accept(&mut session).unwrap(), Exit::Therapy(SceneId::Zen));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].score, 20);
        assert_eq!(session.history()[0].recommendation, "请注意休息。");
        assert_eq!(session.active_tab(), AppTab::Therapy);
        assert_eq!(session.auto_start_scene(), Some(SceneId::Zen));

        assert!(flow.accept(&mut session).is_err());
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_skip_records_and_returns_to_dashboard() {
        let mut session = Session::new();
        session.set_active_tab(AppTab::Assessment);
        let mut flow = AssessmentFlow::new();
        answer_all(&mut flow, &[0; 10]);

        assert!(flow.skip(&mut session).is_err());

        flow.finish(&OfflineGateway).await.unwrap();
        assert_eq!(flow.skip(&mut session).unwrap(), Exit::Dashboard);
        assert_eq!(session.active_tab(), AppTab::Dashboard);
        assert_eq!(session.auto_start_scene(), None);
        assert_eq!(session.history()[0].recommended_scene_id, None);
    }
}
