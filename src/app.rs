//! Application shell
//!
//! Owns the session context and the per-tab view models, and routes between
//! the four tabs. Views are mounted when their tab is entered: entering the
//! assessment tab always starts a fresh questionnaire and entering the
//! therapy tab consumes any pending auto-start scene.

use std::rc::Rc;
use std::sync::Arc;

use crate::assessment::{AssessmentFlow, AssessmentOutcome, Exit, FlowState};
use crate::audio::{AmbientPlayer, SilentPlayer};
use crate::chat::ChatSession;
use crate::dashboard::DashboardView;
use crate::error::WellnessError;
use crate::gateway::AiGateway;
use crate::session::Session;
use crate::therapy::TherapyRoom;
use crate::tone::LazyToneContext;
use crate::types::{AppTab, ChatMessage};

type PlayerFactory = Box<dyn FnMut() -> Box<dyn AmbientPlayer>>;

pub struct App {
    session: Session,
    gateway: Arc<dyn AiGateway>,
    flow: AssessmentFlow,
    therapy: Option<TherapyRoom>,
    chat: ChatSession,
    make_player: PlayerFactory,
    make_tone: Rc<dyn Fn() -> LazyToneContext>,
}

impl App {
    pub fn new(gateway: Arc<dyn AiGateway>) -> Self {
        Self {
            session: Session::new(),
            gateway,
            flow: AssessmentFlow::new(),
            therapy: None,
            chat: ChatSession::new(),
            make_player: Box::new(|| Box::new(SilentPlayer::new()) as Box<dyn AmbientPlayer>),
            make_tone: Rc::new(LazyToneContext::silent),
        }
    }

    /// Ambient player used each time the therapy room is mounted
    pub fn with_player<F>(mut self, factory: F) -> Self
    where
        F: FnMut() -> Box<dyn AmbientPlayer> + 'static,
    {
        self.make_player = Box::new(factory);
        self
    }

    /// Pop tone output used by each new bubble game
    pub fn with_tone<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> LazyToneContext + 'static,
    {
        self.make_tone = Rc::new(factory);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn active_tab(&self) -> AppTab {
        self.session.active_tab()
    }

    pub fn gateway(&self) -> &dyn AiGateway {
        self.gateway.as_ref()
    }

    pub fn switch_tab(&mut self, tab: AppTab) {
        let from = self.session.active_tab();
        self.session.set_active_tab(tab);
        self.on_tab_change(from);
    }

    pub fn dashboard(&self) -> DashboardView {
        DashboardView::from_history(self.session.history())
    }

    /// Jump from the dashboard into the latest recommended scene
    pub fn open_recommended_therapy(&mut self) -> Result<(), WellnessError> {
        let scene = self.dashboard().therapy_shortcut().ok_or_else(|| {
            WellnessError::InvalidState("no recommended scene yet".to_string())
        })?;
        let from = self.session.active_tab();
        self.session.open_therapy(scene);
        if from == AppTab::Therapy {
            // Already on the tab: remount so the pending scene is consumed now
            self.therapy = None;
            self.mount_therapy();
        } else {
            self.on_tab_change(from);
        }
        Ok(())
    }

    pub fn assessment(&self) -> &AssessmentFlow {
        &self.flow
    }

    pub fn answer(&mut self, option_index: usize) -> Result<&FlowState, WellnessError> {
        self.flow.select(option_index)
    }

    pub async fn finish_assessment(&mut self) -> Result<&AssessmentOutcome, WellnessError> {
        self.flow.finish(self.gateway.as_ref()).await
    }

    /// Record the result and go to the recommended scene
    pub fn accept_result(&mut self) -> Result<Exit, WellnessError> {
        let from = self.session.active_tab();
        let exit = self.flow.accept(&mut self.session)?;
        self.on_tab_change(from);
        Ok(exit)
    }

    /// Record the result and go back to the dashboard
    pub fn skip_result(&mut self) -> Result<Exit, WellnessError> {
        let from = self.session.active_tab();
        let exit = self.flow.skip(&mut self.session)?;
        self.on_tab_change(from);
        Ok(exit)
    }

    /// Mounted therapy room, present while the therapy tab is active
    pub fn therapy(&self) -> Option<&TherapyRoom> {
        self.therapy.as_ref()
    }

    pub fn therapy_mut(&mut self) -> Option<&mut TherapyRoom> {
        self.therapy.as_mut()
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub async fn send_chat(&mut self, input: &str) -> Option<&ChatMessage> {
        self.chat.send(input, self.gateway.as_ref()).await
    }

    fn on_tab_change(&mut self, from: AppTab) {
        let to = self.session.active_tab();
        if from == to {
            return;
        }

        if from == AppTab::Therapy {
            self.therapy = None;
        }
        match to {
            AppTab::Assessment => self.flow = AssessmentFlow::new(),
            AppTab::Therapy => self.mount_therapy(),
            AppTab::Dashboard | AppTab::Counselor => {}
        }
    }

    fn mount_therapy(&mut self) {
        let auto_start = self.session.auto_start_scene();
        let make_tone = Rc::clone(&self.make_tone);
        let mut consumed = false;

        let room = TherapyRoom::new(
            (self.make_player)(),
            auto_start.map(|id| id.as_str()),
            || consumed = true,
        )
        .with_tone(move || (*make_tone)());

        if consumed {
            self.session.take_auto_start();
        }
        self.therapy = Some(room);
    }
}
