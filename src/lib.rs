//! Rail Xinyu - stress self-assessment and relaxation companion for railway staff
//!
//! The crate holds the domain logic and view models behind the app: a
//! ten-question stress assessment scored 0-30, an AI gateway for score
//! analysis and counselor chat, a therapy room with looping ambient scenes,
//! and a tap-to-pop bubble game.
//!
//! ## Modules
//!
//! - **Assessment**: question bank, scoring bands and the questionnaire flow
//! - **Gateway**: hosted model access with canned fallbacks
//! - **Views**: dashboard, therapy room, bubble game and counselor chat
//! - **App**: tab routing over an explicit session context

pub mod app;
pub mod assessment;
pub mod audio;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod game;
pub mod gateway;
pub mod logging;
pub mod scene_art;
pub mod scoring;
pub mod session;
pub mod therapy;
pub mod tone;
pub mod types;

pub use app::App;
pub use assessment::{AssessmentFlow, AssessmentOutcome, Exit, FlowState};
pub use config::Config;
pub use error::{GatewayError, WellnessError};
pub use gateway::{connect, AiGateway, Analysis, GeminiGateway, OfflineGateway};
pub use session::Session;
pub use therapy::{TherapyMode, TherapyRoom};

// Domain type exports
pub use types::{
    AppTab, AssessmentResult, ChatMessage, ChatRole, Question, SceneId, StressLevel,
    TherapyScene,
};

/// Version reported by the CLI and diagnostics
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name used for config directories and diagnostics
pub const APP_NAME: &str = "rail-xinyu";
