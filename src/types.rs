//! Core types for Rail Xinyu
//!
//! This module defines the data that flows between the views: questions and
//! scenes from the static catalog, assessment results kept in session history,
//! chat messages, and the navigation tabs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single answer choice for a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnswerOption {
    pub text: &'static str,
    /// Score contributed to the total (0-3)
    pub score: u8,
}

/// A scored questionnaire item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: u32,
    pub text: &'static str,
    pub options: [AnswerOption; 4],
}

/// Identifier of a therapy scene
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneId {
    #[default]
    Forest,
    Ocean,
    Zen,
}

impl SceneId {
    pub const ALL: [SceneId; 3] = [SceneId::Forest, SceneId::Ocean, SceneId::Zen];

    pub fn as_str(&self) -> &'static str {
        match self {
            SceneId::Forest => "forest",
            SceneId::Ocean => "ocean",
            SceneId::Zen => "zen",
        }
    }

    /// Parse a scene id, returning `None` for anything not in the catalog
    pub fn parse(id: &str) -> Option<Self> {
        match id.trim() {
            "forest" => Some(SceneId::Forest),
            "ocean" => Some(SceneId::Ocean),
            "zen" => Some(SceneId::Zen),
            _ => None,
        }
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Ambient therapy scene metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TherapyScene {
    pub id: SceneId,
    pub title: &'static str,
    pub description: &'static str,
    /// Icon name used by front ends (Font Awesome naming)
    pub icon: &'static str,
    /// Looping ambient audio resource
    pub audio_url: &'static str,
}

/// Ordinal stress band derived from the total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StressLevel {
    #[serde(rename = "优")]
    Excellent,
    #[serde(rename = "良")]
    Good,
    #[serde(rename = "轻度压力")]
    Mild,
    #[serde(rename = "中度压力")]
    Moderate,
    #[serde(rename = "高压")]
    High,
}

impl StressLevel {
    pub fn label(&self) -> &'static str {
        match self {
            StressLevel::Excellent => "优",
            StressLevel::Good => "良",
            StressLevel::Mild => "轻度压力",
            StressLevel::Moderate => "中度压力",
            StressLevel::High => "高压",
        }
    }
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Colour family used when rendering a stress band badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Emerald,
    Green,
    Yellow,
    Orange,
    Red,
}

/// A completed assessment as stored in session history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    /// Total score (0-30)
    pub score: u32,
    pub level: StressLevel,
    pub recommendation: String,
    pub date: DateTime<Utc>,
    /// Short display label for trend charts (MM/DD)
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_scene_id: Option<SceneId>,
    #[serde(default)]
    pub guidance: Vec<String>,
}

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

/// One entry in the counselor transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            content: content.into(),
        }
    }
}

/// Top-level navigation tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppTab {
    #[default]
    Dashboard,
    Assessment,
    Therapy,
    Counselor,
}
