//! Generative AI gateway
//!
//! The gateway is the boundary to the hosted language model. It exposes two
//! single-shot operations: analysis of an assessment score and one counselor
//! chat turn. Callers treat every failure the same way and substitute canned
//! text, so nothing here is ever fatal to a view.

mod gemini;
mod prompts;

pub use gemini::GeminiGateway;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::types::{ChatMessage, SceneId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Analysis used when the model returns an empty analysis string
pub const EMPTY_ANALYSIS_TEXT: &str = "测评完成。";

/// Guidance shown when the gateway could not be reached
pub const FALLBACK_GUIDANCE: [&str; 3] = [
    "保持规律作息，倒班结束后尽量补足睡眠。",
    "每天留出十分钟做深呼吸或伸展放松。",
    "多与家人和同事沟通，说出自己的感受。",
];

/// Score analysis returned by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub analysis: String,
    pub guidance: Vec<String>,
    pub recommended_scene_id: SceneId,
}

impl Analysis {
    /// Canned analysis used when the gateway fails or returns garbage
    pub fn fallback(score: u32) -> Self {
        Self {
            analysis: format!("测评已完成，您的分数为：{}", score),
            guidance: FALLBACK_GUIDANCE.iter().map(|s| s.to_string()).collect(),
            recommended_scene_id: SceneId::Forest,
        }
    }

    /// Parse the JSON document produced by the model.
    ///
    /// A missing `analysis` field or undecodable JSON is an error. An unknown
    /// scene id is coerced to `forest`, and an empty analysis to a short
    /// completion notice.
    pub fn from_model_json(text: &str) -> Result<Self, GatewayError> {
        let raw: RawAnalysis = serde_json::from_str(strip_code_fence(text))?;

        let analysis = raw
            .analysis
            .ok_or_else(|| GatewayError::Malformed("missing analysis field".to_string()))?;
        let analysis = match analysis.trim() {
            "" => EMPTY_ANALYSIS_TEXT.to_string(),
            trimmed => trimmed.to_string(),
        };

        let recommended_scene_id = raw
            .recommended_scene_id
            .as_deref()
            .and_then(SceneId::parse)
            .unwrap_or_default();

        let guidance = raw
            .guidance
            .into_iter()
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect();

        Ok(Self {
            analysis,
            guidance,
            recommended_scene_id,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    analysis: Option<String>,
    #[serde(default)]
    guidance: Vec<String>,
    recommended_scene_id: Option<String>,
}

/// Models sometimes wrap JSON output in a markdown fence
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Boundary to the hosted language model
#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Produce an analysis for a total assessment score (0-30)
    async fn analyze(&self, score: u32) -> Result<Analysis, GatewayError>;

    /// Produce one counselor reply given the transcript before `message`.
    ///
    /// An empty string is a valid reply; the chat view substitutes a prompt
    /// asking the user to repeat themselves.
    async fn chat(&self, message: &str, prior: &[ChatMessage]) -> Result<String, GatewayError>;

    /// Short name for logs and diagnostics
    fn name(&self) -> &'static str;
}

/// Gateway that is never reachable.
///
/// Used when no credential is configured so every view runs on canned text.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGateway;

#[async_trait]
impl AiGateway for OfflineGateway {
    async fn analyze(&self, _score: u32) -> Result<Analysis, GatewayError> {
        Err(GatewayError::Offline)
    }

    async fn chat(&self, _message: &str, _prior: &[ChatMessage]) -> Result<String, GatewayError> {
        Err(GatewayError::Offline)
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}

/// Build the gateway for a configuration.
///
/// Falls back to [`OfflineGateway`] when `offline` is requested or no
/// credential is available.
pub fn connect(config: &GatewayConfig, offline: bool) -> Result<Arc<dyn AiGateway>, GatewayError> {
    if offline {
        return Ok(Arc::new(OfflineGateway));
    }
    if !config.has_credential() {
        tracing::warn!("no API credential configured, using canned responses");
        return Ok(Arc::new(OfflineGateway));
    }
    Ok(Arc::new(GeminiGateway::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_well_formed_analysis() {
        let json = r#"{
            "analysis": "  您的压力处于中等水平。 ",
            "guidance": ["规律作息", "", "  与家人通话 "],
            "recommendedSceneId": "ocean"
        }"#;

        let parsed = Analysis::from_model_json(json).unwrap();
        assert_eq!(
            parsed,
            Analysis {
                analysis: "您的压力处于中等水平。".to_string(),
                guidance: vec!["规律作息".to_string(), "与家人通话".to_string()],
                recommended_scene_id: SceneId::Ocean,
            }
        );
    }

    #[test]
    fn test_unknown_scene_coerced_to_forest() {
        let json = r#"{"analysis": "ok", "recommendedSceneId": "teahouse"}"#;
        let parsed = Analysis::from_model_json(json).unwrap();
        assert_eq!(parsed.recommended_scene_id, SceneId::Forest);
        assert!(parsed.guidance.is_empty());
    }

    #[test]
    fn test_empty_analysis_replaced() {
        let parsed = Analysis::from_model_json(r#"{"analysis": "", "recommendedSceneId": "zen"}"#)
            .unwrap();
        assert_eq!(parsed.analysis, EMPTY_ANALYSIS_TEXT);
        assert_eq!(parsed.recommended_scene_id, SceneId::Zen);
    }

    #[test]
    fn test_fenced_json_accepted() {
        let text = "```json\n{\"analysis\": \"fine\", \"recommendedSceneId\": \"zen\"}\n```";
        let parsed = Analysis::from_model_json(text).unwrap();
        assert_eq!(parsed.analysis, "fine");
    }

    #[test]
    fn test_malformed_payloads_rejected() {
        assert!(matches!(
            Analysis::from_model_json("您的压力较大"),
            Err(GatewayError::Malformed(_))
        ));
        assert!(matches!(
            Analysis::from_model_json(r#"{"recommendedSceneId": "zen"}"#),
            Err(GatewayError::Malformed(_))
        ));
    }

    #[test]
    fn test_fallback_is_usable() {
        let fallback = Analysis::fallback(17);
        assert_eq!(fallback.analysis, "测评已完成，您的分数为：17");
        assert_eq!(fallback.recommended_scene_id, SceneId::Forest);
        assert_eq!(fallback.guidance.len(), 3);
    }

    #[tokio::test]
    async fn test_offline_gateway_always_fails() {
        let gateway = OfflineGateway;
        assert!(matches!(gateway.analyze(3).await, Err(GatewayError::Offline)));
        assert!(matches!(
            gateway.chat("hi", &[]).await,
            Err(GatewayError::Offline)
        ));
    }

    #[test]
    fn test_connect_without_credential_is_offline() {
        let gateway = connect(&GatewayConfig::default(), false).unwrap();
        assert_eq!(gateway.name(), "offline");
    }
}
