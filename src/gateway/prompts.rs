//! Prompt text and response schema sent to the model

use crate::catalog::{scenes, MAX_SCORE};
use serde_json::{json, Value};

pub(crate) const ANALYSIS_SYSTEM_INSTRUCTION: &str = "你是一名专业的铁路行业心理咨询师。请返回JSON格式，包含 'analysis' (详细的文字分析与关怀建议)、'guidance' (3到5条简短可执行的减压建议) 和 'recommendedSceneId' (推荐的场景ID)。分析内容要贴合铁路工种（排班、安全责任、长时间离家等）的实际心理压力源。";

pub(crate) const COUNSELOR_SYSTEM_INSTRUCTION: &str = "你是'铁道心语'AI心理辅导员。专门服务于铁路职工，语言要专业、亲切，能够理解铁路工种（驾驶、调度、检修等）的辛苦。提供实用的解压技巧。";

/// User prompt for the score analysis request
pub(crate) fn analysis_prompt(score: u32) -> String {
    let scene_list = scenes()
        .iter()
        .map(|s| format!("'{}' ({})", s.id, s.title))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "根据铁路职工心理测评得分 {score}/{max}（总分{max}分），提供专业分析。\
         0-5分极佳，6-11分良好，12-19分轻度压力，20-24分中度压力，25-30分高压。\
         请从 {scene_list} 中选择一个最适合的疗愈场景作为治疗建议。",
        score = score,
        max = MAX_SCORE,
        scene_list = scene_list,
    )
}

/// JSON schema constraining the analysis response
pub(crate) fn analysis_response_schema() -> Value {
    let ids: Vec<&str> = scenes().iter().map(|s| s.id.as_str()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "analysis": { "type": "STRING" },
            "guidance": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            },
            "recommendedSceneId": {
                "type": "STRING",
                "enum": ids,
                "description": format!("Must be one of: {}", ids.join(", "))
            }
        },
        "required": ["analysis", "recommendedSceneId"]
    })
}
