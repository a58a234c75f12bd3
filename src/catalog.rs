//! Static question bank and therapy scene catalog

use crate::types::{AnswerOption, Question, SceneId, TherapyScene};

/// Highest possible assessment total (10 questions x 3 points)
pub const MAX_SCORE: u32 = 30;

const fn opt(text: &'static str, score: u8) -> AnswerOption {
    AnswerOption { text, score }
}

static QUESTIONS: [Question; 10] = [
    Question {
        id: 1,
        text: "在过去的一周里，您是否感到由于排班不规律导致睡眠质量下降？",
        options: [opt("从不", 0), opt("偶尔", 1), opt("经常", 2), opt("总是", 3)],
    },
    Question {
        id: 2,
        text: "您在工作中是否经常感到精神高度紧张，担心安全事故发生？",
        options: [
            opt("完全没有", 0),
            opt("轻度紧张", 1),
            opt("明显紧张", 2),
            opt("极度焦虑", 3),
        ],
    },
    Question {
        id: 3,
        text: "您是否感到长期在外地工作导致与家人沟通不畅，心情低落？",
        options: [
            opt("很少", 0),
            opt("有时", 1),
            opt("非常多", 2),
            opt("极度痛苦", 3),
        ],
    },
    Question {
        id: 4,
        text: "您是否觉得对目前的铁路工作失去了兴趣或动力？",
        options: [
            opt("依然热爱", 0),
            opt("有些疲劳", 1),
            opt("比较厌倦", 2),
            opt("完全失去动力", 3),
        ],
    },
    Question {
        id: 5,
        text: "当紧急情况发生时，您是否感到无法集中注意力？",
        options: [
            opt("冷静应对", 0),
            opt("偶尔分心", 1),
            opt("很难集中", 2),
            opt("大脑一片空白", 3),
        ],
    },
    Question {
        id: 6,
        text: "您是否感到近期脾气变得暴躁，容易因为小事对同事或乘客发火？",
        options: [
            opt("没有变化", 0),
            opt("稍微有点", 1),
            opt("比较明显", 2),
            opt("完全无法控制", 3),
        ],
    },
    Question {
        id: 7,
        text: "即使不在值班期间，您是否也难以从工作状态中切换出来，脑子里全是数据或计划？",
        options: [
            opt("能够放松", 0),
            opt("偶尔想起", 1),
            opt("很难放下", 2),
            opt("完全被工作占据", 3),
        ],
    },
    Question {
        id: 8,
        text: "您是否感到莫名的身体疲劳，即使休息了很久还是觉得很累？",
        options: [
            opt("精力充沛", 0),
            opt("轻微疲劳", 1),
            opt("沉重疲劳", 2),
            opt("精疲力竭", 3),
        ],
    },
    Question {
        id: 9,
        text: "您是否觉得周围的人（包括家人和朋友）都不理解您工作的特殊性和辛苦？",
        options: [
            opt("感觉被理解", 0),
            opt("偶尔孤独", 1),
            opt("比较孤独", 2),
            opt("极度孤独隔绝", 3),
        ],
    },
    Question {
        id: 10,
        text: "您对未来的职业生涯是否感到迷茫，甚至产生离职或转岗的冲动？",
        options: [
            opt("目标明确", 0),
            opt("偶尔迷茫", 1),
            opt("经常动摇", 2),
            opt("每天都在考虑", 3),
        ],
    },
];

static SCENES: [TherapyScene; 3] = [
    TherapyScene {
        id: SceneId::Forest,
        title: "静谧森林",
        description: "通过极简线条意象，感受微风绕林的宁静与生机。",
        icon: "fa-tree",
        audio_url: "https://www.soundjay.com/nature/sounds/rain-01.mp3",
    },
    TherapyScene {
        id: SceneId::Ocean,
        title: "蔚蓝海岸",
        description: "极简波浪律动，带你找回大海的宽广与松弛感。",
        icon: "fa-water",
        audio_url: "https://www.soundjay.com/nature/ocean-wave-1.mp3",
    },
    TherapyScene {
        id: SceneId::Zen,
        title: "禅意呼吸",
        description: "跟随光圈的律动调整呼吸，在极简中寻求专注。",
        icon: "fa-leaf",
        audio_url: "https://www.soundjay.com/misc/sounds/wind-chime-1.mp3",
    },
];

/// The fixed railway-worker stress questionnaire, in presentation order
pub fn questions() -> &'static [Question] {
    &QUESTIONS
}

/// All therapy scenes, in presentation order
pub fn scenes() -> &'static [TherapyScene] {
    &SCENES
}

/// Look up a scene by id
pub fn scene(id: SceneId) -> &'static TherapyScene {
    match id {
        SceneId::Forest => &SCENES[0],
        SceneId::Ocean => &SCENES[1],
        SceneId::Zen => &SCENES[2],
    }
}

/// Look up a scene by its string id
pub fn find_scene(id: &str) -> Option<&'static TherapyScene> {
    SceneId::parse(id).map(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_bank_shape() {
        let qs = questions();
        assert_eq!(qs.len(), 10);

        for (idx, q) in qs.iter().enumerate() {
            assert_eq!(q.id as usize, idx + 1);
            let scores: Vec<u8> = q.options.iter().map(|o| o.score).collect();
            assert_eq!(scores, vec![0, 1, 2, 3]);
        }

        let max: u32 = qs
            .iter()
            .map(|q| q.options.iter().map(|o| o.score as u32).max().unwrap())
            .sum();
        assert_eq!(max, MAX_SCORE);
    }

    #[test]
    fn test_scene_lookup_matches_ids() {
        for id in SceneId::ALL {
            assert_eq!(scene(id).id, id);
        }
        assert_eq!(find_scene("ocean").map(|s| s.title), Some("蔚蓝海岸"));
        assert!(find_scene("mountain").is_none());
    }
}
