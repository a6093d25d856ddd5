//! OX 퀴즈 채점
//!
//! 제출 답안과 저장된 정답을 비교만 한다. 퀴즈 행은 절대 수정하지 않는다.

use std::collections::HashMap;

use crate::models::{GradeReport, GradedQuestion, Quiz};

const TRUE_TOKENS: &[&str] = &["o", "true", "t"];
const FALSE_TOKENS: &[&str] = &["x", "false", "f"];

/// 폼 필드 이름 접두사 (`answer_{quiz_id}`)
pub const ANSWER_FIELD_PREFIX: &str = "answer_";

/// 제출값 정규화. 대소문자만 무시하며 인식할 수 없는 값(공백 포함)은 `None`(미응답).
pub fn normalize_answer(raw: &str) -> Option<bool> {
    let token = raw.to_lowercase();
    if TRUE_TOKENS.contains(&token.as_str()) {
        Some(true)
    } else if FALSE_TOKENS.contains(&token.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// `answer_{id}` 형태의 폼 필드만 골라 퀴즈 id 별 답안으로 바꾼다.
pub fn answers_from_form(form: &HashMap<String, String>) -> HashMap<i64, String> {
    form.iter()
        .filter_map(|(key, value)| {
            let id = key.strip_prefix(ANSWER_FIELD_PREFIX)?.parse::<i64>().ok()?;
            Some((id, value.clone()))
        })
        .collect()
}

/// 퀴즈 순서대로 채점
pub fn grade(quizzes: &[Quiz], answers: &HashMap<i64, String>) -> GradeReport {
    let results: Vec<GradedQuestion> = quizzes
        .iter()
        .map(|quiz| {
            let user_answer = answers
                .get(&quiz.id)
                .and_then(|raw| normalize_answer(raw));
            GradedQuestion {
                id: quiz.id,
                question: quiz.question.clone(),
                correct_answer: quiz.answer,
                user_answer,
                is_correct: user_answer == Some(quiz.answer),
                explanation: quiz.explanation.clone(),
            }
        })
        .collect();

    GradeReport {
        score: results.iter().filter(|r| r.is_correct).count(),
        total: results.len(),
        results,
    }
}
