//! 모델 응답 해석
//!
//! 퀴즈 JSON 은 관대하게 해석한다. 형식이 깨진 응답은 에러가 아니라 `QuizParse::Empty` 가 된다.

use serde_json::Value;

use crate::models::QuizItem;

/// 문자열 정답 중 "참"으로 인정하는 토큰 (소문자 비교)
const TRUTHY_TOKENS: &[&str] = &["true", "t", "o", "ox", "맞다"];

/// 퀴즈 응답 해석 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizParse {
    Parsed(Vec<QuizItem>),
    Empty,
}

impl QuizParse {
    pub fn into_items(self) -> Vec<QuizItem> {
        match self {
            QuizParse::Parsed(items) => items,
            QuizParse::Empty => Vec::new(),
        }
    }
}

/// 앞에서부터 `max_chars` 글자만 남긴다 (바이트가 아니라 문자 기준)
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// 정답 값 해석. 문자열은 토큰 비교, 나머지는 JSON 값의 참/거짓 여부.
fn coerce_answer(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => TRUTHY_TOKENS.contains(&s.trim().to_lowercase().as_str()),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(fields)) => !fields.is_empty(),
    }
}

fn coerce_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

/// 모델 출력에서 퀴즈 항목을 뽑는다.
///
/// 최상위가 JSON 배열이 아니거나 객체가 아닌 원소가 하나라도 있으면 `Empty`.
/// 질문이 빈 원소만 건너뛴다.
pub fn parse_quiz_response(content: &str) -> QuizParse {
    let Ok(Value::Array(elements)) = serde_json::from_str::<Value>(content.trim()) else {
        return QuizParse::Empty;
    };

    let mut items = Vec::with_capacity(elements.len());
    for element in &elements {
        let Some(obj) = element.as_object() else {
            return QuizParse::Empty;
        };
        let question = coerce_text(obj.get("question"));
        if question.is_empty() {
            continue;
        }
        items.push(QuizItem {
            question,
            answer: coerce_answer(obj.get("answer")),
            explanation: coerce_text(obj.get("explanation")),
        });
    }

    QuizParse::Parsed(items)
}
