//! AI 연동 모듈
//!
//! OpenAI 호환 Chat Completion API 로 노트 요약과 OX 퀴즈 생성을 수행합니다.
//! 워크플로우는 `StudyAssistant` 트레이트만 바라보므로 테스트에서는 스텁으로 교체합니다.

pub mod client;
pub mod parse;
pub mod types;

use std::future::Future;

pub use client::OpenAiClient;
pub use parse::QuizParse;

use crate::error::StudyError;

/// 요약/퀴즈 생성 능력
pub trait StudyAssistant: Send + Sync {
    /// 텍스트를 학습용 불릿 요약으로 변환
    fn summarize(
        &self,
        text: &str,
        language: &str,
    ) -> impl Future<Output = Result<String, StudyError>> + Send;

    /// 요약에서 OX 퀴즈 `count` 개를 생성
    fn generate_quiz(
        &self,
        summary: &str,
        count: usize,
        language: &str,
    ) -> impl Future<Output = Result<QuizParse, StudyError>> + Send;
}
