//! OpenAI 호환 Chat Completion 클라이언트
//!
//! 요약과 OX 퀴즈 생성을 원격 API 로 수행한다. 캐시와 재시도는 없다.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::parse::{parse_quiz_response, truncate_chars, QuizParse};
use super::types::{ApiErrorBody, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use super::StudyAssistant;
use crate::config::Config;
use crate::error::StudyError;

/// 요청 타임아웃
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// 요약 입력 최대 글자 수
pub const SUMMARY_INPUT_LIMIT: usize = 12_000;

/// 퀴즈 생성 입력 최대 글자 수
pub const QUIZ_INPUT_LIMIT: usize = 8_000;

const SUMMARY_SYSTEM_PROMPT: &str = "You are an expert study assistant. Summarize the provided text into concise, well-structured bullet points. \
Focus on key concepts, definitions, and important facts. Keep it in the user's language.";

const QUIZ_SYSTEM_PROMPT: &str = "You generate accurate True/False (OX) questions from a given summary. \
Each question must be unambiguous and answerable as True or False with a short justification.";

/// 요약 요청 사용자 메시지
pub fn summary_prompt(text: &str, language: &str) -> String {
    format!(
        "언어: {}\n\n다음 텍스트를 학습용 핵심 요약으로 7~10개 불릿으로 정리해줘.\n\n텍스트:\n{}",
        language,
        truncate_chars(text, SUMMARY_INPUT_LIMIT)
    )
}

/// 퀴즈 생성 사용자 메시지
pub fn quiz_prompt(summary: &str, count: usize, language: &str) -> String {
    format!(
        "언어: {}\n요약을 기반으로 OX 문제 {}개 만들어줘.\n\
         각 항목은 JSON 배열 요소로 다음 키를 포함해줘: question, answer, explanation.\n\
         answer는 True/False 불리언. JSON만 출력.\n\n요약:\n{}",
        language,
        count,
        truncate_chars(summary, QUIZ_INPUT_LIMIT)
    )
}

/// Chat Completion API 클라이언트
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    api_base: String,
    model: String,
    org_id: Option<String>,
    project_id: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Result<Self, StudyError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StudyError::upstream(None, format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            http,
            api_key: config.openai_api_key.clone(),
            api_base: config.openai_api_base.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
            org_id: config.openai_org_id.clone(),
            project_id: config.openai_project_id.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Chat Completion 호출 후 첫 번째 선택지의 본문을 돌려준다 (앞뒤 공백 제거)
    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, StudyError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(StudyError::MissingCredential)?;

        let url = format!("{}/v1/chat/completions", self.api_base);
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature,
            max_tokens,
        };

        debug!(model = %self.model, %url, "chat completion 요청");

        let mut request = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(org) = &self.org_id {
            request = request.header("OpenAI-Organization", org);
        }
        if let Some(project) = &self.project_id {
            request = request.header("OpenAI-Project", project);
        }

        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "chat completion 전송 실패");
            StudyError::upstream(None, format!("요청 전송 실패: {}", e))
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| StudyError::upstream(Some(status.as_u16()), format!("응답 읽기 실패: {}", e)))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "chat completion 오류 응답");
            let message = match serde_json::from_str::<ApiErrorBody>(&text) {
                Ok(err) => err.error.message,
                Err(_) => format!("HTTP {}", status),
            };
            return Err(StudyError::upstream(Some(status.as_u16()), message));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text).map_err(|e| {
            StudyError::upstream(Some(status.as_u16()), format!("응답 해석 실패: {}", e))
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| {
                StudyError::upstream(Some(status.as_u16()), "응답에 choices[0].message.content 가 없습니다")
            })
    }

    /// 학습용 불릿 요약
    pub async fn summarize_text(&self, text: &str, language: &str) -> Result<String, StudyError> {
        self.chat(
            vec![
                ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
                ChatMessage::user(summary_prompt(text, language)),
            ],
            0.2,
            900,
        )
        .await
    }

    /// 요약 기반 OX 퀴즈 생성. 응답 형식이 깨졌으면 `QuizParse::Empty`.
    pub async fn generate_ox_quiz(
        &self,
        summary: &str,
        count: usize,
        language: &str,
    ) -> Result<QuizParse, StudyError> {
        let content = self
            .chat(
                vec![
                    ChatMessage::system(QUIZ_SYSTEM_PROMPT),
                    ChatMessage::user(quiz_prompt(summary, count, language)),
                ],
                0.3,
                1200,
            )
            .await?;

        let parsed = parse_quiz_response(&content);
        if parsed == QuizParse::Empty {
            warn!("퀴즈 응답을 JSON 배열로 해석하지 못했습니다");
        }
        Ok(parsed)
    }
}

impl StudyAssistant for OpenAiClient {
    fn summarize(
        &self,
        text: &str,
        language: &str,
    ) -> impl Future<Output = Result<String, StudyError>> + Send {
        self.summarize_text(text, language)
    }

    fn generate_quiz(
        &self,
        summary: &str,
        count: usize,
        language: &str,
    ) -> impl Future<Output = Result<QuizParse, StudyError>> + Send {
        self.generate_ox_quiz(summary, count, language)
    }
}
