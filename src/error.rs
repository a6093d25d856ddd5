//! Study Notes Error Types
//!
//! 애플리케이션 전역 에러 타입 정의

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// 학습 노트 애플리케이션 에러
#[derive(Error, Debug)]
pub enum StudyError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),


    #[error("Note not found: {0}")]
    NoteNotFound(i64),

    #[error("Subject not found: {0}")]
    SubjectNotFound(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to acquire database lock")]
    LockPoisoned,

    /// API 키 미설정
    #[error("OPENAI_API_KEY is not configured")]
    MissingCredential,

    /// 빌드에 PDF 추출 기능이 포함되지 않음
    #[error("PDF extraction is not available in this build")]
    ExtractionUnavailable,

    #[error("PDF extraction failed: {0}")]
    ExtractionFailed(String),

    /// 네트워크 오류 또는 2xx 이외의 응답
    #[error("Upstream request failed: {message}")]
    UpstreamRequestFailed { status: Option<u16>, message: String },

    #[error("Note content is empty")]
    EmptyContent,

    #[error("Summary required")]
    SummaryRequired,

    #[error("No quizzes to grade")]
    NoQuizzes,

    #[error("No file provided")]
    MissingFile,
}

impl StudyError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        StudyError::UpstreamRequestFailed {
            status,
            message: message.into(),
        }
    }

    /// 안정적인 에러 코드 (클라이언트 분기용)
    pub fn code(&self) -> &'static str {
        match self {
            StudyError::Database(_) => "DB_ERROR",
            StudyError::Io(_) => "IO_ERROR",
            StudyError::NoteNotFound(_) => "NOTE_NOT_FOUND",
            StudyError::SubjectNotFound(_) => "SUBJECT_NOT_FOUND",
            StudyError::InvalidInput(_) => "INVALID_INPUT",
            StudyError::LockPoisoned => "LOCK_ERROR",
            StudyError::MissingCredential => "MISSING_CREDENTIAL",
            StudyError::ExtractionUnavailable => "EXTRACTION_UNAVAILABLE",
            StudyError::ExtractionFailed(_) => "EXTRACTION_FAILED",
            StudyError::UpstreamRequestFailed { .. } => "UPSTREAM_REQUEST_FAILED",
            StudyError::EmptyContent => "EMPTY_CONTENT",
            StudyError::SummaryRequired => "SUMMARY_REQUIRED",
            StudyError::NoQuizzes => "NO_QUIZZES",
            StudyError::MissingFile => "MISSING_FILE",
        }
    }

    /// 사용자에게 보여줄 메시지
    pub fn user_message(&self) -> String {
        match self {
            StudyError::NoteNotFound(id) => format!("노트를 찾을 수 없습니다: {}", id),
            StudyError::SubjectNotFound(id) => format!("과목을 찾을 수 없습니다: {}", id),
            StudyError::InvalidInput(msg) => msg.clone(),
            StudyError::MissingCredential => {
                "환경변수 OPENAI_API_KEY가 설정되어 있지 않습니다.".to_string()
            }
            StudyError::ExtractionUnavailable => {
                "PDF 추출 기능이 포함되지 않은 빌드입니다. `pdf` feature 로 다시 빌드해주세요."
                    .to_string()
            }
            StudyError::ExtractionFailed(cause) => format!("PDF 텍스트 추출 중 오류: {}", cause),
            StudyError::UpstreamRequestFailed { message, .. } => {
                format!("AI 요청 중 오류: {}", message)
            }
            StudyError::EmptyContent => "노트 내용이 비어있어 요약할 수 없습니다.".to_string(),
            StudyError::SummaryRequired => "먼저 요약을 생성해주세요.".to_string(),
            StudyError::NoQuizzes => {
                "채점할 퀴즈가 없습니다. 먼저 퀴즈를 생성해주세요.".to_string()
            }
            StudyError::MissingFile => "PDF 파일을 선택해주세요.".to_string(),
            StudyError::Database(_)
            | StudyError::Io(_)
            | StudyError::LockPoisoned => format!("내부 오류가 발생했습니다: {}", self),
        }
    }
}

/// HTTP 응답용 직렬화 가능한 에러
#[derive(Debug, Clone, Serialize)]
pub struct CommandError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl From<StudyError> for CommandError {
    fn from(error: StudyError) -> Self {
        let details = match &error {
            StudyError::UpstreamRequestFailed {
                status: Some(status),
                ..
            } => Some(format!("HTTP {}", status)),
            StudyError::Database(e) => Some(e.to_string()),
            _ => None,
        };

        CommandError {
            code: error.code().to_string(),
            message: error.user_message(),
            details,
        }
    }
}

impl CommandError {
    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "NOTE_NOT_FOUND" | "SUBJECT_NOT_FOUND" => StatusCode::NOT_FOUND,
            "INVALID_INPUT" | "EMPTY_CONTENT" | "SUMMARY_REQUIRED" | "NO_QUIZZES"
            | "MISSING_FILE" | "EXTRACTION_FAILED" => StatusCode::BAD_REQUEST,
            "UPSTREAM_REQUEST_FAILED" => StatusCode::BAD_GATEWAY,
            "MISSING_CREDENTIAL" | "EXTRACTION_UNAVAILABLE" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CommandError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// HTTP 명령 결과 타입
pub type CommandResult<T> = Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_errors_map_to_bad_request() {
        for err in [
            StudyError::EmptyContent,
            StudyError::SummaryRequired,
            StudyError::NoQuizzes,
            StudyError::MissingFile,
        ] {
            let cmd = CommandError::from(err);
            assert_eq!(cmd.status(), StatusCode::BAD_REQUEST, "code {}", cmd.code);
        }
    }

    #[test]
    fn test_upstream_error_keeps_status_in_details() {
        let cmd = CommandError::from(StudyError::upstream(Some(429), "rate limited"));
        assert_eq!(cmd.code, "UPSTREAM_REQUEST_FAILED");
        assert_eq!(cmd.details.as_deref(), Some("HTTP 429"));
        assert_eq!(cmd.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_not_found_message_names_the_id() {
        let cmd = CommandError::from(StudyError::NoteNotFound(42));
        assert_eq!(cmd.status(), StatusCode::NOT_FOUND);
        assert!(cmd.message.contains("42"));
    }
}
