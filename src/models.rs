//! Study Notes Data Models
//!
//! DB 행과 HTTP 응답에 공통으로 쓰이는 데이터 모델

use serde::{Deserialize, Serialize};

/// 작성자
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub username: String,
}

/// 과목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
}

/// 필기 원본
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    #[serde(rename = "authorId")]
    pub author_id: i64,
    #[serde(rename = "subjectId")]
    pub subject_id: i64,
    pub title: String,
    pub content: String,
    #[serde(rename = "pdfPath")]
    pub pdf_path: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

/// AI 요약 (노트당 1개)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub id: i64,
    #[serde(rename = "noteId")]
    pub note_id: i64,
    pub content: String,
}

/// OX 퀴즈 문항
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    #[serde(rename = "summaryId")]
    pub summary_id: i64,
    pub question: String,
    pub answer: bool,
    pub explanation: String,
}

/// AI 가 생성한 (아직 저장되지 않은) 퀴즈 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizItem {
    pub question: String,
    pub answer: bool,
    pub explanation: String,
}

/// 문항별 채점 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradedQuestion {
    pub id: i64,
    pub question: String,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: bool,
    /// `None` 이면 미응답
    #[serde(rename = "userAnswer")]
    pub user_answer: Option<bool>,
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
    pub explanation: String,
}

/// 채점 결과 (저장되지 않음)
#[derive(Debug, Clone, Serialize)]
pub struct GradeReport {
    pub score: usize,
    pub total: usize,
    pub results: Vec<GradedQuestion>,
}

/// 노트 상세 (노트 + 요약 + 퀴즈)
#[derive(Debug, Clone, Serialize)]
pub struct NoteDetail {
    pub note: Note,
    pub summary: Option<Summary>,
    pub quizzes: Vec<Quiz>,
}

/// 과목 상세 (과목 + 노트 목록 + 요약 목록)
#[derive(Debug, Clone, Serialize)]
pub struct SubjectDetail {
    pub subject: Subject,
    pub notes: Vec<Note>,
    pub summaries: Vec<Summary>,
}
