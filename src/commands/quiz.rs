//! Quiz Commands
//!
//! OX 퀴즈 생성과 채점

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::ai::StudyAssistant;
use crate::error::CommandResult;
use crate::models::{GradeReport, Quiz};
use crate::workflow::grading::answers_from_form;
use crate::workflow::DEFAULT_QUIZ_COUNT;

/// 한 번에 요청할 수 있는 최대 문항 수
const MAX_QUIZ_COUNT: usize = 20;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateQuizForm {
    pub count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct GenerateQuizResponse {
    pub created: usize,
    pub quizzes: Vec<Quiz>,
    pub message: String,
    /// 생성된 문항이 없을 때 true (에러는 아님)
    pub warning: bool,
}

#[derive(Debug, Serialize)]
pub struct GradeResponse {
    #[serde(flatten)]
    pub report: GradeReport,
    pub message: String,
}

/// 요약 기반 OX 퀴즈 생성 (기존 문항에 추가)
pub async fn generate_quiz<A: StudyAssistant>(
    State(state): State<AppState<A>>,
    Path(note_id): Path<i64>,
    form: Option<Form<GenerateQuizForm>>,
) -> CommandResult<Json<GenerateQuizResponse>> {
    let count = form
        .and_then(|Form(f)| f.count)
        .unwrap_or(DEFAULT_QUIZ_COUNT)
        .clamp(1, MAX_QUIZ_COUNT);

    let generation = state.workflow.generate_quiz(note_id, count).await?;

    let (message, warning) = if generation.created > 0 {
        (format!("OX 퀴즈 {}개를 생성했습니다.", generation.created), false)
    } else {
        (
            "퀴즈를 생성하지 못했습니다. 요약 내용을 확인해주세요.".to_string(),
            true,
        )
    };

    Ok(Json(GenerateQuizResponse {
        created: generation.created,
        quizzes: generation.quizzes,
        message,
        warning,
    }))
}

/// 채점 (폼 필드 `answer_{quiz_id}`)
pub async fn grade_quiz<A: StudyAssistant>(
    State(state): State<AppState<A>>,
    Path(note_id): Path<i64>,
    form: Option<Form<HashMap<String, String>>>,
) -> CommandResult<Json<GradeResponse>> {
    let answers = form
        .map(|Form(fields)| answers_from_form(&fields))
        .unwrap_or_default();

    let report = state.workflow.grade_quiz(note_id, &answers)?;
    let message = format!("채점 결과: {}/{} 문제 정답", report.score, report.total);

    Ok(Json(GradeResponse { report, message }))
}
