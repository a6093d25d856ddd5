//! Subject Commands
//!
//! 과목 목록/상세/삭제

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::AppState;
use crate::ai::StudyAssistant;
use crate::error::CommandResult;
use crate::models::{Subject, SubjectDetail};

/// 과목 목록 (이름순)
pub async fn list_subjects<A: StudyAssistant>(
    State(state): State<AppState<A>>,
) -> CommandResult<Json<Vec<Subject>>> {
    Ok(Json(state.workflow.list_subjects()?))
}

/// 과목 상세 (노트 최신순 + 요약)
pub async fn subject_detail<A: StudyAssistant>(
    State(state): State<AppState<A>>,
    Path(subject_id): Path<i64>,
) -> CommandResult<Json<SubjectDetail>> {
    Ok(Json(state.workflow.subject_detail(subject_id)?))
}

/// 과목 삭제 (노트, 요약, 퀴즈 연쇄 삭제)
pub async fn delete_subject<A: StudyAssistant>(
    State(state): State<AppState<A>>,
    Path(subject_id): Path<i64>,
) -> CommandResult<StatusCode> {
    state.workflow.delete_subject(subject_id)?;
    Ok(StatusCode::NO_CONTENT)
}
