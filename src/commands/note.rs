//! Note Commands
//!
//! 노트 생성, PDF 업로드, 조회, 요약

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::ai::StudyAssistant;
use crate::error::{CommandError, CommandResult, StudyError};
use crate::models::{Note, NoteDetail, Summary};
use crate::workflow::{FormContext, UploadedFile};

#[derive(Debug, Deserialize)]
pub struct CreateNoteForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub subject: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NoteResponse {
    pub note: Note,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub note: Note,
    pub message: String,
    /// 업로드는 성공했지만 텍스트 추출이 실패한 경우
    #[serde(rename = "extractionError")]
    pub extraction_error: Option<CommandError>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: Summary,
    pub message: String,
}

fn invalid_upload(e: axum::extract::multipart::MultipartError) -> CommandError {
    StudyError::InvalidInput(format!("업로드 요청을 읽을 수 없습니다: {}", e)).into()
}

/// 전체 노트 목록 (최신순)
pub async fn list_notes<A: StudyAssistant>(
    State(state): State<AppState<A>>,
) -> CommandResult<Json<Vec<Note>>> {
    Ok(Json(state.workflow.list_notes()?))
}

/// 작성/업로드 폼 정보
pub async fn create_form<A: StudyAssistant>(
    State(state): State<AppState<A>>,
) -> CommandResult<Json<FormContext>> {
    Ok(Json(state.workflow.form_context()?))
}

/// 텍스트 노트 생성
pub async fn create_note<A: StudyAssistant>(
    State(state): State<AppState<A>>,
    Form(form): Form<CreateNoteForm>,
) -> CommandResult<(StatusCode, Json<NoteResponse>)> {
    let note = state.workflow.create_note(
        &form.title,
        &form.content,
        state.author_id,
        form.subject.as_deref(),
    )?;

    Ok((
        StatusCode::CREATED,
        Json(NoteResponse {
            note,
            message: "노트를 저장했습니다.".to_string(),
        }),
    ))
}

/// PDF 업로드 (multipart: `title`, `subject`, `pdf`)
pub async fn upload_note<A: StudyAssistant>(
    State(state): State<AppState<A>>,
    mut multipart: Multipart,
) -> CommandResult<(StatusCode, Json<UploadResponse>)> {
    let mut title: Option<String> = None;
    let mut subject: Option<String> = None;
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_upload)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = Some(field.text().await.map_err(invalid_upload)?),
            "subject" => subject = Some(field.text().await.map_err(invalid_upload)?),
            "pdf" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(invalid_upload)?;
                file = Some(UploadedFile {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    let outcome = state
        .workflow
        .upload_note(
            title.as_deref(),
            file,
            state.author_id,
            subject.as_deref(),
        )
        .await?;

    let message = match outcome.extraction_error {
        None => "PDF 업로드 및 텍스트 추출을 완료했습니다.",
        Some(_) => "PDF를 저장했지만 텍스트 추출에 실패했습니다.",
    };

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            note: outcome.note,
            message: message.to_string(),
            extraction_error: outcome.extraction_error.map(CommandError::from),
        }),
    ))
}

/// 노트 상세 (요약, 퀴즈 포함)
pub async fn note_detail<A: StudyAssistant>(
    State(state): State<AppState<A>>,
    Path(note_id): Path<i64>,
) -> CommandResult<Json<NoteDetail>> {
    Ok(Json(state.workflow.note_detail(note_id)?))
}

/// 노트 삭제 (요약/퀴즈 연쇄 삭제)
pub async fn delete_note<A: StudyAssistant>(
    State(state): State<AppState<A>>,
    Path(note_id): Path<i64>,
) -> CommandResult<StatusCode> {
    state.workflow.delete_note(note_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// AI 요약 생성/갱신
pub async fn summarize_note<A: StudyAssistant>(
    State(state): State<AppState<A>>,
    Path(note_id): Path<i64>,
) -> CommandResult<Json<SummaryResponse>> {
    let summary = state.workflow.summarize(note_id).await?;
    Ok(Json(SummaryResponse {
        summary,
        message: "AI 요약을 생성했습니다.".to_string(),
    }))
}
