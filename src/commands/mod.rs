//! HTTP Commands Module
//!
//! 워크플로우를 JSON HTTP 엔드포인트로 노출한다. HTML 렌더링은 하지 않는다.

pub mod note;
pub mod quiz;
pub mod subject;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::ai::StudyAssistant;
use crate::workflow::NoteWorkflow;

/// 업로드 요청 최대 크기 (100MB)
pub const MAX_UPLOAD_SIZE: usize = 100 * 1024 * 1024;

/// 핸들러 공유 상태
pub struct AppState<A> {
    pub workflow: Arc<NoteWorkflow<A>>,
    /// 요청을 대신 처리할 작성자 (인증은 외부에서 처리)
    pub author_id: i64,
}

impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            workflow: Arc::clone(&self.workflow),
            author_id: self.author_id,
        }
    }
}

impl<A> AppState<A> {
    pub fn new(workflow: NoteWorkflow<A>, author_id: i64) -> Self {
        Self {
            workflow: Arc::new(workflow),
            author_id,
        }
    }
}

/// 전체 라우터
pub fn router<A: StudyAssistant + 'static>(state: AppState<A>) -> Router {
    Router::new()
        .route("/", get(subject::list_subjects::<A>))
        .route("/subjects/:id", get(subject::subject_detail::<A>).delete(subject::delete_subject::<A>))
        .route("/notes", get(note::list_notes::<A>))
        .route("/notes/create", get(note::create_form::<A>).post(note::create_note::<A>))
        .route(
            "/notes/upload",
            get(note::create_form::<A>)
                .post(note::upload_note::<A>)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE)),
        )
        .route("/notes/:id", get(note::note_detail::<A>).delete(note::delete_note::<A>))
        .route("/notes/:id/summarize", post(note::summarize_note::<A>))
        .route("/notes/:id/quiz", post(quiz::generate_quiz::<A>))
        .route("/notes/:id/quiz/grade", post(quiz::grade_quiz::<A>))
        .with_state(state)
}
