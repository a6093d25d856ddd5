//! Note / Quiz Workflow
//!
//! 노트 생성 → PDF 업로드 → 요약 → 퀴즈 생성 → 채점 흐름과 단계 간 선행조건.
//! 노트의 상태는 요약/퀴즈 행의 존재 여부로만 표현된다.
//!
//! DB 잠금은 AI 호출(`.await`) 전에 반드시 풀어야 한다. 같은 노트에 대한 동시 요청은
//! 조율하지 않는다 (요약은 마지막 쓰기가 이기고, 퀴즈는 양쪽 모두 추가된다).

pub mod grading;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::ai::StudyAssistant;
use crate::db::{DbState, NewNote};
use crate::error::StudyError;
use crate::extract::extract_text_from_pdf;
use crate::models::{GradeReport, Note, NoteDetail, Quiz, Subject, SubjectDetail, Summary};

/// 퀴즈 기본 생성 개수
pub const DEFAULT_QUIZ_COUNT: usize = 5;

/// 업로드 파일명이 없을 때의 노트 제목
const DEFAULT_PDF_TITLE: &str = "PDF 노트";

/// 노트 id 가 정해지기 전 업로드를 임시로 써 두는 디렉토리 (media 하위)
const STAGING_DIR: &str = "staging";

/// 업로드된 파일
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// 업로드 결과. 추출 실패는 업로드 실패가 아니다.
#[derive(Debug)]
pub struct UploadOutcome {
    pub note: Note,
    pub extraction_error: Option<StudyError>,
}

/// 퀴즈 생성 결과
#[derive(Debug, Clone, Serialize)]
pub struct QuizGeneration {
    pub created: usize,
    pub quizzes: Vec<Quiz>,
}

/// 노트 작성 폼에 필요한 정보
#[derive(Debug, Clone, Serialize)]
pub struct FormContext {
    pub subjects: Vec<Subject>,
    #[serde(rename = "defaultSubject")]
    pub default_subject: String,
}

/// 업로드 파일명을 저장 가능한 이름으로 정리 (경로 성분 제거)
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').to_string();

    if cleaned.is_empty() {
        "upload.pdf".to_string()
    } else {
        cleaned
    }
}

fn stage_upload(staged: &Path, bytes: &[u8]) -> Result<(), StudyError> {
    if let Some(parent) = staged.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(staged, bytes)?;
    Ok(())
}

/// 임시 파일을 노트 디렉토리로 옮긴다. 같은 파일시스템 안의 rename 이라 잠금 중에 해도 짧다.
fn move_staged_upload(staged: &Path, dir: &Path, file_name: &str) -> Result<String, StudyError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::rename(staged, &path)?;
    Ok(path.to_string_lossy().to_string())
}

/// 노트/퀴즈 워크플로우
pub struct NoteWorkflow<A> {
    db: DbState,
    assistant: A,
    media_dir: PathBuf,
    language: String,
    default_subject: String,
}

impl<A: StudyAssistant> NoteWorkflow<A> {
    pub fn new(
        db: DbState,
        assistant: A,
        media_dir: impl Into<PathBuf>,
        language: impl Into<String>,
        default_subject: impl Into<String>,
    ) -> Self {
        Self {
            db,
            assistant,
            media_dir: media_dir.into(),
            language: language.into(),
            default_subject: default_subject.into(),
        }
    }

    pub fn db(&self) -> &DbState {
        &self.db
    }

    fn subject_name_or_default<'a>(&'a self, subject_name: Option<&'a str>) -> &'a str {
        subject_name
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.default_subject)
    }

    // ---------------------------------------------------------------
    // 조회
    // ---------------------------------------------------------------

    pub fn list_subjects(&self) -> Result<Vec<Subject>, StudyError> {
        self.db.lock()?.list_subjects()
    }

    pub fn list_notes(&self) -> Result<Vec<Note>, StudyError> {
        self.db.lock()?.list_notes()
    }

    pub fn form_context(&self) -> Result<FormContext, StudyError> {
        Ok(FormContext {
            subjects: self.list_subjects()?,
            default_subject: self.default_subject.clone(),
        })
    }

    pub fn subject_detail(&self, subject_id: i64) -> Result<SubjectDetail, StudyError> {
        let db = self.db.lock()?;
        let subject = db.get_subject(subject_id)?;
        Ok(SubjectDetail {
            notes: db.list_notes_by_subject(subject.id)?,
            summaries: db.list_summaries_by_subject(subject.id)?,
            subject,
        })
    }

    pub fn note_detail(&self, note_id: i64) -> Result<NoteDetail, StudyError> {
        let db = self.db.lock()?;
        let note = db.get_note(note_id)?;
        let summary = db.get_summary_for_note(note_id)?;
        let quizzes = match &summary {
            Some(s) => db.list_quizzes(s.id)?,
            None => Vec::new(),
        };
        Ok(NoteDetail {
            note,
            summary,
            quizzes,
        })
    }

    // ---------------------------------------------------------------
    // 노트 생성
    // ---------------------------------------------------------------

    /// 텍스트 노트 생성 (과목은 이름으로 조회/생성)
    pub fn create_note(
        &self,
        title: &str,
        content: &str,
        author_id: i64,
        subject_name: Option<&str>,
    ) -> Result<Note, StudyError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StudyError::InvalidInput("제목을 입력해주세요.".to_string()));
        }

        let db = self.db.lock()?;
        let subject = db.get_or_create_subject(self.subject_name_or_default(subject_name))?;
        let note = db.insert_note(&NewNote {
            author_id,
            subject_id: subject.id,
            title,
            content,
        })?;

        info!(note_id = note.id, subject = %subject.name, "노트 생성");
        Ok(note)
    }

    /// PDF 업로드 노트 생성
    ///
    /// 노트와 파일은 함께 저장된다. 텍스트 추출이 실패해도 노트는 남고, 에러는
    /// `UploadOutcome::extraction_error` 로 따로 보고된다.
    pub async fn upload_note(
        &self,
        title: Option<&str>,
        file: Option<UploadedFile>,
        author_id: i64,
        subject_name: Option<&str>,
    ) -> Result<UploadOutcome, StudyError> {
        let UploadedFile {
            file_name: raw_name,
            bytes,
        } = file
            .filter(|f| !f.bytes.is_empty())
            .ok_or(StudyError::MissingFile)?;

        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                let name = raw_name.trim();
                if name.is_empty() {
                    DEFAULT_PDF_TITLE.to_string()
                } else {
                    name.to_string()
                }
            });
        let file_name = sanitize_file_name(&raw_name);

        // 큰 파일 쓰기는 DB 잠금 밖, 블로킹 스레드에서
        let staged = self
            .media_dir
            .join(STAGING_DIR)
            .join(Uuid::new_v4().to_string());
        let target = staged.clone();
        tokio::task::spawn_blocking(move || stage_upload(&target, &bytes))
            .await
            .map_err(|e| StudyError::Io(std::io::Error::other(e)))??;

        let inserted = self.insert_staged_note(author_id, subject_name, &title, &staged, &file_name);
        let mut note = match inserted {
            Ok(note) => note,
            Err(e) => {
                if let Err(cleanup) = std::fs::remove_file(&staged) {
                    warn!(path = ?staged, error = %cleanup, "임시 업로드 파일 삭제 실패");
                }
                return Err(e);
            }
        };
        info!(note_id = note.id, path = ?note.pdf_path, "PDF 저장");

        let pdf_path = PathBuf::from(note.pdf_path.clone().unwrap_or_default());
        let extracted = match tokio::task::spawn_blocking(move || extract_text_from_pdf(&pdf_path))
            .await
        {
            Ok(result) => result,
            Err(e) => Err(StudyError::ExtractionFailed(e.to_string())),
        };

        let extraction_error = match extracted {
            Ok(text) => {
                self.db.lock()?.update_note_content(note.id, &text)?;
                info!(note_id = note.id, chars = text.chars().count(), "PDF 텍스트 추출 완료");
                note.content = text;
                None
            }
            Err(e) => {
                warn!(note_id = note.id, error = %e, "PDF 텍스트 추출 실패");
                Some(e)
            }
        };

        Ok(UploadOutcome {
            note,
            extraction_error,
        })
    }

    fn insert_staged_note(
        &self,
        author_id: i64,
        subject_name: Option<&str>,
        title: &str,
        staged: &Path,
        file_name: &str,
    ) -> Result<Note, StudyError> {
        let db = self.db.lock()?;
        let subject = db.get_or_create_subject(self.subject_name_or_default(subject_name))?;
        db.insert_note_with_file(
            &NewNote {
                author_id,
                subject_id: subject.id,
                title,
                content: "",
            },
            |note_id| {
                let dir = self.media_dir.join("notes").join(note_id.to_string());
                move_staged_upload(staged, &dir, file_name)
            },
        )
    }

    // ---------------------------------------------------------------
    // AI 단계
    // ---------------------------------------------------------------

    /// 노트 요약 생성/갱신. 실패하면 기존 요약은 그대로 남는다.
    pub async fn summarize(&self, note_id: i64) -> Result<Summary, StudyError> {
        let note = {
            let db = self.db.lock()?;
            db.get_note(note_id)?
        };
        if note.content.trim().is_empty() {
            return Err(StudyError::EmptyContent);
        }

        info!(note_id, "요약 요청");
        let text = self
            .assistant
            .summarize(&note.content, &self.language)
            .await?;

        let db = self.db.lock()?;
        // AI 호출 중 노트가 삭제됐을 수 있다
        db.get_note(note_id)?;
        let summary = db.upsert_summary(note_id, &text)?;
        info!(note_id, summary_id = summary.id, "요약 저장");
        Ok(summary)
    }

    /// 요약 기반 퀴즈 생성. 기존 퀴즈는 지우지 않고 덧붙인다.
    pub async fn generate_quiz(
        &self,
        note_id: i64,
        count: usize,
    ) -> Result<QuizGeneration, StudyError> {
        let summary = {
            let db = self.db.lock()?;
            db.get_note(note_id)?;
            db.get_summary_for_note(note_id)?
                .ok_or(StudyError::SummaryRequired)?
        };

        info!(note_id, count, "퀴즈 생성 요청");
        let items: Vec<_> = self
            .assistant
            .generate_quiz(&summary.content, count, &self.language)
            .await?
            .into_items()
            .into_iter()
            .filter(|item| !item.question.trim().is_empty())
            .collect();

        let quizzes = {
            let db = self.db.lock()?;
            db.insert_quizzes(summary.id, &items)?
        };

        if quizzes.is_empty() {
            warn!(note_id, "생성된 퀴즈가 없습니다");
        } else {
            info!(note_id, created = quizzes.len(), "퀴즈 저장");
        }
        Ok(QuizGeneration {
            created: quizzes.len(),
            quizzes,
        })
    }

    /// 제출 답안 채점 (읽기 전용)
    pub fn grade_quiz(
        &self,
        note_id: i64,
        answers: &HashMap<i64, String>,
    ) -> Result<GradeReport, StudyError> {
        let quizzes = {
            let db = self.db.lock()?;
            db.get_note(note_id)?;
            let summary = db
                .get_summary_for_note(note_id)?
                .ok_or(StudyError::SummaryRequired)?;
            db.list_quizzes(summary.id)?
        };
        if quizzes.is_empty() {
            return Err(StudyError::NoQuizzes);
        }

        let report = grading::grade(&quizzes, answers);
        info!(note_id, score = report.score, total = report.total, "채점");
        Ok(report)
    }

    // ---------------------------------------------------------------
    // 삭제 (관리용)
    // ---------------------------------------------------------------

    pub fn delete_note(&self, note_id: i64) -> Result<(), StudyError> {
        self.db.lock()?.delete_note(note_id)?;
        info!(note_id, "노트 삭제");
        Ok(())
    }

    pub fn delete_subject(&self, subject_id: i64) -> Result<(), StudyError> {
        self.db.lock()?.delete_subject(subject_id)?;
        info!(subject_id, "과목 삭제");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::QuizParse;
    use crate::db::Database;
    use crate::models::QuizItem;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::{tempdir, TempDir};

    /// 테스트용: 미리 정해 둔 응답을 차례로 돌려주는 스텁
    #[derive(Default)]
    struct StubAssistant {
        summaries: Mutex<Vec<Result<String, StudyError>>>,
        quizzes: Mutex<Vec<QuizParse>>,
        calls: AtomicUsize,
    }

    impl StubAssistant {
        fn with_summaries(summaries: Vec<Result<String, StudyError>>) -> Self {
            Self {
                summaries: Mutex::new(summaries),
                ..Default::default()
            }
        }

        fn with_quizzes(quizzes: Vec<QuizParse>) -> Self {
            Self {
                quizzes: Mutex::new(quizzes),
                ..Default::default()
            }
        }
    }

    impl StudyAssistant for StubAssistant {
        fn summarize(
            &self,
            _text: &str,
            _language: &str,
        ) -> impl Future<Output = Result<String, StudyError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.summaries.lock().unwrap().remove(0);
            async move { next }
        }

        fn generate_quiz(
            &self,
            _summary: &str,
            _count: usize,
            _language: &str,
        ) -> impl Future<Output = Result<QuizParse, StudyError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.quizzes.lock().unwrap().remove(0);
            async move { Ok(next) }
        }
    }

    fn items(n: usize) -> QuizParse {
        QuizParse::Parsed(
            (0..n)
                .map(|i| QuizItem {
                    question: format!("문항 {}", i),
                    answer: i % 2 == 0,
                    explanation: format!("해설 {}", i),
                })
                .collect(),
        )
    }

    fn workflow(assistant: StubAssistant) -> (NoteWorkflow<StubAssistant>, i64, TempDir) {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let author = db.get_or_create_author("admin").unwrap();
        let media = tempdir().unwrap();
        let wf = NoteWorkflow::new(
            DbState::new(db),
            assistant,
            media.path(),
            "ko",
            "네트워크 프로그래밍",
        );
        (wf, author.id, media)
    }

    fn summarized_note(wf: &NoteWorkflow<StubAssistant>, author_id: i64) -> Note {
        let note = wf
            .create_note("TCP", "TCP 는 연결지향 프로토콜이다", author_id, Some("네트워크"))
            .unwrap();
        wf.db()
            .lock()
            .unwrap()
            .upsert_summary(note.id, "- TCP 요약")
            .unwrap();
        note
    }

    #[test]
    fn test_create_note_reuses_subject_and_defaults_blank() {
        let (wf, author_id, _media) = workflow(StubAssistant::default());

        let a = wf.create_note("1", "a", author_id, Some(" 운영체제 ")).unwrap();
        let b = wf.create_note("2", "b", author_id, Some("운영체제")).unwrap();
        let c = wf.create_note("3", "c", author_id, Some("  ")).unwrap();

        assert_eq!(a.subject_id, b.subject_id);
        let subjects = wf.list_subjects().unwrap();
        assert_eq!(subjects.len(), 2);
        let default = subjects.iter().find(|s| s.id == c.subject_id).unwrap();
        assert_eq!(default.name, "네트워크 프로그래밍");
    }

    #[test]
    fn test_create_note_requires_title() {
        let (wf, author_id, _media) = workflow(StubAssistant::default());
        let err = wf.create_note("   ", "내용", author_id, None).unwrap_err();
        assert!(matches!(err, StudyError::InvalidInput(_)));
        assert!(wf.list_notes().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summarize_twice_keeps_one_summary() {
        let stub = StubAssistant::with_summaries(vec![
            Ok("- 첫 요약".to_string()),
            Ok("- 새 요약".to_string()),
        ]);
        let (wf, author_id, _media) = workflow(stub);
        let note = wf.create_note("TCP", "내용", author_id, None).unwrap();

        let first = wf.summarize(note.id).await.unwrap();
        let second = wf.summarize(note.id).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(wf.db().lock().unwrap().count_summaries().unwrap(), 1);
        let detail = wf.note_detail(note.id).unwrap();
        assert_eq!(detail.summary.unwrap().content, "- 새 요약");
    }

    #[tokio::test]
    async fn test_summarize_empty_content() {
        let (wf, author_id, _media) = workflow(StubAssistant::default());
        let note = wf.create_note("빈 노트", "  \n ", author_id, None).unwrap();

        let err = wf.summarize(note.id).await.unwrap_err();

        assert!(matches!(err, StudyError::EmptyContent));
        assert_eq!(wf.assistant.calls.load(Ordering::SeqCst), 0);
        assert_eq!(wf.db().lock().unwrap().count_summaries().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_summarize_keeps_previous_summary() {
        let stub = StubAssistant::with_summaries(vec![
            Ok("- 기존 요약".to_string()),
            Err(StudyError::upstream(Some(500), "server error")),
        ]);
        let (wf, author_id, _media) = workflow(stub);
        let note = wf.create_note("TCP", "내용", author_id, None).unwrap();

        wf.summarize(note.id).await.unwrap();
        let err = wf.summarize(note.id).await.unwrap_err();

        assert!(matches!(err, StudyError::UpstreamRequestFailed { .. }));
        let detail = wf.note_detail(note.id).unwrap();
        assert_eq!(detail.summary.unwrap().content, "- 기존 요약");
    }

    #[tokio::test]
    async fn test_summarize_unknown_note() {
        let (wf, _, _media) = workflow(StubAssistant::default());
        let err = wf.summarize(404).await.unwrap_err();
        assert!(matches!(err, StudyError::NoteNotFound(404)));
    }

    #[tokio::test]
    async fn test_generate_quiz_requires_summary() {
        let (wf, author_id, _media) = workflow(StubAssistant::with_quizzes(vec![items(5)]));
        let note = wf.create_note("TCP", "내용", author_id, None).unwrap();

        let err = wf.generate_quiz(note.id, DEFAULT_QUIZ_COUNT).await.unwrap_err();

        assert!(matches!(err, StudyError::SummaryRequired));
        assert_eq!(wf.assistant.calls.load(Ordering::SeqCst), 0);
        assert_eq!(wf.db().lock().unwrap().count_quizzes().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_generate_quiz_is_cumulative() {
        let (wf, author_id, _media) =
            workflow(StubAssistant::with_quizzes(vec![items(5), items(3)]));
        let note = summarized_note(&wf, author_id);

        let first = wf.generate_quiz(note.id, 5).await.unwrap();
        let second = wf.generate_quiz(note.id, 5).await.unwrap();

        assert_eq!(first.created, 5);
        assert_eq!(second.created, 3);
        assert_eq!(wf.note_detail(note.id).unwrap().quizzes.len(), 8);
    }

    #[tokio::test]
    async fn test_malformed_quiz_response_creates_nothing() {
        let (wf, author_id, _media) = workflow(StubAssistant::with_quizzes(vec![QuizParse::Empty]));
        let note = summarized_note(&wf, author_id);

        let generation = wf.generate_quiz(note.id, 5).await.unwrap();

        assert_eq!(generation.created, 0);
        assert!(generation.quizzes.is_empty());
        assert_eq!(wf.db().lock().unwrap().count_quizzes().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_blank_stub_items_are_not_inserted() {
        let parsed = QuizParse::Parsed(vec![
            QuizItem {
                question: "  ".to_string(),
                answer: true,
                explanation: String::new(),
            },
            QuizItem {
                question: "유효".to_string(),
                answer: false,
                explanation: String::new(),
            },
        ]);
        let (wf, author_id, _media) = workflow(StubAssistant::with_quizzes(vec![parsed]));
        let note = summarized_note(&wf, author_id);

        let generation = wf.generate_quiz(note.id, 2).await.unwrap();
        assert_eq!(generation.created, 1);
        assert_eq!(generation.quizzes[0].question, "유효");
    }

    #[tokio::test]
    async fn test_grade_quiz_score_and_read_only() {
        let (wf, author_id, _media) = workflow(StubAssistant::with_quizzes(vec![items(5)]));
        let note = summarized_note(&wf, author_id);
        let quizzes = wf.generate_quiz(note.id, 5).await.unwrap().quizzes;

        // 정답: true, false, true, false, true
        let answers = HashMap::from([
            (quizzes[0].id, "O".to_string()),
            (quizzes[1].id, "x".to_string()),
            (quizzes[2].id, "TRUE".to_string()),
            (quizzes[3].id, "t".to_string()),
            (quizzes[4].id, "".to_string()),
        ]);
        let report = wf.grade_quiz(note.id, &answers).unwrap();

        assert_eq!((report.score, report.total), (3, 5));
        assert_eq!(report.results[4].user_answer, None);

        let stored = wf.note_detail(note.id).unwrap().quizzes;
        let stored_answers: Vec<_> = stored.iter().map(|q| q.answer).collect();
        assert_eq!(stored_answers, vec![true, false, true, false, true]);
    }

    #[test]
    fn test_grade_quiz_preconditions() {
        let (wf, author_id, _media) = workflow(StubAssistant::default());
        let note = wf.create_note("TCP", "내용", author_id, None).unwrap();

        let err = wf.grade_quiz(note.id, &HashMap::new()).unwrap_err();
        assert!(matches!(err, StudyError::SummaryRequired));

        wf.db()
            .lock()
            .unwrap()
            .upsert_summary(note.id, "- 요약")
            .unwrap();
        let err = wf.grade_quiz(note.id, &HashMap::new()).unwrap_err();
        assert!(matches!(err, StudyError::NoQuizzes));
    }

    #[tokio::test]
    async fn test_upload_requires_file() {
        let (wf, author_id, _media) = workflow(StubAssistant::default());

        let err = wf
            .upload_note(Some("제목"), None, author_id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StudyError::MissingFile));

        let empty = UploadedFile {
            file_name: "empty.pdf".to_string(),
            bytes: Vec::new(),
        };
        let err = wf
            .upload_note(None, Some(empty), author_id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StudyError::MissingFile));
        assert!(wf.list_notes().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_keeps_note_when_extraction_fails() {
        let (wf, author_id, media) = workflow(StubAssistant::default());
        let file = UploadedFile {
            file_name: "../lecture 1.pdf".to_string(),
            bytes: b"definitely not a pdf".to_vec(),
        };

        let outcome = wf
            .upload_note(None, Some(file), author_id, Some("컴퓨터구조"))
            .await
            .unwrap();

        assert!(outcome.extraction_error.is_some());
        assert_eq!(outcome.note.title, "../lecture 1.pdf");
        assert_eq!(outcome.note.content, "");

        let stored_path = PathBuf::from(outcome.note.pdf_path.clone().unwrap());
        assert!(stored_path.starts_with(media.path()));
        assert_eq!(stored_path.file_name().unwrap(), "lecture 1.pdf");
        assert_eq!(std::fs::read(&stored_path).unwrap(), b"definitely not a pdf");

        let detail = wf.note_detail(outcome.note.id).unwrap();
        assert_eq!(detail.note.pdf_path, outcome.note.pdf_path);

        let leftovers = std::fs::read_dir(media.path().join(STAGING_DIR)).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[cfg(feature = "pdf")]
    #[tokio::test]
    async fn test_upload_extracts_pdf_text_into_note() {
        let (wf, author_id, _media) = workflow(StubAssistant::default());
        let file = UploadedFile {
            file_name: "week1.pdf".to_string(),
            bytes: crate::extract::sample_pdf(&["FirstPage", "SecondPage"]),
        };

        let outcome = wf
            .upload_note(Some("1주차"), Some(file), author_id, None)
            .await
            .unwrap();

        assert!(outcome.extraction_error.is_none());
        let content = outcome.note.content.clone();
        assert_eq!(content, content.trim());
        let first = content.find("FirstPage").unwrap();
        let second = content.find("SecondPage").unwrap();
        assert!(first < second, "content {:?}", content);

        let detail = wf.note_detail(outcome.note.id).unwrap();
        assert_eq!(detail.note.title, "1주차");
        assert_eq!(detail.note.content, content);
    }

    #[tokio::test]
    async fn test_failed_upload_insert_removes_staged_file() {
        let (wf, _author_id, media) = workflow(StubAssistant::default());
        let file = UploadedFile {
            file_name: "orphan.pdf".to_string(),
            bytes: b"%PDF-1.4".to_vec(),
        };

        // 존재하지 않는 작성자 → FK 위반으로 노트 삽입 실패
        let err = wf.upload_note(None, Some(file), 9999, None).await.unwrap_err();
        assert!(matches!(err, StudyError::Database(_)));

        assert!(wf.list_notes().unwrap().is_empty());
        let leftovers = std::fs::read_dir(media.path().join(STAGING_DIR)).unwrap().count();
        assert_eq!(leftovers, 0);
        assert!(!media.path().join("notes").exists());
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("C:\\Users\\me\\강의 1.pdf"), "강의 1.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("a<b>.pdf"), "a_b_.pdf");
        assert_eq!(sanitize_file_name(".."), "upload.pdf");
        assert_eq!(sanitize_file_name(""), "upload.pdf");
    }

    #[tokio::test]
    async fn test_delete_subject_cascades_through_workflow() {
        let (wf, author_id, _media) = workflow(StubAssistant::with_quizzes(vec![items(2)]));
        let note = summarized_note(&wf, author_id);
        wf.generate_quiz(note.id, 2).await.unwrap();

        wf.delete_subject(note.subject_id).unwrap();

        assert!(matches!(
            wf.note_detail(note.id),
            Err(StudyError::NoteNotFound(_))
        ));
        let db = wf.db().lock().unwrap();
        assert_eq!(db.count_summaries().unwrap(), 0);
        assert_eq!(db.count_quizzes().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_subject_detail_lists_notes_and_summaries() {
        let (wf, author_id, _media) = workflow(StubAssistant::default());
        let note = summarized_note(&wf, author_id);
        wf.create_note("UDP", "", author_id, Some("네트워크")).unwrap();

        let detail = wf.subject_detail(note.subject_id).unwrap();
        assert_eq!(detail.subject.name, "네트워크");
        assert_eq!(detail.notes.len(), 2);
        assert_eq!(detail.summaries.len(), 1);
        assert!(matches!(
            wf.subject_detail(999),
            Err(StudyError::SubjectNotFound(999))
        ));
    }
}
