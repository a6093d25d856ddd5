//! Study Notes - 학습 노트 서버 라이브러리
//!
//! 노트 작성/PDF 업로드, AI 요약, OX 퀴즈 생성과 채점을 담당합니다.
//! 저장소는 SQLite, AI 는 OpenAI 호환 Chat Completion API 를 사용합니다.

pub mod ai;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod logging;
pub mod models;
pub mod workflow;

use tracing::info;

pub use config::Config;
pub use error::{CommandError, CommandResult, StudyError};

use ai::OpenAiClient;
use commands::AppState;
use db::{Database, DbState};
use workflow::NoteWorkflow;

/// 설정으로 워크플로우와 라우터를 구성하고 서버를 실행
pub async fn run(config: Config) -> Result<(), StudyError> {
    // DB 디렉토리 생성
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::create_dir_all(&config.media_dir)?;

    // 데이터베이스 연결 및 초기화
    let db = Database::new(&config.database_path)?;
    db.initialize()?;
    let author = db.get_or_create_author(&config.author)?;

    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY 가 없어 요약/퀴즈 생성은 실패합니다");
    }
    let assistant = OpenAiClient::new(&config)?;
    info!(model = assistant.model(), base = %config.openai_api_base, "AI 클라이언트 준비");

    let workflow = NoteWorkflow::new(
        DbState::new(db),
        assistant,
        config.media_dir.clone(),
        config.language.clone(),
        config.default_subject.clone(),
    );
    let app = commands::router(AppState::new(workflow, author.id));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, db = ?config.database_path, author = %author.username, "서버 시작");
    axum::serve(listener, app).await?;
    Ok(())
}
