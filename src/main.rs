use study_notes_lib::{config, logging, Config};

#[tokio::main]
async fn main() {
    // 로컬 개발용 .env (없으면 무시). RUST_LOG 도 여기서 읽히므로 로깅보다 먼저.
    let env_path = config::load_dotenv();
    logging::init();
    if let Some(path) = env_path {
        tracing::info!(path = %path.display(), ".env 로드");
    }

    let config = Config::from_env();
    if let Err(e) = study_notes_lib::run(config).await {
        tracing::error!(error = %e, "서버 실행 실패");
        std::process::exit(1);
    }
}
