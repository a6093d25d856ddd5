//! Logging
//!
//! `RUST_LOG` 로 필터를 덮어쓸 수 있다. 기본값은 이 크레이트 info, 나머지 warn.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,study_notes=info,study_notes_lib=info";

/// 전역 tracing subscriber 초기화 (두 번째 호출부터는 무시)
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
