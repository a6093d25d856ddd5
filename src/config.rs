//! Configuration
//!
//! `.env` 로딩과 환경변수 기반 설정

use std::path::{Path, PathBuf};

/// 서버 설정
#[derive(Clone, Debug)]
pub struct Config {
    // --- OpenAI 호환 API ---
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_base: String,
    pub openai_org_id: Option<String>,
    pub openai_project_id: Option<String>,
    // --- 저장소 ---
    pub database_path: PathBuf,
    pub media_dir: PathBuf,
    // --- 서버 ---
    pub bind_addr: String,
    /// 요약/퀴즈 생성 언어 태그
    pub language: String,
    /// 노트 작성자로 사용할 계정 (인증은 외부에서 처리)
    pub author: String,
    /// 과목명을 비워 둔 노트가 들어갈 과목
    pub default_subject: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            openai_api_base: "https://api.openai.com".to_string(),
            openai_org_id: None,
            openai_project_id: None,
            database_path: PathBuf::from("study_notes.db"),
            media_dir: PathBuf::from("media"),
            bind_addr: "127.0.0.1:8000".to_string(),
            language: "ko".to_string(),
            author: "admin".to_string(),
            default_subject: "네트워크 프로그래밍".to_string(),
        }
    }
}

/// 비어 있지 않은 환경변수 값 (앞의 키가 우선)
fn env_non_empty(keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        std::env::var(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            openai_api_key: env_non_empty(&["OPENAI_API_KEY"]),
            openai_model: env_non_empty(&["OPENAI_MODEL"]).unwrap_or(default.openai_model),
            openai_api_base: env_non_empty(&["OPENAI_API_BASE"])
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(default.openai_api_base),
            openai_org_id: env_non_empty(&["OPENAI_ORG_ID", "OPENAI_ORGANIZATION"]),
            openai_project_id: env_non_empty(&["OPENAI_PROJECT_ID", "OPENAI_PROJECT"]),
            database_path: env_non_empty(&["STUDY_NOTES_DB"])
                .map(PathBuf::from)
                .unwrap_or(default.database_path),
            media_dir: env_non_empty(&["STUDY_NOTES_MEDIA_DIR"])
                .map(PathBuf::from)
                .unwrap_or(default.media_dir),
            bind_addr: env_non_empty(&["STUDY_NOTES_BIND"]).unwrap_or(default.bind_addr),
            language: env_non_empty(&["STUDY_NOTES_LANGUAGE"]).unwrap_or(default.language),
            author: env_non_empty(&["STUDY_NOTES_AUTHOR"]).unwrap_or(default.author),
            default_subject: env_non_empty(&["STUDY_NOTES_DEFAULT_SUBJECT"])
                .unwrap_or(default.default_subject),
        }
    }
}

fn is_valid_env_key(key: &str) -> bool {
    if key.is_empty() {
        return false;
    }
    // 관례적으로 ENV 키는 A-Z0-9_ 로 제한
    key.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// `KEY=VALUE` 라인만 골라낸다. 주석/코드펜스/설명 라인은 무시.
pub fn parse_env_lenient(text: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("```") {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line).trim();
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        let key = k.trim();
        if !is_valid_env_key(key) {
            continue;
        }

        let mut value = v.trim().to_string();
        // 간단한 quote 제거 ("..." / '...')
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = value[1..value.len() - 1].to_string();
        }

        pairs.push((key.to_string(), value));
    }

    pairs
}

fn try_load_env_lenient(path: &Path) -> std::io::Result<usize> {
    let text = std::fs::read_to_string(path)?;
    let mut loaded = 0usize;

    for (key, value) in parse_env_lenient(&text) {
        // 이미 설정된 값이 "비어있지 않으면" 덮어쓰지 않음
        if let Ok(existing) = std::env::var(&key) {
            if !existing.trim().is_empty() {
                continue;
            }
        }
        std::env::set_var(&key, value);
        loaded += 1;
    }

    Ok(loaded)
}

fn find_upwards(start: PathBuf, filename: &str, max_hops: usize) -> Option<PathBuf> {
    let mut cur = start;
    for _ in 0..=max_hops {
        let candidate = cur.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }
        if !cur.pop() {
            break;
        }
    }
    None
}

/// `.env` 를 작업 디렉토리에서 위로 올라가며 찾아 로드한다.
///
/// strict 파서(dotenvy)가 실패하면 lenient 로더로 보강한다. 파일이 없어도 에러가 아니다.
pub fn load_dotenv() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let path = find_upwards(cwd, ".env", 6)?;

    if dotenvy::from_path(&path).is_ok() {
        return Some(path);
    }
    match try_load_env_lenient(&path) {
        Ok(loaded) if loaded > 0 => Some(path),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_env_lenient_skips_noise() {
        let text = r#"
# OpenAI
```
OPENAI_API_KEY="sk-test"
export OPENAI_MODEL='gpt-4o'
lowercase_key=ignored
그냥 설명 문장
STUDY_NOTES_LANGUAGE = en
```
"#;
        let pairs = parse_env_lenient(text);
        assert_eq!(
            pairs,
            vec![
                ("OPENAI_API_KEY".to_string(), "sk-test".to_string()),
                ("OPENAI_MODEL".to_string(), "gpt-4o".to_string()),
                ("STUDY_NOTES_LANGUAGE".to_string(), "en".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_env_lenient_keeps_lone_quote() {
        let pairs = parse_env_lenient("A=\"");
        assert_eq!(pairs, vec![("A".to_string(), "\"".to_string())]);
    }

    #[test]
    fn test_find_upwards_walks_parents() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".env"), "X=1\n").unwrap();

        let found = find_upwards(nested.clone(), ".env", 4).unwrap();
        assert_eq!(found, dir.path().join(".env"));
        assert!(find_upwards(nested, ".env", 0).is_none());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.openai_api_base, "https://api.openai.com");
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.language, "ko");
    }
}
